// src/links/registry.rs
// =============================================================================
// The registry owns every configured converter and picks the right one for a
// link.
//
// Matching order:
// 1. Resolver-backed converters, in configuration order
// 2. Direct converters, in configuration order
//
// Resolver mappings are usually narrow (one streaming platform) while direct
// mappings can be broad, so the narrow ones get the first look. Disabled
// converters are never returned by find_converter; lookup() still tells the
// caller about them so "known but switched off" reads differently from
// "never heard of it".
// =============================================================================

use anyhow::Result;
use reqwest::Client;
use url::Url;

use super::client::build_client;
use super::converter::{Converter, ConverterKind};
use super::mapping::LinkSummary;
use crate::config::Config;
use crate::error::ConvertError;

pub struct Registry {
    converters: Vec<Converter>,
    client: Client,
}

impl Registry {
    pub fn new(converters: Vec<Converter>, client: Client) -> Self {
        Self { converters, client }
    }

    /// Builds every converter and the shared client. Fails on the first
    /// invalid mapping so a bad config never starts half-loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let converters = config.converters()?;
        let client = build_client(&config.http)?;
        Ok(Self::new(converters, client))
    }

    /// The HTTP client shared by every conversion
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Every loaded converter, enabled or not, in configuration order
    pub fn converters(&self) -> &[Converter] {
        &self.converters
    }

    // Resolver-backed first, then direct; configuration order inside each group.
    // The iterator is lazy, so find() stops at the first hit.
    fn in_match_order(&self) -> impl Iterator<Item = &Converter> {
        let of_kind = move |kind: ConverterKind| {
            self.converters.iter().filter(move |c| c.kind() == kind)
        };
        of_kind(ConverterKind::Resolver).chain(of_kind(ConverterKind::Direct))
    }

    /// First enabled converter whose mapping accepts the link
    pub fn find_converter(&self, url: &Url) -> Option<&Converter> {
        tracing::debug!("Searching a converter for {} ...", url);

        let found = self
            .in_match_order()
            .find(|converter| converter.is_enabled() && converter.is_applicable(url));

        match found {
            Some(converter) => tracing::debug!("Found {}!", converter.name()),
            None => tracing::debug!("Didn't find a converter for {}", url),
        }
        found
    }

    /// Like find_converter, but explains a miss
    pub fn lookup(&self, url: &Url) -> Result<&Converter, ConvertError> {
        if let Some(converter) = self.find_converter(url) {
            return Ok(converter);
        }

        // Second pass over the disabled ones only to name the site
        match self
            .in_match_order()
            .find(|converter| !converter.is_enabled() && converter.is_applicable(url))
        {
            Some(disabled) => Err(ConvertError::DisabledMapping(disabled.name().to_string())),
            None => Err(ConvertError::UnsupportedLink(url.to_string())),
        }
    }

    /// Name, origin hosts and destination host of every enabled mapping
    pub fn supported_links(&self) -> Vec<LinkSummary> {
        self.converters
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| c.mapping().summary())
            .collect()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does find_converter return Option but lookup return Result?
//    - find_converter answers "who handles this?", and nobody is a normal
//      answer
//    - lookup feeds the user-facing report, which needs to know why nothing
//      matched (switched off vs. unknown website)
//
// 2. Why `impl Iterator` from in_match_order?
//    - Callers chain find() on it without collecting into a Vec
//    - The borrow of self is tied to the returned iterator, so the
//      converters can't change while it is in use
//
// 3. Why does the registry own the reqwest Client?
//    - Client keeps a connection pool; one per registry means every
//      conversion in a batch reuses the same connections
// -----------------------------------------------------------------------------
