// src/convert/batch.rs
// =============================================================================
// Converts several links concurrently and reports on each one.
//
// Every link is an independent task: one slow short-link or an unreachable
// resolver API never holds the others back. Results come back in completion
// order, each tagged with the input it belongs to.
//
// Rust concepts:
// - Streams: buffer_unordered runs up to N conversions at once
// - Enums with data: ConvertStatus carries exactly what each outcome needs
// =============================================================================

use futures::stream::{self, StreamExt};
use serde::Serialize;
use url::Url;

use crate::error::ConvertError;
use crate::links::{expand_redirects, parse_link, Converter, Registry};

// One outcome per link. Serialized with an internal "status" tag so the
// JSON output reads {"status": "converted", "site": ..., "url": ...}
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConvertStatus {
    /// The link was rewritten
    Converted {
        site: String,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// The link was already on the destination site
    Unchanged { site: String, url: String },
    /// No configured website matches
    Unsupported,
    /// A website matches but its mapping is switched off
    Disabled { site: String },
    /// The resolver API couldn't make sense of the link
    NoResult { site: String },
    /// Bad input or a network failure
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    pub input: String,
    #[serde(flatten)]
    pub status: ConvertStatus,
}

impl ConvertReport {
    /// Converted and already-clean links both count as success
    pub fn is_ok(&self) -> bool {
        matches!(
            self.status,
            ConvertStatus::Converted { .. } | ConvertStatus::Unchanged { .. }
        )
    }
}

/// Converts every input, running at most `concurrency` conversions at once.
/// The reports come back in completion order, not input order.
pub async fn convert_links(
    registry: &Registry,
    inputs: Vec<String>,
    concurrency: usize,
) -> Vec<ConvertReport> {
    // Each input becomes a future; buffer_unordered polls up to N of them
    // and yields whichever finishes first
    stream::iter(inputs)
        .map(|input| async move {
            let status = convert_one(registry, &input).await;
            ConvertReport { input, status }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

async fn convert_one(registry: &Registry, input: &str) -> ConvertStatus {
    tracing::debug!("Requested to convert {}", input);

    let url = match parse_link(input) {
        Ok(url) => url,
        Err(e) => return failure(e),
    };

    // Match on the link as given first. Short links (bit.ly, t.co, ...)
    // only reveal their website once their redirects are followed.
    let (converter, target) = match registry.lookup(&url) {
        Ok(converter) => (converter, url.clone()),
        Err(ConvertError::UnsupportedLink(_)) => match match_expanded(registry, &url).await {
            Ok(found) => found,
            Err(e) => return failure(e),
        },
        Err(e) => return failure(e),
    };

    tracing::debug!("Found the following match: {}", converter.name());
    let site = converter.name().to_string();

    // "Unchanged" is judged against what the user typed, so a short link
    // landing on the destination site still counts as converted
    match converter.resolve(registry.client(), &target).await {
        Ok(Some(conversion)) if conversion.is_unchanged(&url) => ConvertStatus::Unchanged {
            site,
            url: conversion.url.to_string(),
        },
        Ok(Some(conversion)) => ConvertStatus::Converted {
            site,
            url: conversion.url.to_string(),
            title: conversion.title,
        },
        Ok(None) => ConvertStatus::NoResult { site },
        Err(e) => failure(e),
    }
}

// Follows the redirects of a link nothing recognized and matches again on
// where it lands. A link that can't be fetched stays unsupported.
async fn match_expanded<'a>(
    registry: &'a Registry,
    url: &Url,
) -> Result<(&'a Converter, Url), ConvertError> {
    let expanded = match expand_redirects(registry.client(), url).await {
        Ok(expanded) => expanded,
        Err(e) => {
            tracing::debug!("Could not expand unrecognized link {}: {}", url, e);
            return Err(ConvertError::UnsupportedLink(url.to_string()));
        }
    };

    // Same link after expansion: the first lookup already said no
    if expanded == *url {
        return Err(ConvertError::UnsupportedLink(url.to_string()));
    }

    tracing::debug!("Unrecognized link {} redirects to {}", url, expanded);
    let converter = registry.lookup(&expanded)?;
    Ok((converter, expanded))
}

// Maps engine errors to the outcome shown to the user. Unsupported and
// disabled links are normal answers, not failures, so only the rest is
// logged as a warning.
fn failure(error: ConvertError) -> ConvertStatus {
    match error {
        ConvertError::UnsupportedLink(_) => ConvertStatus::Unsupported,
        ConvertError::DisabledMapping(site) => ConvertStatus::Disabled { site },
        other => {
            tracing::warn!("Conversion failed: {}", other);
            ConvertStatus::Error {
                message: other.to_string(),
            }
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why match twice (before and after redirects)?
//    - Most links are already on a known website, so the first lookup costs
//      no request at all
//    - Short links (bit.ly, t.co, a forwarding domain) only name their
//      website after the redirects are followed
//
// 2. Why does a disabled website on the first lookup stop right away?
//    - The link is recognized; following its redirects can't change that
//      the user switched the mapping off
//
// 3. Why `async move` inside map()?
//    - Each future owns its input String and only borrows the registry,
//      which outlives the whole stream
// -----------------------------------------------------------------------------
