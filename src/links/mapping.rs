// src/links/mapping.rs
// =============================================================================
// A mapping ties one website's hostnames (origins) to the host its links
// should be rewritten to (destination).
//
// Mappings are built once from the configuration and never change
// afterwards. A disabled mapping stays loaded but converters refuse to use
// it.
// =============================================================================

use serde::Serialize;
use url::Url;

use crate::error::ConvertError;

#[derive(Debug, Clone)]
pub struct LinkMapping {
    name: String,
    origins: Vec<Url>,
    destination: Url,
    enabled: bool,
}

/// What the `links` listing shows for one mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    pub name: String,
    pub origins: Vec<String>,
    pub destination: String,
}

impl LinkMapping {
    /// Creates a mapping, checking that it has at least one origin and that
    /// every URL involved is an absolute http(s) URL with a host
    pub fn new(
        name: impl Into<String>,
        origins: Vec<Url>,
        destination: Url,
        enabled: bool,
    ) -> Result<Self, ConvertError> {
        let name = name.into();
        let invalid = |reason: String| ConvertError::InvalidMapping {
            name: name.clone(),
            reason,
        };

        if origins.is_empty() {
            return Err(invalid("at least one origin is required".to_string()));
        }
        for url in origins.iter().chain(std::iter::once(&destination)) {
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(invalid(format!("'{}' is not an absolute http(s) URL", url)));
            }
        }

        tracing::debug!(
            "Created {} mapping that converts to {} from {:?}. It is {}.",
            name,
            host_of(&destination),
            origins.iter().map(host_of).collect::<Vec<_>>(),
            if enabled { "enabled" } else { "disabled" }
        );

        Ok(Self {
            name,
            origins,
            destination,
            enabled,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origins(&self) -> &[Url] {
        &self.origins
    }

    pub fn destination(&self) -> &Url {
        &self.destination
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // Already-converted links (destination host) count as supported so the
    // caller can say "that link already looks fine". Origins match by plain
    // suffix, which lets www./sfw./vm. variants through before stripping.
    pub fn is_applicable(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };

        if host == host_of(&self.destination) {
            return true;
        }

        self.origins
            .iter()
            .any(|origin| host.ends_with(host_of(origin)))
    }

    pub fn summary(&self) -> LinkSummary {
        LinkSummary {
            name: self.name.clone(),
            origins: self.origins.iter().map(|o| host_of(o).to_string()).collect(),
            destination: host_of(&self.destination).to_string(),
        }
    }
}

fn host_of(url: &Url) -> &str {
    url.host_str().unwrap_or_default()
}
