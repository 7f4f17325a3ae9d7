// src/error.rs
// =============================================================================
// Error type for the link conversion core.
//
// The core uses one typed error enum so callers can tell apart
// "never heard of this site", "known but switched off" and "the network
// let us down". The CLI layer wraps these in anyhow where it just needs to
// report and exit.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input is not a well-formed absolute HTTP(S) URL
    #[error("invalid link '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    /// A configured mapping breaks its invariants (no origins, bad destination)
    #[error("invalid mapping '{name}': {reason}")]
    InvalidMapping { name: String, reason: String },

    /// The host has fewer than two labels (or is an IP address)
    #[error("cannot strip subdomains from host '{0}'")]
    MalformedHost(String),

    /// No configured mapping recognizes the link
    #[error("no configured website matches {0}")]
    UnsupportedLink(String),

    /// A mapping recognizes the link but is disabled
    #[error("'{0}' is supported but currently disabled")]
    DisabledMapping(String),

    /// Transport failure (DNS, connect, timeout, TLS, too many redirects)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The resolver API answered with something we can't use
    #[error("could not resolve {url}: {reason}")]
    Resolution { url: String, reason: String },
}
