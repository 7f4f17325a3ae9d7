// src/links/normalize.rs
// =============================================================================
// This module holds the URL cleaning steps every converter builds on.
//
// Steps:
// - parse_link: accept only absolute http(s) URLs
// - expand_redirects: follow short links (vm.tiktok.com/...) to the real page
// - strip_subdomains: www.example.com -> example.com
// - strip_query: drop ?si=... style tracking parameters
//
// Order matters: expand first, then strip. A redirect target may live on a
// different host and carry its own tracking parameters.
//
// Rust concepts:
// - Borrowing: the pure steps take &Url and hand back a new Url
// - Result<T, E>: strip_subdomains and expand_redirects can fail
// =============================================================================

use reqwest::Client;
use url::{Host, Url};

use crate::error::ConvertError;

// Parses user input into an absolute http(s) URL
//
// Leading/trailing whitespace is ignored since links pasted into a terminal
// or a chat often carry some.
pub fn parse_link(input: &str) -> Result<Url, ConvertError> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|e| ConvertError::InvalidUrl {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConvertError::InvalidUrl {
            input: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if url.host_str().is_none() {
        return Err(ConvertError::InvalidUrl {
            input: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

// Keeps only the last two dot-separated labels of the hostname
//
// This is label based, not public-suffix aware: news.bbc.co.uk becomes
// co.uk. The configured origins are written with that in mind.
//
// Examples:
//   https://www.example.com/a   -> https://example.com/a
//   https://sfw.furaffinity.net -> https://furaffinity.net
//   https://example.com         -> unchanged
//   http://localhost            -> MalformedHost
pub fn strip_subdomains(url: &Url) -> Result<Url, ConvertError> {
    tracing::debug!("Filtering out subdomains of link {}", url);

    let domain = match url.host() {
        Some(Host::Domain(domain)) => domain,
        Some(other) => return Err(ConvertError::MalformedHost(other.to_string())),
        None => return Err(ConvertError::MalformedHost(String::new())),
    };

    // A fully-qualified "example.com." still has two labels
    let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(ConvertError::MalformedHost(domain.to_string()));
    }

    let reduced = labels[labels.len() - 2..].join(".");

    let mut filtered = url.clone();
    filtered
        .set_host(Some(&reduced))
        .map_err(|_| ConvertError::MalformedHost(domain.to_string()))?;

    tracing::debug!("Filtered out subdomains of link: {} -> {}", url, filtered);
    Ok(filtered)
}

// Rebuilds the link from its origin and path only
//
// Query string and fragment are both dropped. Scheme, host, port and path
// are left exactly as they were.
pub fn strip_query(url: &Url) -> Url {
    let mut cleaned = url.clone();
    cleaned.set_query(None);
    cleaned.set_fragment(None);

    if cleaned != *url {
        tracing::debug!("Cleaned link: {} -> {}", url, cleaned);
    }
    cleaned
}

// Follows redirects and returns where the link finally lands
//
// The client's redirect policy does the following; we only look at the final
// response URL and drop the response without reading its body.
pub async fn expand_redirects(client: &Client, url: &Url) -> Result<Url, ConvertError> {
    tracing::debug!("Expanding link {} ...", url);

    let response = client.get(url.clone()).send().await?;
    let expanded = response.url().clone();
    drop(response);

    if expanded != *url {
        tracing::debug!("Expanded link: {} -> {}", url, expanded);
    }
    Ok(expanded)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does strip_subdomains return a new Url instead of mutating?
//    - The caller keeps the original around to detect "already clean" links
//    - Url is cheap enough to clone for one link per request
//
// 2. Why drop(response) explicitly in expand_redirects?
//    - reqwest only downloads the body when asked (text(), bytes(), ...)
//    - Dropping the response closes it without pulling a whole web page
// -----------------------------------------------------------------------------
