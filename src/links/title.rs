// src/links/title.rs
// =============================================================================
// Best-effort page title lookup for converted links.
//
// The title is only shown next to the converted link, so every failure
// (network, HTTP status, missing <title>) turns into None instead of an
// error.
// =============================================================================

use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

pub async fn fetch_title(client: &Client, url: &Url) -> Option<String> {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Error fetching page title of {}: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::warn!(
            "Failed to fetch page title of {}: HTTP {}",
            url,
            response.status().as_u16()
        );
        return None;
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Error reading page of {}: {}", url, e);
            return None;
        }
    };

    extract_title(&html)
}

// Returns the trimmed text of the first <title> element, if any
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    let title = document.select(&selector).next()?;
    let text = title.text().collect::<String>();
    let text = text.trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
