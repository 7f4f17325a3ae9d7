// src/links/client.rs
// =============================================================================
// Builds the one HTTP client every network step shares.
//
// Redirect expansion, resolver API calls and title fetches all go through
// this client, so the timeout and redirect limit apply to every request.
// =============================================================================

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::config::HttpSettings;
use crate::error::ConvertError;

// Returns a builder preconfigured from the settings
//
// Tests use this to add DNS overrides before building.
pub fn client_builder(settings: &HttpSettings) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
        .user_agent(settings.user_agent.clone())
}

pub fn build_client(settings: &HttpSettings) -> Result<Client, ConvertError> {
    Ok(client_builder(settings).build()?)
}
