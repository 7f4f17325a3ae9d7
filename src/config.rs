// src/config.rs
// =============================================================================
// Loads the YAML configuration: which websites we know, how to convert
// them, and the HTTP settings every request uses.
//
// Example:
//   about:
//     code_repo: https://github.com/example/previewsynth
//   links:
//     - name: FurAffinity
//       origins: [https://furaffinity.net/]
//       destination: https://xfuraffinity.net/
//     - name: Music
//       kind: resolver
//       origins: [https://open.spotify.com/, https://music.apple.com/]
//       destination: https://song.link/
//
// The file is read once at startup into an immutable Config that is handed
// to the registry explicitly.
// =============================================================================

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

use crate::links::{
    Converter, ConverterKind, DirectConverter, LinkMapping, ResolverConverter,
    DEFAULT_RESOLVER_ENDPOINT,
};

/// Default location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub about: About,
    #[serde(default)]
    pub http: HttpSettings,
    pub links: Vec<LinkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct About {
    /// Where users can read the code and suggest new websites
    #[serde(default)]
    pub code_repo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Upper bound for any single request (redirects included)
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 10,
            user_agent: concat!("previewsynth/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSettings {
    // reqwest treats a zero timeout as "fail immediately", which would turn
    // every link into a network error
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

/// One entry of the `links` list, as written in the file
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    pub name: String,
    pub origins: Vec<String>,
    pub destination: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub kind: ConverterKind,
    /// Resolver endpoint (resolver kind only)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Resolver API key (resolver kind only); missing or empty = public access
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!("Reading configuration file at {} ...", path.display());
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&data)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(data)?;
        config
            .http
            .validate()
            .context("Invalid http.timeout_secs setting")?;
        Ok(config)
    }

    /// Builds every converter, in file order
    pub fn converters(&self) -> Result<Vec<Converter>> {
        self.links.iter().map(LinkConfig::build).collect()
    }
}

impl LinkConfig {
    pub fn build(&self) -> Result<Converter> {
        let origins = self
            .origins
            .iter()
            .map(|origin| parse_site(origin))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Invalid origins for '{}'", self.name))?;
        let destination = parse_site(&self.destination)
            .with_context(|| format!("Invalid destination for '{}'", self.name))?;

        let mapping = LinkMapping::new(&self.name, origins, destination, self.enabled)?;

        let converter = match self.kind {
            ConverterKind::Direct => {
                if self.base_url.is_some() || self.api_key.is_some() {
                    tracing::warn!(
                        "'{}' is a direct mapping, ignoring its base_url/api_key",
                        self.name
                    );
                }
                Converter::Direct(DirectConverter::new(mapping))
            }
            ConverterKind::Resolver => {
                let base_url = self
                    .base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_RESOLVER_ENDPOINT);
                let base_url = Url::parse(base_url)
                    .with_context(|| format!("Invalid base_url for '{}'", self.name))?;
                let api_key = self.api_key.clone().unwrap_or_default();
                Converter::Resolver(ResolverConverter::new(mapping, base_url, api_key))
            }
        };

        Ok(converter)
    }
}

// Accepts full URLs ("https://tiktok.com/") and bare hostnames ("tiktok.com")
fn parse_site(value: &str) -> Result<Url> {
    let value = value.trim();
    match Url::parse(value) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{value}"))
            .map_err(|e| anyhow!("'{}' is not a valid site: {}", value, e)),
        Err(e) => Err(anyhow!("'{}' is not a valid site: {}", value, e)),
    }
}
