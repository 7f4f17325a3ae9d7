// src/links/converter.rs
// =============================================================================
// Converters turn a recognized link into its embed-friendly equivalent.
//
// Two kinds exist:
// - Direct: swaps scheme/host/port for the destination's (xfuraffinity.net)
// - Resolver: asks an external API for the canonical page (song.link)
//
// Both share the same contract (is_applicable + resolve), so they live in a
// single enum instead of a trait object: the set of kinds is closed and
// matching on it keeps the registry simple.
// =============================================================================

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::mapping::LinkMapping;
use super::normalize::{expand_redirects, strip_query, strip_subdomains};
use super::resolver::ResolverConverter;
use super::title::fetch_title;
use crate::error::ConvertError;

/// Which conversion strategy a mapping uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    #[default]
    Direct,
    Resolver,
}

/// A successfully converted link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub url: Url,
    pub title: Option<String>,
}

impl Conversion {
    /// True when the conversion only removed tracking parameters, i.e. the
    /// input was already on the right site
    pub fn is_unchanged(&self, input: &Url) -> bool {
        self.url == strip_query(input)
    }
}

#[derive(Debug, Clone)]
pub enum Converter {
    Direct(DirectConverter),
    Resolver(ResolverConverter),
}

impl Converter {
    pub fn mapping(&self) -> &LinkMapping {
        match self {
            Converter::Direct(direct) => direct.mapping(),
            Converter::Resolver(resolver) => resolver.mapping(),
        }
    }

    pub fn name(&self) -> &str {
        self.mapping().name()
    }

    pub fn is_enabled(&self) -> bool {
        self.mapping().is_enabled()
    }

    pub fn kind(&self) -> ConverterKind {
        match self {
            Converter::Direct(_) => ConverterKind::Direct,
            Converter::Resolver(_) => ConverterKind::Resolver,
        }
    }

    pub fn is_applicable(&self, url: &Url) -> bool {
        self.mapping().is_applicable(url)
    }

    // Ok(None) is the "could not resolve" outcome, only the resolver
    // produces it
    pub async fn resolve(
        &self,
        client: &Client,
        url: &Url,
    ) -> Result<Option<Conversion>, ConvertError> {
        match self {
            Converter::Direct(direct) => direct.resolve(client, url).await.map(Some),
            Converter::Resolver(resolver) => resolver.resolve(client, url).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectConverter {
    mapping: LinkMapping,
}

impl DirectConverter {
    pub fn new(mapping: LinkMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &LinkMapping {
        &self.mapping
    }

    pub fn is_applicable(&self, url: &Url) -> bool {
        self.mapping.is_applicable(url)
    }

    // Keeps path, query and fragment; takes scheme, host and port from the
    // destination
    pub fn convert(&self, url: &Url) -> Result<Url, ConvertError> {
        if !self.is_applicable(url) {
            return Err(ConvertError::UnsupportedLink(url.to_string()));
        }

        let mut converted = self.mapping.destination().clone();
        converted.set_path(url.path());
        converted.set_query(url.query());
        converted.set_fragment(url.fragment());

        tracing::debug!("Converted link: {} -> {}", url, converted);
        Ok(converted)
    }

    // The local part of the pipeline: strip subdomains, strip query, convert
    pub fn clean(&self, url: &Url) -> Result<Url, ConvertError> {
        let reduced = strip_subdomains(url)?;
        self.convert(&strip_query(&reduced))
    }

    pub async fn resolve(&self, client: &Client, url: &Url) -> Result<Conversion, ConvertError> {
        if !self.mapping.is_enabled() {
            return Err(ConvertError::DisabledMapping(self.mapping.name().to_string()));
        }

        let expanded = expand_or_keep(client, url).await;
        let converted = self.clean(&expanded)?;
        let title = fetch_title(client, &converted).await;

        Ok(Conversion {
            url: converted,
            title,
        })
    }
}

// A link that can't be fetched is treated as already final; the later steps
// still clean it up
pub(crate) async fn expand_or_keep(client: &Client, url: &Url) -> Url {
    match expand_redirects(client, url).await {
        Ok(expanded) => expanded,
        Err(e) => {
            tracing::warn!("Could not expand {}, using it as is: {}", url, e);
            url.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use crate::links::client::client_builder;
    use std::net::SocketAddr;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn direct(name: &str, origins: &[&str], destination: &str) -> DirectConverter {
        let origins = origins.iter().map(|o| url(o)).collect();
        DirectConverter::new(LinkMapping::new(name, origins, url(destination), true).unwrap())
    }

    fn furaffinity() -> DirectConverter {
        direct(
            "FurAffinity",
            &["https://furaffinity.net/"],
            "https://xfuraffinity.net/",
        )
    }

    // Client whose DNS sends every listed host to `addr`
    fn client_resolving(hosts: &[&str], addr: SocketAddr) -> Client {
        hosts
            .iter()
            .fold(client_builder(&HttpSettings::default()), |builder, host| {
                builder.resolve(host, addr)
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_convert_after_stripping_subdomains() {
        let converter = furaffinity();
        let full = url("https://www.furaffinity.net/view/58904471/");
        let converted = converter.convert(&strip_subdomains(&full).unwrap()).unwrap();
        assert_eq!(converted, url("https://xfuraffinity.net/view/58904471/"));
    }

    #[test]
    fn test_convert_keeps_query_and_replaces_port() {
        let converter = direct("Site", &["https://site.test/"], "https://embed.test:8443/");
        let converted = converter
            .convert(&url("http://site.test:8080/a/b?keep=1"))
            .unwrap();
        assert_eq!(converted, url("https://embed.test:8443/a/b?keep=1"));
    }

    #[test]
    fn test_convert_rejects_unsupported_links() {
        let result = furaffinity().convert(&url("https://example.com/view/1/"));
        assert!(matches!(result, Err(ConvertError::UnsupportedLink(_))));
    }

    #[test]
    fn test_clean_with_subdomains_and_params() {
        let converted = furaffinity()
            .clean(&url("https://sfw.furaffinity.net/view/58904471/?testy=testtest"))
            .unwrap();
        assert_eq!(converted, url("https://xfuraffinity.net/view/58904471/"));
    }

    #[test]
    fn test_conversion_is_unchanged() {
        let conversion = Conversion {
            url: url("https://xfuraffinity.net/view/1/"),
            title: None,
        };
        assert!(conversion.is_unchanged(&url("https://xfuraffinity.net/view/1/?utm=x")));
        assert!(!conversion.is_unchanged(&url("https://furaffinity.net/view/1/")));
    }

    #[tokio::test]
    async fn test_resolve_disabled_mapping() {
        let mapping = LinkMapping::new(
            "Off",
            vec![url("https://off.test/")],
            url("https://on.test/"),
            false,
        )
        .unwrap();
        let converter = Converter::Direct(DirectConverter::new(mapping));

        let result = converter
            .resolve(&Client::new(), &url("https://off.test/a"))
            .await;
        assert!(matches!(result, Err(ConvertError::DisabledMapping(name)) if name == "Off"));
    }

    #[tokio::test]
    async fn test_resolve_without_live_redirect() {
        // Nothing listens on port 1: expansion and title fetch both fail and
        // the pipeline carries on with the link as given
        let dead: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let client = client_resolving(&["sfw.furaffinity.net", "xfuraffinity.net"], dead);

        let conversion = furaffinity()
            .resolve(
                &client,
                &url("http://sfw.furaffinity.net:1/view/58904471/?testy=testtest"),
            )
            .await
            .unwrap();

        assert_eq!(conversion.url, url("https://xfuraffinity.net/view/58904471/"));
        assert_eq!(conversion.title, None);
    }

    #[tokio::test]
    async fn test_resolve_expands_short_links() {
        let server = MockServer::start().await;
        let port = server.address().port();
        Mock::given(method("GET"))
            .and(path("/ZMhtQT3Yf/"))
            .respond_with(ResponseTemplate::new(301).insert_header(
                "location",
                format!("http://www.tiktok.test:{port}/@user/video/12345?_r=1&share=x"),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/@user/video/12345"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><head><title>user on TikTok</title></head></html>"),
            )
            .mount(&server)
            .await;

        let client = client_resolving(
            &["vm.tiktok.test", "www.tiktok.test", "vxtiktok.test"],
            *server.address(),
        );
        let converter = direct(
            "TikTok",
            &["https://tiktok.test/", "https://vm.tiktok.test/"],
            &format!("http://vxtiktok.test:{port}/"),
        );

        let conversion = converter
            .resolve(&client, &url(&format!("http://vm.tiktok.test:{port}/ZMhtQT3Yf/")))
            .await
            .unwrap();

        assert_eq!(
            conversion.url,
            url(&format!("http://vxtiktok.test:{port}/@user/video/12345"))
        );
        assert_eq!(conversion.title.as_deref(), Some("user on TikTok"));
    }

    #[tokio::test]
    async fn test_resolve_destination_link_is_unchanged() {
        let server = MockServer::start().await;
        let port = server.address().port();
        Mock::given(method("GET"))
            .and(path("/view/1/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_resolving(&["xfuraffinity.test"], *server.address());
        let destination = format!("http://xfuraffinity.test:{port}/");
        let converter = direct("FurAffinity", &["https://furaffinity.test/"], &destination);

        let input = url(&format!("{destination}view/1/?testy=testtest"));
        let conversion = converter.resolve(&client, &input).await.unwrap();

        assert_eq!(conversion.url, strip_query(&input));
        assert!(conversion.is_unchanged(&input));
    }

    #[tokio::test]
    async fn test_resolve_redirect_to_unknown_site_is_unsupported() {
        let server = MockServer::start().await;
        let port = server.address().port();
        Mock::given(method("GET"))
            .and(path("/s/abc"))
            .respond_with(ResponseTemplate::new(302).insert_header(
                "location",
                format!("http://elsewhere.test:{port}/landing"),
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_resolving(&["short.test", "elsewhere.test"], *server.address());
        let converter = direct("Short", &["https://short.test/"], "https://long.test/");

        let result = converter
            .resolve(&client, &url(&format!("http://short.test:{port}/s/abc")))
            .await;
        assert!(matches!(result, Err(ConvertError::UnsupportedLink(_))));
    }
}
