// src/links/mod.rs
// =============================================================================
// The link conversion engine.
//
// Submodules:
// - normalize: URL cleaning steps (redirects, subdomains, query strings)
// - mapping: configured origin -> destination pairs
// - converter: direct (hostname swap) converters and the Converter enum
// - resolver: converters backed by an external resolution API
// - registry: picks the converter for a link
// - title: best-effort page title lookup
// - client: the shared HTTP client
// =============================================================================

mod client;
mod converter;
mod mapping;
mod normalize;
mod registry;
mod resolver;
mod title;

pub use converter::{Conversion, Converter, ConverterKind, DirectConverter};
pub use mapping::{LinkMapping, LinkSummary};
pub use normalize::{expand_redirects, parse_link};
pub use registry::Registry;
pub use resolver::{ResolverConverter, DEFAULT_RESOLVER_ENDPOINT};
