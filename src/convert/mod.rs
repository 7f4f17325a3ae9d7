// src/convert/mod.rs
// =============================================================================
// The command layer between the CLI and the link engine.
//
// It takes raw user input, runs every link through the registry and turns
// each outcome into a ConvertReport the CLI can print as text or JSON.
// =============================================================================

mod batch;

pub use batch::{convert_links, ConvertReport, ConvertStatus};
