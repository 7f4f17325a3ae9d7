// src/logging.rs
// =============================================================================
// Logging setup.
//
// Logs go to stderr so `--json` output on stdout stays machine-readable.
// RUST_LOG overrides the default filter entirely.
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,previewsynth=debug"
    } else {
        "warn,previewsynth=info"
    }
}

pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
