// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The CLI plays the part a chat bot's command handlers would: it takes the
// links a user gives it, hands them to the conversion engine and prints
// what came back.
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "previewsynth",
    version,
    about = "Convert links from known websites to embed-friendly, tracking-free versions",
    long_about = "previewsynth recognizes links from the websites listed in its configuration \
                  and rewrites them to an embed-friendly equivalent. Query parameters (the text \
                  after a « ? » in a link) are removed along the way, which gets rid of tracking IDs."
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        long,
        short,
        global = true,
        env = "PREVIEWSYNTH_CONFIG_FILE_PATH",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Show debug logs (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert one or more links
    ///
    /// Example: previewsynth convert https://www.furaffinity.net/view/58904471/
    #[command(alias = "embed")]
    Convert {
        /// Links to convert
        #[arg(required = true)]
        links: Vec<String>,

        /// Output results in JSON format instead of text
        #[arg(long)]
        json: bool,

        /// How many links to convert at the same time
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
    },

    /// List the supported websites and what they convert to
    Links {
        /// Output the list in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show what this tool does and where its code lives
    About,
}
