// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the configuration and build the converter registry once
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = all converted, 1 = some link not converted,
//    2 = error)
// =============================================================================

mod cli;
mod config;
mod convert;
mod error;
mod links;
mod logging;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use config::Config;
use convert::{ConvertReport, ConvertStatus};
use links::{Converter, Registry};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load(&cli.config)?;
    let registry = Registry::from_config(&config)?;
    log_loaded_mappings(&registry);

    match cli.command {
        Commands::Convert {
            links,
            json,
            concurrency,
        } => handle_convert(&registry, &config, links, json, concurrency).await,
        Commands::Links { json } => {
            handle_links(&registry, &config, json)?;
            Ok(0)
        }
        Commands::About => {
            print_about(&config);
            Ok(0)
        }
    }
}

fn log_loaded_mappings(registry: &Registry) {
    for converter in registry.converters() {
        let mapping = converter.mapping();
        let origins: Vec<&str> = mapping
            .origins()
            .iter()
            .filter_map(|origin| origin.host_str())
            .collect();
        let endpoint = match converter {
            Converter::Resolver(resolver) => resolver.base_url().as_str(),
            Converter::Direct(_) => "-",
        };

        tracing::info!(
            site = mapping.name(),
            kind = ?converter.kind(),
            origins = ?origins,
            destination = mapping.destination().host_str().unwrap_or_default(),
            resolver = endpoint,
            enabled = mapping.is_enabled(),
            "Loaded link mapping"
        );
    }
    tracing::info!("Loaded {} link mapping(s)", registry.converters().len());
}

async fn handle_convert(
    registry: &Registry,
    config: &Config,
    links: Vec<String>,
    json: bool,
    concurrency: usize,
) -> Result<i32> {
    let reports = convert::convert_links(registry, links, concurrency).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report, config);
        }
    }

    if reports.iter().all(ConvertReport::is_ok) {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn print_report(report: &ConvertReport, config: &Config) {
    println!("🔗 {}", report.input);

    match &report.status {
        ConvertStatus::Converted { site, url, title } => {
            println!("   It's a link from {}! ✨", site);
            println!("   {}", url);
            if let Some(title) = title {
                println!("   📄 {}", title);
            }
        }
        ConvertStatus::Unchanged { url, .. } => {
            println!("   Hmm... That link already looks fine to me. 🤔");
            println!("   {}", url);
        }
        ConvertStatus::Unsupported => {
            println!("   Sorry, I don't have an equivalent for that website. 😥");
            if let Some(repo) = &config.about.code_repo {
                println!("   If you happen to know one, feel free to suggest it at {}/issues", repo);
            }
        }
        ConvertStatus::Disabled { site } => {
            println!("   I know {}, but converting its links is currently turned off. 💤", site);
        }
        ConvertStatus::NoResult { site } => {
            println!("   I couldn't resolve that {} link, maybe it isn't a known song? 🎶", site);
        }
        ConvertStatus::Error { message } => {
            println!("   ⚠️  {}", message);
        }
    }
    println!();
}

fn handle_links(registry: &Registry, config: &Config, json: bool) -> Result<()> {
    let links = registry.supported_links();

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
        return Ok(());
    }

    println!("Use « previewsynth convert <link> » to convert a link to an embed-friendly one. ✨");
    println!();
    println!("{:<20} {:<40} {:<30}", "WEBSITE", "ORIGINS", "DESTINATION");
    println!("{}", "=".repeat(90));
    for link in &links {
        println!(
            "{:<20} {:<40} {:<30}",
            link.name,
            link.origins.join(", "),
            link.destination
        );
    }

    if let Some(repo) = &config.about.code_repo {
        println!();
        println!("Know a translation I should learn? Suggest it at {}/issues/new 🌐", repo);
    }
    Ok(())
}

fn print_about(config: &Config) {
    println!("previewsynth {}", env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("Converted links are also stripped of their parameters (the text after a « ? »),");
    println!("which gets rid of tracking IDs for example. 😉");
    if let Some(repo) = &config.about.code_repo {
        println!();
        println!("Code: {}", repo);
    }
}
