//! Main entry point for the gtranslate CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gtranslate::ClientConfig;

mod cli;

use cli::commands::Commands;

/// gtranslate - translate text through the public translate web endpoint
#[derive(Parser, Debug)]
#[command(name = "gtranslate", version, about, long_about = None)]
struct Args {
    /// Server address (defaults to GTRANSLATE_SERVER or the international host)
    #[arg(long)]
    server: Option<String>,

    /// Proxy URL for every request
    #[arg(long)]
    proxy: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Load configuration from a JSON or YAML file instead of the environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_CRATE_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };

    // Override config with CLI args if provided
    if let Some(server) = args.server {
        config.server = server;
    }
    if let Some(proxy) = args.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    // Execute command
    match args.command {
        Some(Commands::Translate {
            text,
            source_lang,
            target_lang,
            json,
        }) => {
            cli::commands::handle_translate(&config, text, source_lang, target_lang, json)?;
        }
        Some(Commands::Languages) => {
            cli::commands::handle_languages()?;
        }
        Some(Commands::Token { text, key }) => {
            cli::commands::handle_token(text, key)?;
        }
        Some(Commands::Key) => {
            cli::commands::handle_key(&config)?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
