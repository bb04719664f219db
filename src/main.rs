//! Metacrawl main entry point
//!
//! This is the command-line interface for the Metacrawl gateway.

use anyhow::Context;
use clap::Parser;
use metacrawl::config::{load_config_or_default, Config};
use metacrawl::{gateway, MetaCrawl};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Metacrawl: a batch page-metadata crawler
///
/// Accepts batches of URLs over HTTP, crawls them in the background with
/// per-domain pacing, and serves the page titles and meta values it found
/// as CSV.
#[derive(Parser, Debug)]
#[command(name = "metacrawl")]
#[command(version)]
#[command(about = "A batch page-metadata crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding `server.bind-address`
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration, print the effective settings and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config_or_default(Some(path.as_path()))
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            load_config_or_default(None)
        }
    }
    .context("Failed to load configuration")?;

    if let Some(bind) = cli.bind {
        config.server.bind_address = bind.to_string();
    }

    if cli.dry_run {
        print_settings(&config);
        return Ok(());
    }

    let service = Arc::new(MetaCrawl::new(config.crawler.clone())?);
    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;

    gateway::serve(listener, service, shutdown_signal()).await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("metacrawl=info,tower_http=info,warn"),
            1 => EnvFilter::new("metacrawl=debug,tower_http=debug,info"),
            2 => EnvFilter::new("metacrawl=trace,tower_http=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: shows the configuration that would be served
fn print_settings(config: &Config) {
    println!("=== Metacrawl Dry Run ===\n");

    println!("Server:");
    println!("  Bind address: {}", config.server.bind_address);

    println!("\nCrawler:");
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout);
    println!("  Domain interval: {}ms", config.crawler.domain_interval);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Max body bytes: {}", config.crawler.max_body_bytes);
    println!(
        "  Drop undecodable rows: {}",
        config.crawler.drop_undecodable_rows
    );
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\n✓ Configuration is valid");
}

/// Resolves when the process receives Ctrl-C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received interrupt, shutting down"),
        Err(e) => {
            tracing::error!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
