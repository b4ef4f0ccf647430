//! Link-Sweeper main entry point
//!
//! This is the command-line interface for the Link-Sweeper link-integrity crawler.

use clap::Parser;
use link_sweeper::config::{load_config_with_hash, Config};
use link_sweeper::crawler::crawl;
use link_sweeper::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Sweeper: a single-host link-integrity crawler
///
/// Link-Sweeper follows every link reachable from the seed URLs on the target
/// host, probes links that leave the host, and writes visited URLs, unhandled
/// links, redirects and broken links to CSV files.
#[derive(Parser, Debug)]
#[command(name = "link-sweeper")]
#[command(version = "1.0.0")]
#[command(about = "A single-host link-integrity crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the CSV files into this directory instead of the configured one
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(dir) = &cli.output_dir {
        config.output = config.output.with_directory(dir);
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_sweeper=info,warn"),
            1 => EnvFilter::new("link_sweeper=debug,info"),
            2 => EnvFilter::new("link_sweeper=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Link-Sweeper Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Target host: {}", config.crawler.target_host);
    println!("  GET timeout: {}ms", config.crawler.get_timeout_ms);
    println!("  HEAD timeout: {}ms", config.crawler.head_timeout_ms);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Keep query strings: {}", config.crawler.keep_query);

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\nClassifier:");
    println!(
        "  Unhandled schemes: {}",
        config.classifier.unhandled_schemes.join(", ")
    );
    println!(
        "  Untraversable extensions: {}",
        config.classifier.untraversable_extensions.join(", ")
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Broken links: {}", config.output.results_path().display());
    println!("  Redirects: {}", config.output.redirects_path().display());
    println!("  Visited: {}", config.output.visited_path().display());
    println!("  Unhandled: {}", config.output.unhandled_path().display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    match crawl(config).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
