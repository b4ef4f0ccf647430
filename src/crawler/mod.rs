//! Crawler module for link traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and probing
//! - HTML parsing and link extraction
//! - The crawl engine that dedups, classifies and routes every link

mod engine;
mod fetcher;
mod parser;

pub use engine::{Engine, EngineSettings};
pub use fetcher::{
    build_http_client, user_agent_string, FetchedPage, HttpTransport, Transport, TransportError,
    TransportErrorKind,
};
pub use parser::LinkExtractor;

use crate::config::Config;
use crate::output::{CrawlStatistics, CsvSink};
use crate::url::{Classifier, Normalizer};
use crate::SweepError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the four CSV output files
/// 2. Build the HTTP client
/// 3. Crawl from every seed URL
/// 4. Flush the output files and return the run statistics
///
/// # Example
///
/// ```no_run
/// use link_sweeper::config::load_config;
/// use link_sweeper::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = crawl(config).await?;
/// println!("{} broken links", stats.broken);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlStatistics, SweepError> {
    let sink = CsvSink::create(&config.output)?;
    let transport = HttpTransport::from_config(&config.user_agent)?;
    let classifier = Classifier::from_config(&config.crawler, &config.classifier);
    let normalizer = Normalizer::new(config.crawler.keep_query);
    let settings = EngineSettings::from_config(&config.crawler);

    tracing::info!(
        "Crawling host {} from {} seed(s), {} request(s) in flight",
        classifier.target_host(),
        config.crawler.seeds.len(),
        settings.max_in_flight
    );

    let mut engine = Engine::new(transport, sink, classifier, normalizer, settings);
    engine.run(&config.crawler.seeds).await?;

    let (_, stats) = engine.finish()?;
    Ok(stats)
}
