//! Output module for recording crawl outcomes
//!
//! This module handles:
//! - The result sink interface and outcome records
//! - Writing the visited, unhandled, redirects and broken-link streams as CSV
//! - An in-memory sink for embedding and tests
//! - Crawl statistics

mod csv_output;
mod memory;
pub mod stats;
mod traits;

pub use csv_output::{CsvSink, REDIRECTS_HEADER, RESULTS_HEADER, UNHANDLED_HEADER, VISITED_HEADER};
pub use memory::MemorySink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, Outcome, ResultSink, Status, TRANSPORT_FAILURE_CODE};
