//! Result sink traits and types
//!
//! This module defines the trait interface for result sinks and the outcome
//! records they store.

use std::fmt;
use thiserror::Error;

/// Status written for requests that never produced an HTTP status
pub const TRANSPORT_FAILURE_CODE: u16 = 999;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Status of a processed link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// An HTTP status code was received
    Code(u16),
    /// Connection error, timeout, or anything else that prevented a status
    TransportFailure,
}

impl Status {
    /// Numeric form used in output rows
    pub fn code(&self) -> u16 {
        match self {
            Self::Code(code) => *code,
            Self::TransportFailure => TRANSPORT_FAILURE_CODE,
        }
    }

    /// Returns true for 3xx statuses
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Code(code) if code / 100 == 3)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A link that redirected or failed, together with the page that referred to it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Outcome {
    /// The page the link was found on
    pub page: String,

    /// The canonical URL of the link
    pub url: String,

    /// What happened when the link was requested
    pub status: Status,
}

impl Outcome {
    pub fn new(page: &str, url: &str, status: Status) -> Self {
        Self {
            page: page.to_string(),
            url: url.to_string(),
            status,
        }
    }
}

/// Trait for result sinks
///
/// A sink receives four append-only streams of crawl events. Rows are never
/// retracted, and the sink does no deduplication of its own: the engine records
/// each URL as visited exactly once and in at most one of the other three streams.
pub trait ResultSink {
    /// Records a uniquely seen canonical URL
    fn record_visited(&mut self, url: &str) -> OutputResult<()>;

    /// Records a link whose scheme is never requested
    ///
    /// # Arguments
    ///
    /// * `page` - The page that linked to it
    /// * `url` - The unhandled URL
    fn record_unhandled(&mut self, page: &str, url: &str) -> OutputResult<()>;

    /// Records a link that answered with a 3xx status
    fn record_redirect(&mut self, outcome: &Outcome) -> OutputResult<()>;

    /// Records a link that failed, either with a bad status or a transport failure
    fn record_broken(&mut self, outcome: &Outcome) -> OutputResult<()>;

    /// Flushes buffered rows to their destination
    fn flush(&mut self) -> OutputResult<()>;
}
