//! CSV result sink
//!
//! Writes the four output streams as comma-separated files, each starting with a
//! fixed header row.

use crate::config::OutputConfig;
use crate::output::traits::{OutputResult, Outcome, ResultSink};
use csv::Writer;
use std::fs::{self, File};
use std::path::Path;

/// Header of the broken links file
pub const RESULTS_HEADER: [&str; 3] = ["host_page", "broken_url", "status"];

/// Header of the redirects file
pub const REDIRECTS_HEADER: [&str; 3] = ["host_page", "redirected_url", "status"];

/// Header of the visited URLs file
pub const VISITED_HEADER: [&str; 1] = ["url"];

/// Header of the unhandled links file
pub const UNHANDLED_HEADER: [&str; 2] = ["page", "url"];

/// Result sink backed by four CSV files
pub struct CsvSink {
    results: Writer<File>,
    redirects: Writer<File>,
    visited: Writer<File>,
    unhandled: Writer<File>,
}

impl CsvSink {
    /// Creates (or truncates) the four output files and writes their headers
    ///
    /// The output directory is created if it does not exist.
    pub fn create(config: &OutputConfig) -> OutputResult<Self> {
        fs::create_dir_all(&config.directory)?;

        Ok(Self {
            results: open_stream(&config.results_path(), &RESULTS_HEADER)?,
            redirects: open_stream(&config.redirects_path(), &REDIRECTS_HEADER)?,
            visited: open_stream(&config.visited_path(), &VISITED_HEADER)?,
            unhandled: open_stream(&config.unhandled_path(), &UNHANDLED_HEADER)?,
        })
    }
}

fn open_stream(path: &Path, header: &[&str]) -> OutputResult<Writer<File>> {
    tracing::debug!("Opening output file {}", path.display());
    let mut writer = Writer::from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

impl ResultSink for CsvSink {
    fn record_visited(&mut self, url: &str) -> OutputResult<()> {
        self.visited.write_record([url])?;
        Ok(())
    }

    fn record_unhandled(&mut self, page: &str, url: &str) -> OutputResult<()> {
        self.unhandled.write_record([page, url])?;
        Ok(())
    }

    fn record_redirect(&mut self, outcome: &Outcome) -> OutputResult<()> {
        let status = outcome.status.to_string();
        self.redirects
            .write_record([outcome.page.as_str(), outcome.url.as_str(), status.as_str()])?;
        Ok(())
    }

    fn record_broken(&mut self, outcome: &Outcome) -> OutputResult<()> {
        let status = outcome.status.to_string();
        self.results
            .write_record([outcome.page.as_str(), outcome.url.as_str(), status.as_str()])?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.results.flush()?;
        self.redirects.flush()?;
        self.visited.flush()?;
        self.unhandled.flush()?;
        Ok(())
    }
}
