//! Crawl statistics
//!
//! Counters kept by the crawl engine and printed when a run finishes.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Uniquely seen URLs
    pub visited: u64,

    /// Links with an unhandled scheme
    pub unhandled: u64,

    /// Links that answered with a 3xx status
    pub redirects: u64,

    /// Links with a bad status or a transport failure
    pub broken: u64,

    /// Of the broken links, how many never produced a status
    pub transport_failures: u64,

    /// Traversable pages fetched and parsed for links
    pub pages_expanded: u64,

    /// HEAD probes issued for external-only links
    pub probes: u64,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Returns the share of visited URLs that ended up broken, as a percentage
    pub fn broken_rate(&self) -> f64 {
        if self.visited == 0 {
            return 0.0;
        }
        (self.broken as f64 / self.visited as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URLs visited: {}", stats.visited);
    println!("  Pages expanded: {}", stats.pages_expanded);
    println!("  External probes: {}", stats.probes);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Outcomes:");
    println!("  Unhandled: {}", stats.unhandled);
    println!("  Redirects: {}", stats.redirects);
    println!(
        "  Broken: {} ({} transport failures)",
        stats.broken, stats.transport_failures
    );
    println!();

    println!("Broken Rate: {:.1}%", stats.broken_rate());
}
