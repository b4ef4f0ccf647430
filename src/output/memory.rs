use crate::output::traits::{OutputResult, Outcome, ResultSink};

/// Result sink that keeps every row in memory
///
/// Useful for embedding the crawler in another program, where the caller
/// inspects the outcome lists directly instead of reading CSV files.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub visited: Vec<String>,
    pub unhandled: Vec<(String, String)>,
    pub redirects: Vec<Outcome>,
    pub broken: Vec<Outcome>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `url` appears in the unhandled, redirect, or broken streams
    pub fn has_outcome_for(&self, url: &str) -> bool {
        self.outcome_count(url) > 0
    }

    /// Number of unhandled, redirect, and broken rows naming `url`
    pub fn outcome_count(&self, url: &str) -> usize {
        self.unhandled.iter().filter(|(_, u)| u == url).count()
            + self.redirects.iter().filter(|o| o.url == url).count()
            + self.broken.iter().filter(|o| o.url == url).count()
    }
}

impl ResultSink for MemorySink {
    fn record_visited(&mut self, url: &str) -> OutputResult<()> {
        self.visited.push(url.to_string());
        Ok(())
    }

    fn record_unhandled(&mut self, page: &str, url: &str) -> OutputResult<()> {
        self.unhandled.push((page.to_string(), url.to_string()));
        Ok(())
    }

    fn record_redirect(&mut self, outcome: &Outcome) -> OutputResult<()> {
        self.redirects.push(outcome.clone());
        Ok(())
    }

    fn record_broken(&mut self, outcome: &Outcome) -> OutputResult<()> {
        self.broken.push(outcome.clone());
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::traits::Status;

    #[test]
    fn test_outcome_count() {
        let mut sink = MemorySink::new();
        sink.record_unhandled("p", "mailto:a@b.c").unwrap();
        sink.record_broken(&Outcome::new("p", "https://x/", Status::Code(404)))
            .unwrap();

        assert_eq!(sink.outcome_count("mailto:a@b.c"), 1);
        assert_eq!(sink.outcome_count("https://x/"), 1);
        assert!(!sink.has_outcome_for("https://y/"));
    }

    #[test]
    fn test_visited_kept_in_order() {
        let mut sink = MemorySink::new();
        sink.record_visited("a").unwrap();
        sink.record_visited("b").unwrap();
        assert_eq!(sink.visited, vec!["a", "b"]);
    }
}
