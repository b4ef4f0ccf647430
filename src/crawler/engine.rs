//! Crawl engine - traversal state machine
//!
//! The engine owns the seen set and the work queue. Every discovered URL passes
//! through the same steps:
//! - Skip it if it was seen before, otherwise mark it seen and record it as visited
//! - Classify it
//! - Unhandled scheme: record and stop
//! - Traversable: GET it, and on 2xx queue every link found on the page
//! - External-only: HEAD it
//! - Record 3xx statuses as redirects, other non-2xx statuses and transport failures as broken
//!
//! Traversal is breadth-first over an explicit queue, so stack depth does not grow
//! with the link graph. Requests run concurrently up to the configured limit, but the
//! seen set, queue and sink are only touched by the task driving the engine.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchedPage, Transport, TransportError};
use crate::crawler::parser::LinkExtractor;
use crate::output::{CrawlStatistics, Outcome, OutputResult, ResultSink, Status};
use crate::url::{Classifier, HandlingCategory, Normalizer, PageContext};
use crate::SweepError;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often (in visited URLs) progress is logged
const PROGRESS_INTERVAL: u64 = 100;

/// Request timeouts and concurrency for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Timeout for GET requests on traversable pages
    pub get_timeout: Duration,

    /// Timeout for HEAD probes on external-only links
    pub head_timeout: Duration,

    /// Maximum number of requests in flight
    pub max_in_flight: usize,
}

impl EngineSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            get_timeout: Duration::from_millis(config.get_timeout_ms),
            head_timeout: Duration::from_millis(config.head_timeout_ms),
            max_in_flight: config.max_concurrent_requests.max(1) as usize,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            get_timeout: Duration::from_secs(2),
            head_timeout: Duration::from_secs(1),
            max_in_flight: 1,
        }
    }
}

/// A link waiting to be processed, with the page it was found on
#[derive(Debug, Clone)]
struct Discovered {
    page: String,
    url: String,
}

/// A network request the engine decided to make
#[derive(Debug)]
enum Job {
    Fetch(Discovered),
    Probe(Discovered),
}

#[derive(Debug)]
enum Response {
    Fetched(Result<FetchedPage, TransportError>),
    Probed(Result<u16, TransportError>),
}

#[derive(Debug)]
struct Completed {
    link: Discovered,
    response: Response,
}

/// Single-host crawl engine
pub struct Engine<T, S> {
    transport: Arc<T>,
    sink: S,
    classifier: Classifier,
    normalizer: Normalizer,
    extractor: LinkExtractor,
    settings: EngineSettings,
    seen: HashSet<String>,
    queue: VecDeque<Discovered>,
    stats: CrawlStatistics,
    started: Instant,
}

impl<T, S> Engine<T, S>
where
    T: Transport + 'static,
    S: ResultSink,
{
    /// Creates an engine with an empty seen set
    pub fn new(
        transport: T,
        sink: S,
        classifier: Classifier,
        normalizer: Normalizer,
        settings: EngineSettings,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            sink,
            classifier,
            normalizer,
            extractor: LinkExtractor::new(normalizer),
            settings,
            seen: HashSet::new(),
            queue: VecDeque::new(),
            stats: CrawlStatistics::default(),
            started: Instant::now(),
        }
    }

    /// Crawls from each seed in turn, using the seed as its own referring page
    pub async fn run(&mut self, seeds: &[String]) -> Result<(), SweepError> {
        for seed in seeds {
            let canonical = self
                .canonical_seed(seed)
                .ok_or_else(|| SweepError::InvalidSeed { url: seed.clone() })?;

            tracing::info!("Start processing {}", canonical);
            self.process(&canonical, &canonical).await?;
            tracing::info!("Finished processing {}", canonical);
        }

        tracing::info!("Finished processing all seed URLs");
        Ok(())
    }

    /// Processes `url` found on `page`, and everything reachable from it
    ///
    /// Returns once the queue is empty and no request is in flight. A URL that was
    /// already seen is a no-op. Per-link failures are recorded in the sink; only
    /// sink write errors are returned.
    pub async fn process(&mut self, page: &str, url: &str) -> Result<(), SweepError> {
        self.queue.push_back(Discovered {
            page: page.to_string(),
            url: url.to_string(),
        });
        self.drain().await
    }

    /// Flushes the sink and returns it together with the run statistics
    pub fn finish(mut self) -> Result<(S, CrawlStatistics), SweepError> {
        self.sink.flush()?;
        self.stats.elapsed = self.started.elapsed();
        tracing::info!(
            "Crawl finished: {} URLs visited, {} broken, {} redirects in {:?}",
            self.stats.visited,
            self.stats.broken,
            self.stats.redirects,
            self.stats.elapsed
        );
        Ok((self.sink, self.stats))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Returns true if `url` has already been dispatched
    pub fn has_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    fn canonical_seed(&self, seed: &str) -> Option<String> {
        let context = PageContext::from_url(seed.trim())?;
        Some(self.normalizer.normalize(&context, seed))
    }

    /// Runs queued work to completion
    ///
    /// On a sink error the in-flight requests are dropped and the queue is cleared,
    /// so a later `process` call starts from its own target only.
    async fn drain(&mut self) -> Result<(), SweepError> {
        let result = self.drain_queue().await;
        if result.is_err() {
            self.queue.clear();
        }
        result
    }

    async fn drain_queue(&mut self) -> Result<(), SweepError> {
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.settings.max_in_flight {
                let Some(link) = self.queue.pop_front() else {
                    break;
                };
                if let Some(job) = self.admit(link)? {
                    in_flight.push(self.dispatch(job));
                }
            }

            match in_flight.next().await {
                Some(completed) => self.route(completed)?,
                None => break,
            }
        }

        Ok(())
    }

    /// Dedups, records and classifies a link; returns the request to make, if any
    fn admit(&mut self, link: Discovered) -> OutputResult<Option<Job>> {
        tracing::debug!("Starting to process link {} on page {}", link.url, link.page);

        if !self.seen.insert(link.url.clone()) {
            tracing::debug!("Already seen {}, will not process it again", link.url);
            return Ok(None);
        }

        self.sink.record_visited(&link.url)?;
        self.stats.visited += 1;
        if self.stats.visited % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} URLs visited, {} queued",
                self.stats.visited,
                self.queue.len()
            );
        }

        let category = self.classifier.classify(&link.url);
        tracing::debug!("Link {} is {}", link.url, category);

        match category {
            HandlingCategory::UnhandledScheme => {
                self.sink.record_unhandled(&link.page, &link.url)?;
                self.stats.unhandled += 1;
                Ok(None)
            }
            HandlingCategory::Traversable => Ok(Some(Job::Fetch(link))),
            HandlingCategory::ExternalOnly => Ok(Some(Job::Probe(link))),
        }
    }

    fn dispatch(&self, job: Job) -> BoxFuture<'static, Completed> {
        let transport = Arc::clone(&self.transport);

        match job {
            Job::Fetch(link) => {
                let timeout = self.settings.get_timeout;
                async move {
                    tracing::debug!("Trying to get {}", link.url);
                    let response = Response::Fetched(transport.get(&link.url, timeout).await);
                    Completed { link, response }
                }
                .boxed()
            }
            Job::Probe(link) => {
                let timeout = self.settings.head_timeout;
                async move {
                    tracing::debug!("Will not traverse {}; testing for access", link.url);
                    let response = Response::Probed(transport.head(&link.url, timeout).await);
                    Completed { link, response }
                }
                .boxed()
            }
        }
    }

    /// Records the outcome of a request and queues links from expanded pages
    fn route(&mut self, completed: Completed) -> OutputResult<()> {
        let Completed { link, response } = completed;

        match response {
            Response::Fetched(Ok(page)) => {
                tracing::debug!("Status for {} is {}", link.url, page.status);
                if is_good(page.status) {
                    self.expand(&link.url, &page.body);
                } else {
                    self.record_bad_status(&link, page.status)?;
                }
            }
            Response::Probed(Ok(status)) => {
                tracing::debug!("Status for {} is {}", link.url, status);
                self.stats.probes += 1;
                if !is_good(status) {
                    self.record_bad_status(&link, status)?;
                }
            }
            Response::Fetched(Err(e)) => self.record_transport_failure(&link, &e)?,
            Response::Probed(Err(e)) => {
                self.stats.probes += 1;
                self.record_transport_failure(&link, &e)?;
            }
        }

        Ok(())
    }

    fn expand(&mut self, page_url: &str, body: &str) {
        let Some(context) = PageContext::from_url(page_url) else {
            tracing::debug!("Cannot use {} as a page context, skipping its links", page_url);
            return;
        };

        self.stats.pages_expanded += 1;
        let links = self.extractor.extract_from_html(&context, body);
        tracing::debug!("Found {} links on {}", links.len(), page_url);

        for url in links {
            if self.seen.contains(&url) {
                continue;
            }
            self.queue.push_back(Discovered {
                page: page_url.to_string(),
                url,
            });
        }
    }

    fn record_bad_status(&mut self, link: &Discovered, code: u16) -> OutputResult<()> {
        let outcome = Outcome::new(&link.page, &link.url, Status::Code(code));
        if outcome.status.is_redirect() {
            self.sink.record_redirect(&outcome)?;
            self.stats.redirects += 1;
        } else {
            self.sink.record_broken(&outcome)?;
            self.stats.broken += 1;
        }
        Ok(())
    }

    fn record_transport_failure(
        &mut self,
        link: &Discovered,
        error: &TransportError,
    ) -> OutputResult<()> {
        tracing::warn!("Request for {} (on {}) failed: {}", link.url, link.page, error);
        let outcome = Outcome::new(&link.page, &link.url, Status::TransportFailure);
        self.sink.record_broken(&outcome)?;
        self.stats.broken += 1;
        self.stats.transport_failures += 1;
        Ok(())
    }
}

/// Returns true for 2xx statuses
fn is_good(status: u16) -> bool {
    (200..300).contains(&status)
}
