use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure for Link-Sweeper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The only host whose pages are fetched and expanded
    #[serde(rename = "target-host")]
    pub target_host: String,

    /// URLs the crawl starts from
    pub seeds: Vec<String>,

    /// Timeout for GET requests on traversable pages (milliseconds)
    #[serde(rename = "get-timeout-ms", default = "default_get_timeout_ms")]
    pub get_timeout_ms: u64,

    /// Timeout for HEAD probes on external-only links (milliseconds)
    #[serde(rename = "head-timeout-ms", default = "default_head_timeout_ms")]
    pub head_timeout_ms: u64,

    /// Maximum number of requests in flight at once
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Keep query strings as part of the canonical URL
    #[serde(rename = "keep-query", default)]
    pub keep_query: bool,
}

/// URL classification rules
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Schemes that are recorded but never requested
    #[serde(rename = "unhandled-schemes", default = "default_unhandled_schemes")]
    pub unhandled_schemes: Vec<String>,

    /// File extensions that are probed but never parsed for links
    #[serde(
        rename = "untraversable-extensions",
        default = "default_untraversable_extensions"
    )]
    pub untraversable_extensions: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            unhandled_schemes: default_unhandled_schemes(),
            untraversable_extensions: default_untraversable_extensions(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the four CSV files are written into
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Broken links file
    #[serde(rename = "results-file", default = "default_results_file")]
    pub results_file: String,

    /// Redirects file
    #[serde(rename = "redirects-file", default = "default_redirects_file")]
    pub redirects_file: String,

    /// Visited URLs file
    #[serde(rename = "visited-file", default = "default_visited_file")]
    pub visited_file: String,

    /// Unhandled scheme links file
    #[serde(rename = "unhandled-file", default = "default_unhandled_file")]
    pub unhandled_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            results_file: default_results_file(),
            redirects_file: default_redirects_file(),
            visited_file: default_visited_file(),
            unhandled_file: default_unhandled_file(),
        }
    }
}

impl OutputConfig {
    pub fn results_path(&self) -> PathBuf {
        self.directory.join(&self.results_file)
    }

    pub fn redirects_path(&self) -> PathBuf {
        self.directory.join(&self.redirects_file)
    }

    pub fn visited_path(&self) -> PathBuf {
        self.directory.join(&self.visited_file)
    }

    pub fn unhandled_path(&self) -> PathBuf {
        self.directory.join(&self.unhandled_file)
    }

    /// Returns a copy writing into `directory` instead
    pub fn with_directory(&self, directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
            ..self.clone()
        }
    }
}

fn default_get_timeout_ms() -> u64 {
    2000
}

fn default_head_timeout_ms() -> u64 {
    1000
}

fn default_max_concurrent_requests() -> u32 {
    1
}

fn default_unhandled_schemes() -> Vec<String> {
    ["mailto", "javascript"].iter().map(|s| s.to_string()).collect()
}

fn default_untraversable_extensions() -> Vec<String> {
    [
        "gif", "jpg", "jpeg", "mp4", "mov", "pdf", "ppt", "pptx", "xls", "xlsx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_results_file() -> String {
    "results.csv".to_string()
}

fn default_redirects_file() -> String {
    "redirects.csv".to_string()
}

fn default_visited_file() -> String {
    "visited.csv".to_string()
}

fn default_unhandled_file() -> String {
    "unhandled.csv".to_string()
}
