//! HTTP transport implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building HTTP clients with proper user agent strings
//! - GET requests that fetch traversable pages
//! - HEAD requests that probe external-only links
//! - Classifying transport failures
//!
//! Redirects are never followed, so 3xx statuses reach the engine unchanged.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Kind of failure that prevented an HTTP status from being obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request timed out
    Timeout,
    /// The connection could not be established
    Connect,
    /// Any other request-level failure (invalid URL, TLS, body read, ...)
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connection error",
            Self::Other => "request error",
        };
        f.write_str(name)
    }
}

/// Failure of a single request; recorded, never fatal to the crawl
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, e.to_string())
    }
}

/// Response to a GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Page body; empty unless the status is 2xx
    pub body: String,
}

/// HTTP transport used by the crawl engine
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches a page with GET
    ///
    /// The body is only downloaded for 2xx responses.
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage, TransportError>;

    /// Probes a URL with HEAD and returns its status
    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportError>;
}

/// Formats the user agent string: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use link_sweeper::config::UserAgentConfig;
/// use link_sweeper::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "LinkSweeper".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a transport identifying itself with the configured user agent
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage, TransportError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Ok(FetchedPage {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let body = response.text().await?;
        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }

    async fn head(&self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        let response = self.client.head(url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }
}
