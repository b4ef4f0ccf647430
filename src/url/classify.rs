use crate::config::{ClassifierConfig, CrawlerConfig};
use crate::url::scheme_of;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// How the crawler handles a canonical URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlingCategory {
    /// Scheme is recorded but never requested (mail, script)
    UnhandledScheme,
    /// Page on the target host, fetched with GET and parsed for links
    Traversable,
    /// Probed with HEAD for reachability, never parsed
    ExternalOnly,
}

impl fmt::Display for HandlingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnhandledScheme => "unhandled-scheme",
            Self::Traversable => "traversable",
            Self::ExternalOnly => "external-only",
        };
        f.write_str(name)
    }
}

/// Routes canonical URLs into handling categories for one target host
///
/// Rules are evaluated in order:
/// 1. Unhandled scheme (`mailto`, `javascript` by default)
/// 2. Any other scheme besides `http`/`https` is external-only
/// 3. A path ending in a non-searchable extension is external-only
/// 4. A host other than the target host is external-only
/// 5. Everything else is traversable
///
/// # Examples
///
/// ```
/// use link_sweeper::url::{Classifier, HandlingCategory};
///
/// let classifier = Classifier::new("ed.fnal.gov");
/// assert_eq!(classifier.classify("https://ed.fnal.gov/about"), HandlingCategory::Traversable);
/// assert_eq!(classifier.classify("https://example.org/x"), HandlingCategory::ExternalOnly);
/// assert_eq!(classifier.classify("mailto:staff@fnal.gov"), HandlingCategory::UnhandledScheme);
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    target_host: String,
    unhandled_schemes: HashSet<String>,
    untraversable_extensions: HashSet<String>,
}

impl Classifier {
    /// Creates a classifier with the default scheme and extension rules
    pub fn new(target_host: &str) -> Self {
        Self::with_rules(target_host, &ClassifierConfig::default())
    }

    /// Creates a classifier from explicit rule lists
    pub fn with_rules(target_host: &str, rules: &ClassifierConfig) -> Self {
        Self {
            target_host: target_host.to_lowercase(),
            unhandled_schemes: rules
                .unhandled_schemes
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            untraversable_extensions: rules
                .untraversable_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Creates a classifier from the crawler configuration
    pub fn from_config(crawler: &CrawlerConfig, rules: &ClassifierConfig) -> Self {
        Self::with_rules(&crawler.target_host, rules)
    }

    pub fn target_host(&self) -> &str {
        &self.target_host
    }

    /// Classifies a canonical URL
    pub fn classify(&self, canonical_url: &str) -> HandlingCategory {
        let scheme = scheme_of(canonical_url).map(|s| s.to_lowercase());

        if let Some(scheme) = &scheme {
            if self.unhandled_schemes.contains(scheme) {
                return HandlingCategory::UnhandledScheme;
            }
        }

        if !matches!(scheme.as_deref(), Some("http") | Some("https")) {
            return HandlingCategory::ExternalOnly;
        }

        let url = match Url::parse(canonical_url) {
            Ok(url) => url,
            Err(_) => return HandlingCategory::ExternalOnly,
        };

        if self.has_untraversable_extension(url.path()) {
            return HandlingCategory::ExternalOnly;
        }

        match url.host_str() {
            Some(host) if host.eq_ignore_ascii_case(&self.target_host) => {
                HandlingCategory::Traversable
            }
            _ => HandlingCategory::ExternalOnly,
        }
    }

    fn has_untraversable_extension(&self, path: &str) -> bool {
        let last_segment = path.rsplit('/').next().unwrap_or("");
        match last_segment.rsplit_once('.') {
            Some((_, extension)) => self
                .untraversable_extensions
                .contains(&extension.to_lowercase()),
            None => false,
        }
    }
}
