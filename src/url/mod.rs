//! URL handling module for Link-Sweeper
//!
//! This module turns raw hrefs into canonical absolute URLs and decides how each
//! canonical URL is handled by the crawl engine.

mod classify;
mod normalize;

// Re-export main types
pub use classify::{Classifier, HandlingCategory};
pub use normalize::{normalize, Normalizer, PageContext};

/// Returns the scheme prefix of a URL or href, if it has one
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`, terminated
/// by `:`. The returned slice keeps its original case.
pub(crate) fn scheme_of(href: &str) -> Option<&str> {
    let (candidate, _) = href.split_once(':')?;
    let mut chars = candidate.chars();
    let first = chars.next()?;

    if first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_of() {
        assert_eq!(scheme_of("https://ed.fnal.gov/"), Some("https"));
        assert_eq!(scheme_of("MailTo:x@y.z"), Some("MailTo"));
        assert_eq!(scheme_of("svn+ssh://host/repo"), Some("svn+ssh"));
        assert_eq!(scheme_of("/about"), None);
        assert_eq!(scheme_of("photo.jpg"), None);
        assert_eq!(scheme_of("a/b:c"), None);
        assert_eq!(scheme_of("1http://x"), None);
        assert_eq!(scheme_of(":nothing"), None);
    }
}
