//! HTML link extraction
//!
//! Finds every `<a href="...">` on a page and turns each href into a canonical URL
//! relative to the page it was found on.

use crate::url::{Normalizer, PageContext};
use scraper::{Html, Selector};

/// Extracts canonical link targets from parsed HTML documents
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    anchors: Option<Selector>,
    normalizer: Normalizer,
}

impl LinkExtractor {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            anchors: Selector::parse("a[href]").ok(),
            normalizer,
        }
    }

    /// Yields the canonical URL of every anchor with a non-empty href
    ///
    /// Links come out in document order. The iterator is single-pass and borrows
    /// the document for its lifetime.
    ///
    /// # Example
    ///
    /// ```
    /// use link_sweeper::crawler::LinkExtractor;
    /// use link_sweeper::url::{Normalizer, PageContext};
    /// use scraper::Html;
    ///
    /// let page = PageContext::from_url("https://ed.fnal.gov/staff/index.html").unwrap();
    /// let document = Html::parse_document(r#"<a href="/about">About</a>"#);
    /// let extractor = LinkExtractor::new(Normalizer::default());
    ///
    /// let links: Vec<String> = extractor.extract(&page, &document).collect();
    /// assert_eq!(links, vec!["https://ed.fnal.gov/about"]);
    /// ```
    pub fn extract<'a>(
        &'a self,
        page: &'a PageContext,
        document: &'a Html,
    ) -> impl Iterator<Item = String> + 'a {
        self.anchors
            .iter()
            .flat_map(move |anchors| document.select(anchors))
            .filter_map(|element| element.value().attr("href"))
            .filter(|href| !href.trim().is_empty())
            .map(move |href| self.normalizer.normalize(page, href))
    }

    /// Parses `html` and collects the canonical links found in it
    pub fn extract_from_html(&self, page: &PageContext, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        self.extract(page, &document).collect()
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new(Normalizer::default())
    }
}
