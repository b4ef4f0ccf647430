use crate::url::scheme_of;
use url::Url;

/// Location of the page whose hrefs are being resolved
///
/// Supplies the scheme, host and path that relative hrefs inherit. A context is built
/// from the canonical URL of the page currently being parsed and lives only for that
/// traversal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    base: Url,
}

impl PageContext {
    /// Builds a context from separate scheme, host and path components
    ///
    /// Returns `None` when the components do not form an absolute URL.
    pub fn new(scheme: &str, host: &str, path: &str) -> Option<Self> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Self::from_url(&format!("{}://{}{}", scheme, host, path))
    }

    /// Builds a context from a canonical URL string
    pub fn from_url(url: &str) -> Option<Self> {
        Url::parse(url).ok().map(|base| Self { base })
    }

    pub fn scheme(&self) -> &str {
        self.base.scheme()
    }

    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or("")
    }

    pub fn path(&self) -> &str {
        self.base.path()
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }
}

/// Converts hrefs found on a page into canonical absolute URLs
///
/// # Canonical Form
///
/// 1. `mailto:` hrefs (any case) are returned unchanged apart from surrounding whitespace
/// 2. Relative hrefs are resolved against the page: a missing scheme or host is
///    inherited, and a relative path is joined onto the directory of the page path
/// 3. Scheme and host are lowercased
/// 4. Dot segments are resolved and runs of `/` collapse to a single `/`
/// 5. An empty path becomes `/`; a trailing slash is kept
/// 6. The fragment is dropped, and so is the query unless `keep_query` is set
///
/// Normalization never fails: an href that cannot be resolved is returned trimmed,
/// which later surfaces as a transport failure when it is probed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    keep_query: bool,
}

impl Normalizer {
    pub fn new(keep_query: bool) -> Self {
        Self { keep_query }
    }

    /// Normalizes `raw_href` relative to `page`
    ///
    /// # Examples
    ///
    /// ```
    /// use link_sweeper::url::{Normalizer, PageContext};
    ///
    /// let page = PageContext::from_url("https://ed.fnal.gov/staff/index.html").unwrap();
    /// let normalizer = Normalizer::default();
    /// assert_eq!(normalizer.normalize(&page, "/about"), "https://ed.fnal.gov/about");
    /// assert_eq!(
    ///     normalizer.normalize(&page, "team.html#top"),
    ///     "https://ed.fnal.gov/staff/team.html"
    /// );
    /// ```
    pub fn normalize(&self, page: &PageContext, raw_href: &str) -> String {
        let href = raw_href.trim();

        if scheme_of(href).is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto")) {
            return href.to_string();
        }

        let mut url = match page.base.join(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Keeping unresolvable href {:?} as-is: {}", href, e);
                return href.to_string();
            }
        };

        if let Some(host) = url.host_str() {
            let lowered = host.to_lowercase();
            if lowered != host {
                // Only reachable for non-special schemes; special hosts are already lowercase
                let _ = url.set_host(Some(&lowered));
            }
        }

        if !url.cannot_be_a_base() {
            url = settle_path(url);
            url.set_fragment(None);
            if !self.keep_query {
                url.set_query(None);
            }
        }

        url.into()
    }
}

/// Normalizes `raw_href` relative to `page` with the default canonical form
///
/// # Examples
///
/// ```
/// use link_sweeper::url::{normalize, PageContext};
///
/// let page = PageContext::from_url("https://ed.fnal.gov/gallery/").unwrap();
/// assert_eq!(normalize(&page, "photo.jpg"), "https://ed.fnal.gov/gallery/photo.jpg");
/// assert_eq!(normalize(&page, "mailto:staff@fnal.gov"), "mailto:staff@fnal.gov");
/// ```
pub fn normalize(page: &PageContext, raw_href: &str) -> String {
    Normalizer::default().normalize(page, raw_href)
}

/// Collapses slashes in the path of `url` until the path stops changing
///
/// Without a host, the url crate writes a path starting with `//` as `/.//`. Collapsing
/// that leaves a `/./` prefix which only resolves when the URL is parsed again.
fn settle_path(mut url: Url) -> Url {
    for _ in 0..MAX_PATH_PASSES {
        let path = collapse_slashes(url.path());
        if path == url.path() {
            break;
        }
        url.set_path(&path);
        match Url::parse(url.as_str()) {
            Ok(reparsed) => url = reparsed,
            Err(_) => break,
        }
    }
    url
}

const MAX_PATH_PASSES: usize = 4;

/// Collapses runs of `/` into one, keeping leading and trailing slashes
fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }

    if collapsed.is_empty() {
        "/".to_string()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> PageContext {
        PageContext::from_url(url).unwrap()
    }

    #[test]
    fn test_root_relative_href() {
        let page = page("https://ed.fnal.gov/staff/index.html");
        assert_eq!(normalize(&page, "/about"), "https://ed.fnal.gov/about");
    }

    #[test]
    fn test_directory_relative_href() {
        let page = page("https://ed.fnal.gov/gallery/");
        assert_eq!(
            normalize(&page, "photo.jpg"),
            "https://ed.fnal.gov/gallery/photo.jpg"
        );
    }

    #[test]
    fn test_relative_href_drops_last_page_segment() {
        let page = page("https://ed.fnal.gov/staff/index.html");
        assert_eq!(
            normalize(&page, "bios.html"),
            "https://ed.fnal.gov/staff/bios.html"
        );
    }

    #[test]
    fn test_parent_segments_resolved() {
        let page = page("https://ed.fnal.gov/a/b/index.html");
        assert_eq!(normalize(&page, "../c/d.html"), "https://ed.fnal.gov/a/c/d.html");
        assert_eq!(normalize(&page, "./e.html"), "https://ed.fnal.gov/a/b/e.html");
        assert_eq!(normalize(&page, "/../../x"), "https://ed.fnal.gov/x");
    }

    #[test]
    fn test_mailto_returned_unchanged() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(
            normalize(&page, "mailto:staff@fnal.gov"),
            "mailto:staff@fnal.gov"
        );
        assert_eq!(
            normalize(&page, "MailTo:Staff@FNAL.gov?subject=Hi"),
            "MailTo:Staff@FNAL.gov?subject=Hi"
        );
    }

    #[test]
    fn test_scheme_and_host_lowercased() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(
            normalize(&page, "HTTPS://Ed.FNAL.Gov/Staff"),
            "https://ed.fnal.gov/Staff"
        );
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(normalize(&page, "https://example.org"), "https://example.org/");
    }

    #[test]
    fn test_scheme_relative_inherits_scheme() {
        let page = page("http://ed.fnal.gov/");
        assert_eq!(
            normalize(&page, "//cdn.example.org/lib"),
            "http://cdn.example.org/lib"
        );
    }

    #[test]
    fn test_query_and_fragment_dropped_by_default() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(
            normalize(&page, "/search?q=neutrino#results"),
            "https://ed.fnal.gov/search"
        );
    }

    #[test]
    fn test_query_kept_when_requested() {
        let page = page("https://ed.fnal.gov/");
        let normalizer = Normalizer::new(true);
        assert_eq!(
            normalizer.normalize(&page, "/search?q=neutrino#results"),
            "https://ed.fnal.gov/search?q=neutrino"
        );
    }

    #[test]
    fn test_fragment_only_resolves_to_page() {
        let page = page("https://ed.fnal.gov/staff/index.html");
        assert_eq!(
            normalize(&page, "#top"),
            "https://ed.fnal.gov/staff/index.html"
        );
    }

    #[test]
    fn test_repeated_slashes_collapse() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(
            normalize(&page, "https://ed.fnal.gov//a///b//"),
            "https://ed.fnal.gov/a/b/"
        );
    }

    #[test]
    fn test_trailing_slash_kept() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(normalize(&page, "/gallery/"), "https://ed.fnal.gov/gallery/");
        assert_eq!(normalize(&page, "/gallery"), "https://ed.fnal.gov/gallery");
    }

    #[test]
    fn test_whitespace_trimmed() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(normalize(&page, "  /about \n"), "https://ed.fnal.gov/about");
    }

    #[test]
    fn test_javascript_href_kept_opaque() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(
            normalize(&page, "javascript:void(0)"),
            "javascript:void(0)"
        );
    }

    #[test]
    fn test_malformed_href_is_best_effort() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(normalize(&page, "http://[::1"), "http://[::1");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let page = page("https://ed.fnal.gov/staff/index.html");
        let hrefs = [
            "/about",
            "bios.html",
            "../x/./y//z/",
            "HTTPS://Example.ORG",
            "mailto:staff@fnal.gov",
            "javascript:void(0)",
            "/search?q=1#frag",
            "ftp://Files.Example.org/pub/",
            "/path with spaces",
            "news:/..//x",
            "foo:/.//a",
            "x:/.//",
        ];

        for href in hrefs {
            let once = normalize(&page, href);
            let twice = normalize(&page, &once);
            assert_eq!(once, twice, "not idempotent for {:?}", href);
        }
    }

    #[test]
    fn test_page_context_from_components() {
        let context = PageContext::new("https", "ed.fnal.gov", "/staff/index.html").unwrap();
        assert_eq!(context.scheme(), "https");
        assert_eq!(context.host(), "ed.fnal.gov");
        assert_eq!(context.path(), "/staff/index.html");
        assert_eq!(normalize(&context, "/about"), "https://ed.fnal.gov/about");
    }

    #[test]
    fn test_page_context_rejects_garbage() {
        assert!(PageContext::from_url("not a url").is_none());
        assert!(PageContext::new("https", "", "/").is_none());
    }

    #[test]
    fn test_hostless_double_slash_path_settles() {
        let page = page("https://ed.fnal.gov/");
        assert_eq!(normalize(&page, "news:/..//x"), "news:/x");
        assert_eq!(normalize(&page, "foo:/.//a"), "foo:/a");
        assert_eq!(normalize(&page, "x:/.//"), "x:/");
        assert_eq!(normalize(&page, "news:/x"), "news:/x");
    }

    #[test]
    fn test_collapse_slashes() {
        assert_eq!(collapse_slashes(""), "/");
        assert_eq!(collapse_slashes("/"), "/");
        assert_eq!(collapse_slashes("//"), "/");
        assert_eq!(collapse_slashes("/a//b/"), "/a/b/");
    }
}
