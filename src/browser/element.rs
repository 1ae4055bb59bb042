//! Snapshot of a matched element.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::CrawlError;

/// A matched element, detached from its page.
///
/// Holds the element's outer HTML and the URL of the page it was found on, so
/// relative links can be resolved the way a browser's `href`/`src` properties
/// would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    html: String,
    page_url: String,
}

impl Element {
    /// Creates an element from its outer HTML and the page URL.
    pub fn new(html: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            page_url: page_url.into(),
        }
    }

    /// Outer HTML of the element.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// URL of the page the element came from.
    #[must_use]
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Trimmed text content of the first descendant matching `selector`.
    ///
    /// # Errors
    ///
    /// [`CrawlError::Extraction`] when nothing matches, or
    /// [`CrawlError::InvalidSelector`] when the selector does not parse.
    pub fn text(&self, selector: &str, field: &'static str) -> Result<String, CrawlError> {
        self.with_first(selector, field, |el| Some(collect_text(el)))
    }

    /// Trimmed value of attribute `name` on the first descendant matching `selector`.
    ///
    /// # Errors
    ///
    /// [`CrawlError::Extraction`] when nothing matches or the attribute is absent.
    pub fn attr(&self, selector: &str, name: &str, field: &'static str) -> Result<String, CrawlError> {
        self.with_first(selector, field, |el| {
            el.value().attr(name).map(|v| v.trim().to_string())
        })
    }

    /// Like [`attr`](Self::attr), resolved to an absolute URL against the page URL.
    ///
    /// # Errors
    ///
    /// Same as [`attr`](Self::attr).
    pub fn link(&self, selector: &str, name: &str, field: &'static str) -> Result<String, CrawlError> {
        let raw = self.attr(selector, name, field)?;
        Ok(resolve(&self.page_url, &raw))
    }

    fn with_first<F>(&self, selector: &str, field: &'static str, read: F) -> Result<String, CrawlError>
    where
        F: FnOnce(ElementRef<'_>) -> Option<String>,
    {
        let parsed = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        fragment
            .select(&parsed)
            .next()
            .and_then(read)
            .ok_or_else(|| CrawlError::extraction(selector, field, &self.page_url))
    }
}

/// Parses a CSS selector, mapping failures to [`CrawlError::InvalidSelector`].
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Resolves `raw` against `base`; falls back to `raw` when either is not a URL.
pub(crate) fn resolve(base: &str, raw: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(raw))
        .map_or_else(|_| raw.to_string(), String::from)
}

fn collect_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
