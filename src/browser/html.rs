//! [`Browser`] implementation over static HTML documents.
//!
//! A page view stores the last document it navigated to and answers queries
//! with CSS selectors. "Clicking" a control follows its `href`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, instrument, warn};

use super::element::{parse_selector, resolve};
use super::{Browser, DocumentSource, Element, Page};
use crate::error::CrawlError;

/// Browser session backed by a [`DocumentSource`].
///
/// Tracks how many page views are open so leaks are visible at shutdown.
pub struct HtmlBrowser {
    source: Arc<dyn DocumentSource>,
    open_pages: Arc<AtomicUsize>,
    closed: AtomicBool,
}

impl fmt::Debug for HtmlBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HtmlBrowser")
            .field("open_pages", &self.open_pages())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl HtmlBrowser {
    /// Creates a session reading documents from `source`.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            open_pages: Arc::new(AtomicUsize::new(0)),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of page views opened and not yet closed.
    #[must_use]
    pub fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for HtmlBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>, CrawlError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CrawlError::BrowserClosed);
        }
        let open = self.open_pages.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(open, "opened page view");
        Ok(Box::new(HtmlPage {
            source: Arc::clone(&self.source),
            open_pages: Arc::clone(&self.open_pages),
            url: None,
            document: None,
            closed: false,
        }))
    }

    async fn close(&self) -> Result<(), CrawlError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let open = self.open_pages();
        if open > 0 {
            warn!(open, "closing browser with page views still open");
        }
        debug!("browser closed");
        Ok(())
    }
}

struct HtmlPage {
    source: Arc<dyn DocumentSource>,
    open_pages: Arc<AtomicUsize>,
    url: Option<String>,
    document: Option<String>,
    closed: bool,
}

impl HtmlPage {
    fn ensure_open(&self) -> Result<(), CrawlError> {
        if self.closed {
            return Err(CrawlError::PageClosed);
        }
        Ok(())
    }

    fn current_url(&self) -> &str {
        self.url.as_deref().unwrap_or("about:blank")
    }
}

#[async_trait]
impl Page for HtmlPage {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[instrument(level = "debug", skip(self))]
    async fn goto(&mut self, url: &str) -> Result<(), CrawlError> {
        self.ensure_open()?;
        let document = self
            .source
            .fetch_document(url)
            .await
            .map_err(|e| CrawlError::navigation(url, e))?;
        debug!(bytes = document.len(), "document loaded");
        self.url = Some(url.to_string());
        self.document = Some(document);
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn click_and_wait(&mut self, selector: &str) -> Result<(), CrawlError> {
        self.ensure_open()?;
        let href = self
            .query(selector)
            .await?
            .and_then(|control| control_href(control.html()))
            .ok_or_else(|| CrawlError::missing_control(selector, self.current_url()))?;
        let target = resolve(self.current_url(), &href);
        self.goto(&target).await
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>, CrawlError> {
        self.ensure_open()?;
        let Some(document) = self.document.as_deref() else {
            return Ok(Vec::new());
        };
        select_elements(document, self.current_url(), selector)
    }

    async fn close(&mut self) -> Result<(), CrawlError> {
        if !self.closed {
            self.closed = true;
            self.document = None;
            let open = self.open_pages.fetch_sub(1, Ordering::SeqCst) - 1;
            debug!(url = self.current_url(), open, "closed page view");
        }
        Ok(())
    }
}

impl Drop for HtmlPage {
    fn drop(&mut self) {
        if !self.closed {
            warn!(url = self.current_url(), "page view dropped without being closed");
        }
    }
}

/// Parses `document` and snapshots every element matching `selector`.
fn select_elements(document: &str, url: &str, selector: &str) -> Result<Vec<Element>, CrawlError> {
    let parsed = parse_selector(selector)?;
    let html = Html::parse_document(document);
    Ok(html
        .select(&parsed)
        .map(|el| Element::new(el.html(), url))
        .collect())
}

/// `href` of a clicked control: the element itself or its first link.
fn control_href(outer_html: &str) -> Option<String> {
    let selector = parse_selector("[href]").ok()?;
    let fragment = Html::parse_fragment(outer_html);
    fragment
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
}
