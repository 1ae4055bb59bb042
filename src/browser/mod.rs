//! Browser capability used by the crawler.
//!
//! The crawl logic only needs a handful of operations from a browser: open a
//! page view, navigate it, follow a control, query elements, and close it.
//! Those are the [`Browser`] and [`Page`] traits. Matched elements come back as
//! [`Element`] snapshots that answer "trimmed text / attribute of a child".
//!
//! [`HtmlBrowser`] implements the traits over plain HTTP documents, which is
//! enough for server-rendered galleries.
//!
//! Ownership rule: whoever opens a page view closes it.

mod element;
mod html;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use tracing::warn;

pub use element::Element;
pub use html::HtmlBrowser;

use crate::download::DownloadError;
use crate::error::CrawlError;

/// Source of HTML documents for a page view.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the document at `url` as text.
    async fn fetch_document(&self, url: &str) -> Result<String, DownloadError>;
}

/// A single page view (tab) of a browser session.
#[async_trait]
pub trait Page: Send + Sync {
    /// URL of the loaded document, if any.
    fn url(&self) -> Option<&str>;

    /// Navigates to `url` and waits for the document to load.
    async fn goto(&mut self, url: &str) -> Result<(), CrawlError>;

    /// Clicks the first element matching `selector` and waits for the
    /// resulting navigation to settle.
    async fn click_and_wait(&mut self, selector: &str) -> Result<(), CrawlError>;

    /// All elements matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Element>, CrawlError>;

    /// First element matching `selector`.
    async fn query(&self, selector: &str) -> Result<Option<Element>, CrawlError> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    /// Whether any element matches `selector`.
    async fn exists(&self, selector: &str) -> Result<bool, CrawlError> {
        Ok(self.query(selector).await?.is_some())
    }

    /// Releases the view. Closing twice is a no-op.
    async fn close(&mut self) -> Result<(), CrawlError>;
}

/// A browser session that page views are opened against.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a blank page view.
    async fn new_page(&self) -> Result<Box<dyn Page>, CrawlError>;

    /// Shuts the session down.
    async fn close(&self) -> Result<(), CrawlError>;
}

/// Opens a page view, navigating it to `url` when given.
///
/// If navigation fails the view is closed before the error is returned.
///
/// # Errors
///
/// Returns the error from opening or navigating the page.
pub async fn open_page(browser: &dyn Browser, url: Option<&str>) -> Result<Box<dyn Page>, CrawlError> {
    let mut page = browser.new_page().await?;
    if let Some(url) = url
        && let Err(error) = page.goto(url).await
    {
        close_quietly(page.as_mut()).await;
        return Err(error);
    }
    Ok(page)
}

/// Closes a page view, logging instead of failing.
pub(crate) async fn close_quietly(page: &mut dyn Page) {
    if let Err(error) = page.close().await {
        warn!(url = page.url().unwrap_or("about:blank"), error = %error, "failed to close page view");
    }
}
