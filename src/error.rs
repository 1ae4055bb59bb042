//! Crawl error type shared by the browser, crawl and download layers.
//!
//! Errors fall into the families the pipeline reacts to:
//! - navigation ([`CrawlError::Navigation`], [`CrawlError::MissingControl`]) and
//!   extraction ([`CrawlError::Extraction`]) abort the current category crawl
//! - fetch ([`CrawlError::Fetch`]) and write ([`CrawlError::Write`]) abort the
//!   record's download slot
//!
//! Everything else is a caller or configuration mistake surfaced early.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;

/// Errors produced while crawling the gallery and persisting its images.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A page failed to load.
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        /// The URL that was being loaded.
        url: String,
        /// The underlying fetch error.
        #[source]
        source: DownloadError,
    },

    /// A control that should trigger navigation was not present or had no link.
    #[error("navigation control `{selector}` missing on {url}")]
    MissingControl {
        /// The selector of the control that was clicked.
        selector: String,
        /// The page the control was looked up on.
        url: String,
    },

    /// A required field was absent on a matched element.
    #[error("missing `{field}` (selector `{selector}`) on {url}")]
    Extraction {
        /// Selector that matched nothing inside the element.
        selector: String,
        /// Human name of the field being read.
        field: &'static str,
        /// The page the element came from.
        url: String,
    },

    /// A selector could not be parsed.
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector {
        /// The selector text.
        selector: String,
        /// Parser message.
        reason: String,
    },

    /// A link did not carry the id it was expected to.
    #[error("cannot read {what} from link {href}")]
    InvalidLink {
        /// The offending href.
        href: String,
        /// What was being parsed from it.
        what: &'static str,
    },

    /// Fetching image bytes exhausted the retry budget.
    #[error("fetch of {url} failed: {source}")]
    Fetch {
        /// The image URL.
        url: String,
        /// The error from the last attempt.
        #[source]
        source: DownloadError,
    },

    /// Persisting fetched bytes (or the catalog) failed.
    #[error("write to {path} failed: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Reading a previously written file failed.
    #[error("read of {path} failed: {source}")]
    Read {
        /// Source path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog document could not be encoded or decoded.
    #[error("catalog {path} is not valid JSON: {source}")]
    Catalog {
        /// Catalog path.
        path: PathBuf,
        /// The serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A limit that must be at least one was zero.
    #[error("{name} must be at least 1, got {value}")]
    InvalidLimit {
        /// Name of the limit.
        name: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// The page ceiling was reached before the terminal marker appeared.
    #[error("stopped after {pages} pages without reaching the last page of {url}")]
    PageLimitExceeded {
        /// Pages visited.
        pages: u32,
        /// Start URL of the crawl.
        url: String,
    },

    /// A page view was used after it was closed.
    #[error("page view already closed")]
    PageClosed,

    /// A page view was requested from a browser that was shut down.
    #[error("browser session already closed")]
    BrowserClosed,

    /// A mapped task was cancelled before it produced a result.
    #[error("mapped task aborted: {0}")]
    TaskAborted(String),
}

impl CrawlError {
    /// Creates a navigation error.
    pub fn navigation(url: impl Into<String>, source: DownloadError) -> Self {
        Self::Navigation {
            url: url.into(),
            source,
        }
    }

    /// Creates a missing-control error.
    pub fn missing_control(selector: impl Into<String>, url: impl Into<String>) -> Self {
        Self::MissingControl {
            selector: selector.into(),
            url: url.into(),
        }
    }

    /// Creates an extraction error.
    pub fn extraction(
        selector: impl Into<String>,
        field: &'static str,
        url: impl Into<String>,
    ) -> Self {
        Self::Extraction {
            selector: selector.into(),
            field,
            url: url.into(),
        }
    }

    /// Creates a fetch error.
    pub fn fetch(url: impl Into<String>, source: DownloadError) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors that abort a category crawl (navigation or extraction).
    #[must_use]
    pub fn is_crawl_failure(&self) -> bool {
        matches!(
            self,
            Self::Navigation { .. }
                | Self::MissingControl { .. }
                | Self::Extraction { .. }
                | Self::InvalidLink { .. }
                | Self::PageLimitExceeded { .. }
        )
    }
}
