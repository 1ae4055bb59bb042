//! Gallery Crawler Core Library
//!
//! Crawls a paginated photo gallery: enumerates its categories, walks each
//! category's list pages until the last one, reads every image's detail page,
//! downloads the images with bounded concurrency and retries, and collects
//! everything into a JSON [`Catalog`].
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`browser`] - Page view capability and its static-HTML implementation
//! - [`crawl`] - Record extraction, pagination, detail pages, whole-gallery crawl
//! - [`download`] - HTTP client, retry, bounded concurrency, image persistence
//! - [`catalog`] - Records and the catalog document
//! - [`config`] - Run settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod catalog;
pub mod config;
pub mod crawl;
pub mod download;
mod error;
mod user_agent;

// Re-export commonly used types
pub use browser::{Browser, DocumentSource, Element, HtmlBrowser, Page, open_page};
pub use catalog::{
    CATALOG_FILE_NAME, Catalog, Category, ImageDetail, ImageRecord, ListedImage, Service,
};
pub use config::{CrawlConfig, DEFAULT_BASE_URL, DEFAULT_OUTPUT_DIR, FailurePolicy};
pub use crawl::{GalleryCrawler, Paginator, SiteLayout};
pub use download::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, DownloadError, HttpClient, ImageStore, ImageTarget,
    RetryPolicy, map_limit,
};
pub use error::CrawlError;
