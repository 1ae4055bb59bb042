//! Image download layer: HTTP client, retry, bounded concurrency and persistence.
//!
//! # Features
//!
//! - Shared HTTP session (cookie store, connect/request timeouts)
//! - Sequential retry with a configurable attempt budget
//! - Order-preserving bounded-concurrency mapping
//! - Deterministic file naming from titles and ids
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gallery_core::download::{HttpClient, ImageStore, ImageTarget, RetryPolicy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ImageStore::new(Arc::new(HttpClient::new()), "./output", RetryPolicy::default());
//! let target = ImageTarget { title: "Garden Arch".into(), category_id: 3, image_id: Some(17) };
//! let path = store.fetch_and_save("https://example.com/17.png", &target).await?;
//! println!("Saved: {}", path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
mod filename;
mod retry;
mod store;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use engine::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY, map_limit};
pub use error::DownloadError;
pub use filename::{
    IMAGE_EXTENSION, category_dir, encode, image_path, name_with_id, relative_image_path,
};
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
pub use store::{BinarySource, ImageStore, ImageTarget};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, CrawlError>` / `Result<T, DownloadError>` explicitly in signatures.
