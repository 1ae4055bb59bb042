//! Gallery crawl pipeline.
//!
//! - [`extract`] turns the thumbnails of one list page into records
//! - [`Paginator`] walks list pages until the last-page marker shows up
//! - [`fetch_detail`] reads one image's detail page
//! - [`GalleryCrawler`] ties them together with the image store
//!
//! ```text
//! categories index ──> Category (+ cover image)
//!        │
//!        └─> per category: Paginator ──> extract ──> fetch_detail (retried)
//!                               │
//!                               └─> map_limit ──> ImageStore::fetch_and_save
//! ```

mod detail;
mod extractor;
mod gallery;
mod layout;
mod paginator;

pub use detail::fetch_detail;
pub use extractor::{Identity, RawRecord, RecordTransform, extract};
pub use gallery::GalleryCrawler;
pub use layout::{SiteLayout, categories_url, detail_url, list_page_url};
pub use paginator::{ListPage, PageState, Pagination, Paginator};
