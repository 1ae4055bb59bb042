//! Page record extraction.
//!
//! Every thumbnail container on a list page yields a [`RawRecord`] of image
//! URL, link and title. A [`RecordTransform`] turns each raw record into the
//! caller's record type, possibly fetching more pages on the way.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::SiteLayout;
use crate::browser::{Element, Page};
use crate::error::CrawlError;

/// Fields every thumbnail container must provide, trimmed and absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Image source URL.
    pub img: String,
    /// Link target.
    pub href: String,
    /// Title text.
    pub title: String,
}

/// Turns a raw thumbnail record into a final record.
#[async_trait]
pub trait RecordTransform: Send + Sync {
    /// Record type produced.
    type Output: Send;

    /// Transforms one record. Errors abort the extraction.
    async fn transform(&self, raw: RawRecord) -> Result<Self::Output, CrawlError>;
}

/// Keeps raw records as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

#[async_trait]
impl RecordTransform for Identity {
    type Output = RawRecord;

    async fn transform(&self, raw: RawRecord) -> Result<RawRecord, CrawlError> {
        Ok(raw)
    }
}

/// Extracts one record per element matching `containers` on the current page.
///
/// Records are read and transformed one at a time, in document order.
///
/// # Errors
///
/// [`CrawlError::Extraction`] if a container lacks a required field, or the
/// first error returned by `transform`.
#[instrument(level = "debug", skip(page, layout, transform), fields(url = page.url().unwrap_or("about:blank")))]
pub async fn extract<T>(
    page: &dyn Page,
    layout: &SiteLayout,
    containers: &str,
    transform: &T,
) -> Result<Vec<T::Output>, CrawlError>
where
    T: RecordTransform + ?Sized,
{
    let elements = page.query_all(containers).await?;
    debug!(count = elements.len(), "matched thumbnail containers");

    let mut records = Vec::with_capacity(elements.len());
    for element in &elements {
        let raw = read_thumbnail(element, layout)?;
        records.push(transform.transform(raw).await?);
    }
    Ok(records)
}

fn read_thumbnail(element: &Element, layout: &SiteLayout) -> Result<RawRecord, CrawlError> {
    Ok(RawRecord {
        img: element.link(&layout.thumbnail_image, "src", "image")?,
        href: element.link(&layout.thumbnail_link, "href", "link")?,
        title: element.text(&layout.thumbnail_title, "title")?,
    })
}
