//! One-shot detail page fetch.

use tracing::{debug, instrument};

use super::SiteLayout;
use crate::browser::{Browser, Page, close_quietly, open_page};
use crate::catalog::{ImageDetail, Service};
use crate::error::CrawlError;

/// Opens `url` in a fresh page view and reads its title, description and service.
///
/// The view is closed before returning, on success and on failure.
///
/// # Errors
///
/// [`CrawlError::Navigation`] if the page does not load, or
/// [`CrawlError::Extraction`] if the detail region or one of its fields is missing.
#[instrument(level = "debug", skip(browser, layout))]
pub async fn fetch_detail(
    browser: &dyn Browser,
    layout: &SiteLayout,
    url: &str,
) -> Result<ImageDetail, CrawlError> {
    let mut page = open_page(browser, Some(url)).await?;
    let result = read_detail(page.as_ref(), layout, url).await;
    close_quietly(page.as_mut()).await;
    result
}

async fn read_detail(
    page: &dyn Page,
    layout: &SiteLayout,
    url: &str,
) -> Result<ImageDetail, CrawlError> {
    let region = page
        .query(&layout.detail_region)
        .await?
        .ok_or_else(|| CrawlError::extraction(&layout.detail_region, "detail", url))?;

    let detail = ImageDetail {
        title: region.text(&layout.detail_title, "detail title")?,
        description: region.text(&layout.detail_description, "description")?,
        service: Service {
            name: region.text(&layout.detail_service, "service name")?,
            href: region.link(&layout.detail_service, "href", "service link")?,
        },
    };
    debug!(title = %detail.title, "read detail page");
    Ok(detail)
}
