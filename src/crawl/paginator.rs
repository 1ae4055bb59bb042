//! Walks a sequence of list pages until the last one.
//!
//! # State Machine
//!
//! ```text
//! Navigating ──> Extracting ──> CheckingTerminal ──> Done
//!                    ^                 │
//!                    └── Advancing <───┘
//! ```
//!
//! Any error moves the walk to `Failed`. The marker on the last page is the
//! only way to reach `Done`; there is no "empty page" shortcut. Both terminal
//! states close the page view, so it is closed exactly once whichever way the
//! walk ends. Records collected before a failure are dropped.

use std::fmt;

use tracing::{debug, info, instrument};

use super::SiteLayout;
use super::extractor::{RecordTransform, extract};
use super::layout::list_page_url;
use crate::browser::{Browser, Page, close_quietly};
use crate::error::CrawlError;

/// Where a pagination walk currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Loading the first list page.
    Navigating,
    /// Reading the records of the current page.
    Extracting,
    /// Looking for the last-page marker.
    CheckingTerminal,
    /// Following the next-page control.
    Advancing,
    /// The last page was processed.
    Done,
    /// A step failed; the walk is over.
    Failed,
}

/// First list page of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    /// URL to load first.
    pub url: String,
    /// Logical number of that page.
    pub page_number: u32,
}

impl ListPage {
    /// List page `page_number` of a category (or of all images).
    #[must_use]
    pub fn new(base_url: &str, category_id: Option<u64>, page_number: u32) -> Self {
        Self {
            url: list_page_url(base_url, category_id, page_number),
            page_number,
        }
    }
}

/// Records of a finished walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination<R> {
    /// All records, page by page, in document order.
    pub records: Vec<R>,
    /// Number of list pages processed.
    pub pages_visited: u32,
}

/// Drives one page view across list pages, extracting records from each.
pub struct Paginator<'a> {
    browser: &'a dyn Browser,
    layout: &'a SiteLayout,
    max_pages: Option<u32>,
}

impl fmt::Debug for Paginator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

struct Walk<R> {
    records: Vec<R>,
    page_number: u32,
    visited: u32,
    failure: Option<CrawlError>,
}

impl<R> Walk<R> {
    fn new(start: &ListPage) -> Self {
        Self {
            records: Vec::new(),
            page_number: start.page_number,
            visited: 0,
            failure: None,
        }
    }
}

impl<'a> Paginator<'a> {
    /// Creates an unbounded paginator.
    pub fn new(browser: &'a dyn Browser, layout: &'a SiteLayout) -> Self {
        Self {
            browser,
            layout,
            max_pages: None,
        }
    }

    /// Fails the walk once `max_pages` pages were processed without reaching the last one.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Collects records from `start` and every following page.
    ///
    /// # Errors
    ///
    /// - [`CrawlError::Navigation`] or [`CrawlError::MissingControl`] when a
    ///   page cannot be loaded or has no next-page control
    /// - [`CrawlError::Extraction`] or any error from `transform`
    /// - [`CrawlError::PageLimitExceeded`] when the page ceiling is hit
    #[instrument(skip(self, transform), fields(url = %start.url))]
    pub async fn collect<T>(
        &self,
        start: &ListPage,
        transform: &T,
    ) -> Result<Pagination<T::Output>, CrawlError>
    where
        T: RecordTransform + ?Sized,
    {
        let mut page = self.browser.new_page().await?;
        let mut walk = Walk::new(start);
        let mut state = PageState::Navigating;

        loop {
            let next = self
                .step(state, page.as_mut(), start, transform, &mut walk)
                .await;
            debug!(from = ?state, to = ?next, page = walk.page_number, "pagination step");
            if matches!(state, PageState::Done | PageState::Failed) {
                break;
            }
            state = next;
        }

        if let Some(error) = walk.failure {
            return Err(error);
        }
        info!(
            pages = walk.visited,
            records = walk.records.len(),
            "reached last page"
        );
        Ok(Pagination {
            records: walk.records,
            pages_visited: walk.visited,
        })
    }

    /// Runs one state. `Done` and `Failed` close the page and stay put; an
    /// error in any other state is kept in `walk` and moves to `Failed`.
    async fn step<T>(
        &self,
        state: PageState,
        page: &mut dyn Page,
        start: &ListPage,
        transform: &T,
        walk: &mut Walk<T::Output>,
    ) -> PageState
    where
        T: RecordTransform + ?Sized,
    {
        let outcome = match state {
            PageState::Navigating => page
                .goto(&start.url)
                .await
                .map(|()| PageState::Extracting),
            PageState::Extracting => {
                info!(page = walk.page_number, "processing page");
                extract(&*page, self.layout, &self.layout.image_containers, transform)
                    .await
                    .map(|mut batch| {
                        walk.records.append(&mut batch);
                        walk.visited += 1;
                        PageState::CheckingTerminal
                    })
            }
            PageState::CheckingTerminal => self.check_terminal(&*page, start, walk.visited).await,
            PageState::Advancing => page
                .click_and_wait(&self.layout.next_page)
                .await
                .map(|()| {
                    walk.page_number += 1;
                    PageState::Extracting
                }),
            PageState::Done | PageState::Failed => {
                close_quietly(page).await;
                return state;
            }
        };

        outcome.unwrap_or_else(|error| {
            debug!(from = ?state, error = %error, "pagination failed");
            walk.records.clear();
            walk.failure = Some(error);
            PageState::Failed
        })
    }

    async fn check_terminal(
        &self,
        page: &dyn Page,
        start: &ListPage,
        visited: u32,
    ) -> Result<PageState, CrawlError> {
        if page.exists(&self.layout.last_page_marker).await? {
            return Ok(PageState::Done);
        }
        if let Some(max) = self.max_pages
            && visited >= max
        {
            return Err(CrawlError::PageLimitExceeded {
                pages: visited,
                url: start.url.clone(),
            });
        }
        Ok(PageState::Advancing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::browser::HtmlBrowser;
    use crate::browser::memory::MemorySource;
    use crate::crawl::extractor::Identity;

    const BASE: &str = "https://g.test";

    fn list(items: &[u32], next: Option<&str>, last: bool) -> String {
        let thumbs: String = items
            .iter()
            .map(|n| {
                format!(
                    r#"<div><a href="/photos/{n}"><img src="/img/{n}.png"></a><h3>Photo {n}</h3></div>"#
                )
            })
            .collect();
        let control = match (next, last) {
            (_, true) => r##"<div class="next next_page disabled"><a href="#">Next</a></div>"##.to_string(),
            (Some(href), false) => format!(r#"<div class="next next_page"><a href="{href}">Next</a></div>"#),
            (None, false) => String::new(),
        };
        format!(
            r#"<html><body><div class="photos--container"><div>{thumbs}</div></div>{control}</body></html>"#
        )
    }

    fn three_pages() -> MemorySource {
        MemorySource::new()
            .with_document(
                "https://g.test/photos?category=7&page=1",
                &list(&[1, 2], Some("/photos?category=7&page=2"), false),
            )
            .with_document(
                "https://g.test/photos?category=7&page=2",
                &list(&[3, 4], Some("/photos?category=7&page=3"), false),
            )
            .with_document(
                "https://g.test/photos?category=7&page=3",
                &list(&[5], None, true),
            )
    }

    #[test]
    fn test_list_page_start_url() {
        let start = ListPage::new(BASE, Some(7), 1);
        assert_eq!(start.url, "https://g.test/photos?category=7&page=1");
        assert_eq!(start.page_number, 1);
    }

    #[tokio::test]
    async fn test_collect_stops_at_terminal_marker() {
        let source = Arc::new(three_pages());
        let browser = HtmlBrowser::new(source.clone());
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .collect(&ListPage::new(BASE, Some(7), 1), &Identity)
            .await
            .unwrap();

        assert_eq!(result.pages_visited, 3);
        let titles: Vec<&str> = result.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Photo 1", "Photo 2", "Photo 3", "Photo 4", "Photo 5"]);
        for page in 1..=3 {
            let url = format!("https://g.test/photos?category=7&page={page}");
            assert_eq!(source.requests(&url), 1, "{url}");
        }
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_collect_empty_page_without_marker_keeps_going() {
        let source = MemorySource::new()
            .with_document(
                "https://g.test/photos?page=1",
                &list(&[], Some("/photos?page=2"), false),
            )
            .with_document("https://g.test/photos?page=2", &list(&[9], None, true));
        let browser = HtmlBrowser::new(Arc::new(source));
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .collect(&ListPage::new(BASE, None, 1), &Identity)
            .await
            .unwrap();

        assert_eq!(result.pages_visited, 2);
        assert_eq!(result.records.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_start_page_mid_sequence() {
        let browser = HtmlBrowser::new(Arc::new(three_pages()));
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .collect(&ListPage::new(BASE, Some(7), 2), &Identity)
            .await
            .unwrap();

        assert_eq!(result.pages_visited, 2);
        assert_eq!(result.records.len(), 3);
    }

    #[tokio::test]
    async fn test_collect_missing_next_control_fails_and_closes_page() {
        let source = MemorySource::new().with_document(
            "https://g.test/photos?page=1",
            &list(&[1], None, false),
        );
        let browser = HtmlBrowser::new(Arc::new(source));
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .collect(&ListPage::new(BASE, None, 1), &Identity)
            .await;

        assert!(matches!(result, Err(CrawlError::MissingControl { .. })));
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_collect_navigation_failure_closes_page() {
        let browser = HtmlBrowser::new(Arc::new(MemorySource::new()));
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .collect(&ListPage::new(BASE, Some(1), 1), &Identity)
            .await;

        assert!(matches!(result, Err(CrawlError::Navigation { .. })));
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_collect_broken_later_page_discards_everything() {
        let source = MemorySource::new().with_document(
            "https://g.test/photos?page=1",
            &list(&[1, 2], Some("/photos?page=2"), false),
        );
        let browser = HtmlBrowser::new(Arc::new(source));
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .collect(&ListPage::new(BASE, None, 1), &Identity)
            .await;

        assert!(matches!(result, Err(CrawlError::Navigation { .. })));
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_step_error_moves_to_failed_and_keeps_error() {
        let browser = HtmlBrowser::new(Arc::new(MemorySource::new()));
        let layout = SiteLayout::default();
        let paginator = Paginator::new(&browser, &layout);
        let start = ListPage::new(BASE, Some(7), 1);
        let mut walk = Walk::new(&start);
        let mut page = browser.new_page().await.unwrap();

        let next = paginator
            .step(PageState::Navigating, page.as_mut(), &start, &Identity, &mut walk)
            .await;

        assert_eq!(next, PageState::Failed);
        assert!(matches!(walk.failure, Some(CrawlError::Navigation { .. })));
        assert_eq!(browser.open_pages(), 1);

        let last = paginator
            .step(PageState::Failed, page.as_mut(), &start, &Identity, &mut walk)
            .await;

        assert_eq!(last, PageState::Failed);
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_step_done_closes_page_once() {
        let browser = HtmlBrowser::new(Arc::new(three_pages()));
        let layout = SiteLayout::default();
        let paginator = Paginator::new(&browser, &layout);
        let start = ListPage::new(BASE, Some(7), 3);
        let mut walk = Walk::new(&start);
        let mut page = browser.new_page().await.unwrap();

        let mut state = PageState::Navigating;
        for expected in [
            PageState::Extracting,
            PageState::CheckingTerminal,
            PageState::Done,
        ] {
            state = paginator
                .step(state, page.as_mut(), &start, &Identity, &mut walk)
                .await;
            assert_eq!(state, expected);
        }
        assert_eq!(browser.open_pages(), 1);

        let state = paginator
            .step(state, page.as_mut(), &start, &Identity, &mut walk)
            .await;

        assert_eq!(state, PageState::Done);
        assert_eq!(browser.open_pages(), 0);
        assert_eq!(walk.visited, 1);
        assert!(walk.failure.is_none());
    }

    #[tokio::test]
    async fn test_collect_page_ceiling() {
        let browser = HtmlBrowser::new(Arc::new(three_pages()));
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .with_max_pages(Some(2))
            .collect(&ListPage::new(BASE, Some(7), 1), &Identity)
            .await;

        assert!(matches!(
            result,
            Err(CrawlError::PageLimitExceeded { pages: 2, .. })
        ));
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_collect_ceiling_equal_to_page_count_succeeds() {
        let browser = HtmlBrowser::new(Arc::new(three_pages()));
        let layout = SiteLayout::default();

        let result = Paginator::new(&browser, &layout)
            .with_max_pages(Some(3))
            .collect(&ListPage::new(BASE, Some(7), 1), &Identity)
            .await
            .unwrap();

        assert_eq!(result.pages_visited, 3);
    }
}
