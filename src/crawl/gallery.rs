//! Whole-gallery crawl: categories, then every category's images.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, instrument, warn};
use url::Url;

use super::detail::fetch_detail;
use super::extractor::{RawRecord, RecordTransform, extract};
use super::layout::{categories_url, detail_url};
use super::paginator::{ListPage, Paginator};
use crate::browser::{Browser, HtmlBrowser, close_quietly, open_page};
use crate::catalog::{CATALOG_FILE_NAME, Catalog, Category, ImageRecord, ListedImage};
use crate::config::{CrawlConfig, FailurePolicy};
use crate::download::{HttpClient, ImageStore, ImageTarget, RetryPolicy, map_limit};
use crate::error::CrawlError;

/// Image id in a listing link: `.../photos/<id>`.
#[allow(clippy::expect_used)]
static IMAGE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"photos/(\d+)").expect("image id regex is valid") // Static pattern, safe to panic
});

/// Crawls a gallery site into a [`Catalog`].
///
/// Cheap to clone; clones share the browser session and the image store.
#[derive(Clone)]
pub struct GalleryCrawler {
    browser: Arc<dyn Browser>,
    store: ImageStore,
    retry: RetryPolicy,
    config: Arc<CrawlConfig>,
}

impl fmt::Debug for GalleryCrawler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryCrawler")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GalleryCrawler {
    /// Creates a crawler over an existing browser session and image store.
    ///
    /// Images are written below the store's root, whatever `config.output_dir` says.
    ///
    /// # Errors
    ///
    /// [`CrawlError::InvalidLimit`] when the configuration is out of range.
    pub fn new(
        browser: Arc<dyn Browser>,
        store: ImageStore,
        config: CrawlConfig,
    ) -> Result<Self, CrawlError> {
        config.validate()?;
        let retry = RetryPolicy::new(config.max_attempts)?;
        Ok(Self {
            browser,
            store,
            retry,
            config: Arc::new(config),
        })
    }

    /// Creates a crawler fetching pages and images over HTTP.
    ///
    /// # Errors
    ///
    /// [`CrawlError::InvalidLimit`] when the configuration is out of range.
    pub fn from_config(config: CrawlConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let client =
            HttpClient::new_with_timeouts(config.connect_timeout_secs, config.read_timeout_secs);
        let browser = HtmlBrowser::new(Arc::new(client.clone()));
        let store = ImageStore::new(
            Arc::new(client),
            config.output_dir.clone(),
            RetryPolicy::new(config.max_attempts)?,
        );
        Self::new(Arc::new(browser), store, config)
    }

    /// Settings of this crawler.
    #[must_use]
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Where [`Catalog::save`] should write the result of [`run`](Self::run).
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.store.root().join(CATALOG_FILE_NAME)
    }

    /// Crawls every category and all of its images.
    ///
    /// Categories keep listing order and their images follow in category order.
    ///
    /// # Errors
    ///
    /// The first navigation, extraction or download error; nothing is returned
    /// for a partially crawled gallery.
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    pub async fn run(&self) -> Result<Catalog, CrawlError> {
        let categories = self.categories().await?;
        info!(count = categories.len(), "found categories");

        let ids: Vec<u64> = categories.iter().map(|category| category.id).collect();
        let crawler = self.clone();
        let per_category = map_limit(ids, self.config.category_concurrency, move |id| {
            let crawler = crawler.clone();
            async move { crawler.category_images(id).await }
        })
        .await?;

        let images: Vec<ImageRecord> = per_category.into_iter().flatten().collect();
        info!(
            categories = categories.len(),
            images = images.len(),
            "gallery crawl complete"
        );
        Ok(Catalog { categories, images })
    }

    /// Reads the categories index and downloads each category's cover image.
    ///
    /// # Errors
    ///
    /// Navigation and extraction errors, [`CrawlError::InvalidLink`] when a
    /// category link has no `category` parameter, or the cover download error.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, CrawlError> {
        let url = categories_url(&self.config.base_url);
        let mut page = open_page(self.browser.as_ref(), Some(&url)).await?;
        let layout = &self.config.layout;
        let result = extract(
            page.as_ref(),
            layout,
            &layout.category_containers,
            &CategoryListing(self),
        )
        .await;
        close_quietly(page.as_mut()).await;
        result
    }

    /// Walks every list page of a category, then downloads its images.
    ///
    /// # Errors
    ///
    /// Pagination errors abort the category. Download errors abort it too under
    /// [`FailurePolicy::Abort`]; under [`FailurePolicy::Skip`] the image is
    /// left out instead.
    #[instrument(skip(self))]
    pub async fn category_images(&self, category_id: u64) -> Result<Vec<ImageRecord>, CrawlError> {
        let start = ListPage::new(
            &self.config.base_url,
            Some(category_id),
            self.config.start_page,
        );
        let pagination = Paginator::new(self.browser.as_ref(), &self.config.layout)
            .with_max_pages(self.config.max_pages)
            .collect(&start, &ImageListing(self))
            .await?;
        info!(
            pages = pagination.pages_visited,
            images = pagination.records.len(),
            "category listing collected"
        );

        let store = self.store.clone();
        let policy = self.config.failure_policy;
        let saved = map_limit(pagination.records, self.config.concurrency, move |listed| {
            let store = store.clone();
            async move { save_image(&store, listed, category_id, policy).await }
        })
        .await?;

        Ok(saved.into_iter().flatten().collect())
    }

    /// Images saved so far, across all categories.
    #[must_use]
    pub fn images_saved(&self) -> usize {
        self.store.saved_count()
    }

    /// Shuts the browser session down.
    ///
    /// # Errors
    ///
    /// Whatever the browser reports while closing.
    pub async fn close(&self) -> Result<(), CrawlError> {
        self.browser.close().await
    }
}

async fn save_image(
    store: &ImageStore,
    listed: ListedImage,
    category_id: u64,
    policy: FailurePolicy,
) -> Result<Option<ImageRecord>, CrawlError> {
    let target = ImageTarget {
        title: listed.title.clone(),
        category_id,
        image_id: Some(listed.id),
    };
    match store.fetch_and_save(&listed.source_url, &target).await {
        Ok(_) => Ok(Some(listed.into_record(category_id, target.catalog_path()))),
        Err(error) if policy == FailurePolicy::Skip => {
            warn!(image_id = listed.id, url = %listed.source_url, error = %error, "skipping image");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Category thumbnails: parse the id and save the cover.
struct CategoryListing<'a>(&'a GalleryCrawler);

#[async_trait]
impl<'a> RecordTransform for CategoryListing<'a> {
    type Output = Category;

    async fn transform(&self, raw: RawRecord) -> Result<Category, CrawlError> {
        let id = category_id(&raw.href)?;
        info!(category_id = id, title = %raw.title, "found category");

        let target = ImageTarget {
            title: raw.title.clone(),
            category_id: id,
            image_id: None,
        };
        self.0.store.fetch_and_save(&raw.img, &target).await?;
        Ok(Category {
            id,
            image_local_path: target.catalog_path(),
            title: raw.title,
        })
    }
}

/// Image thumbnails: parse the id and read the detail page.
struct ImageListing<'a>(&'a GalleryCrawler);

#[async_trait]
impl<'a> RecordTransform for ImageListing<'a> {
    type Output = ListedImage;

    async fn transform(&self, raw: RawRecord) -> Result<ListedImage, CrawlError> {
        let crawler = self.0;
        let id = image_id(&raw.href)?;
        info!(image_id = id, title = %raw.title, "found image");

        let detail = if crawler.config.fetch_details {
            let url = detail_url(&crawler.config.base_url, id);
            let detail = crawler
                .retry
                .run(|_| fetch_detail(crawler.browser.as_ref(), &crawler.config.layout, &url))
                .await?;
            info!(image_id = id, "fetched image details");
            Some(detail)
        } else {
            None
        };

        Ok(ListedImage {
            id,
            title: raw.title,
            source_url: raw.img,
            detail,
        })
    }
}

fn category_id(href: &str) -> Result<u64, CrawlError> {
    Url::parse(href)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "category")
                .and_then(|(_, value)| value.parse().ok())
        })
        .ok_or_else(|| CrawlError::InvalidLink {
            href: href.to_string(),
            what: "category id",
        })
}

fn image_id(href: &str) -> Result<u64, CrawlError> {
    IMAGE_ID_PATTERN
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
        .ok_or_else(|| CrawlError::InvalidLink {
            href: href.to_string(),
            what: "image id",
        })
}
