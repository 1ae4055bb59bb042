//! Crawl run settings.

use std::path::PathBuf;

use crate::crawl::SiteLayout;
use crate::download::{
    CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, MAX_CONCURRENCY,
    READ_TIMEOUT_SECS,
};
use crate::error::CrawlError;

/// Gallery crawled when no base URL is given.
pub const DEFAULT_BASE_URL: &str = "https://weds360.com/en";

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Categories crawled at the same time by default.
pub const DEFAULT_CATEGORY_CONCURRENCY: usize = 1;

/// What happens when one image of a category cannot be downloaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Log the failure and leave the image out of the catalog.
    Skip,
}

/// Everything a [`GalleryCrawler`](crate::GalleryCrawler) run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Site root that list, category and detail URLs are built from.
    pub base_url: String,
    /// Directory images and the catalog are written to.
    pub output_dir: PathBuf,
    /// Image downloads in flight per category (1..=100).
    pub concurrency: usize,
    /// Categories crawled at once (1..=100).
    pub category_concurrency: usize,
    /// Attempts for every image fetch and detail page.
    pub max_attempts: u32,
    /// Optional ceiling on list pages per category.
    pub max_pages: Option<u32>,
    /// First list page of every category.
    pub start_page: u32,
    /// Reaction to a failed image download.
    pub failure_policy: FailurePolicy,
    /// Whether detail pages are fetched for every image.
    pub fetch_details: bool,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
    /// Selectors of the target site.
    pub layout: SiteLayout,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            category_concurrency: DEFAULT_CATEGORY_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_pages: None,
            start_page: 1,
            failure_policy: FailurePolicy::Abort,
            fetch_details: true,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            layout: SiteLayout::default(),
        }
    }
}

impl CrawlConfig {
    /// Checks every limit.
    ///
    /// # Errors
    ///
    /// [`CrawlError::InvalidLimit`] naming the first value out of range.
    pub fn validate(&self) -> Result<(), CrawlError> {
        check_concurrency("concurrency", self.concurrency)?;
        check_concurrency("category_concurrency", self.category_concurrency)?;
        check_positive("max_attempts", u64::from(self.max_attempts))?;
        check_positive("start_page", u64::from(self.start_page))?;
        if let Some(max_pages) = self.max_pages {
            check_positive("max_pages", u64::from(max_pages))?;
        }
        check_positive("connect_timeout_secs", self.connect_timeout_secs)?;
        check_positive("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn check_concurrency(name: &'static str, value: usize) -> Result<(), CrawlError> {
    if (1..=MAX_CONCURRENCY).contains(&value) {
        Ok(())
    } else {
        Err(CrawlError::InvalidLimit { name, value })
    }
}

fn check_positive(name: &'static str, value: u64) -> Result<(), CrawlError> {
    if value == 0 {
        return Err(CrawlError::InvalidLimit { name, value: 0 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CrawlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.category_concurrency, 1);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.max_pages, None);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_concurrency() {
        let config = CrawlConfig {
            concurrency: 101,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CrawlError::InvalidLimit {
                name: "concurrency",
                value: 101
            })
        ));

        let config = CrawlConfig {
            category_concurrency: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CrawlError::InvalidLimit {
                name: "category_concurrency",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        for config in [
            CrawlConfig {
                max_attempts: 0,
                ..CrawlConfig::default()
            },
            CrawlConfig {
                start_page: 0,
                ..CrawlConfig::default()
            },
            CrawlConfig {
                max_pages: Some(0),
                ..CrawlConfig::default()
            },
            CrawlConfig {
                read_timeout_secs: 0,
                ..CrawlConfig::default()
            },
        ] {
            assert!(
                matches!(config.validate(), Err(CrawlError::InvalidLimit { value: 0, .. })),
                "{config:?}"
            );
        }
    }
}
