//! Crawl records and the catalog document written at the end of a run.
//!
//! The catalog is a single JSON file:
//!
//! ```json
//! {
//!   "categories": [{ "id": 3, "title": "Venues", "imageLocalPath": "/category/3/venues.png" }],
//!   "images": [{
//!     "id": 41, "categoryId": 3, "title": "Garden Arch",
//!     "sourceUrl": "https://cdn.example.com/41.png",
//!     "localPath": "/category/3/garden_arch_41.png",
//!     "detail": { "title": "...", "description": "...", "service": { "name": "...", "href": "..." } }
//!   }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::CrawlError;

/// File name of the catalog inside the output directory.
pub const CATALOG_FILE_NAME: &str = "db.json";

/// A gallery category and its downloaded cover image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Id from the listing link's `category` query parameter.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Where the cover image was saved, relative to the output directory.
    pub image_local_path: String,
}

/// Vendor/service an image links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Link text.
    pub name: String,
    /// Absolute link target.
    pub href: String,
}

/// Fields read from an image's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetail {
    /// Heading of the detail page.
    pub title: String,
    /// Description text.
    pub description: String,
    /// Linked service.
    pub service: Service,
}

/// An image found on a list page, before its bytes are downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedImage {
    /// Id from the `photos/<id>` link.
    pub id: u64,
    /// Thumbnail title.
    pub title: String,
    /// Absolute image URL.
    pub source_url: String,
    /// Detail page fields, when fetched.
    pub detail: Option<ImageDetail>,
}

impl ListedImage {
    /// Attaches the category and local path once the image is saved.
    #[must_use]
    pub fn into_record(self, category_id: u64, local_path: String) -> ImageRecord {
        ImageRecord {
            id: self.id,
            category_id,
            title: self.title,
            source_url: self.source_url,
            local_path,
            detail: self.detail,
        }
    }
}

/// A downloaded image as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Id from the `photos/<id>` link; unique within a category.
    pub id: u64,
    /// Category the image was crawled from.
    pub category_id: u64,
    /// Thumbnail title.
    pub title: String,
    /// Absolute image URL.
    pub source_url: String,
    /// Where the image was saved, relative to the output directory.
    pub local_path: String,
    /// Detail page fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Categories in listing order.
    pub categories: Vec<Category>,
    /// Images of all categories, category by category, in page order.
    pub images: Vec<ImageRecord>,
}

impl Catalog {
    /// Writes the catalog as JSON, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// [`CrawlError::Catalog`] if encoding fails, [`CrawlError::Write`] if the
    /// file cannot be written.
    #[instrument(skip(self), fields(path = %path.display(), images = self.images.len()))]
    pub async fn save(&self, path: &Path) -> Result<(), CrawlError> {
        let json = serde_json::to_vec_pretty(self).map_err(|source| CrawlError::Catalog {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CrawlError::write(parent, e))?;
        }
        tokio::fs::write(path, json)
            .await
            .map_err(|e| CrawlError::write(path, e))?;
        info!(categories = self.categories.len(), "catalog written");
        Ok(())
    }

    /// Reads a catalog previously written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// [`CrawlError::Read`] if the file cannot be read, [`CrawlError::Catalog`]
    /// if it is not a valid catalog.
    pub async fn load(path: &Path) -> Result<Self, CrawlError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| CrawlError::read(path, e))?;
        serde_json::from_slice(&raw).map_err(|source| CrawlError::Catalog {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Catalog {
        Catalog {
            categories: vec![Category {
                id: 3,
                title: "Venues".into(),
                image_local_path: "/category/3/venues.png".into(),
            }],
            images: vec![
                ImageRecord {
                    id: 41,
                    category_id: 3,
                    title: "Garden Arch".into(),
                    source_url: "https://cdn.test/41.png".into(),
                    local_path: "/category/3/garden_arch_41.png".into(),
                    detail: Some(ImageDetail {
                        title: "Garden Arch".into(),
                        description: "By Blooms".into(),
                        service: Service {
                            name: "Blooms".into(),
                            href: "https://g.test/vendors/9".into(),
                        },
                    }),
                },
                ImageRecord {
                    id: 42,
                    category_id: 3,
                    title: "Hall".into(),
                    source_url: "https://cdn.test/42.png".into(),
                    local_path: "/category/3/hall_42.png".into(),
                    detail: None,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_catalog_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/db.json");
        let catalog = sample();

        catalog.save(&path).await.unwrap();
        let loaded = Catalog::load(&path).await.unwrap();

        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_catalog_uses_camel_case_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["categories"][0]["imageLocalPath"], "/category/3/venues.png");
        assert_eq!(value["images"][0]["categoryId"], 3);
        assert_eq!(value["images"][0]["sourceUrl"], "https://cdn.test/41.png");
        assert_eq!(value["images"][0]["detail"]["service"]["name"], "Blooms");
        assert!(value["images"][1].get("detail").is_none());
    }

    #[tokio::test]
    async fn test_catalog_load_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.json");

        let result = Catalog::load(&path).await;

        match result {
            Err(CrawlError::Read { path: failed, source }) => {
                assert_eq!(failed, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Read error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_catalog_load_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("db.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let result = Catalog::load(&path).await;
        assert!(matches!(result, Err(CrawlError::Catalog { .. })));
    }

    #[test]
    fn test_listed_image_into_record() {
        let listed = ListedImage {
            id: 7,
            title: "Cake".into(),
            source_url: "https://cdn.test/7.png".into(),
            detail: None,
        };
        let record = listed.into_record(2, "/category/2/cake_7.png".into());
        assert_eq!(record.id, 7);
        assert_eq!(record.category_id, 2);
        assert_eq!(record.local_path, "/category/2/cake_7.png");
    }
}
