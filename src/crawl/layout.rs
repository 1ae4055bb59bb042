//! Selectors and URL shapes of the gallery site.

/// CSS selectors describing the structure of list and detail pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    /// Repeated thumbnail container on image list pages.
    pub image_containers: String,
    /// Repeated thumbnail container on the categories index.
    pub category_containers: String,
    /// Thumbnail image, read via `src`.
    pub thumbnail_image: String,
    /// Thumbnail link, read via `href`.
    pub thumbnail_link: String,
    /// Thumbnail title, read as text.
    pub thumbnail_title: String,
    /// Control that advances to the next list page.
    pub next_page: String,
    /// Marker present only on the last list page.
    pub last_page_marker: String,
    /// Region of the detail page holding its fields.
    pub detail_region: String,
    /// Detail title inside the region.
    pub detail_title: String,
    /// Detail description inside the region.
    pub detail_description: String,
    /// Service link inside the region.
    pub detail_service: String,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            image_containers: containers("photos"),
            category_containers: containers("vendors"),
            thumbnail_image: "img".into(),
            thumbnail_link: "a".into(),
            thumbnail_title: "h3".into(),
            next_page: ".next.next_page a".into(),
            last_page_marker: ".next.next_page.disabled a".into(),
            detail_region: ".photo--description".into(),
            detail_title: "h2".into(),
            detail_description: "h5".into(),
            detail_service: "h5 a".into(),
        }
    }
}

fn containers(kind: &str) -> String {
    format!("div.{kind}--container > div > div")
}

/// Categories index: `{base}/categories?parent_menu=photos`.
#[must_use]
pub fn categories_url(base_url: &str) -> String {
    format!("{}/categories?parent_menu=photos", trim_base(base_url))
}

/// List page: `{base}/photos?category={id}&page={n}`, or `{base}/photos?page={n}`.
#[must_use]
pub fn list_page_url(base_url: &str, category_id: Option<u64>, page: u32) -> String {
    let base = trim_base(base_url);
    match category_id {
        Some(id) => format!("{base}/photos?category={id}&page={page}"),
        None => format!("{base}/photos?page={page}"),
    }
}

/// Detail page: `{base}/photos/{id}`.
#[must_use]
pub fn detail_url(base_url: &str, image_id: u64) -> String {
    format!("{}/photos/{image_id}", trim_base(base_url))
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}
