//! Deterministic, filesystem-safe names for downloaded images.
//!
//! Names depend only on the title and optional id, so re-crawling the same
//! gallery lands every image on the same path.

use std::path::{Path, PathBuf};

/// Extension appended to every generated image name.
pub const IMAGE_EXTENSION: &str = ".png";

/// Encodes a title into a lowercase `[a-z0-9_]` base name.
///
/// Lower-cases and trims, turns ASCII spaces into underscores, then drops every
/// remaining character outside `[a-z0-9_]`. Total over any input; an empty or
/// fully-stripped title yields an empty string.
///
/// ```
/// use gallery_core::download::encode;
///
/// assert_eq!(encode("Café Déco!"), "caf_dco");
/// assert_eq!(encode("  Garden Party "), "garden_party");
/// ```
#[must_use]
pub fn encode(title: &str) -> String {
    title
        .to_lowercase()
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Builds the image file name for a title, suffixed with `_<id>` when an id is given.
///
/// A zero id is treated as absent.
///
/// ```
/// use gallery_core::download::name_with_id;
///
/// assert_eq!(name_with_id("My Title", Some(42)), "my_title_42.png");
/// assert_eq!(name_with_id("My Title", None), "my_title.png");
/// ```
#[must_use]
pub fn name_with_id(title: &str, id: Option<u64>) -> String {
    let base = encode(title);
    match id {
        Some(id) if id != 0 => format!("{base}_{id}{IMAGE_EXTENSION}"),
        _ => format!("{base}{IMAGE_EXTENSION}"),
    }
}

/// Directory holding the images of one category: `{root}/category/{category_id}`.
#[must_use]
pub fn category_dir(root: &Path, category_id: u64) -> PathBuf {
    root.join("category").join(category_id.to_string())
}

/// Full local path for an image: `{root}/category/{category_id}/{name_with_id}`.
#[must_use]
pub fn image_path(root: &Path, category_id: u64, title: &str, image_id: Option<u64>) -> PathBuf {
    category_dir(root, category_id).join(name_with_id(title, image_id))
}

/// Path of an image as recorded in the catalog, relative to the output root:
/// `/category/{category_id}/{name_with_id}`.
///
/// Independent of where the output root lives, so the catalog can be moved
/// together with its images.
///
/// ```
/// use gallery_core::download::relative_image_path;
///
/// assert_eq!(relative_image_path(3, "Garden Arch", Some(41)), "/category/3/garden_arch_41.png");
/// ```
#[must_use]
pub fn relative_image_path(category_id: u64, title: &str, image_id: Option<u64>) -> String {
    format!("/category/{category_id}/{}", name_with_id(title, image_id))
}
