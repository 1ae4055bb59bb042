//! A small gallery served by wiremock.
//!
//! Layout of [`mount_gallery`]:
//! - one category (id 7, "Garden Venues") with a cover image
//! - two list pages of two images each: 101, 102 | 103, 104
//! - a detail page and a PNG payload for every image

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CATEGORY_ID: u64 = 7;
pub const IMAGE_IDS: [u64; 4] = [101, 102, 103, 104];

/// Base URL of the gallery on `server`.
pub fn base_url(server: &MockServer) -> String {
    format!("{}/en", server.uri())
}

fn thumbs(kind: &str, items: &[(String, String, String)]) -> String {
    let inner: String = items
        .iter()
        .map(|(href, img, title)| {
            format!(r#"<div><a href="{href}"><img src="{img}"></a><h3>{title}</h3></div>"#)
        })
        .collect();
    format!(r#"<div class="{kind}--container"><div>{inner}</div></div>"#)
}

fn image_thumb(id: u64) -> (String, String, String) {
    (
        format!("/en/photos/{id}"),
        format!("/img/{id}.png"),
        format!("Photo {id}"),
    )
}

pub fn list_page(ids: &[u64], next: Option<&str>) -> String {
    let items: Vec<_> = ids.iter().map(|id| image_thumb(*id)).collect();
    let control = match next {
        Some(href) => format!(r#"<div class="next next_page"><a href="{href}">Next</a></div>"#),
        None => r##"<div class="next next_page disabled"><a href="#">Next</a></div>"##.to_string(),
    };
    format!("<html><body>{}{control}</body></html>", thumbs("photos", &items))
}

fn detail_page(id: u64) -> String {
    format!(
        r#"<html><body><div class="photo--description">
            <h2>Photo {id}</h2>
            <h5>Styled by <a href="/en/vendors/{id}">Vendor {id}</a></h5>
        </div></body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// PNG payload served for image `id`.
pub fn png_bytes(id: u64) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(id.to_string().as_bytes());
    bytes
}

/// Mounts the categories index and the cover image.
pub async fn mount_categories(server: &MockServer) {
    let index = format!(
        "<html><body>{}</body></html>",
        thumbs(
            "vendors",
            &[(
                format!("/en/photos?category={CATEGORY_ID}"),
                "/covers/7.png".to_string(),
                "Garden Venues".to_string(),
            )],
        )
    );
    Mock::given(method("GET"))
        .and(path("/en/categories"))
        .and(query_param("parent_menu", "photos"))
        .respond_with(html(index))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/covers/7.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(0)))
        .mount(server)
        .await;
}

/// Mounts list page `page` of the category.
pub async fn mount_list_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/en/photos"))
        .and(query_param("category", CATEGORY_ID.to_string()))
        .and(query_param("page", page.to_string()))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Mounts the detail page of `id`.
pub async fn mount_detail(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/en/photos/{id}")))
        .respond_with(html(detail_page(id)))
        .mount(server)
        .await;
}

/// Mounts the image payload of `id`.
pub async fn mount_image(server: &MockServer, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/img/{id}.png")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(id)))
        .mount(server)
        .await;
}

/// Mounts the whole two-page gallery.
pub async fn mount_gallery(server: &MockServer) {
    mount_categories(server).await;
    mount_list_page(
        server,
        1,
        list_page(&IMAGE_IDS[..2], Some("/en/photos?category=7&page=2")),
    )
    .await;
    mount_list_page(server, 2, list_page(&IMAGE_IDS[2..], None)).await;
    for id in IMAGE_IDS {
        mount_detail(server, id).await;
        mount_image(server, id).await;
    }
}
