//! User-Agent string for page and image requests.
//!
//! Identifies the tool and its version so site operators can tell crawler
//! traffic apart (RFC 9308).

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/gallery-crawler";

/// Default User-Agent sent with every request of a crawl.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("gallery-crawler/{version} (+{PROJECT_UA_URL})")
}
