//! Resolution policies shared by every dialect.
//!
//! Extractors only report what the document says. The functions here turn
//! those raw candidates into canonical values: absolute URLs, stable ids,
//! reconciled dates and inherited languages.

use chrono::{DateTime, Utc};

use crate::config::HashAlgorithm;
use crate::util::{base_url, resolve_url};

/// The feed URL: the extracted value resolved against the fetch URL, or
/// the fetch URL verbatim when the document names none.
pub(crate) fn feed_url(extracted: Option<&str>, fallback_url: &str) -> String {
    match extracted {
        Some(url) => resolve_url(url, fallback_url),
        None => fallback_url.to_owned(),
    }
}

/// The site URL: the extracted value resolved against the fetch URL, or
/// the origin of the resolved feed URL.
pub(crate) fn site_url(extracted: Option<&str>, fallback_url: &str, feed_url: &str) -> String {
    match extracted {
        Some(url) => resolve_url(url, fallback_url),
        None => base_url(feed_url),
    }
}

/// A URL found inside the document, resolved against the site URL.
pub(crate) fn document_url(extracted: Option<String>, site_url: &str) -> String {
    extracted
        .map(|url| resolve_url(&url, site_url))
        .unwrap_or_default()
}

/// Feed id: the explicit one, else the feed URL, else the site URL.
pub(crate) fn feed_id(explicit: Option<String>, feed_url: &str, site_url: &str) -> String {
    explicit.unwrap_or_else(|| {
        if feed_url.is_empty() {
            site_url.to_owned()
        } else {
            feed_url.to_owned()
        }
    })
}

/// Item id: a digest of the explicit identifier, or of
/// `url ‖ title ‖ content` when there is none. Never empty.
pub(crate) fn item_id(
    algorithm: HashAlgorithm,
    explicit: Option<&str>,
    url: &str,
    title: &str,
    content: &str,
) -> String {
    match explicit.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => algorithm.digest(&[id]),
        None => algorithm.digest(&[url, title, content]),
    }
}

/// Title, falling back to the entity's own URL.
pub(crate) fn title_or_url(title: Option<String>, url: &str) -> String {
    title.unwrap_or_else(|| url.to_owned())
}

/// Item date: the later of published and updated, whichever is present,
/// else the feed date.
pub(crate) fn reconcile_dates(
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    feed_date: DateTime<Utc>,
) -> DateTime<Utc> {
    match (published, updated) {
        (Some(published), Some(updated)) => published.max(updated),
        (Some(date), None) | (None, Some(date)) => date,
        (None, None) => feed_date,
    }
}

/// Item language, falling back to the feed language.
pub(crate) fn language_or_feed(language: Option<String>, feed_language: &str) -> String {
    language.unwrap_or_else(|| feed_language.to_owned())
}
