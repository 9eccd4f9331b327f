use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::util::is_rtl_language;
use crate::xml::{Namespaces, NodeId, XmlError};

/// Errors that abort a parse. Field-level problems never surface here;
/// they resolve to defaults instead.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] XmlError),

    #[error("Unsupported feed format: root element <{root}> matches no known dialect")]
    UnsupportedFormat { root: String },
}

/// A normalized feed.
///
/// String fields are empty when the source has no usable value. `date`
/// is the most recent feed-level timestamp, or the time of parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub site_url: String,
    pub feed_url: String,
    pub id: String,
    pub language: String,
    pub date: DateTime<Utc>,
    pub logo_url: String,
    pub icon_url: String,
    pub items: Vec<Item>,
}

impl Feed {
    /// Returns `true` if the feed language is written right-to-left.
    pub fn is_rtl(&self) -> bool {
        is_rtl_language(&self.language)
    }
}

/// A normalized feed entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Never empty: a digest of the explicit identifier, or of
    /// `url ‖ title ‖ content` when the source has none.
    pub id: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub author: String,
    /// The later of `published_date` and `updated_date`, else the feed date.
    pub date: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
    pub language: String,
    pub enclosure_url: String,
    pub enclosure_type: String,
    #[serde(skip)]
    pub(crate) source: NodeId,
    #[serde(skip)]
    pub(crate) namespaces: Namespaces,
}

impl Item {
    /// Id of the element this item was extracted from.
    ///
    /// Resolve it with [`Document::element`](crate::xml::Document::element)
    /// on the document that was parsed; see
    /// [`FeedParser::parse_document`](super::FeedParser::parse_document).
    pub fn source_node(&self) -> NodeId {
        self.source
    }

    /// Namespace bindings in scope at the item element.
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn is_rtl(&self) -> bool {
        is_rtl_language(&self.language)
    }
}
