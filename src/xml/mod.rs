//! XML front end: byte decoding, lenient document building and the tree model.
//!
//! Feeds arrive as raw bytes in whatever encoding the publisher chose, and a
//! good share of them are not well-formed. This module turns those bytes
//! into a namespace-aware [`Document`]:
//!
//! 1. [`normalize_encoding`] picks the character encoding (byte-order mark,
//!    then the document's own declaration, then the transport hint) and
//!    decodes to UTF-8 with the declaration stripped.
//! 2. [`build`] parses strictly with quick-xml into an arena tree.
//! 3. [`build_with_repair`] retries once on a repaired copy of the text when
//!    the strict parse fails.
//!
//! # Security
//!
//! - SEC-003: Nesting is bounded by a caller-supplied depth limit
//! - DTDs are skipped and never expanded, so entity bombs have no effect

mod builder;
mod encoding;
mod namespace;
mod repair;
mod tree;

pub use builder::build;
pub use encoding::normalize_encoding;
pub use namespace::{Namespaces, XML_NS};
pub use repair::repair;
pub use tree::{Attribute, Document, Element, NodeId};

/// Hard ceiling on nesting depth, whatever the caller asks for.
/// Tree walks recurse once per level, so this also bounds stack use.
pub const MAX_DEPTH_LIMIT: usize = 4096;

use thiserror::Error;

/// Errors that can occur while building a document.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Element <{0}> is never closed")]
    UnclosedElement(String),

    #[error("Content outside the root element at byte {position}")]
    ContentOutsideRoot { position: u64 },

    #[error("Maximum nesting depth exceeded (limit: {0})")]
    MaxDepthExceeded(usize),
}

impl XmlError {
    pub(crate) fn syntax(position: u64, error: impl std::fmt::Display) -> Self {
        XmlError::Syntax {
            position,
            message: error.to_string(),
        }
    }
}

/// Parses `text`, retrying once on a repaired copy if the strict parse fails.
///
/// When both attempts fail, the error from the repaired attempt is returned.
/// The depth limit is never retried: a document that is too deep stays
/// too deep after repair.
pub fn build_with_repair(text: &str, max_depth: usize) -> Result<Document, XmlError> {
    match build(text, max_depth) {
        Ok(doc) => Ok(doc),
        Err(e @ XmlError::MaxDepthExceeded(_)) => Err(e),
        Err(e) => {
            tracing::debug!(error = %e, "Strict parse failed, retrying on repaired text");
            build(&repair(text), max_depth)
        }
    }
}

/// Decodes `bytes` and builds a document, repairing it if needed.
///
/// # Arguments
///
/// * `bytes` - The raw document
/// * `encoding_hint` - Transport-level encoding: a bare label such as
///   `iso-8859-1` or a Content-Type value such as `text/xml; charset=utf-8`
/// * `max_depth` - Maximum element nesting depth
///
/// # Examples
///
/// ```
/// use feednorm::xml::build_document;
///
/// let doc = build_document(b"<rss version=\"2.0\"><channel/></rss>", None, 64).unwrap();
/// assert_eq!(doc.root().local_name(), "rss");
/// assert_eq!(doc.root().attribute("version"), Some("2.0"));
/// ```
pub fn build_document(
    bytes: &[u8],
    encoding_hint: Option<&str>,
    max_depth: usize,
) -> Result<Document, XmlError> {
    let text = normalize_encoding(bytes, encoding_hint);
    build_with_repair(&text, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_recovers_html_entities() {
        let doc = build_with_repair("<t>caf&eacute;&nbsp;au lait &amp; more</t>", 16).unwrap();
        assert_eq!(doc.root().text(), "café\u{a0}au lait & more");
    }

    #[test]
    fn test_repair_recovers_stray_ampersand() {
        let doc = build_with_repair("<t>Q&A</t>", 16).unwrap();
        assert_eq!(doc.root().text(), "Q&A");
    }

    #[test]
    fn test_unrepairable_input_fails() {
        assert!(matches!(
            build_with_repair("foobar", 16),
            Err(XmlError::NoRootElement)
        ));
        assert!(build_with_repair("<a><b></a>", 16).is_err());
    }

    #[test]
    fn test_depth_limit_not_retried() {
        let deep = "<a>".repeat(10) + &"</a>".repeat(10);
        assert!(matches!(
            build_with_repair(&deep, 3),
            Err(XmlError::MaxDepthExceeded(3))
        ));
    }

    #[test]
    fn test_build_document_decodes_bytes() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"windows-1251\"?><t>\xc2\xee\xe9\xed\xe0</t>";
        let doc = build_document(bytes, None, 16).unwrap();
        assert_eq!(doc.root().text(), "Война");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            XmlError::UnclosedElement("channel".into()).to_string(),
            "Element <channel> is never closed"
        );
        assert_eq!(
            XmlError::MaxDepthExceeded(256).to_string(),
            "Maximum nesting depth exceeded (limit: 256)"
        );
    }
}
