//! Syndication feed normalization.
//!
//! `feednorm` reads Atom, RSS 2.0, RSS 1.0 (RDF), RSS 0.92 and RSS 0.91
//! documents and produces one canonical [`Feed`] model, whatever vocabulary,
//! namespace prefixes or encoding the publisher used. Broken markup is
//! repaired once before giving up.
//!
//! Parsing is a pure function of the document bytes, the URL it was fetched
//! from and the transport-declared encoding. Nothing is fetched, cached or
//! sanitized here.
//!
//! # Examples
//!
//! ```
//! let xml = br#"<?xml version="1.0" encoding="utf-8"?>
//! <rss version="2.0"><channel>
//!   <title>Example</title>
//!   <item><title>Hello &amp; welcome</title><guid>urn:1</guid></item>
//! </channel></rss>"#;
//!
//! let feed = feednorm::parse(xml, "https://example.org/rss.xml", None).unwrap();
//! assert_eq!(feed.site_url, "https://example.org/");
//! assert_eq!(feed.items[0].title, "Hello & welcome");
//! assert_eq!(feed.items[0].id.len(), 64);
//! ```

pub mod config;
pub mod feed;
pub mod util;
pub mod xml;

pub use config::{ConfigError, HashAlgorithm, ParserConfig};
pub use feed::{detect_dialect, Dialect, Feed, FeedError, FeedParser, Item};

/// Parses `bytes` with the default configuration.
///
/// See [`FeedParser::parse`].
pub fn parse(
    bytes: &[u8],
    fallback_url: &str,
    encoding_hint: Option<&str>,
) -> Result<Feed, FeedError> {
    FeedParser::default().parse(bytes, fallback_url, encoding_hint)
}
