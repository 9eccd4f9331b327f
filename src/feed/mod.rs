//! Feed normalization: dialect detection, extraction and resolution.
//!
//! This module turns a built XML document into the canonical [`Feed`] model:
//!
//! - **Detection**: ordered root-shape rules pick one of five dialects
//! - **Extraction**: one extractor per dialect reports raw candidates from
//!   ordered fallback lists
//! - **Resolution**: shared policies absolutize URLs, derive ids, reconcile
//!   dates and inherit languages
//! - **Post-processing**: an [`ItemPostProcessor`] chain sees every item
//!   together with its raw element
//!
//! # Example
//!
//! ```
//! use feednorm::feed::{Dialect, FeedParser};
//!
//! let xml = br#"<feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en">
//!   <title>Example</title>
//!   <entry><title>First</title><id>urn:1</id></entry>
//! </feed>"#;
//!
//! let feed = FeedParser::default().parse(xml, "https://example.org/atom.xml", None).unwrap();
//! assert_eq!(feed.items.len(), 1);
//! assert_eq!(feed.items[0].language, "en");
//! assert_eq!(feednorm::detect_dialect(xml), Dialect::Atom);
//! ```

mod date;
mod detect;
mod dialect;
mod parser;
mod processor;
mod query;
mod resolve;
mod types;

pub use date::parse_date;
pub use detect::{detect_dialect, Dialect};
pub use parser::FeedParser;
pub use processor::{ItemPostProcessor, ItemProcessor, ItemSource};
pub use types::{Feed, FeedError, Item};
