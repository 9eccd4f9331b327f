//! Utility functions shared by the document builder and the resolution policies.
//!
//! This module provides reusable utilities for:
//!
//! - **URL handling**: absolutization against a base, origin derivation and
//!   the absolute-http(s) validity check used by link candidates
//! - **Text processing**: XML character filtering and text-direction lookup
//!
//! # Examples
//!
//! ```
//! use feednorm::util::{base_url, resolve_url, strip_invalid_xml_chars};
//!
//! // Resolve a relative item link against a site URL
//! let url = resolve_url("/posts/1", "https://example.org/");
//! assert_eq!(url, "https://example.org/posts/1");
//!
//! // Derive a site URL from a feed URL
//! assert_eq!(base_url("https://example.org/feed.xml"), "https://example.org/");
//!
//! // Drop characters XML forbids
//! assert_eq!(strip_invalid_xml_chars("a\u{0}b"), "ab");
//! ```

mod text;
mod url_resolver;

pub use text::{is_rtl_language, is_xml_char, strip_invalid_xml_chars};
pub use url_resolver::{base_url, is_absolute_http_url, resolve_url};
