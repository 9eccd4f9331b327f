use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::xml::{normalize_encoding, Element};

/// The syndication vocabularies the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dialect {
    Atom,
    Rss20,
    Rss10,
    Rss092,
    Rss091,
    Unknown,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Atom => "Atom",
            Dialect::Rss20 => "RSS 2.0",
            Dialect::Rss10 => "RSS 1.0",
            Dialect::Rss092 => "RSS 0.92",
            Dialect::Rss091 => "RSS 0.91",
            Dialect::Unknown => "unknown",
        })
    }
}

/// What the rules look at: the root element's local name and trimmed
/// `version` attribute.
struct RootShape<'a> {
    local_name: &'a str,
    version: Option<&'a str>,
}

struct Rule {
    dialect: Dialect,
    matches: fn(&RootShape<'_>) -> bool,
}

/// Ordered root-shape rules. First match wins.
const RULES: &[Rule] = &[
    Rule {
        dialect: Dialect::Atom,
        matches: |root| root.local_name == "feed",
    },
    Rule {
        dialect: Dialect::Rss20,
        matches: |root| root.local_name == "rss" && root.version == Some("2.0"),
    },
    Rule {
        dialect: Dialect::Rss092,
        matches: |root| root.local_name == "rss" && root.version == Some("0.92"),
    },
    Rule {
        dialect: Dialect::Rss091,
        matches: |root| root.local_name == "rss" && root.version == Some("0.91"),
    },
    Rule {
        dialect: Dialect::Rss10,
        matches: |root| root.local_name.eq_ignore_ascii_case("rdf"),
    },
];

fn classify(shape: &RootShape<'_>) -> Dialect {
    RULES
        .iter()
        .find(|rule| (rule.matches)(shape))
        .map_or(Dialect::Unknown, |rule| rule.dialect)
}

impl Dialect {
    /// Classifies a built document by its root element.
    pub fn of_root(root: Element<'_>) -> Dialect {
        classify(&RootShape {
            local_name: root.local_name(),
            version: root.attribute("version").map(str::trim),
        })
    }
}

/// Detects the dialect of a raw document without building a tree.
///
/// Only the prologue and the root start tag are read, so truncated or
/// otherwise malformed bodies still classify. Input whose root tag cannot
/// be reached is [`Dialect::Unknown`].
///
/// # Examples
///
/// ```
/// use feednorm::{detect_dialect, Dialect};
///
/// assert_eq!(detect_dialect(b"<rss version=\"2.0\"><channel><ti"), Dialect::Rss20);
/// assert_eq!(detect_dialect(b"<feed xmlns=\"http://www.w3.org/2005/Atom\">"), Dialect::Atom);
/// assert_eq!(detect_dialect(b"<html><body/></html>"), Dialect::Unknown);
/// assert_eq!(detect_dialect(b"foobar"), Dialect::Unknown);
/// ```
pub fn detect_dialect(bytes: &[u8]) -> Dialect {
    let text = normalize_encoding(bytes, None);
    let mut reader = Reader::from_str(&text);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => return classify_start_tag(&e),
            Ok(Event::Eof) => return Dialect::Unknown,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "No root element found while detecting dialect");
                return Dialect::Unknown;
            }
        }
    }
}

fn classify_start_tag(start: &BytesStart<'_>) -> Dialect {
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let version = start
        .attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.as_ref() == b"version")
        .map(|attr| String::from_utf8_lossy(&attr.value).trim().to_owned());

    classify(&RootShape {
        local_name: &local_name,
        version: version.as_deref(),
    })
}
