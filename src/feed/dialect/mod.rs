//! Per-dialect field extraction.
//!
//! Each dialect is a zero-sized [`Extractor`] holding its ordered candidate
//! lists. Extractors report raw candidates only; URL resolution, id
//! derivation and date reconciliation happen in the parser.

mod atom;
mod rss09;
mod rss10;
mod rss20;

use chrono::{DateTime, Utc};

use super::detect::Dialect;
use super::query::Scope;
use crate::xml::Element;

pub(crate) const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub(crate) const RSS10_NS: &str = "http://purl.org/rss/1.0/";
pub(crate) const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub(crate) const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub(crate) const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub(crate) const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
pub(crate) const FEEDBURNER_NS: &str = "http://rssnamespace.org/feedburner/ext/1.0";

/// Feed-level candidates as found in the document.
#[derive(Debug, Default)]
pub struct FeedFields {
    pub feed_url: Option<String>,
    pub site_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
    pub language: Option<String>,
    /// Every parseable feed-level date; the latest wins.
    pub dates: Vec<DateTime<Utc>>,
    pub logo_url: Option<String>,
    pub icon_url: Option<String>,
}

/// Item-level candidates as found in the document.
#[derive(Debug, Default)]
pub struct ItemFields {
    pub author: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub id: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub enclosure_url: Option<String>,
    pub enclosure_type: Option<String>,
    pub language: Option<String>,
}

/// Field extraction rules for one dialect.
pub trait Extractor: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Prefixes the candidate paths are written with.
    fn namespaces(&self) -> &'static [(&'static str, &'static str)];

    /// Namespace unprefixed steps match besides "no namespace".
    fn home_namespace(&self) -> Option<&'static str> {
        None
    }

    fn feed_fields(&self, feed: &Scope<'_>) -> FeedFields;

    /// Item elements in document order.
    fn items<'d>(&self, feed: &Scope<'d>) -> Vec<Element<'d>>;

    fn item_fields(&self, item: &Scope<'_>, feed: &Scope<'_>) -> ItemFields;
}

/// Returns the extractor for `dialect`, or `None` for [`Dialect::Unknown`].
pub fn extractor_for(dialect: Dialect) -> Option<&'static dyn Extractor> {
    match dialect {
        Dialect::Atom => Some(&atom::Atom as &dyn Extractor),
        Dialect::Rss20 => Some(&rss20::Rss20 as &dyn Extractor),
        Dialect::Rss10 => Some(&rss10::Rss10 as &dyn Extractor),
        Dialect::Rss092 => Some(&rss09::RSS092 as &dyn Extractor),
        Dialect::Rss091 => Some(&rss09::RSS091 as &dyn Extractor),
        Dialect::Unknown => None,
    }
}

/// Feed language, shared by every dialect.
///
/// Looks at `xml:lang` on the root, then on the channel element, then on
/// the direct children of the channel (or root) other than entries, then
/// at the dialect's language elements. Entry subtrees never contribute.
fn feed_language<'d>(
    feed: &Scope<'d>,
    channel: Option<Element<'d>>,
    entry_name: &str,
    language_paths: &[&str],
) -> Option<String> {
    let root = feed.element();
    let container = channel.unwrap_or(root);

    root.lang()
        .or_else(|| channel.and_then(|c| c.lang()))
        .or_else(|| {
            container
                .children()
                .filter(|child| child.local_name() != entry_name)
                .find_map(|child| child.lang())
        })
        .map(str::to_owned)
        .or_else(|| language_paths.iter().find_map(|path| feed.text(path)))
}

/// Item language: `xml:lang` on the item, then on its language-sensitive
/// children, then the dialect's language elements.
fn item_language(item: &Scope<'_>, sensitive: &[&str], language_paths: &[&str]) -> Option<String> {
    item.element()
        .lang()
        .or_else(|| {
            sensitive
                .iter()
                .flat_map(|path| item.all(path))
                .find_map(|element| element.lang())
        })
        .map(str::to_owned)
        .or_else(|| language_paths.iter().find_map(|path| item.text(path)))
}

/// Runs `extractor` over `xml` the way the parser does, without resolution.
#[cfg(test)]
pub(super) fn extract(extractor: &dyn Extractor, xml: &str) -> (FeedFields, Vec<ItemFields>) {
    let doc = crate::xml::build(xml, 64).unwrap();
    let context = crate::xml::Namespaces::from_static(extractor.namespaces())
        .layer(doc.root().namespaces());
    let feed = Scope::new(doc.root(), context, extractor.home_namespace());
    let items = extractor
        .items(&feed)
        .into_iter()
        .map(|element| extractor.item_fields(&feed.nested(element), &feed))
        .collect();
    (extractor.feed_fields(&feed), items)
}
