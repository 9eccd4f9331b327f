use super::{
    feed_language, item_language, Extractor, FeedFields, ItemFields, CONTENT_NS, DCTERMS_NS,
    DC_NS, FEEDBURNER_NS, RDF_NS, RSS10_NS,
};
use crate::feed::detect::Dialect;
use crate::feed::query::Scope;
use crate::xml::Element;

/// RSS 1.0 (RDF Site Summary). Items are siblings of the channel.
pub(super) struct Rss10;

const NAMESPACES: &[(&str, &str)] = &[
    ("rdf", RDF_NS),
    ("dc", DC_NS),
    ("dcterms", DCTERMS_NS),
    ("content", CONTENT_NS),
    ("feedburner", FEEDBURNER_NS),
];

impl Extractor for Rss10 {
    fn dialect(&self) -> Dialect {
        Dialect::Rss10
    }

    fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        NAMESPACES
    }

    fn home_namespace(&self) -> Option<&'static str> {
        Some(RSS10_NS)
    }

    fn feed_fields(&self, feed: &Scope<'_>) -> FeedFields {
        FeedFields {
            feed_url: None,
            site_url: feed.text("channel/link"),
            title: feed.text("channel/title"),
            description: feed.text("channel/description"),
            id: None,
            language: feed_language(feed, feed.first("channel"), "item", &["channel/dc:language"]),
            dates: feed.dates(&["channel/dc:date", "channel/dcterms:modified"]),
            logo_url: feed
                .text("image/url")
                .or_else(|| feed.attr("channel/image", "rdf:resource")),
            icon_url: None,
        }
    }

    fn items<'d>(&self, feed: &Scope<'d>) -> Vec<Element<'d>> {
        feed.all("item")
    }

    fn item_fields(&self, item: &Scope<'_>, _feed: &Scope<'_>) -> ItemFields {
        ItemFields {
            author: item.text("dc:creator").or_else(|| item.text("author")),
            url: item
                .text("feedburner:origLink")
                .or_else(|| item.text("link")),
            title: item.text("title"),
            content: item
                .content("content:encoded")
                .or_else(|| item.content("description")),
            id: None,
            published: item.latest_date(&["dc:date"]),
            updated: item.latest_date(&["dcterms:modified"]),
            enclosure_url: None,
            enclosure_type: None,
            language: item_language(
                item,
                &["title", "description", "content:encoded"],
                &["dc:language"],
            ),
        }
    }
}
