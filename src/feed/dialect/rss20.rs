use super::{
    feed_language, item_language, Extractor, FeedFields, ItemFields, ATOM_NS, CONTENT_NS,
    DCTERMS_NS, DC_NS, FEEDBURNER_NS,
};
use crate::feed::detect::Dialect;
use crate::feed::query::Scope;
use crate::util::is_absolute_http_url;
use crate::xml::Element;

pub(super) struct Rss20;

const NAMESPACES: &[(&str, &str)] = &[
    ("dc", DC_NS),
    ("dcterms", DCTERMS_NS),
    ("content", CONTENT_NS),
    ("feedburner", FEEDBURNER_NS),
    ("atom", ATOM_NS),
];

impl Extractor for Rss20 {
    fn dialect(&self) -> Dialect {
        Dialect::Rss20
    }

    fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        NAMESPACES
    }

    fn feed_fields(&self, feed: &Scope<'_>) -> FeedFields {
        FeedFields {
            feed_url: feed.link("channel/atom:link", &[Some("self")]),
            site_url: feed
                .text("channel/link")
                .or_else(|| feed.link("channel/atom:link", &[Some("alternate")])),
            title: feed.text("channel/title"),
            description: feed.text("channel/description"),
            id: None,
            language: feed_language(
                feed,
                feed.first("channel"),
                "item",
                &["channel/language", "channel/dc:language"],
            ),
            dates: feed.dates(&[
                "channel/pubDate",
                "channel/lastBuildDate",
                "channel/dc:date",
                "channel/atom:updated",
            ]),
            logo_url: feed.text("channel/image/url"),
            icon_url: None,
        }
    }

    fn items<'d>(&self, feed: &Scope<'d>) -> Vec<Element<'d>> {
        feed.all("channel/item")
    }

    fn item_fields(&self, item: &Scope<'_>, feed: &Scope<'_>) -> ItemFields {
        ItemFields {
            author: item
                .text("dc:creator")
                .or_else(|| item.text("author"))
                .or_else(|| feed.text("channel/managingEditor"))
                .or_else(|| feed.text("channel/dc:creator")),
            url: item
                .text("feedburner:origLink")
                .or_else(|| item.text("link"))
                .or_else(|| item.link("atom:link", &[Some("alternate"), None]))
                .or_else(|| item.text("guid").filter(|guid| is_absolute_http_url(guid))),
            title: item.text("title"),
            content: item
                .content("content:encoded")
                .or_else(|| item.content("description")),
            id: item.text("guid"),
            published: item.latest_date(&["pubDate", "dc:date"]),
            updated: item.latest_date(&["atom:updated", "dcterms:modified"]),
            enclosure_url: item
                .text("feedburner:origEnclosureLink")
                .or_else(|| item.attr("enclosure", "url")),
            enclosure_type: item.attr("enclosure", "type"),
            language: item_language(
                item,
                &["title", "description", "content:encoded"],
                &["dc:language"],
            ),
        }
    }
}
