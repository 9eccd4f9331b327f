use super::{
    feed_language, item_language, Extractor, FeedFields, ItemFields, CONTENT_NS, DC_NS,
    FEEDBURNER_NS,
};
use crate::feed::detect::Dialect;
use crate::feed::query::Scope;
use crate::xml::Element;

/// RSS 0.91 and 0.92. The two differ only in 0.92's enclosures.
pub(super) struct Rss09 {
    dialect: Dialect,
    enclosures: bool,
}

pub(super) static RSS092: Rss09 = Rss09 {
    dialect: Dialect::Rss092,
    enclosures: true,
};

pub(super) static RSS091: Rss09 = Rss09 {
    dialect: Dialect::Rss091,
    enclosures: false,
};

const NAMESPACES: &[(&str, &str)] = &[
    ("dc", DC_NS),
    ("content", CONTENT_NS),
    ("feedburner", FEEDBURNER_NS),
];

impl Extractor for Rss09 {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        NAMESPACES
    }

    fn feed_fields(&self, feed: &Scope<'_>) -> FeedFields {
        FeedFields {
            feed_url: None,
            site_url: feed.text("channel/link"),
            title: feed.text("channel/title"),
            description: feed.text("channel/description"),
            id: None,
            language: feed_language(
                feed,
                feed.first("channel"),
                "item",
                &["channel/language", "channel/dc:language"],
            ),
            dates: feed.dates(&["channel/pubDate", "channel/lastBuildDate", "channel/dc:date"]),
            logo_url: feed.text("channel/image/url"),
            icon_url: None,
        }
    }

    fn items<'d>(&self, feed: &Scope<'d>) -> Vec<Element<'d>> {
        feed.all("channel/item")
    }

    fn item_fields(&self, item: &Scope<'_>, _feed: &Scope<'_>) -> ItemFields {
        let (enclosure_url, enclosure_type) = if self.enclosures {
            (item.attr("enclosure", "url"), item.attr("enclosure", "type"))
        } else {
            (None, None)
        };

        ItemFields {
            author: item.text("dc:creator"),
            url: item
                .text("feedburner:origLink")
                .or_else(|| item.text("link")),
            title: item.text("title"),
            content: item
                .content("content:encoded")
                .or_else(|| item.content("description")),
            id: None,
            published: item.latest_date(&["pubDate", "dc:date"]),
            updated: None,
            enclosure_url,
            enclosure_type,
            language: item_language(
                item,
                &["title", "description", "content:encoded"],
                &["dc:language"],
            ),
        }
    }
}
