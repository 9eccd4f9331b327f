use super::{feed_language, item_language, Extractor, FeedFields, ItemFields, ATOM_NS};
use crate::feed::detect::Dialect;
use crate::feed::query::{body, Scope};
use crate::xml::Element;

/// Atom 1.0, also accepting Atom 0.3 element names.
pub(super) struct Atom;

const NAMESPACES: &[(&str, &str)] = &[("atom", ATOM_NS)];

/// Text construct: the wrapped `div` for `type="xhtml"`, markup for inline
/// children, text otherwise.
fn text_construct(scope: &Scope<'_>, path: &str) -> Option<String> {
    scope.all(path).into_iter().find_map(|element| {
        if element.attribute("type").map(str::trim) == Some("xhtml") {
            if let Some(div) = element.children().find(|c| c.local_name() == "div") {
                return body(div);
            }
        }
        body(element)
    })
}

fn enclosure_link<'d>(item: &Scope<'d>) -> Option<Element<'d>> {
    item.all("link").into_iter().find(|link| {
        link.attribute("rel").map(str::trim) == Some("enclosure")
            && item.attribute_of(*link, "href").is_some()
    })
}

impl Extractor for Atom {
    fn dialect(&self) -> Dialect {
        Dialect::Atom
    }

    fn namespaces(&self) -> &'static [(&'static str, &'static str)] {
        NAMESPACES
    }

    fn home_namespace(&self) -> Option<&'static str> {
        Some(ATOM_NS)
    }

    fn feed_fields(&self, feed: &Scope<'_>) -> FeedFields {
        FeedFields {
            feed_url: feed.link("link", &[Some("self")]),
            site_url: feed
                .link("link", &[Some("alternate")])
                .or_else(|| feed.link("link", &[None])),
            title: text_construct(feed, "title"),
            description: text_construct(feed, "subtitle")
                .or_else(|| text_construct(feed, "tagline")),
            id: feed.text("id"),
            language: feed_language(feed, None, "entry", &[]),
            dates: feed.dates(&["updated", "modified"]),
            logo_url: feed.text("logo"),
            icon_url: feed.text("icon"),
        }
    }

    fn items<'d>(&self, feed: &Scope<'d>) -> Vec<Element<'d>> {
        feed.all("entry")
    }

    fn item_fields(&self, item: &Scope<'_>, feed: &Scope<'_>) -> ItemFields {
        let enclosure = enclosure_link(item);

        ItemFields {
            author: item
                .text("author/name")
                .or_else(|| feed.text("author/name")),
            url: item
                .link("link", &[Some("alternate")])
                .or_else(|| item.link("link", &[None]))
                .or_else(|| item.attr("link", "href")),
            title: text_construct(item, "title"),
            content: text_construct(item, "content")
                .or_else(|| text_construct(item, "summary")),
            id: item.text("id"),
            published: item.latest_date(&["published", "issued", "created"]),
            updated: item.latest_date(&["updated", "modified"]),
            enclosure_url: enclosure.and_then(|link| item.attribute_of(link, "href")),
            enclosure_type: enclosure.and_then(|link| item.attribute_of(link, "type")),
            language: item_language(item, &["title", "summary", "content"], &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::extract;
    use super::*;
    use pretty_assertions::assert_eq;

    const FEED: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en">
  <title type="text">Example Feed</title>
  <subtitle>All the news</subtitle>
  <link rel="self" href="/atom.xml"/>
  <link href="http://example.org/"/>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2003-12-13T18:30:02Z</updated>
  <logo>/logo.png</logo>
  <author><name>Feed Author</name></author>
  <entry>
    <title type="html">Atom &lt;b&gt;Powered&lt;/b&gt;</title>
    <link rel="enclosure" type="audio/mpeg" href="http://example.org/a.mp3"/>
    <link rel="alternate" href="http://example.org/2003/12/13/atom03"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <published>2003-12-13T08:29:29-04:00</published>
    <updated>2003-12-13T18:30:02Z</updated>
    <summary>Some text.</summary>
    <content type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml"><p>Hello</p></div></content>
  </entry>
  <entry>
    <title xml:lang="fr">Sans lien</title>
    <author><name>Entry Author</name></author>
    <link href="/relative"/>
  </entry>
</feed>"#;

    #[test]
    fn test_feed_fields() {
        let (feed, _) = extract(&Atom, FEED);
        assert_eq!(feed.title.as_deref(), Some("Example Feed"));
        assert_eq!(feed.description.as_deref(), Some("All the news"));
        assert_eq!(feed.feed_url.as_deref(), Some("/atom.xml"));
        assert_eq!(feed.site_url.as_deref(), Some("http://example.org/"));
        assert_eq!(
            feed.id.as_deref(),
            Some("urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6")
        );
        assert_eq!(feed.language.as_deref(), Some("en"));
        assert_eq!(feed.logo_url.as_deref(), Some("/logo.png"));
        assert_eq!(feed.dates.len(), 1);
    }

    #[test]
    fn test_item_fields() {
        let (_, items) = extract(&Atom, FEED);
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title.as_deref(), Some("Atom <b>Powered</b>"));
        assert_eq!(
            first.url.as_deref(),
            Some("http://example.org/2003/12/13/atom03")
        );
        assert_eq!(first.content.as_deref(), Some("<p>Hello</p>"));
        assert_eq!(first.author.as_deref(), Some("Feed Author"));
        assert_eq!(first.enclosure_url.as_deref(), Some("http://example.org/a.mp3"));
        assert_eq!(first.enclosure_type.as_deref(), Some("audio/mpeg"));
        assert!(first.published.unwrap() < first.updated.unwrap());
        assert_eq!(first.language, None);

        let second = &items[1];
        assert_eq!(second.author.as_deref(), Some("Entry Author"));
        assert_eq!(second.url.as_deref(), Some("/relative"));
        assert_eq!(second.language.as_deref(), Some("fr"));
        assert_eq!(second.id, None);
        assert_eq!(second.content, None);
    }

    #[test]
    fn test_atom_03_names() {
        let (feed, items) = extract(
            &Atom,
            r#"<feed version="0.3" xmlns="http://purl.org/atom/ns#">
  <tagline>Old school</tagline>
  <modified>2004-01-01T00:00:00Z</modified>
  <link rel="alternate" type="text/html" href="http://example.org/"/>
  <entry>
    <issued>2003-12-13T08:29:29-04:00</issued>
    <modified>2003-12-14T00:00:00Z</modified>
    <content type="text/html" mode="escaped">&lt;p&gt;Old&lt;/p&gt;</content>
  </entry>
</feed>"#,
        );
        assert_eq!(feed.description.as_deref(), Some("Old school"));
        assert_eq!(feed.site_url.as_deref(), Some("http://example.org/"));
        assert_eq!(feed.dates.len(), 1);
        assert!(items[0].published.is_some());
        assert!(items[0].updated.is_some());
        assert_eq!(items[0].content.as_deref(), Some("<p>Old</p>"));
    }

    #[test]
    fn test_prefixed_atom() {
        let (feed, items) = extract(
            &Atom,
            r#"<atom:feed xmlns:atom="http://www.w3.org/2005/Atom"><atom:title>P</atom:title><atom:entry><atom:title>E</atom:title></atom:entry></atom:feed>"#,
        );
        assert_eq!(feed.title.as_deref(), Some("P"));
        assert_eq!(items[0].title.as_deref(), Some("E"));
    }
}
