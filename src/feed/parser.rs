use chrono::Utc;

use super::date::most_recent;
use super::detect::Dialect;
use super::dialect::{extractor_for, Extractor};
use super::processor::{ItemPostProcessor, ItemProcessor, ItemSource};
use super::query::Scope;
use super::resolve;
use super::types::{Feed, FeedError, Item};
use crate::config::ParserConfig;
use crate::xml::{build_document, Document, Namespaces};

/// Turns raw feed documents into [`Feed`]s.
///
/// A parser holds only configuration and the post-processing chain, so one
/// instance can be shared across threads and reused for any number of
/// documents.
///
/// # Examples
///
/// ```
/// use feednorm::FeedParser;
///
/// let xml = br#"<rss version="2.0"><channel>
///   <title>Example</title><link>https://example.org/</link>
///   <item><title>Hello</title><link>/hello</link></item>
/// </channel></rss>"#;
///
/// let feed = FeedParser::default()
///     .parse(xml, "https://feeds.example.org/rss.xml", None)
///     .unwrap();
/// assert_eq!(feed.feed_url, "https://feeds.example.org/rss.xml");
/// assert_eq!(feed.items[0].url, "https://example.org/hello");
/// ```
#[derive(Debug, Default)]
pub struct FeedParser {
    config: ParserConfig,
    processor: ItemPostProcessor,
}

impl FeedParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            processor: ItemPostProcessor::new(),
        }
    }

    /// Appends a post-processor to the chain run on every item.
    pub fn with_processor(mut self, processor: impl ItemProcessor + 'static) -> Self {
        self.processor.register(Box::new(processor));
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a document, detecting its dialect from the root element.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The raw document
    /// * `fallback_url` - The URL the document was fetched from; base for
    ///   every relative URL when the document names no feed URL
    /// * `encoding_hint` - Transport-declared encoding, as a bare label or a
    ///   Content-Type value
    ///
    /// # Errors
    ///
    /// - [`FeedError::MalformedDocument`] if the document cannot be built,
    ///   even after repair
    /// - [`FeedError::UnsupportedFormat`] if the root matches no dialect
    pub fn parse(
        &self,
        bytes: &[u8],
        fallback_url: &str,
        encoding_hint: Option<&str>,
    ) -> Result<Feed, FeedError> {
        tracing::debug!(bytes = bytes.len(), fallback_url, "Parsing feed");
        let document = build_document(bytes, encoding_hint, self.config.max_depth)?;
        self.parse_document(&document, fallback_url)
    }

    /// Parses a document with the extractor for `dialect`, skipping
    /// detection.
    ///
    /// # Errors
    ///
    /// As [`FeedParser::parse`]; `Dialect::Unknown` is always
    /// [`FeedError::UnsupportedFormat`].
    pub fn parse_as(
        &self,
        dialect: Dialect,
        bytes: &[u8],
        fallback_url: &str,
        encoding_hint: Option<&str>,
    ) -> Result<Feed, FeedError> {
        let document = build_document(bytes, encoding_hint, self.config.max_depth)?;
        let extractor = extractor_for(dialect).ok_or_else(|| unsupported(&document))?;
        Ok(self.normalize(extractor, &document, fallback_url))
    }

    /// Parses an already built document.
    ///
    /// The caller keeps the document, so [`Item::source_node`] can be
    /// resolved against it afterwards.
    pub fn parse_document(&self, document: &Document, fallback_url: &str) -> Result<Feed, FeedError> {
        let dialect = Dialect::of_root(document.root());
        let extractor = extractor_for(dialect).ok_or_else(|| unsupported(document))?;
        Ok(self.normalize(extractor, document, fallback_url))
    }

    fn normalize(&self, extractor: &dyn Extractor, document: &Document, fallback_url: &str) -> Feed {
        let root = document.root();
        let context = Namespaces::from_static(extractor.namespaces()).layer(root.namespaces());
        let scope = Scope::new(root, context, extractor.home_namespace());

        let fields = extractor.feed_fields(&scope);
        let feed_url = resolve::feed_url(fields.feed_url.as_deref(), fallback_url);
        let site_url = resolve::site_url(fields.site_url.as_deref(), fallback_url, &feed_url);

        let mut feed = Feed {
            title: resolve::title_or_url(fields.title, &site_url),
            description: fields.description.unwrap_or_default(),
            id: resolve::feed_id(fields.id, &feed_url, &site_url),
            language: fields.language.unwrap_or_default(),
            date: most_recent(fields.dates).unwrap_or_else(Utc::now),
            logo_url: resolve::document_url(fields.logo_url, &site_url),
            icon_url: resolve::document_url(fields.icon_url, &site_url),
            feed_url,
            site_url,
            items: Vec::new(),
        };

        let items = extractor
            .items(&scope)
            .into_iter()
            .map(|element| {
                let item_scope = scope.nested(element);
                let mut item = self.normalize_item(extractor, &feed, &scope, &item_scope);
                self.post_process(&feed, &mut item, &item_scope);
                item
            })
            .collect();
        feed.items = items;

        tracing::debug!(
            dialect = %extractor.dialect(),
            items = feed.items.len(),
            "Normalized feed"
        );
        feed
    }

    fn normalize_item(
        &self,
        extractor: &dyn Extractor,
        feed: &Feed,
        feed_scope: &Scope<'_>,
        item_scope: &Scope<'_>,
    ) -> Item {
        let fields = extractor.item_fields(item_scope, feed_scope);

        // Fixed order: the id may depend on url, title and content
        let author = fields.author.unwrap_or_default();
        let url = resolve::document_url(fields.url, &feed.site_url);
        let title = resolve::title_or_url(fields.title, &url);
        let content = fields.content.unwrap_or_default();
        let id = resolve::item_id(
            self.config.hash_algorithm,
            fields.id.as_deref(),
            &url,
            &title,
            &content,
        );
        let date = resolve::reconcile_dates(fields.published, fields.updated, feed.date);
        let enclosure_url = resolve::document_url(fields.enclosure_url, &feed.site_url);
        let enclosure_type = fields.enclosure_type.unwrap_or_default();
        let language = resolve::language_or_feed(fields.language, &feed.language);

        Item {
            id,
            url,
            title,
            content,
            author,
            date,
            published_date: fields.published,
            updated_date: fields.updated,
            language,
            enclosure_url,
            enclosure_type,
            source: item_scope.element().id(),
            namespaces: item_scope.namespaces().clone(),
        }
    }

    fn post_process(&self, feed: &Feed, item: &mut Item, item_scope: &Scope<'_>) {
        if self.processor.is_empty() {
            return;
        }

        let id = item.id.clone();
        let url = item.url.clone();
        let source = ItemSource::new(item_scope.element(), item_scope.namespaces());
        self.processor.process(feed, item, &source);

        if item.id != id {
            tracing::warn!(item = %id, "Post-processor changed item id, reverting");
            item.id = id;
        }
        if item.url != url {
            tracing::warn!(item = %item.id, "Post-processor changed item url, reverting");
            item.url = url;
        }
    }
}

fn unsupported(document: &Document) -> FeedError {
    FeedError::UnsupportedFormat {
        root: document.root().local_name().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashAlgorithm;
    use pretty_assertions::assert_eq;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_garbage_is_malformed() {
        let result = FeedParser::default().parse(b"foobar", "", None);
        assert!(matches!(result, Err(FeedError::MalformedDocument(_))));
    }

    #[test]
    fn test_unknown_root_is_unsupported() {
        let result = FeedParser::default().parse(b"<html><body/></html>", "", None);
        assert!(matches!(
            result,
            Err(FeedError::UnsupportedFormat { root }) if root == "html"
        ));
    }

    #[test]
    fn test_zero_items() {
        let feed = FeedParser::default()
            .parse(b"<rss version=\"2.0\"><channel><title>T</title></channel></rss>", "", None)
            .unwrap();
        assert!(feed.items.is_empty());
        assert_eq!(feed.title, "T");
    }

    #[test]
    fn test_feed_defaults() {
        let before = Utc::now();
        let feed = FeedParser::default()
            .parse(
                b"<rss version=\"2.0\"><channel/></rss>",
                "https://feeds.example.org/category/x.xml",
                None,
            )
            .unwrap();
        assert_eq!(feed.feed_url, "https://feeds.example.org/category/x.xml");
        assert_eq!(feed.site_url, "https://feeds.example.org/");
        assert_eq!(feed.id, "https://feeds.example.org/category/x.xml");
        // Title falls back to the site URL
        assert_eq!(feed.title, "https://feeds.example.org/");
        assert!(feed.date >= before);
    }

    #[test]
    fn test_item_without_dates_uses_feed_date() {
        let feed = FeedParser::default()
            .parse(
                b"<rss version=\"2.0\"><channel><lastBuildDate>Sat, 07 Sep 2002 09:42:31 GMT</lastBuildDate><item><title>x</title></item></channel></rss>",
                "",
                None,
            )
            .unwrap();
        assert_eq!(feed.items[0].date, feed.date);
        assert_eq!(feed.date.to_rfc3339(), "2002-09-07T09:42:31+00:00");
    }

    #[test]
    fn test_empty_item_id() {
        let feed = FeedParser::default()
            .parse(b"<rss version=\"2.0\"><channel><item/></channel></rss>", "", None)
            .unwrap();
        assert_eq!(feed.items[0].id, EMPTY_SHA256);
        assert_eq!(feed.items[0].title, "");
        assert_eq!(feed.items[0].url, "");
    }

    #[test]
    fn test_title_falls_back_to_url() {
        let feed = FeedParser::default()
            .parse(
                b"<rss version=\"2.0\"><channel><item><link>http://example.org/a</link></item></channel></rss>",
                "",
                None,
            )
            .unwrap();
        assert_eq!(feed.items[0].title, "http://example.org/a");
    }

    #[test]
    fn test_configured_hash_algorithm() {
        let config = ParserConfig {
            hash_algorithm: HashAlgorithm::Sha512,
            ..ParserConfig::default()
        };
        let feed = FeedParser::new(config)
            .parse(b"<rss version=\"2.0\"><channel><item/></channel></rss>", "", None)
            .unwrap();
        assert_eq!(feed.items[0].id.len(), 128);
    }

    #[test]
    fn test_parse_as_forces_dialect() {
        // No version attribute, so detection alone would fail
        let xml = b"<rss><channel><item><title>x</title></item></channel></rss>";
        assert!(FeedParser::default().parse(xml, "", None).is_err());

        let feed = FeedParser::default()
            .parse_as(Dialect::Rss20, xml, "", None)
            .unwrap();
        assert_eq!(feed.items[0].title, "x");

        assert!(matches!(
            FeedParser::default().parse_as(Dialect::Unknown, xml, "", None),
            Err(FeedError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_parse_document_keeps_source_nodes() {
        let document = crate::xml::build(
            "<rss version=\"2.0\" xmlns:media=\"http://search.yahoo.com/mrss/\"><channel><item><media:thumbnail url=\"t.png\"/></item></channel></rss>",
            16,
        )
        .unwrap();
        let feed = FeedParser::default().parse_document(&document, "").unwrap();
        let item = &feed.items[0];
        let source = document.element(item.source_node()).unwrap();
        assert_eq!(source.local_name(), "item");
        assert_eq!(item.namespaces().get("media"), Some("http://search.yahoo.com/mrss/"));
    }

    struct Meddler;

    impl ItemProcessor for Meddler {
        fn process(&self, _feed: &Feed, item: &mut Item, source: &ItemSource<'_>) {
            item.id = "changed".into();
            item.url = "changed".into();
            item.content = format!("<{}>", source.element().local_name());
        }
    }

    #[test]
    fn test_post_processor_cannot_change_identity() {
        let feed = FeedParser::default()
            .with_processor(Meddler)
            .parse(
                b"<rss version=\"2.0\"><channel><item><link>http://example.org/a</link></item></channel></rss>",
                "",
                None,
            )
            .unwrap();
        let item = &feed.items[0];
        assert_eq!(item.url, "http://example.org/a");
        assert_eq!(item.id.len(), 64);
        assert_eq!(item.content, "<item>");
    }
}
