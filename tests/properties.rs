//! Property tests over generated documents.

use chrono::DateTime;
use feednorm::{parse, FeedParser, HashAlgorithm, ParserConfig};
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn rss_item(title: &str, link: &str, description: &str) -> String {
    format!(
        "<rss version=\"2.0\"><channel><title>Generated</title><item>\
         <title>{}</title><link>{}</link><description>{}</description>\
         </item></channel></rss>",
        escape(title),
        escape(link),
        escape(description)
    )
}

fn atom_entry(published: i64, updated: i64) -> String {
    let published = DateTime::from_timestamp(published, 0).unwrap().to_rfc3339();
    let updated = DateTime::from_timestamp(updated, 0).unwrap().to_rfc3339();
    format!(
        "<feed xmlns=\"http://www.w3.org/2005/Atom\"><entry><id>urn:x</id>\
         <published>{}</published><updated>{}</updated></entry></feed>",
        published, updated
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_parse_is_deterministic(
        title in "[a-zA-Z0-9 <>&\"']{0,40}",
        link in "[a-z/]{0,20}",
        description in "[a-zA-Z0-9 <>&]{0,80}",
    ) {
        let xml = rss_item(&title, &link, &description);
        let first = parse(xml.as_bytes(), "https://example.org/rss.xml", None).unwrap();
        let second = parse(xml.as_bytes(), "https://example.org/rss.xml", None).unwrap();

        prop_assert_eq!(&first.items[0].id, &second.items[0].id);
        prop_assert_eq!(&first.items[0].url, &second.items[0].url);
        prop_assert_eq!(first.items[0].date, second.items[0].date);
    }

    #[test]
    fn prop_item_id_is_hex_digest(
        title in "[a-zA-Z0-9 ]{0,40}",
        description in "[a-zA-Z0-9 ]{0,80}",
    ) {
        let xml = rss_item(&title, "", &description);
        let feed = parse(xml.as_bytes(), "", None).unwrap();
        let id = &feed.items[0].id;

        prop_assert_eq!(id.len(), 64);
        prop_assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn prop_configured_digest_length(title in "[a-z]{0,20}") {
        let xml = rss_item(&title, "", "");
        let config = ParserConfig {
            hash_algorithm: HashAlgorithm::Sha384,
            ..ParserConfig::default()
        };
        let feed = FeedParser::new(config).parse(xml.as_bytes(), "", None).unwrap();
        prop_assert_eq!(feed.items[0].id.len(), 96);
    }

    #[test]
    fn prop_escaped_title_survives(title in "[a-zA-Z0-9<>&\"'][a-zA-Z0-9 <>&\"']{0,38}[a-zA-Z0-9<>&\"']") {
        let xml = rss_item(&title, "", "");
        let feed = parse(xml.as_bytes(), "", None).unwrap();
        prop_assert_eq!(&feed.items[0].title, &title);
    }

    #[test]
    fn prop_item_date_is_latest(
        published in 0i64..4_000_000_000,
        updated in 0i64..4_000_000_000,
    ) {
        let xml = atom_entry(published, updated);
        let feed = parse(xml.as_bytes(), "", None).unwrap();
        let item = &feed.items[0];

        prop_assert_eq!(item.date.timestamp(), published.max(updated));
        prop_assert_eq!(item.published_date.map(|d| d.timestamp()), Some(published));
        prop_assert_eq!(item.updated_date.map(|d| d.timestamp()), Some(updated));
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse(&bytes, "", None);
    }
}
