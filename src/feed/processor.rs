use super::types::{Feed, Item};
use crate::xml::{Document, Element, Namespaces};

/// Read-only view of the raw element an item was extracted from.
#[derive(Debug, Clone, Copy)]
pub struct ItemSource<'a> {
    element: Element<'a>,
    namespaces: &'a Namespaces,
}

impl<'a> ItemSource<'a> {
    pub(crate) fn new(element: Element<'a>, namespaces: &'a Namespaces) -> Self {
        Self {
            element,
            namespaces,
        }
    }

    pub fn element(&self) -> Element<'a> {
        self.element
    }

    /// Namespace context of the item: the dialect's prefixes with the
    /// document's declarations layered on top.
    pub fn namespaces(&self) -> &'a Namespaces {
        self.namespaces
    }

    pub fn document(&self) -> &'a Document {
        self.element.document()
    }
}

/// Hook run on every item once normalization is complete.
///
/// Processors may rewrite `content` and other derived fields. Changes to
/// `id` or `url` are reverted by the parser. The feed passed in has its
/// feed-level fields resolved; its `items` are not yet populated.
pub trait ItemProcessor: Send + Sync {
    fn process(&self, feed: &Feed, item: &mut Item, source: &ItemSource<'_>);
}

/// An ordered chain of [`ItemProcessor`]s.
#[derive(Default)]
pub struct ItemPostProcessor {
    processors: Vec<Box<dyn ItemProcessor>>,
}

impl ItemPostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a processor; processors run in registration order.
    pub fn register(&mut self, processor: Box<dyn ItemProcessor>) -> &mut Self {
        self.processors.push(processor);
        self
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl ItemProcessor for ItemPostProcessor {
    fn process(&self, feed: &Feed, item: &mut Item, source: &ItemSource<'_>) {
        for processor in &self.processors {
            processor.process(feed, item, source);
        }
    }
}

impl std::fmt::Debug for ItemPostProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemPostProcessor")
            .field("processors", &self.processors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedParser;

    struct Suffix(&'static str);

    impl ItemProcessor for Suffix {
        fn process(&self, _feed: &Feed, item: &mut Item, _source: &ItemSource<'_>) {
            item.content.push_str(self.0);
        }
    }

    #[test]
    fn test_processors_run_in_order() {
        let mut chain = ItemPostProcessor::new();
        chain.register(Box::new(Suffix("-a"))).register(Box::new(Suffix("-b")));
        assert_eq!(chain.len(), 2);

        let parser = FeedParser::default().with_processor(chain);
        let feed = parser
            .parse(
                b"<rss version=\"2.0\"><channel><item><description>x</description></item></channel></rss>",
                "",
                None,
            )
            .unwrap();
        assert_eq!(feed.items[0].content, "x-a-b");
    }

    #[test]
    fn test_empty_chain() {
        let chain = ItemPostProcessor::default();
        assert!(chain.is_empty());
        assert_eq!(format!("{:?}", chain), "ItemPostProcessor { processors: 0 }");
    }
}
