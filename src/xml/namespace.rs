use std::collections::BTreeMap;
use std::sync::Arc;

/// Namespace URI permanently bound to the `xml` prefix.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// An immutable prefix -> namespace URI mapping.
///
/// The empty prefix holds the default namespace. Cloning is cheap (the map
/// is shared), and [`Namespaces::layer`] produces a new context instead of
/// mutating, so a feed-level context can be extended per item without
/// affecting its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces(Arc<BTreeMap<String, String>>);

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from a static prefix table, such as the set a
    /// dialect extractor declares.
    pub fn from_static(pairs: &[(&str, &str)]) -> Self {
        Self(Arc::new(
            pairs
                .iter()
                .map(|(prefix, uri)| ((*prefix).to_owned(), (*uri).to_owned()))
                .collect(),
        ))
    }

    /// Looks up the URI bound to `prefix`. The `xml` prefix is always bound.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NS);
        }
        self.0.get(prefix).map(String::as_str)
    }

    /// The default namespace, if one is declared.
    pub fn default_namespace(&self) -> Option<&str> {
        self.0.get("").map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a context where the prefixed bindings of `other` override
    /// those of `self`.
    ///
    /// Default-namespace bindings are not carried over: unprefixed lookups
    /// are resolved against a dialect's home namespace, never against a
    /// document's default.
    pub fn layer(&self, other: &Namespaces) -> Namespaces {
        let mut overrides = other
            .0
            .iter()
            .filter(|(prefix, uri)| !prefix.is_empty() && self.0.get(*prefix) != Some(*uri))
            .peekable();

        if overrides.peek().is_none() {
            return self.clone();
        }

        let mut merged = (*self.0).clone();
        for (prefix, uri) in overrides {
            merged.insert(prefix.clone(), uri.clone());
        }
        Namespaces(Arc::new(merged))
    }

    /// Extends the context with declarations found on one element.
    pub(crate) fn declare(&self, declarations: Vec<(String, String)>) -> Namespaces {
        if declarations.is_empty() {
            return self.clone();
        }
        let mut merged = (*self.0).clone();
        merged.extend(declarations);
        Namespaces(Arc::new(merged))
    }
}
