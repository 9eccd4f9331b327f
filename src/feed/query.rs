//! Prefix-aware element lookups used by the dialect extractors.
//!
//! A [`Scope`] pairs an element with the namespace context that applies
//! to it. Paths are `/`-separated steps relative to that element:
//!
//! - `dc:creator` matches a child in the namespace the context binds to
//!   `dc`, whatever prefix the document itself used. A child whose
//!   prefix the document never declared matches when it is written with
//!   the same prefix.
//! - `title` matches a child with no namespace, in the dialect's home
//!   namespace, or written unprefixed in a namespace the context does not
//!   know (publishers sometimes invent a default namespace for RSS).

use chrono::{DateTime, Utc};

use super::date::{most_recent, parse_date};
use crate::xml::{Element, Namespaces};

#[derive(Debug, Clone)]
pub struct Scope<'d> {
    element: Element<'d>,
    namespaces: Namespaces,
    home: Option<&'static str>,
}

impl<'d> Scope<'d> {
    pub fn new(element: Element<'d>, namespaces: Namespaces, home: Option<&'static str>) -> Self {
        Self {
            element,
            namespaces,
            home,
        }
    }

    pub fn element(&self) -> Element<'d> {
        self.element
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// A scope for `element` with its own declarations layered over this
    /// scope's context.
    pub fn nested(&self, element: Element<'d>) -> Scope<'d> {
        Scope {
            element,
            namespaces: self.namespaces.layer(element.namespaces()),
            home: self.home,
        }
    }

    /// All elements reached by `path`, in document order.
    pub fn all(&self, path: &str) -> Vec<Element<'d>> {
        let mut current = vec![self.element];
        for step in path.split('/').filter(|step| !step.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children())
                .filter(|child| self.matches(*child, step))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn first(&self, path: &str) -> Option<Element<'d>> {
        self.all(path).into_iter().next()
    }

    /// First non-empty trimmed text among the elements reached by `path`.
    pub fn text(&self, path: &str) -> Option<String> {
        self.all(path).into_iter().find_map(|element| non_empty(element.text()))
    }

    /// First non-empty body among the elements reached by `path`.
    ///
    /// Bodies with child elements are serialized back to markup; plain
    /// bodies (including escaped or CDATA HTML) are returned as text.
    pub fn content(&self, path: &str) -> Option<String> {
        self.all(path).into_iter().find_map(body)
    }

    /// First non-empty value of attribute `name` on the elements reached
    /// by `path`. `name` may carry a prefix (`rdf:resource`).
    pub fn attr(&self, path: &str, name: &str) -> Option<String> {
        self.all(path)
            .into_iter()
            .find_map(|element| self.attribute_of(element, name))
    }

    /// Value of attribute `name` on `element`, resolved in this scope.
    pub fn attribute_of(&self, element: Element<'_>, name: &str) -> Option<String> {
        let value = match name.split_once(':') {
            Some((prefix, local)) => {
                element.attribute_ns(Some(self.namespaces.get(prefix)?), local)?
            }
            None => element.attribute(name)?,
        };
        non_empty(value.to_owned())
    }

    /// `href` of the first link reached by `path` whose `rel` is one of
    /// `rels`. A `None` entry matches a link without `rel`.
    pub fn link(&self, path: &str, rels: &[Option<&str>]) -> Option<String> {
        self.all(path).into_iter().find_map(|link| {
            let rel = link.attribute("rel").map(str::trim);
            if rels.contains(&rel) {
                self.attribute_of(link, "href")
            } else {
                None
            }
        })
    }

    /// Most recent parseable date across every element reached by `paths`.
    pub fn latest_date(&self, paths: &[&str]) -> Option<DateTime<Utc>> {
        most_recent(self.dates(paths))
    }

    /// Every parseable date reached by `paths`.
    pub fn dates(&self, paths: &[&str]) -> Vec<DateTime<Utc>> {
        paths
            .iter()
            .flat_map(|path| self.all(path))
            .filter_map(|element| parse_date(&element.text()))
            .collect()
    }

    fn matches(&self, element: Element<'_>, step: &str) -> bool {
        match step.split_once(':') {
            Some((prefix, local)) => {
                element.local_name() == local
                    && match element.namespace() {
                        Some(ns) => Some(ns) == self.namespaces.get(prefix),
                        // Undeclared prefix: trust the conventional spelling
                        None => element.prefix() == Some(prefix),
                    }
            }
            None => element.local_name() == step && self.is_unqualified(element),
        }
    }

    fn is_unqualified(&self, element: Element<'_>) -> bool {
        match element.namespace() {
            None => true,
            Some(ns) if Some(ns) == self.home => true,
            Some(ns) => element.prefix().is_none() && !self.namespaces.iter().any(|(_, uri)| uri == ns),
        }
    }
}

/// Body of an element: markup when it has child elements, else its text.
pub fn body(element: Element<'_>) -> Option<String> {
    if element.has_child_elements() {
        non_empty(element.inner_xml())
    } else {
        non_empty(element.text())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}
