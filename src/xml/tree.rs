//! Arena-backed, namespace-aware document tree.
//!
//! Nodes live in one `Vec` owned by [`Document`] and refer to each other by
//! [`NodeId`]. [`Element`] is a `Copy` view pairing a document reference with
//! an id, so extraction code can hand elements around freely while the
//! borrow checker keeps them from outliving the tree.

use quick_xml::escape::{escape, partial_escape};

use super::namespace::{Namespaces, XML_NS};

/// Index of a node inside its [`Document`].
///
/// An id is only meaningful for the document that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A namespace-qualified attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub(crate) namespace: Option<String>,
    pub(crate) prefix: Option<String>,
    pub(crate) local_name: String,
    pub(crate) attributes: Vec<Attribute>,
    /// Every binding in scope at this element (inherited + declared here)
    pub(crate) namespaces: Namespaces,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Document {
    /// The root element.
    pub fn root(&self) -> Element<'_> {
        Element {
            doc: self,
            id: self.root,
        }
    }

    /// Returns the element with the given id, or `None` if the id does not
    /// name an element of this document.
    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        match self.nodes.get(id.0)?.kind {
            NodeKind::Element(_) => Some(Element { doc: self, id }),
            NodeKind::Text(_) => None,
        }
    }

    /// Total number of nodes (elements and text runs).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &ElementData {
        match &self.nodes[id.0].kind {
            NodeKind::Element(data) => data,
            // Element views are only ever created for element nodes
            NodeKind::Text(_) => unreachable!("element view over a text node"),
        }
    }
}

/// A read-only view of one element in a [`Document`].
#[derive(Clone, Copy)]
pub struct Element<'d> {
    doc: &'d Document,
    id: NodeId,
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("namespace", &self.namespace())
            .field("local_name", &self.local_name())
            .finish()
    }
}

impl<'d> Element<'d> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    pub fn local_name(&self) -> &'d str {
        &self.doc.data(self.id).local_name
    }

    pub fn namespace(&self) -> Option<&'d str> {
        self.doc.data(self.id).namespace.as_deref()
    }

    /// The prefix the element was written with, if any.
    pub fn prefix(&self) -> Option<&'d str> {
        self.doc.data(self.id).prefix.as_deref()
    }

    /// Namespace bindings in scope at this element.
    pub fn namespaces(&self) -> &'d Namespaces {
        &self.doc.data(self.id).namespaces
    }

    pub fn attributes(&self) -> &'d [Attribute] {
        &self.doc.data(self.id).attributes
    }

    /// Value of the un-namespaced attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&'d str> {
        self.attribute_ns(None, name)
    }

    /// Value of the attribute `name` in `namespace`.
    pub fn attribute_ns(&self, namespace: Option<&str>, name: &str) -> Option<&'d str> {
        self.attributes()
            .iter()
            .find(|a| a.local_name == name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    /// The `xml:lang` declared on this element itself (not inherited).
    pub fn lang(&self) -> Option<&'d str> {
        self.attribute_ns(Some(XML_NS), "lang")
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
    }

    pub fn parent(&self) -> Option<Element<'d>> {
        let parent = self.doc.nodes[self.id.0].parent?;
        self.doc.element(parent)
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = Element<'d>> + 'd {
        let doc = self.doc;
        doc.nodes[self.id.0]
            .children
            .iter()
            .filter_map(move |&id| doc.element(id))
    }

    pub fn has_child_elements(&self) -> bool {
        self.children().next().is_some()
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(self.id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in &self.doc.nodes[id.0].children {
            match &self.doc.nodes[child.0].kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element(_) => self.collect_text(child, out),
            }
        }
    }

    /// Serializes the element's children back to markup.
    ///
    /// Used for content bodies published as inline (X)HTML rather than
    /// escaped text. Text is re-escaped; elements keep the prefix they
    /// were written with.
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for &child in &self.doc.nodes[self.id.0].children {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.doc.nodes[id.0];
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeKind::Element(data) => {
                let name = match &data.prefix {
                    Some(prefix) => format!("{}:{}", prefix, data.local_name),
                    None => data.local_name.clone(),
                };
                out.push('<');
                out.push_str(&name);
                for attr in &data.attributes {
                    out.push(' ');
                    if let Some(prefix) = &attr.prefix {
                        out.push_str(prefix);
                        out.push(':');
                    }
                    out.push_str(&attr.local_name);
                    out.push_str("=\"");
                    out.push_str(&escape(attr.value.as_str()));
                    out.push('"');
                }
                if node.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in &node.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
        }
    }
}
