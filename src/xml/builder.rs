use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::reader::NsReader;

use super::namespace::{Namespaces, XML_NS};
use super::tree::{Attribute, Document, ElementData, Node, NodeId, NodeKind};
use super::{XmlError, MAX_DEPTH_LIMIT};

/// Parses `text` into a [`Document`], failing on the first structural error.
///
/// Entity handling is the reader's: only the five XML built-ins and numeric
/// character references are resolved. Anything else (HTML entities, stray
/// ampersands) is an error here and is left to the repair pass.
///
/// # Errors
///
/// Returns [`XmlError`] if:
/// - The reader reports a syntax error (mismatched tags, bad references)
/// - Non-whitespace content or a second element appears outside the root
/// - An element is still open at end of input
/// - No root element exists
/// - Element nesting exceeds `max_depth` (capped at [`MAX_DEPTH_LIMIT`])
pub fn build(text: &str, max_depth: usize) -> Result<Document, XmlError> {
    let max_depth = max_depth.min(MAX_DEPTH_LIMIT);
    let mut reader = NsReader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut nodes: Vec<Node> = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut root: Option<NodeId> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| XmlError::syntax(position, e))?;

        match event {
            Event::Start(e) => {
                // SEC-003: Reject excessively nested documents
                if stack.len() >= max_depth {
                    return Err(XmlError::MaxDepthExceeded(max_depth));
                }
                let id = open_element(&reader, &e, &mut nodes, &stack, &mut root, position)?;
                stack.push(id);
            }
            Event::Empty(e) => {
                if stack.len() >= max_depth {
                    return Err(XmlError::MaxDepthExceeded(max_depth));
                }
                open_element(&reader, &e, &mut nodes, &stack, &mut root, position)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| XmlError::syntax(position, e))?;
                push_text(&mut nodes, &stack, &text, position)?;
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                push_text(&mut nodes, &stack, &String::from_utf8_lossy(&bytes), position)?;
            }
            Event::Eof => break,
            // Declarations, processing instructions, comments and doctypes carry no feed data
            _ => {}
        }
    }

    if let Some(&open) = stack.last() {
        let name = match &nodes[open.0].kind {
            NodeKind::Element(data) => data.local_name.clone(),
            NodeKind::Text(_) => String::new(),
        };
        return Err(XmlError::UnclosedElement(name));
    }

    let root = root.ok_or(XmlError::NoRootElement)?;
    Ok(Document { nodes, root })
}

fn open_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    nodes: &mut Vec<Node>,
    stack: &[NodeId],
    root: &mut Option<NodeId>,
    position: u64,
) -> Result<NodeId, XmlError> {
    let parent = stack.last().copied();
    if parent.is_none() && root.is_some() {
        return Err(XmlError::ContentOutsideRoot { position });
    }

    let inherited = match parent.map(|p| &nodes[p.0].kind) {
        Some(NodeKind::Element(data)) => data.namespaces.clone(),
        _ => Namespaces::new(),
    };

    let mut declarations = Vec::new();
    let mut attributes = Vec::new();

    for attr_result in start.attributes() {
        let attr = match attr_result {
            Ok(attr) => attr,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed attribute");
                continue;
            }
        };
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| XmlError::syntax(position, e))?
            .into_owned();

        if let Some(binding) = attr.key.as_namespace_binding() {
            let prefix = match binding {
                PrefixDeclaration::Default => String::new(),
                PrefixDeclaration::Named(prefix) => lossy(prefix),
            };
            declarations.push((prefix, value));
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attr.key);
        let prefix = attr.key.prefix().map(|p| lossy(p.as_ref()));
        let namespace = bound_namespace(resolved)
            .or_else(|| (prefix.as_deref() == Some("xml")).then(|| XML_NS.to_owned()));
        attributes.push(Attribute {
            namespace,
            prefix,
            local_name: lossy(local.as_ref()),
            value,
        });
    }

    let (resolved, local) = reader.resolve_element(start.name());
    let data = ElementData {
        namespace: bound_namespace(resolved),
        prefix: start.name().prefix().map(|p| lossy(p.as_ref())),
        local_name: lossy(local.as_ref()),
        attributes,
        namespaces: inherited.declare(declarations),
    };

    let id = NodeId(nodes.len());
    nodes.push(Node {
        kind: NodeKind::Element(data),
        parent,
        children: Vec::new(),
    });
    match parent {
        Some(parent) => nodes[parent.0].children.push(id),
        None => *root = Some(id),
    }
    Ok(id)
}

fn push_text(
    nodes: &mut Vec<Node>,
    stack: &[NodeId],
    text: &str,
    position: u64,
) -> Result<(), XmlError> {
    let Some(&parent) = stack.last() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(XmlError::ContentOutsideRoot { position });
    };

    // Adjacent text and CDATA runs merge into one text node
    if let Some(&last) = nodes[parent.0].children.last() {
        if let NodeKind::Text(existing) = &mut nodes[last.0].kind {
            existing.push_str(text);
            return Ok(());
        }
    }

    let id = NodeId(nodes.len());
    nodes.push(Node {
        kind: NodeKind::Text(text.to_owned()),
        parent: Some(parent),
        children: Vec::new(),
    });
    nodes[parent.0].children.push(id);
    Ok(())
}

fn bound_namespace(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(lossy(ns.as_ref())),
        // Undeclared prefixes are kept unqualified instead of failing the document
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM: &str = "http://www.w3.org/2005/Atom";

    #[test]
    fn test_default_namespace_resolved() {
        let doc = build(&format!(r#"<feed xmlns="{ATOM}"><entry/></feed>"#), 16).unwrap();
        let root = doc.root();
        assert_eq!(root.namespace(), Some(ATOM));
        assert_eq!(root.children().next().unwrap().namespace(), Some(ATOM));
    }

    #[test]
    fn test_prefixed_namespace_resolved() {
        let doc = build(
            &format!(r#"<atom:feed xmlns:atom="{ATOM}"><atom:entry/></atom:feed>"#),
            16,
        )
        .unwrap();
        let entry = doc.root().children().next().unwrap();
        assert_eq!(entry.namespace(), Some(ATOM));
        assert_eq!(entry.prefix(), Some("atom"));
        assert_eq!(entry.local_name(), "entry");
    }

    #[test]
    fn test_item_level_redeclaration() {
        let doc = build(
            r#"<rss xmlns:dc="urn:a"><item xmlns:dc="urn:b"><dc:creator>x</dc:creator></item></rss>"#,
            16,
        )
        .unwrap();
        let item = doc.root().children().next().unwrap();
        assert_eq!(doc.root().namespaces().get("dc"), Some("urn:a"));
        assert_eq!(item.namespaces().get("dc"), Some("urn:b"));
        assert_eq!(item.children().next().unwrap().namespace(), Some("urn:b"));
    }

    #[test]
    fn test_undeclared_prefix_is_lenient() {
        let doc = build("<rss><media:thumbnail url=\"x\"/></rss>", 16).unwrap();
        let thumb = doc.root().children().next().unwrap();
        assert_eq!(thumb.namespace(), None);
        assert_eq!(thumb.local_name(), "thumbnail");
    }

    #[test]
    fn test_xml_lang_attribute_namespace() {
        let doc = build(r#"<rss xml:lang="ru"/>"#, 16).unwrap();
        assert_eq!(doc.root().lang(), Some("ru"));
    }

    #[test]
    fn test_cdata_merged_with_text() {
        let doc = build("<d>a <![CDATA[<b>bold</b>]]> c</d>", 16).unwrap();
        assert_eq!(doc.root().text(), "a <b>bold</b> c");
        assert!(!doc.root().has_child_elements());
    }

    #[test]
    fn test_entities_unescaped() {
        let doc = build("<t>Tom &amp; Jerry &#8212; &lt;3</t>", 16).unwrap();
        assert_eq!(doc.root().text(), "Tom & Jerry \u{2014} <3");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            build("foobar", 16),
            Err(XmlError::ContentOutsideRoot { .. })
        ));
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert!(matches!(build("", 16), Err(XmlError::NoRootElement)));
        assert!(matches!(build("  \n ", 16), Err(XmlError::NoRootElement)));
    }

    #[test]
    fn test_unclosed_element_rejected() {
        assert!(matches!(
            build("<rss><channel>", 16),
            Err(XmlError::UnclosedElement(name)) if name == "channel"
        ));
    }

    #[test]
    fn test_mismatched_end_tag_rejected() {
        assert!(matches!(
            build("<a><b></a></b>", 16),
            Err(XmlError::Syntax { .. })
        ));
    }

    #[test]
    fn test_second_root_rejected() {
        assert!(matches!(
            build("<a/><b/>", 16),
            Err(XmlError::ContentOutsideRoot { .. })
        ));
    }

    #[test]
    fn test_unknown_entity_rejected() {
        assert!(matches!(
            build("<t>&nbsp;</t>", 16),
            Err(XmlError::Syntax { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let deep = "<a>".repeat(5) + &"</a>".repeat(5);
        assert!(build(&deep, 5).is_ok());
        assert!(matches!(
            build(&deep, 4),
            Err(XmlError::MaxDepthExceeded(4))
        ));
    }

    #[test]
    fn test_depth_limit_is_capped() {
        let depth = MAX_DEPTH_LIMIT + 1;
        let deep = "<a>".repeat(depth) + &"</a>".repeat(depth);
        assert!(matches!(
            build(&deep, usize::MAX),
            Err(XmlError::MaxDepthExceeded(MAX_DEPTH_LIMIT))
        ));
    }

    #[test]
    fn test_comments_and_doctype_ignored() {
        let doc = build("<!DOCTYPE rss><!-- note --><rss><?pi x?></rss>", 16).unwrap();
        assert_eq!(doc.root().local_name(), "rss");
        assert_eq!(doc.len(), 1);
    }
}
