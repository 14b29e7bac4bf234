//! HTML parsing into the arena.
//!
//! `scraper` (html5ever) does the parsing; the resulting tree is copied node by node
//! into a `Document` so the rest of the crate owns a plain mutable arena.

use ego_tree::{NodeId, Tree};
use scraper::Html;

use super::{Document, DomNode, ElementData};

impl Document {
    /// Parse a complete HTML document (doctype, `<html>`, `<head>`, `<body>`).
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document::new();
        let root = doc.root();
        for child in parsed.tree.root().children() {
            copy_subtree(&mut doc.tree, root, child);
        }
        doc
    }

    /// Parse an HTML fragment. Its top-level nodes become children of the document root.
    #[must_use]
    pub fn parse_fragment(html: &str) -> Self {
        let parsed = Html::parse_fragment(html);
        let mut doc = Document::new();
        let root = doc.root();
        // html5ever hangs fragment content off a synthetic <html> element
        for child in parsed.root_element().children() {
            copy_subtree(&mut doc.tree, root, child);
        }
        doc
    }
}

fn convert(node: &scraper::Node) -> Option<DomNode> {
    match node {
        scraper::Node::Doctype(doctype) => Some(DomNode::Doctype(doctype.name().to_string())),
        scraper::Node::Comment(comment) => Some(DomNode::Comment(String::from(&**comment))),
        scraper::Node::Text(text) => Some(DomNode::Text(String::from(&**text))),
        scraper::Node::Element(element) => {
            let mut data = ElementData::new(element.name());
            for (name, value) in element.attrs() {
                data.set_attr(name, value);
            }
            Some(DomNode::Element(data))
        }
        _ => None,
    }
}

/// Copy `source` and its descendants under `parent`. Iterative so deeply nested
/// input cannot overflow the stack.
fn copy_subtree(tree: &mut Tree<DomNode>, parent: NodeId, source: ego_tree::NodeRef<'_, scraper::Node>) {
    let mut stack = vec![(source, parent)];
    while let Some((node, parent)) = stack.pop() {
        let Some(value) = convert(node.value()) else {
            continue;
        };
        let Some(mut parent_mut) = tree.get_mut(parent) else {
            continue;
        };
        let id = parent_mut.append(value).id();
        // Reverse so children pop in document order
        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push((child, id));
        }
    }
}
