//! HTML serialization of the arena.
//!
//! Serialization walks open/close edges instead of recursing, so arbitrarily deep
//! documents come out whole.

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef};
use html_escape::{encode_double_quoted_attribute, encode_text};
use phf::phf_set;

use super::{Document, DomNode, ElementData};

static VOID_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
};

static RAW_TEXT_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
};

impl Document {
    /// Serialize the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    /// Serialize the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut output = String::new();
        if let Some(node) = self.get(id) {
            for child in node.children() {
                serialize_node(child, &mut output);
            }
        }
        output
    }

    /// Serialize `id` itself and its descendants.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut output = String::new();
        if let Some(node) = self.get(id) {
            serialize_node(node, &mut output);
        }
        output
    }
}

fn serialize_node(node: NodeRef<'_, DomNode>, output: &mut String) {
    // Children of a void element are never written
    let mut void_open: Option<NodeId> = None;

    for edge in node.traverse() {
        match edge {
            Edge::Open(current) => {
                if void_open.is_some() {
                    continue;
                }
                open_node(current, output);
                if current
                    .value()
                    .as_element()
                    .is_some_and(|e| VOID_ELEMENTS.contains(e.name()))
                {
                    void_open = Some(current.id());
                }
            }
            Edge::Close(current) => {
                if let Some(id) = void_open {
                    if id == current.id() {
                        void_open = None;
                    }
                    continue;
                }
                if let DomNode::Element(element) = current.value() {
                    close_element(element, output);
                }
            }
        }
    }
}

fn open_node(node: NodeRef<'_, DomNode>, output: &mut String) {
    match node.value() {
        DomNode::Document => {}
        DomNode::Doctype(name) => {
            output.push_str("<!DOCTYPE ");
            output.push_str(name);
            output.push('>');
        }
        DomNode::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
        DomNode::Text(text) => {
            let raw = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| RAW_TEXT_ELEMENTS.contains(e.name())))
                .unwrap_or(false);
            if raw {
                output.push_str(text);
            } else {
                output.push_str(&encode_text(text));
            }
        }
        DomNode::Element(element) => {
            output.push('<');
            output.push_str(element.name());
            for (name, value) in element.attrs() {
                output.push(' ');
                output.push_str(name);
                output.push_str("=\"");
                output.push_str(&encode_double_quoted_attribute(value));
                output.push('"');
            }
            output.push('>');
        }
    }
}

fn close_element(element: &ElementData, output: &mut String) {
    output.push_str("</");
    output.push_str(element.name());
    output.push('>');
}
