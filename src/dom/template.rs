//! Detached node templates
//!
//! A `NodeTemplate` is a small owned tree with exactly one root element. Wrapper
//! templates and node-valued replacements are both templates; every insertion
//! deep-copies the template into the target document so each match gets fresh nodes.

use ego_tree::{NodeId, NodeRef, Tree};

use super::{Document, DomNode, ElementData};
use crate::error::{FinderError, FinderResult};

#[derive(Debug, Clone)]
pub struct NodeTemplate {
    tree: Tree<DomNode>,
}

impl NodeTemplate {
    /// A template holding a single empty element.
    #[must_use]
    pub fn element(element: ElementData) -> Self {
        Self {
            tree: Tree::new(DomNode::Element(element)),
        }
    }

    /// Parse an HTML snippet such as `<mark class="hit"></mark>`.
    ///
    /// The snippet must contain exactly one top-level element; surrounding whitespace
    /// and comments are ignored.
    pub fn parse(html: &str) -> FinderResult<Self> {
        let doc = Document::parse_fragment(html);
        let mut root_element = None;
        for child in doc.tree().root().children() {
            match child.value() {
                DomNode::Element(_) if root_element.is_none() => root_element = Some(child),
                DomNode::Element(_) => {
                    return Err(FinderError::MalformedTemplate(format!(
                        "expected one root element in {html:?}, found several"
                    )));
                }
                DomNode::Text(text) if text.trim().is_empty() => {}
                DomNode::Comment(_) => {}
                other => {
                    return Err(FinderError::MalformedTemplate(format!(
                        "unexpected top-level node {other:?} in {html:?}"
                    )));
                }
            }
        }
        let root = root_element.ok_or_else(|| {
            FinderError::MalformedTemplate(format!("no element found in {html:?}"))
        })?;
        Self::from_node(root)
    }

    /// Copy the subtree rooted at `node` of an existing document.
    pub fn from_node(node: NodeRef<'_, DomNode>) -> FinderResult<Self> {
        let DomNode::Element(element) = node.value() else {
            return Err(FinderError::MalformedTemplate(format!(
                "template root must be an element, got {:?}",
                node.value()
            )));
        };
        let mut tree = Tree::new(DomNode::Element(element.clone()));
        let root = tree.root().id();
        clone_children(&mut tree, root, node);
        Ok(Self { tree })
    }

    #[must_use]
    pub fn root_element(&self) -> &ElementData {
        match self.tree.root().value() {
            DomNode::Element(element) => element,
            // Both constructors only ever put an element at the root
            _ => unreachable!("node template root is always an element"),
        }
    }

    pub(crate) fn tree(&self) -> &Tree<DomNode> {
        &self.tree
    }
}

/// Copy `source` and its descendants into `dest` as a detached subtree.
pub(crate) fn clone_subtree(dest: &mut Tree<DomNode>, source: NodeRef<'_, DomNode>) -> NodeId {
    let id = dest.orphan(source.value().clone()).id();
    clone_children(dest, id, source);
    id
}

fn clone_children(dest: &mut Tree<DomNode>, dest_parent: NodeId, source: NodeRef<'_, DomNode>) {
    let mut stack: Vec<(NodeRef<'_, DomNode>, NodeId)> = source
        .children()
        .rev()
        .map(|child| (child, dest_parent))
        .collect();
    while let Some((node, parent)) = stack.pop() {
        let Some(mut parent_mut) = dest.get_mut(parent) else {
            continue;
        };
        let id = parent_mut.append(node.value().clone()).id();
        for child in node.children().rev() {
            stack.push((child, id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_element() {
        let template = NodeTemplate::parse(r#" <mark class="hit"><i></i></mark> "#)
            .expect("template should parse");
        assert_eq!(template.root_element().name(), "mark");
        assert_eq!(template.root_element().class(), Some("hit"));
        assert_eq!(template.tree().root().children().count(), 1);
    }

    #[test]
    fn test_rejects_multiple_roots() {
        let err = NodeTemplate::parse("<b></b><i></i>").expect_err("two roots");
        assert!(matches!(err, FinderError::MalformedTemplate(_)));
    }

    #[test]
    fn test_rejects_bare_text() {
        assert!(NodeTemplate::parse("just text").is_err());
        assert!(NodeTemplate::parse("").is_err());
    }

    #[test]
    fn test_graft_creates_fresh_nodes() {
        let template = NodeTemplate::parse("<span><b>x</b></span>").expect("parse");
        let mut doc = Document::new();
        let first = doc.graft(&template);
        let second = doc.graft(&template);
        assert_ne!(first, second);
        assert_eq!(doc.outer_html(first), "<span><b>x</b></span>");
        assert!(!doc.is_attached(first));
    }
}
