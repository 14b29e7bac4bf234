//! Arena-backed document tree
//!
//! Nodes live in an `ego_tree::Tree` and are addressed by `NodeId`. Detaching a node
//! never frees its slot, so a handle taken before a surgery stays valid afterwards and
//! can be checked for "is it still where I left it" with a sibling lookup.

use ego_tree::{NodeId, NodeMut, NodeRef, Tree};

use crate::error::{FinderError, FinderResult};

pub mod elements;
pub mod parse;
pub mod serialize;
pub mod template;

pub use elements::{
    NON_CONTIGUOUS_PROSE_ELEMENTS, NON_PROSE_ELEMENTS, is_non_inline_prose, is_prose_element,
};
pub use template::NodeTemplate;

/// A single node of the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Document,
    Doctype(String),
    Comment(String),
    Text(String),
    Element(ElementData),
}

impl DomNode {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DomNode::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, DomNode::Text(_))
    }
}

/// Tag name and attributes of an element.
///
/// Tag names are stored lower-case; attribute order is preserved so serialization
/// round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.attr("class")
    }
}

/// An HTML document held in an arena.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<DomNode>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Tree::new(DomNode::Document),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    #[must_use]
    pub fn tree(&self) -> &Tree<DomNode> {
        &self.tree
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_, DomNode>> {
        self.tree.get(id)
    }

    pub fn node(&self, id: NodeId) -> FinderResult<NodeRef<'_, DomNode>> {
        self.tree.get(id).ok_or(FinderError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> FinderResult<NodeMut<'_, DomNode>> {
        self.tree.get_mut(id).ok_or(FinderError::UnknownNode(id))
    }

    /// Create a detached node. It joins the tree once inserted next to an attached one.
    pub(crate) fn orphan(&mut self, value: DomNode) -> NodeId {
        self.tree.orphan(value).id()
    }

    pub fn append(&mut self, parent: NodeId, value: DomNode) -> FinderResult<NodeId> {
        Ok(self.node_mut(parent)?.append(value).id())
    }

    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> FinderResult<NodeId> {
        self.append(parent, DomNode::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> FinderResult<NodeId> {
        self.append(parent, DomNode::Text(text.into()))
    }

    /// Insert `node` (detaching it from wherever it is) as the previous sibling of `anchor`.
    pub(crate) fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> FinderResult<()> {
        if self.node(anchor)?.parent().is_none() {
            return Err(FinderError::InvalidRoot(format!(
                "cannot insert next to detached node {anchor:?}"
            )));
        }
        self.node(node)?;
        self.node_mut(anchor)?.insert_id_before(node);
        Ok(())
    }

    pub(crate) fn detach(&mut self, id: NodeId) -> FinderResult<()> {
        self.node_mut(id)?.detach();
        Ok(())
    }

    /// True when the node currently hangs off a parent.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.tree.get(id).is_some_and(|node| node.parent().is_some())
    }

    /// Concatenated text of every text node under `id`, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|n| n.value().as_text())
            .collect()
    }

    /// First element carrying the given `id` attribute.
    #[must_use]
    pub fn find_by_id(&self, id_attr: &str) -> Option<NodeId> {
        self.find_element(|el| el.attr("id") == Some(id_attr))
    }

    /// First element with the given tag name, in document order.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.find_element(|el| el.name() == tag)
    }

    fn find_element(&self, predicate: impl Fn(&ElementData) -> bool) -> Option<NodeId> {
        self.tree
            .root()
            .descendants()
            .find(|n| n.value().as_element().is_some_and(&predicate))
            .map(|n| n.id())
    }

    /// Compare the subtree at `id` with the subtree at `other_id` of `other`:
    /// same node kinds, tag names, attributes, text and child ordering.
    #[must_use]
    pub fn structurally_eq(&self, id: NodeId, other: &Document, other_id: NodeId) -> bool {
        match (self.tree.get(id), other.tree.get(other_id)) {
            (Some(a), Some(b)) => subtree_eq(a, b),
            _ => false,
        }
    }

    /// Deep-copy a template into the arena as a detached subtree.
    pub(crate) fn graft(&mut self, template: &NodeTemplate) -> NodeId {
        template::clone_subtree(&mut self.tree, template.tree().root())
    }
}

fn subtree_eq(a: NodeRef<'_, DomNode>, b: NodeRef<'_, DomNode>) -> bool {
    let mut stack = vec![(a, b)];
    while let Some((a, b)) = stack.pop() {
        if a.value() != b.value() {
            return false;
        }
        let mut left = a.children();
        let mut right = b.children();
        loop {
            match (left.next(), right.next()) {
                (Some(l), Some(r)) => stack.push((l, r)),
                (None, None) => break,
                _ => return false,
            }
        }
    }
    true
}
