//! Text aggregation
//!
//! Flattens the text under a root into segments. Text separated only by inline
//! wrappers (`<em>`, `<span>`, ...) lands in one segment; an element that forces a
//! context starts a new segment before and after its own text. Filtered elements
//! contribute no text, though a filtered element that also forces a context still
//! ends the current segment.
//!
//! Segment offsets are byte offsets into the concatenation of all segments, which is
//! exactly the sequence of unfiltered text nodes in depth-first order. The surgeon
//! relies on that to replay the same offsets while walking the live tree.

use ego_tree::iter::Children;
use ego_tree::{NodeId, NodeRef};

use crate::config::FinderOptions;
use crate::dom::{Document, DomNode};

/// A run of text that matches may span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Byte offset of the segment's first character in the aggregated text.
    pub offset: usize,
}

/// Segments of one root, in document order. Empty runs are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextAggregation {
    segments: Vec<Segment>,
    len: usize,
}

impl TextAggregation {
    fn from_runs(runs: Vec<String>) -> Self {
        let mut segments = Vec::with_capacity(runs.len());
        let mut offset = 0;
        for text in runs {
            let len = text.len();
            if len > 0 {
                segments.push(Segment { text, offset });
            }
            offset += len;
        }
        Self { segments, len: offset }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total length in bytes of the aggregated text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All segments concatenated.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Aggregate the text under `root` according to the filter and context options.
#[must_use]
pub fn aggregate(doc: &Document, root: NodeId, options: &FinderOptions) -> TextAggregation {
    match doc.get(root) {
        Some(node) => TextAggregation::from_runs(collect_runs(node, options)),
        None => TextAggregation::default(),
    }
}

/// Runs of `node`. The first run is open at the front and the last is open at the
/// back: a non-boundary parent glues its surrounding text onto the first one.
///
/// Walks with an explicit stack of frames, one per open element, so document depth
/// is bounded by memory rather than the call stack.
fn collect_runs(node: NodeRef<'_, DomNode>, options: &FinderOptions) -> Vec<String> {
    match node.value() {
        DomNode::Text(text) => return vec![text.clone()],
        DomNode::Element(element) if !options.accepts(element) => return Vec::new(),
        _ => {}
    }

    let mut stack = vec![Frame::new(node)];
    loop {
        let Some(frame) = stack.last_mut() else {
            return Vec::new();
        };

        let Some(child) = frame.children.next() else {
            let Some(done) = stack.pop() else {
                return Vec::new();
            };
            let Some(parent) = stack.last_mut() else {
                return done.runs;
            };
            let forced = forces_context(done.node, options);
            merge_runs(&mut parent.runs, done.runs, forced);
            continue;
        };

        match child.value() {
            DomNode::Text(text) => push_onto_last(&mut frame.runs, text),
            DomNode::Element(element) if !options.accepts(element) => {
                let forced = options.forces_context(element);
                merge_runs(&mut frame.runs, Vec::new(), forced);
            }
            DomNode::Element(_) | DomNode::Document => stack.push(Frame::new(child)),
            DomNode::Doctype(_) | DomNode::Comment(_) => {}
        }
    }
}

/// An element whose children are still being collected.
struct Frame<'a> {
    node: NodeRef<'a, DomNode>,
    children: Children<'a, DomNode>,
    runs: Vec<String>,
}

impl<'a> Frame<'a> {
    fn new(node: NodeRef<'a, DomNode>) -> Self {
        Self {
            node,
            children: node.children(),
            runs: vec![String::new()],
        }
    }
}

fn forces_context(node: NodeRef<'_, DomNode>, options: &FinderOptions) -> bool {
    node.value()
        .as_element()
        .is_some_and(|element| options.forces_context(element))
}

/// Fold a finished child's runs into its parent's.
fn merge_runs(runs: &mut Vec<String>, inner: Vec<String>, forced: bool) {
    if forced {
        runs.extend(inner);
        runs.push(String::new());
        return;
    }
    let mut inner = inner.into_iter();
    if let Some(first) = inner.next() {
        push_onto_last(runs, &first);
    }
    let rest: Vec<String> = inner.collect();
    if !rest.is_empty() {
        runs.extend(rest);
        runs.push(String::new());
    }
}

fn push_onto_last(runs: &mut Vec<String>, text: &str) {
    match runs.last_mut() {
        Some(last) => last.push_str(text),
        None => runs.push(text.to_string()),
    }
}
