//! DOM-aware find-and-replace
//!
//! A run goes through three phases:
//! 1. Aggregate the text under the root into segments (`aggregate`)
//! 2. Match the pattern against the segments (`matcher`)
//! 3. Walk the tree once, splicing a replacement in for every match (`surgeon`)
//!
//! Every splice is recorded in a `RevertLog`; `Finder::revert` undoes them all.
//!
//! # Usage
//!
//! ```rust
//! # use kodegen_tools_domfind::{Document, Finder, FinderOptions};
//! let mut doc = Document::parse_fragment("<div>cat dog cat</div>");
//! let options = FinderOptions::builder()
//!     .find("cat")
//!     .wrap("span")
//!     .wrap_class("hl")
//!     .build()?;
//! let root = doc.root();
//! let mut finder = Finder::run(&mut doc, root, &options)?;
//! assert_eq!(
//!     doc.to_html(),
//!     r#"<div><span class="hl">cat</span> dog <span class="hl">cat</span></div>"#
//! );
//! finder.revert(&mut doc);
//! assert_eq!(doc.to_html(), "<div>cat dog cat</div>");
//! # Ok::<(), kodegen_tools_domfind::FinderError>(())
//! ```

use ego_tree::NodeId;

pub mod aggregate;
pub mod matcher;
pub mod replacement;
pub mod revert;
mod surgeon;

pub use aggregate::{Segment, TextAggregation, aggregate};
pub use matcher::search;
pub use replacement::expand_template;
pub use revert::{RevertAction, RevertLog, Side};

use crate::config::FinderOptions;
use crate::dom::{Document, DomNode};
use crate::error::{FinderError, FinderResult};
use surgeon::Surgeon;

/// One match of the pattern in the aggregated text.
///
/// Offsets are byte offsets into the aggregated text of the run, half-open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    ordinal: usize,
    start: usize,
    end: usize,
    groups: Vec<Option<String>>,
}

impl MatchRecord {
    pub(crate) fn new(ordinal: usize, start: usize, end: usize, groups: Vec<Option<String>>) -> Self {
        Self {
            ordinal,
            start,
            end,
            groups,
        }
    }

    /// 0-based position among the matches of the run.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn end_index(&self) -> usize {
        self.end
    }

    /// The matched text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.group(0).unwrap_or_default()
    }

    /// Capture group `n`; `None` if it does not exist or did not participate.
    #[must_use]
    pub fn group(&self, n: usize) -> Option<&str> {
        self.groups.get(n).and_then(|g| g.as_deref())
    }
}

/// The part of a match that falls inside one original text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portion {
    /// The original text node. It is detached by the surgery but stays in the arena.
    pub node: NodeId,
    /// Position of this portion among the portions of its match.
    pub index: usize,
    /// The matched text inside this node.
    pub text: String,
    /// Byte offset of `text` within the whole match.
    pub position_in_match: usize,
    pub position_in_node: usize,
    pub end_position_in_node: usize,
    /// Whether this portion ends the match.
    pub is_terminal: bool,
}

/// Result of one find-and-replace run, able to undo it.
#[derive(Debug)]
pub struct Finder {
    root: NodeId,
    matches: Vec<MatchRecord>,
    reverts: RevertLog,
}

impl Finder {
    /// Find every match of `options` under `root` and replace it in place.
    ///
    /// # Errors
    ///
    /// - `FinderError::InvalidRoot` / `UnknownNode` for a root that cannot hold matches
    /// - `FinderError::ZeroLengthMatch` before any mutation
    /// - `FinderError::MatchOutOfBounds` / `Desync` if the walk disagrees with the
    ///   matches; splices done before the failure stay in place
    pub fn run(doc: &mut Document, root: NodeId, options: &FinderOptions) -> FinderResult<Self> {
        if let DomNode::Text(_) = doc.node(root)?.value() {
            return Err(FinderError::InvalidRoot(
                "a text node cannot be the root of a run".to_string(),
            ));
        }

        let aggregation = aggregate(doc, root, options);
        let matches = search(&aggregation, options.compiled_pattern())?;
        let mut reverts = RevertLog::default();

        if !matches.is_empty() {
            let input = aggregation.full_text();
            Surgeon::new(doc, root, options, &input, &mut reverts).run(&matches)?;
        }

        tracing::debug!(
            matches = matches.len(),
            revert_actions = reverts.len(),
            segments = aggregation.segments().len(),
            "Find-and-replace run complete"
        );

        Ok(Self {
            root,
            matches,
            reverts,
        })
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Matches found by the run, in document order.
    #[must_use]
    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    #[must_use]
    pub fn revert_log(&self) -> &RevertLog {
        &self.reverts
    }

    /// True once everything has been undone, or when there was nothing to undo.
    #[must_use]
    pub fn is_reverted(&self) -> bool {
        self.reverts.is_empty()
    }

    /// Undo the run. Calling it again is a no-op.
    pub fn revert(&mut self, doc: &mut Document) {
        let applied = self.reverts.revert(doc);
        tracing::debug!(applied = applied, "Reverted find-and-replace run");
    }
}

/// Run `options` against the whole document.
pub fn find_and_replace(doc: &mut Document, options: &FinderOptions) -> FinderResult<Finder> {
    let root = doc.root();
    Finder::run(doc, root, options)
}
