//! Reversal log
//!
//! Every surgery step records undo operations as plain data. `RevertLog::revert`
//! interprets them newest-first, so each operation sees the tree exactly as it was
//! right after the step that recorded it.

use ego_tree::NodeId;

use crate::dom::Document;

/// Which side of its anchor a synthetic node was inserted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

/// One undo operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertAction {
    /// Detach a synthetic text node, but only while it still sits directly on
    /// `side` of `anchor`.
    RemoveSynthetic {
        node: NodeId,
        anchor: NodeId,
        side: Side,
    },
    /// Put `original` back where `replacement` stands and detach `replacement`.
    ReinsertOriginal { original: NodeId, replacement: NodeId },
}

#[derive(Debug, Default)]
pub struct RevertLog {
    actions: Vec<RevertAction>,
}

impl RevertLog {
    pub(crate) fn push(&mut self, action: RevertAction) {
        self.actions.push(action);
    }

    #[must_use]
    pub fn actions(&self) -> &[RevertAction] {
        &self.actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Undo every recorded action, newest first, and clear the log.
    ///
    /// Returns the number of actions that applied. Actions whose nodes were moved
    /// by someone else since the run are skipped. Calling this on an empty log is
    /// a no-op.
    pub fn revert(&mut self, doc: &mut Document) -> usize {
        let mut applied = 0;
        while let Some(action) = self.actions.pop() {
            if apply(doc, action) {
                applied += 1;
            }
        }
        applied
    }
}

fn apply(doc: &mut Document, action: RevertAction) -> bool {
    match action {
        RevertAction::RemoveSynthetic { node, anchor, side } => {
            let Some(anchor_ref) = doc.get(anchor) else {
                return false;
            };
            let neighbour = match side {
                Side::Before => anchor_ref.prev_sibling(),
                Side::After => anchor_ref.next_sibling(),
            };
            if neighbour.map(|n| n.id()) != Some(node) {
                tracing::debug!(?node, ?anchor, ?side, "Synthetic node moved, leaving it in place");
                return false;
            }
            doc.detach(node).is_ok()
        }
        RevertAction::ReinsertOriginal {
            original,
            replacement,
        } => {
            if !doc.is_attached(replacement) {
                tracing::warn!(
                    ?original,
                    ?replacement,
                    "Replacement node is detached, cannot restore original"
                );
                return false;
            }
            if doc.insert_before(replacement, original).is_err() {
                return false;
            }
            doc.detach(replacement).is_ok()
        }
    }
}
