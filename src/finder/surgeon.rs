//! Span-to-node mapping and DOM surgery
//!
//! The surgeon walks the tree in the same depth-first order as the aggregator,
//! keeping a running byte offset that only text nodes advance. For the current match
//! it moves through three states:
//!
//! - `SeekingStart`: skip text nodes until one contains the match start.
//! - `AccumulatingInterior`: collect every following text node whole until one
//!   contains the match end.
//! - `FoundEnd`: all portions are known; splice the replacement in.
//!
//! After a surgery the walk resumes right after the last inserted replacement node
//! with the offset wound back to the end of the match, so the synthetic "after" text
//! node (if any) is scanned next as if it were the rest of the original node.

use ego_tree::NodeId;

use super::replacement::build_portion_node;
use super::revert::{RevertAction, RevertLog, Side};
use super::{MatchRecord, Portion};
use crate::config::FinderOptions;
use crate::dom::{Document, DomNode};
use crate::error::{FinderError, FinderResult};

/// Portions of a match once its end has been found.
#[derive(Debug)]
enum ResolvedMatch {
    /// The whole match sits inside one text node.
    Single(Portion),
    /// The match starts in one node, ends in another and swallows any in between.
    Spanning {
        start: Portion,
        interior: Vec<Portion>,
        end: Portion,
    },
}

#[derive(Debug)]
enum SurgeonState {
    SeekingStart,
    AccumulatingInterior { start: Portion, interior: Vec<Portion> },
    FoundEnd(ResolvedMatch),
}

/// Where the walk continues after one surgery.
struct Splice {
    /// Last inserted replacement node; the walk skips its subtree.
    last: NodeId,
    /// Bytes of the terminal node that lie after the match end.
    unvisited: usize,
}

pub(crate) struct Surgeon<'a> {
    doc: &'a mut Document,
    root: NodeId,
    options: &'a FinderOptions,
    input: &'a str,
    log: &'a mut RevertLog,
}

impl<'a> Surgeon<'a> {
    pub(crate) fn new(
        doc: &'a mut Document,
        root: NodeId,
        options: &'a FinderOptions,
        input: &'a str,
        log: &'a mut RevertLog,
    ) -> Self {
        Self {
            doc,
            root,
            options,
            input,
            log,
        }
    }

    /// Replace every match, in order, in a single walk.
    pub(crate) fn run(mut self, matches: &[MatchRecord]) -> FinderResult<()> {
        for record in matches {
            if record.end_index() > self.input.len() || record.start_index() >= record.end_index() {
                return Err(FinderError::MatchOutOfBounds {
                    ordinal: record.ordinal(),
                    start: record.start_index(),
                    end: record.end_index(),
                    len: self.input.len(),
                });
            }
        }

        let mut pending = matches.iter();
        let Some(mut record) = pending.next() else {
            return Ok(());
        };

        let mut state = SurgeonState::SeekingStart;
        let mut offset = 0usize;
        let mut cursor = self.root;
        let mut descend = true;

        while let Some(next) = self.next_node(cursor, descend) {
            cursor = next;
            descend = true;

            let text_len = match self.doc.node(cursor)?.value() {
                DomNode::Element(element) if !self.options.accepts(element) => {
                    descend = false;
                    continue;
                }
                DomNode::Text(text) => {
                    state = advance(state, record, cursor, text, offset)?;
                    text.len()
                }
                _ => continue,
            };
            offset += text_len;

            let SurgeonState::FoundEnd(resolved) = state else {
                continue;
            };
            let splice = self.replace(record, resolved)?;
            offset -= splice.unvisited;
            cursor = splice.last;
            descend = false;
            state = SurgeonState::SeekingStart;

            match pending.next() {
                Some(next_record) => record = next_record,
                None => return Ok(()),
            }
        }

        Err(FinderError::Desync {
            ordinal: record.ordinal(),
            message: format!(
                "walk ended at offset {offset} before reaching {}..{}",
                record.start_index(),
                record.end_index()
            ),
        })
    }

    /// Next node in depth-first order, staying inside the root.
    fn next_node(&self, cursor: NodeId, descend: bool) -> Option<NodeId> {
        let node = self.doc.get(cursor)?;
        if descend && let Some(child) = node.first_child() {
            return Some(child.id());
        }
        let mut current = node;
        loop {
            if current.id() == self.root {
                return None;
            }
            if let Some(sibling) = current.next_sibling() {
                return Some(sibling.id());
            }
            current = current.parent()?;
        }
    }

    fn replace(&mut self, record: &MatchRecord, resolved: ResolvedMatch) -> FinderResult<Splice> {
        match resolved {
            ResolvedMatch::Single(portion) => self.replace_single(record, portion),
            ResolvedMatch::Spanning {
                start,
                interior,
                end,
            } => self.replace_spanning(record, start, interior, end),
        }
    }

    fn replace_single(&mut self, record: &MatchRecord, portion: Portion) -> FinderResult<Splice> {
        let node = portion.node;
        let text = self.node_text(node, record)?;
        let before = slice(&text, ..portion.position_in_node, record)?;
        let after = slice(&text, portion.end_position_in_node.., record)?;

        let replacement = build_portion_node(self.doc, self.options, &portion, record, self.input)?;
        let preceding = self.insert_text_before(node, before)?;
        self.doc.insert_before(node, replacement)?;
        let following = self.insert_text_before(node, after)?;
        self.doc.detach(node)?;

        self.log.push(RevertAction::ReinsertOriginal {
            original: node,
            replacement,
        });
        if let Some(following) = following {
            self.log.push(RevertAction::RemoveSynthetic {
                node: following,
                anchor: replacement,
                side: Side::After,
            });
        }
        if let Some(preceding) = preceding {
            self.log.push(RevertAction::RemoveSynthetic {
                node: preceding,
                anchor: replacement,
                side: Side::Before,
            });
        }

        tracing::debug!(
            ordinal = record.ordinal(),
            start = record.start_index(),
            end = record.end_index(),
            "Replaced match inside one text node"
        );

        Ok(Splice {
            last: replacement,
            unvisited: text.len() - portion.end_position_in_node,
        })
    }

    fn replace_spanning(
        &mut self,
        record: &MatchRecord,
        start: Portion,
        interior: Vec<Portion>,
        end: Portion,
    ) -> FinderResult<Splice> {
        let start_text = self.node_text(start.node, record)?;
        let end_text = self.node_text(end.node, record)?;
        let before = slice(&start_text, ..start.position_in_node, record)?;
        let after = slice(&end_text, end.end_position_in_node.., record)?;

        let first = build_portion_node(self.doc, self.options, &start, record, self.input)?;

        for portion in &interior {
            let replacement =
                build_portion_node(self.doc, self.options, portion, record, self.input)?;
            self.doc.insert_before(portion.node, replacement)?;
            self.doc.detach(portion.node)?;
            self.log.push(RevertAction::ReinsertOriginal {
                original: portion.node,
                replacement,
            });
        }

        let last = build_portion_node(self.doc, self.options, &end, record, self.input)?;

        let preceding = self.insert_text_before(start.node, before)?;
        self.doc.insert_before(start.node, first)?;
        self.doc.detach(start.node)?;

        self.doc.insert_before(end.node, last)?;
        let following = self.insert_text_before(end.node, after)?;
        self.doc.detach(end.node)?;

        self.log.push(RevertAction::ReinsertOriginal {
            original: end.node,
            replacement: last,
        });
        if let Some(following) = following {
            self.log.push(RevertAction::RemoveSynthetic {
                node: following,
                anchor: last,
                side: Side::After,
            });
        }
        self.log.push(RevertAction::ReinsertOriginal {
            original: start.node,
            replacement: first,
        });
        if let Some(preceding) = preceding {
            self.log.push(RevertAction::RemoveSynthetic {
                node: preceding,
                anchor: first,
                side: Side::Before,
            });
        }

        tracing::debug!(
            ordinal = record.ordinal(),
            start = record.start_index(),
            end = record.end_index(),
            portions = interior.len() + 2,
            "Replaced match spanning several text nodes"
        );

        Ok(Splice {
            last,
            unvisited: end_text.len() - end.end_position_in_node,
        })
    }

    fn node_text(&self, node: NodeId, record: &MatchRecord) -> FinderResult<String> {
        match self.doc.node(node)?.value() {
            DomNode::Text(text) => Ok(text.clone()),
            other => Err(FinderError::Desync {
                ordinal: record.ordinal(),
                message: format!("portion node {node:?} is not text: {other:?}"),
            }),
        }
    }

    /// Insert a synthetic text node before `anchor` unless `text` is empty.
    fn insert_text_before(&mut self, anchor: NodeId, text: &str) -> FinderResult<Option<NodeId>> {
        if text.is_empty() {
            return Ok(None);
        }
        let id = self.doc.orphan(DomNode::Text(text.to_string()));
        self.doc.insert_before(anchor, id)?;
        Ok(Some(id))
    }
}

/// Feed one text node into the state machine.
fn advance(
    state: SurgeonState,
    record: &MatchRecord,
    node: NodeId,
    text: &str,
    offset: usize,
) -> FinderResult<SurgeonState> {
    let node_end = offset + text.len();
    let match_start = record.start_index();
    let match_end = record.end_index();

    match state {
        SurgeonState::SeekingStart => {
            if node_end <= match_start {
                return Ok(SurgeonState::SeekingStart);
            }
            if offset > match_start {
                return Err(FinderError::Desync {
                    ordinal: record.ordinal(),
                    message: format!("text node at {offset} lies past match start {match_start}"),
                });
            }

            let position_in_node = match_start - offset;
            if match_end <= node_end {
                let end_position_in_node = match_end - offset;
                let portion = Portion {
                    node,
                    index: 0,
                    text: slice(text, position_in_node..end_position_in_node, record)?.to_string(),
                    position_in_match: 0,
                    position_in_node,
                    end_position_in_node,
                    is_terminal: true,
                };
                Ok(SurgeonState::FoundEnd(ResolvedMatch::Single(portion)))
            } else {
                let start = Portion {
                    node,
                    index: 0,
                    text: slice(text, position_in_node.., record)?.to_string(),
                    position_in_match: 0,
                    position_in_node,
                    end_position_in_node: text.len(),
                    is_terminal: false,
                };
                Ok(SurgeonState::AccumulatingInterior {
                    start,
                    interior: Vec::new(),
                })
            }
        }
        SurgeonState::AccumulatingInterior { start, mut interior } => {
            let position_in_match = offset - match_start;
            let index = interior.len() + 1;
            if match_end <= node_end {
                let end_position_in_node = match_end - offset;
                let end = Portion {
                    node,
                    index,
                    text: slice(text, ..end_position_in_node, record)?.to_string(),
                    position_in_match,
                    position_in_node: 0,
                    end_position_in_node,
                    is_terminal: true,
                };
                Ok(SurgeonState::FoundEnd(ResolvedMatch::Spanning {
                    start,
                    interior,
                    end,
                }))
            } else {
                interior.push(Portion {
                    node,
                    index,
                    text: text.to_string(),
                    position_in_match,
                    position_in_node: 0,
                    end_position_in_node: text.len(),
                    is_terminal: false,
                });
                Ok(SurgeonState::AccumulatingInterior { start, interior })
            }
        }
        SurgeonState::FoundEnd(_) => Err(FinderError::Desync {
            ordinal: record.ordinal(),
            message: "surgery still pending for the previous text node".to_string(),
        }),
    }
}

fn slice<'t, R>(text: &'t str, range: R, record: &MatchRecord) -> FinderResult<&'t str>
where
    R: std::slice::SliceIndex<str, Output = str> + std::fmt::Debug + Clone,
{
    text.get(range.clone()).ok_or_else(|| FinderError::Desync {
        ordinal: record.ordinal(),
        message: format!("range {range:?} does not fall on character boundaries of {text:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ego_tree::Tree;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut tree = Tree::new(DomNode::Document);
        (0..n)
            .map(|_| tree.root_mut().append(DomNode::Document).id())
            .collect()
    }

    fn record(start: usize, end: usize) -> MatchRecord {
        MatchRecord::new(0, start, end, vec![Some("x".repeat(end - start))])
    }

    #[test]
    fn test_single_node_match_resolves_immediately() {
        let nodes = ids(1);
        let state = advance(SurgeonState::SeekingStart, &record(2, 4), nodes[0], "abcdef", 0)
            .expect("advance");
        let SurgeonState::FoundEnd(ResolvedMatch::Single(portion)) = state else {
            panic!("expected a single-node match");
        };
        assert_eq!(portion.text, "cd");
        assert_eq!((portion.position_in_node, portion.end_position_in_node), (2, 4));
        assert!(portion.is_terminal);
    }

    #[test]
    fn test_spanning_match_walks_through_states() {
        let nodes = ids(4);
        let m = record(2, 10);
        let state = advance(SurgeonState::SeekingStart, &m, nodes[0], "x", 0).expect("advance");
        assert!(matches!(state, SurgeonState::SeekingStart));

        let state = advance(state, &m, nodes[1], "abc", 1).expect("advance");
        assert!(matches!(state, SurgeonState::AccumulatingInterior { .. }));

        let state = advance(state, &m, nodes[2], "defg", 4).expect("advance");
        let state = advance(state, &m, nodes[3], "hijk", 8).expect("advance");
        let SurgeonState::FoundEnd(ResolvedMatch::Spanning { start, interior, end }) = state else {
            panic!("expected a spanning match");
        };
        assert_eq!(start.text, "bc");
        assert_eq!(start.position_in_node, 1);
        assert_eq!(interior.len(), 1);
        assert_eq!(interior[0].text, "defg");
        assert_eq!(interior[0].position_in_match, 2);
        assert_eq!(end.text, "hi");
        assert_eq!(end.position_in_match, 6);
        assert_eq!(end.index, 2);
        assert!(end.is_terminal);
    }

    #[test]
    fn test_match_ending_on_node_boundary() {
        let nodes = ids(2);
        let m = record(1, 3);
        let state = advance(SurgeonState::SeekingStart, &m, nodes[0], "ab", 0).expect("advance");
        let state = advance(state, &m, nodes[1], "c", 2).expect("advance");
        let SurgeonState::FoundEnd(ResolvedMatch::Spanning { end, .. }) = state else {
            panic!("expected a spanning match");
        };
        assert_eq!(end.text, "c");
        assert_eq!(end.end_position_in_node, 1);
    }

    #[test]
    fn test_match_past_aggregated_text_is_rejected() {
        let mut doc = Document::parse_fragment("<p>abc</p>");
        let before = doc.clone();
        let root = doc.root();
        let options = FinderOptions::builder()
            .find("abc")
            .wrap("span")
            .build()
            .expect("options");
        let mut log = RevertLog::default();

        let out_of_bounds = MatchRecord::new(0, 5, 9, vec![Some("wxyz".to_string())]);
        let err = Surgeon::new(&mut doc, root, &options, "abc", &mut log)
            .run(&[out_of_bounds])
            .expect_err("match lies outside the text");

        assert!(matches!(
            err,
            FinderError::MatchOutOfBounds {
                ordinal: 0,
                start: 5,
                end: 9,
                len: 3
            }
        ));
        assert!(err.is_contract_violation());
        assert!(log.is_empty());
        assert!(doc.structurally_eq(doc.root(), &before, before.root()));
    }

    #[test]
    fn test_start_skipped_is_a_desync() {
        let nodes = ids(1);
        let err = advance(SurgeonState::SeekingStart, &record(1, 2), nodes[0], "abc", 2)
            .expect_err("start lies before this node");
        assert!(err.is_contract_violation());
    }
}
