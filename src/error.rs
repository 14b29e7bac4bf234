//! Error types for find-and-replace runs
//!
//! Configuration problems surface from `FinderOptions::builder().build()` or from
//! `Finder::run` before any traversal starts. Contract violations (the matcher and the
//! surgeon disagreeing about the text) surface mid-run and leave earlier surgery in place.

use ego_tree::NodeId;
use thiserror::Error;

/// Result type alias for finder operations
pub type FinderResult<T> = Result<T, FinderError>;

/// Error types for finder operations
#[derive(Debug, Error)]
pub enum FinderError {
    /// The pattern matched an empty string
    #[error("Pattern matched an empty string at offset {offset}; zero-length matches cannot be mapped onto text nodes")]
    ZeroLengthMatch { offset: usize },

    /// A match span lies outside the aggregated text
    #[error("Match {ordinal} spans {start}..{end} but the aggregated text is only {len} bytes long")]
    MatchOutOfBounds {
        ordinal: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    /// The surgeon walked past a match start it should have seen
    #[error("Text walk out of sync with match {ordinal}: {message}")]
    Desync { ordinal: usize, message: String },

    /// The run root cannot hold matches
    #[error("Invalid root node: {0}")]
    InvalidRoot(String),

    /// A handle does not belong to the document
    #[error("Node {0:?} does not belong to this document")]
    UnknownNode(NodeId),

    /// The wrapper element is unusable
    #[error("Malformed wrapper: {0}")]
    MalformedWrap(String),

    /// A node template did not have exactly one root element
    #[error("Malformed node template: {0}")]
    MalformedTemplate(String),

    /// The pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl FinderError {
    /// True for errors that signal an internal aggregator/matcher/surgeon disagreement
    /// rather than a bad configuration.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            FinderError::MatchOutOfBounds { .. } | FinderError::Desync { .. }
        )
    }
}
