pub mod batch;
pub mod config;
pub mod dom;
pub mod error;
pub mod finder;

pub use batch::{HighlightJob, HighlightRule, JobOutcome, RuleOutcome};
pub use config::{
    CompiledPattern, FinderOptions, FinderOptionsBuilder, ForceContext, Pattern, PortionMode,
    Preset, Replacement, ReplacementValue, Wrap,
};
pub use dom::{Document, DomNode, ElementData, NodeTemplate};
pub use error::{FinderError, FinderResult};
pub use finder::{Finder, MatchRecord, Portion, RevertAction, RevertLog, find_and_replace};

// Node handles are ego_tree ids; re-exported so callers need not depend on ego_tree
pub use ego_tree::NodeId;
