//! Core option types for find-and-replace runs
//!
//! `FinderOptions` is produced by `FinderOptionsBuilder::build`, which has already
//! applied presets and validated the wrapper, so a run never starts with a bad config.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::dom::{ElementData, NodeTemplate};
use crate::finder::{MatchRecord, Portion};

/// Predicate over elements, used for both the element filter and forced contexts.
pub type ElementPredicate = Arc<dyn Fn(&ElementData) -> bool + Send + Sync>;

/// Callback producing the replacement for one portion of one match.
pub type ReplaceFn = Arc<dyn Fn(&Portion, &MatchRecord) -> ReplacementValue + Send + Sync>;

/// What to search for.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Literal text, matched everywhere it occurs.
    Literal(String),
    /// A compiled expression. With `global` unset only the first match is used.
    Regex { regex: Regex, global: bool },
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Compile `pattern` as a global expression.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Pattern::Regex {
            regex: Regex::new(pattern)?,
            global: true,
        })
    }

    /// Compile `pattern` so that only its first match is used.
    pub fn regex_first(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Pattern::Regex {
            regex: Regex::new(pattern)?,
            global: false,
        })
    }

    /// Expression and global flag the matcher runs with. Literals are escaped.
    pub fn compile(&self) -> Result<CompiledPattern, regex::Error> {
        Ok(match self {
            Pattern::Literal(text) => CompiledPattern {
                regex: Regex::new(&regex::escape(text))?,
                global: true,
            },
            Pattern::Regex { regex, global } => CompiledPattern {
                regex: regex.clone(),
                global: *global,
            },
        })
    }
}

/// A pattern ready for matching, built once when options are built.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub global: bool,
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Pattern::Literal(text.to_string())
    }
}

impl From<String> for Pattern {
    fn from(text: String) -> Self {
        Pattern::Literal(text)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern::Regex { regex, global: true }
    }
}

/// Value returned by a replacement callback.
#[derive(Debug, Clone)]
pub enum ReplacementValue {
    /// Inserted as a text node.
    Text(String),
    /// Deep-copied into the document as-is.
    Node(NodeTemplate),
}

impl From<String> for ReplacementValue {
    fn from(text: String) -> Self {
        ReplacementValue::Text(text)
    }
}

impl From<&str> for ReplacementValue {
    fn from(text: &str) -> Self {
        ReplacementValue::Text(text.to_string())
    }
}

impl From<NodeTemplate> for ReplacementValue {
    fn from(template: NodeTemplate) -> Self {
        ReplacementValue::Node(template)
    }
}

/// How matched text is rendered.
#[derive(Clone)]
pub enum Replacement {
    /// Template string supporting `$&`, `` $` ``, `$'` and `$N`.
    Template(String),
    /// Callback invoked once per portion. Its result is not wrapped.
    Function(ReplaceFn),
}

impl Default for Replacement {
    fn default() -> Self {
        Replacement::Template("$&".to_string())
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Replacement::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Element placed around each rendered portion.
#[derive(Debug, Clone)]
pub enum Wrap {
    /// Create a fresh element with this tag name.
    Tag(String),
    /// Deep-copy this template.
    Template(NodeTemplate),
}

/// How a replacement is spread over a match that spans several text nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortionMode {
    /// Every portion receives its slice of the rendered replacement.
    #[default]
    Retain,
    /// The first portion receives the whole replacement, later portions render empty.
    First,
}

/// Which elements force a context boundary.
#[derive(Clone, Default)]
pub enum ForceContext {
    #[default]
    Off,
    /// Every element is a boundary.
    All,
    Predicate(ElementPredicate),
}

impl ForceContext {
    #[must_use]
    pub fn applies(&self, element: &ElementData) -> bool {
        match self {
            ForceContext::Off => false,
            ForceContext::All => true,
            ForceContext::Predicate(predicate) => predicate(element),
        }
    }
}

impl fmt::Debug for ForceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceContext::Off => f.write_str("Off"),
            ForceContext::All => f.write_str("All"),
            ForceContext::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<bool> for ForceContext {
    fn from(enabled: bool) -> Self {
        if enabled { ForceContext::All } else { ForceContext::Off }
    }
}

/// Option bundles. A preset only fills options the caller left unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Skip non-prose elements and treat block-level elements as boundaries.
    Prose,
}

/// Validated options for one `Finder::run`.
#[derive(Clone)]
pub struct FinderOptions {
    pub(crate) pattern: Pattern,
    pub(crate) compiled: CompiledPattern,
    pub(crate) replace: Replacement,
    pub(crate) wrap: Option<Wrap>,
    pub(crate) wrap_class: Option<String>,
    pub(crate) portion_mode: PortionMode,
    pub(crate) filter_elements: Option<ElementPredicate>,
    pub(crate) force_context: ForceContext,
}

impl fmt::Debug for FinderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderOptions")
            .field("pattern", &self.pattern)
            .field("replace", &self.replace)
            .field("wrap", &self.wrap)
            .field("wrap_class", &self.wrap_class)
            .field("portion_mode", &self.portion_mode)
            .field("filter_elements", &self.filter_elements.as_ref().map(|_| ".."))
            .field("force_context", &self.force_context)
            .finish()
    }
}
