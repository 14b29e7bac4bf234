//! Highlight jobs
//!
//! A job is a JSON file listing terms to highlight in one document, with shared
//! defaults and per-rule overrides:
//!
//! ```json
//! {
//!   "root_id": "page-content",
//!   "preset": "prose",
//!   "wrap": "span",
//!   "wrap_class": "hl",
//!   "rules": [
//!     { "find": "Pythagoras" },
//!     { "find": "\\b\\d{4}\\b", "regex": true, "wrap_class": "year" }
//!   ]
//! }
//! ```
//!
//! Every rule is compiled before the first one runs, and a rule that fails while
//! running reverts the rules before it, so a bad rule leaves the document untouched.

use anyhow::{Context, Result, anyhow};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{FinderOptions, Pattern, PortionMode, Preset};
use crate::dom::{Document, NodeTemplate};
use crate::finder::Finder;

/// A batch of highlight rules applied to one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightJob {
    /// `id` attribute of the element to search under. The whole document when unset.
    pub root_id: Option<String>,
    pub preset: Option<Preset>,
    /// Default wrapper tag name.
    pub wrap: Option<String>,
    /// Default wrapper given as an HTML snippet; takes precedence over `wrap`.
    pub wrap_html: Option<String>,
    pub wrap_class: Option<String>,
    pub portion_mode: PortionMode,
    pub rules: Vec<HighlightRule>,
}

/// One term or expression to highlight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightRule {
    pub find: String,
    /// Treat `find` as a regular expression instead of literal text.
    #[serde(default)]
    pub regex: bool,
    /// Replace every occurrence rather than only the first.
    #[serde(default = "default_global")]
    pub global: bool,
    #[serde(default)]
    pub case_insensitive: bool,
    /// Replacement template; `$&` when unset.
    #[serde(default)]
    pub replace: Option<String>,
    #[serde(default)]
    pub wrap: Option<String>,
    #[serde(default)]
    pub wrap_class: Option<String>,
}

fn default_global() -> bool {
    true
}

impl HighlightRule {
    /// A global, case-sensitive literal rule.
    pub fn literal(find: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            regex: false,
            global: true,
            case_insensitive: false,
            replace: None,
            wrap: None,
            wrap_class: None,
        }
    }

    fn pattern(&self) -> Result<Pattern> {
        if !self.regex && !self.case_insensitive && self.global {
            return Ok(Pattern::literal(self.find.clone()));
        }
        let source = if self.regex {
            self.find.clone()
        } else {
            regex::escape(&self.find)
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(self.case_insensitive)
            .build()
            .with_context(|| format!("Invalid pattern {:?}", self.find))?;
        Ok(Pattern::Regex {
            regex,
            global: self.global,
        })
    }

    /// Options for this rule, falling back to the job defaults.
    pub fn options(&self, job: &HighlightJob) -> Result<FinderOptions> {
        let mut builder = FinderOptions::builder()
            .find(self.pattern()?)
            .portion_mode(job.portion_mode);

        if let Some(preset) = job.preset {
            builder = builder.preset(preset);
        }
        if let Some(template) = &self.replace {
            builder = builder.replace(template.clone());
        }

        builder = match (&self.wrap, &job.wrap_html, &job.wrap) {
            (Some(tag), _, _) => builder.wrap(tag.clone()),
            (None, Some(html), _) => builder.wrap_template(
                NodeTemplate::parse(html).with_context(|| format!("Invalid wrap_html {html:?}"))?,
            ),
            (None, None, Some(tag)) => builder.wrap(tag.clone()),
            (None, None, None) => builder,
        };

        if let Some(class) = self.wrap_class.as_ref().or(job.wrap_class.as_ref()) {
            builder = builder.wrap_class(class.clone());
        }

        Ok(builder.build()?)
    }
}

/// Match count of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub find: String,
    pub matches: usize,
}

/// Result of applying a job. Holds the finders so the whole job can be undone.
#[derive(Debug, Default)]
pub struct JobOutcome {
    pub rules: Vec<RuleOutcome>,
    finders: Vec<Finder>,
}

impl JobOutcome {
    #[must_use]
    pub fn total_matches(&self) -> usize {
        self.rules.iter().map(|r| r.matches).sum()
    }

    /// Undo every rule, last rule first.
    pub fn revert_all(&mut self, doc: &mut Document) {
        while let Some(mut finder) = self.finders.pop() {
            finder.revert(doc);
        }
    }
}

impl HighlightJob {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse highlight job")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid job file {}", path.display()))
    }

    /// Apply every rule in order.
    pub fn apply(&self, doc: &mut Document) -> Result<JobOutcome> {
        let root = match &self.root_id {
            Some(id) => doc
                .find_by_id(id)
                .ok_or_else(|| anyhow!("Root element #{id} not found"))?,
            None => doc.root(),
        };

        let compiled = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                rule.options(self)
                    .with_context(|| format!("Rule {i} ({:?}) is invalid", rule.find))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut outcome = JobOutcome::default();
        for (rule, options) in self.rules.iter().zip(&compiled) {
            let finder = match Finder::run(doc, root, options) {
                Ok(finder) => finder,
                Err(err) => {
                    // Undo the rules that already ran so the job stays all-or-nothing
                    outcome.revert_all(doc);
                    return Err(err).with_context(|| format!("Rule {:?} failed", rule.find));
                }
            };
            tracing::info!(
                find = %rule.find,
                matches = finder.matches().len(),
                "Applied highlight rule"
            );
            outcome.rules.push(RuleOutcome {
                find: rule.find.clone(),
                matches: finder.matches().len(),
            });
            outcome.finders.push(finder);
        }
        Ok(outcome)
    }
}
