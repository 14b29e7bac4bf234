//! Type-safe builder for `FinderOptions` using the typestate pattern
//!
//! A pattern is the only required option, so `build()` only exists once `find` has
//! been called. Wrapper validation happens in `build()`, before any traversal.

use std::sync::Arc;

use super::types::{
    ElementPredicate, FinderOptions, ForceContext, Pattern, PortionMode, Preset, Replacement,
    ReplacementValue, Wrap,
};
use crate::dom::{ElementData, NodeTemplate, is_non_inline_prose, is_prose_element};
use crate::error::{FinderError, FinderResult};
use crate::finder::{MatchRecord, Portion};

// Type states for the builder; the complete state owns the pattern
pub struct NoPattern;
pub struct WithPattern(Pattern);

pub struct FinderOptionsBuilder<State = NoPattern> {
    pub(crate) state: State,
    pub(crate) replace: Option<Replacement>,
    pub(crate) wrap: Option<Wrap>,
    pub(crate) wrap_class: Option<String>,
    pub(crate) portion_mode: Option<PortionMode>,
    pub(crate) filter_elements: Option<ElementPredicate>,
    pub(crate) force_context: Option<ForceContext>,
    pub(crate) preset: Option<Preset>,
}

impl Default for FinderOptionsBuilder<NoPattern> {
    fn default() -> Self {
        Self {
            state: NoPattern,
            replace: None,
            wrap: None,
            wrap_class: None,
            portion_mode: None,
            filter_elements: None,
            force_context: None,
            preset: None,
        }
    }
}

impl FinderOptions {
    /// Start building options. A pattern must be supplied before `build()`.
    #[must_use]
    pub fn builder() -> FinderOptionsBuilder<NoPattern> {
        FinderOptionsBuilder::default()
    }
}

impl<State> FinderOptionsBuilder<State> {
    fn transition<Next>(self, state: Next) -> FinderOptionsBuilder<Next> {
        FinderOptionsBuilder {
            state,
            replace: self.replace,
            wrap: self.wrap,
            wrap_class: self.wrap_class,
            portion_mode: self.portion_mode,
            filter_elements: self.filter_elements,
            force_context: self.force_context,
            preset: self.preset,
        }
    }

    /// Set the pattern to search for.
    #[must_use]
    pub fn find(self, pattern: impl Into<Pattern>) -> FinderOptionsBuilder<WithPattern> {
        self.transition(WithPattern(pattern.into()))
    }

    /// Compile and set a global regular expression.
    pub fn find_regex(self, pattern: &str) -> FinderResult<FinderOptionsBuilder<WithPattern>> {
        Ok(self.find(Pattern::regex(pattern)?))
    }

    /// Replacement template (`$&`, `` $` ``, `$'`, `$N`).
    #[must_use]
    pub fn replace(mut self, template: impl Into<String>) -> Self {
        self.replace = Some(Replacement::Template(template.into()));
        self
    }

    /// Replacement callback, invoked once per portion.
    #[must_use]
    pub fn replace_with<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&Portion, &MatchRecord) -> R + Send + Sync + 'static,
        R: Into<ReplacementValue>,
    {
        self.replace = Some(Replacement::Function(Arc::new(move |portion: &Portion, record: &MatchRecord| {
            f(portion, record).into()
        })));
        self
    }

    /// Wrap each rendered portion in a fresh element with this tag name.
    #[must_use]
    pub fn wrap(mut self, tag: impl Into<String>) -> Self {
        self.wrap = Some(Wrap::Tag(tag.into()));
        self
    }

    /// Wrap each rendered portion in a copy of `template`.
    #[must_use]
    pub fn wrap_template(mut self, template: NodeTemplate) -> Self {
        self.wrap = Some(Wrap::Template(template));
        self
    }

    #[must_use]
    pub fn wrap_class(mut self, class: impl Into<String>) -> Self {
        self.wrap_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn portion_mode(mut self, mode: PortionMode) -> Self {
        self.portion_mode = Some(mode);
        self
    }

    /// Skip the subtree of every element for which `filter` returns false.
    #[must_use]
    pub fn filter_elements<F>(mut self, filter: F) -> Self
    where
        F: Fn(&ElementData) -> bool + Send + Sync + 'static,
    {
        self.filter_elements = Some(Arc::new(filter));
        self
    }

    #[must_use]
    pub fn force_context(mut self, force: impl Into<ForceContext>) -> Self {
        self.force_context = Some(force.into());
        self
    }

    /// Treat every element for which `predicate` returns true as a context boundary.
    #[must_use]
    pub fn force_context_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ElementData) -> bool + Send + Sync + 'static,
    {
        self.force_context = Some(ForceContext::Predicate(Arc::new(predicate)));
        self
    }

    #[must_use]
    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }
}

impl FinderOptionsBuilder<WithPattern> {
    /// Apply the preset, validate the wrapper and produce the options.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::MalformedWrap` for an unusable wrapper tag name and
    /// `FinderError::InvalidPattern` if a literal pattern fails to compile.
    pub fn build(self) -> FinderResult<FinderOptions> {
        let WithPattern(pattern) = self.state;
        let compiled = pattern.compile()?;

        if let Some(Wrap::Tag(tag)) = &self.wrap {
            validate_tag_name(tag)?;
        }

        let mut filter_elements = self.filter_elements;
        let mut force_context = self.force_context;
        if let Some(Preset::Prose) = self.preset {
            if filter_elements.is_none() {
                filter_elements = Some(Arc::new(is_prose_element));
            }
            if force_context.is_none() {
                force_context = Some(ForceContext::Predicate(Arc::new(is_non_inline_prose)));
            }
        }

        Ok(FinderOptions {
            pattern,
            compiled,
            replace: self.replace.unwrap_or_default(),
            wrap: self.wrap,
            wrap_class: self.wrap_class,
            portion_mode: self.portion_mode.unwrap_or_default(),
            filter_elements,
            force_context: force_context.unwrap_or_default(),
        })
    }
}

fn validate_tag_name(tag: &str) -> FinderResult<()> {
    let mut chars = tag.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(FinderError::MalformedWrap(format!(
            "{tag:?} is not a valid element name"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FinderOptions::builder()
            .find("cat")
            .build()
            .expect("options should build");
        assert!(matches!(options.replacement(), Replacement::Template(t) if t == "$&"));
        assert_eq!(options.portion_mode(), PortionMode::Retain);
        assert!(options.wrap().is_none());
        assert!(!options.has_filter());
        assert!(options.accepts(&ElementData::new("script")));
        assert!(!options.forces_context(&ElementData::new("p")));
    }

    #[test]
    fn test_prose_preset_fills_unset_options() {
        let options = FinderOptions::builder()
            .preset(Preset::Prose)
            .find("cat")
            .build()
            .expect("options should build");
        assert!(options.has_filter());
        assert!(!options.accepts(&ElementData::new("script")));
        assert!(options.accepts(&ElementData::new("em")));
        assert!(options.forces_context(&ElementData::new("p")));
        assert!(!options.forces_context(&ElementData::new("span")));
    }

    #[test]
    fn test_preset_does_not_override_explicit_options() {
        let options = FinderOptions::builder()
            .find("cat")
            .filter_elements(|_| true)
            .force_context(false)
            .preset(Preset::Prose)
            .build()
            .expect("options should build");
        assert!(options.accepts(&ElementData::new("script")));
        assert!(!options.forces_context(&ElementData::new("p")));
    }

    #[test]
    fn test_rejects_malformed_wrap_tag() {
        for tag in ["", "1span", "sp an", "<b>"] {
            let err = FinderOptions::builder()
                .find("x")
                .wrap(tag)
                .build()
                .expect_err("tag should be rejected");
            assert!(matches!(err, FinderError::MalformedWrap(_)), "{tag:?}");
        }
    }

    #[test]
    fn test_pattern_is_compiled_once_at_build() {
        let options = FinderOptions::builder()
            .find("a.b")
            .find(Pattern::regex_first("x+").expect("regex"))
            .find("a.b")
            .build()
            .expect("options should build");
        let compiled = options.compiled_pattern();
        assert_eq!(compiled.regex.as_str(), r"a\.b");
        assert!(compiled.global);
        assert!(matches!(options.pattern(), Pattern::Literal(text) if text == "a.b"));
    }

    #[test]
    fn test_find_regex_reports_compile_errors() {
        let result = FinderOptions::builder().find_regex("(unclosed");
        assert!(matches!(result, Err(FinderError::InvalidPattern(_))));
    }
}
