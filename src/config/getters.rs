//! Getter methods for `FinderOptions`
//!
//! Fields are only set through the builder; runs read them through these accessors.

use super::types::{CompiledPattern, FinderOptions, Pattern, PortionMode, Replacement, Wrap};
use crate::dom::ElementData;

impl FinderOptions {
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The expression compiled by `build()`.
    #[must_use]
    pub fn compiled_pattern(&self) -> &CompiledPattern {
        &self.compiled
    }

    #[must_use]
    pub fn replacement(&self) -> &Replacement {
        &self.replace
    }

    #[must_use]
    pub fn wrap(&self) -> Option<&Wrap> {
        self.wrap.as_ref()
    }

    #[must_use]
    pub fn wrap_class(&self) -> Option<&str> {
        self.wrap_class.as_deref()
    }

    #[must_use]
    pub fn portion_mode(&self) -> PortionMode {
        self.portion_mode
    }

    /// False when the element's subtree must be skipped entirely.
    #[must_use]
    pub fn accepts(&self, element: &ElementData) -> bool {
        self.filter_elements
            .as_ref()
            .is_none_or(|filter| filter(element))
    }

    #[must_use]
    pub fn forces_context(&self, element: &ElementData) -> bool {
        self.force_context.applies(element)
    }

    #[must_use]
    pub fn has_filter(&self) -> bool {
        self.filter_elements.is_some()
    }
}
