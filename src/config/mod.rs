//! Configuration module for find-and-replace runs
//!
//! This module provides `FinderOptions` and its type-safe builder.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{FinderOptionsBuilder, NoPattern, WithPattern};
pub use types::{
    CompiledPattern, ElementPredicate, FinderOptions, ForceContext, Pattern, PortionMode, Preset,
    ReplaceFn, Replacement, ReplacementValue, Wrap,
};
