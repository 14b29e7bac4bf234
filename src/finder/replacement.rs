//! Rendering of replacement nodes
//!
//! Templates understand `$&` (whole match), `` $` `` (aggregated text before the
//! match), `$'` (aggregated text after the match) and `$N` (capture group N, empty
//! when the group did not participate). Anything else, including `$$`, is literal.

use ego_tree::NodeId;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::{MatchRecord, Portion};
use crate::config::{FinderOptions, PortionMode, Replacement, ReplacementValue, Wrap};
use crate::dom::{Document, DomNode, ElementData};
use crate::error::FinderResult;

static TEMPLATE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\d+|&|`|')").expect("TEMPLATE_TOKEN_RE: hardcoded regex is valid")
});

/// Expand `template` for `record`. `input` is the aggregated text the match came from.
#[must_use]
pub fn expand_template(template: &str, record: &MatchRecord, input: &str) -> String {
    TEMPLATE_TOKEN_RE
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "&" => record.text().to_string(),
            "`" => input.get(..record.start_index()).unwrap_or_default().to_string(),
            "'" => input.get(record.end_index()..).unwrap_or_default().to_string(),
            digits => digits
                .parse::<usize>()
                .ok()
                .and_then(|n| record.group(n))
                .unwrap_or_default()
                .to_string(),
        })
        .into_owned()
}

/// The part of the expanded template that belongs to `portion`.
///
/// In retain mode each portion gets the slice of the replacement lining up with its
/// slice of the match, and the terminal portion takes whatever is left. In first
/// mode the first portion takes everything.
#[must_use]
pub fn portion_text(
    template: &str,
    portion: &Portion,
    record: &MatchRecord,
    input: &str,
    mode: PortionMode,
) -> String {
    if mode == PortionMode::First && portion.position_in_match > 0 {
        return String::new();
    }
    let expanded = expand_template(template, record, input);
    match mode {
        PortionMode::First => expanded,
        PortionMode::Retain if portion.is_terminal => {
            slice_clamped(&expanded, portion.position_in_match, expanded.len()).to_string()
        }
        PortionMode::Retain => slice_clamped(
            &expanded,
            portion.position_in_match,
            portion.position_in_match + portion.text.len(),
        )
        .to_string(),
    }
}

/// Byte slice clamped to the string and floored to char boundaries.
fn slice_clamped(s: &str, start: usize, end: usize) -> &str {
    let start = floor_char_boundary(s, start.min(s.len()));
    let end = floor_char_boundary(s, end.min(s.len())).max(start);
    &s[start..end]
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Build the detached node that stands in for `portion`.
pub(crate) fn build_portion_node(
    doc: &mut Document,
    options: &FinderOptions,
    portion: &Portion,
    record: &MatchRecord,
    input: &str,
) -> FinderResult<NodeId> {
    let template = match options.replacement() {
        Replacement::Function(replace) => {
            return Ok(match replace(portion, record) {
                ReplacementValue::Text(text) => doc.orphan(DomNode::Text(text)),
                ReplacementValue::Node(template) => doc.graft(&template),
            });
        }
        Replacement::Template(template) => template,
    };

    let text = portion_text(template, portion, record, input, options.portion_mode());
    let text_node = doc.orphan(DomNode::Text(text));

    let wrapper = match options.wrap() {
        None => return Ok(text_node),
        Some(Wrap::Tag(tag)) => doc.orphan(DomNode::Element(ElementData::new(tag))),
        Some(Wrap::Template(template)) => doc.graft(template),
    };

    let mut wrapper_mut = doc.node_mut(wrapper)?;
    if let Some(class) = options.wrap_class()
        && let DomNode::Element(element) = wrapper_mut.value()
    {
        element.set_attr("class", class);
    }
    wrapper_mut.append_id(text_node);
    Ok(wrapper)
}
