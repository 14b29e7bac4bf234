//! Pattern matching over aggregated text.

use super::aggregate::TextAggregation;
use super::MatchRecord;
use crate::config::CompiledPattern;
use crate::error::{FinderError, FinderResult};

/// Find the matches of `pattern` in `aggregation`, ordered by start offset.
///
/// Matches never cross segment boundaries. A global pattern yields every match; a
/// non-global one stops after the first.
///
/// # Errors
///
/// `FinderError::ZeroLengthMatch` if the pattern matches an empty string anywhere.
pub fn search(
    aggregation: &TextAggregation,
    pattern: &CompiledPattern,
) -> FinderResult<Vec<MatchRecord>> {
    let CompiledPattern { regex, global } = pattern;
    let mut matches = Vec::new();

    'segments: for segment in aggregation.segments() {
        for captures in regex.captures_iter(&segment.text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let start = segment.offset + whole.start();
            if whole.is_empty() {
                return Err(FinderError::ZeroLengthMatch { offset: start });
            }

            let groups = captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect();
            let record = MatchRecord::new(matches.len(), start, segment.offset + whole.end(), groups);
            tracing::trace!(
                ordinal = record.ordinal(),
                start = record.start_index(),
                end = record.end_index(),
                "Pattern matched"
            );
            matches.push(record);

            if !*global {
                break 'segments;
            }
        }
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FinderOptions, Pattern, Preset};
    use crate::dom::Document;
    use crate::finder::aggregate::aggregate;

    fn run_search(html: &str, pattern: Pattern, preset: bool) -> FinderResult<Vec<MatchRecord>> {
        let doc = Document::parse_fragment(html);
        let mut builder = FinderOptions::builder().find(pattern);
        if preset {
            builder = builder.preset(Preset::Prose);
        }
        let options = builder.build()?;
        search(&aggregate(&doc, doc.root(), &options), options.compiled_pattern())
    }

    #[test]
    fn test_literal_is_escaped_and_global() {
        let matches = run_search("<div>a.b a.b axb</div>", Pattern::literal("a.b"), false)
            .expect("search");
        let spans: Vec<_> = matches.iter().map(|m| (m.start_index(), m.end_index())).collect();
        assert_eq!(spans, vec![(0, 3), (4, 7)]);
        assert_eq!(matches[1].ordinal(), 1);
    }

    #[test]
    fn test_non_global_stops_at_first() {
        let pattern = Pattern::regex_first("o+").expect("regex");
        let matches = run_search("<p>foo</p><p>boo</p>", pattern, true).expect("search");
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].start_index(), matches[0].end_index()), (1, 3));
    }

    #[test]
    fn test_offsets_continue_across_segments() {
        let pattern = Pattern::regex("o+").expect("regex");
        let matches = run_search("<p>foo</p><p>boo</p>", pattern, true).expect("search");
        let spans: Vec<_> = matches.iter().map(|m| (m.start_index(), m.end_index())).collect();
        assert_eq!(spans, vec![(1, 3), (4, 6)]);
    }

    #[test]
    fn test_captures_are_recorded() {
        let pattern = Pattern::regex("a(b)?(c)").expect("regex");
        let matches = run_search("<div>ac abc</div>", pattern, false).expect("search");
        assert_eq!(matches[0].group(1), None);
        assert_eq!(matches[0].group(2), Some("c"));
        assert_eq!(matches[1].group(1), Some("b"));
        assert_eq!(matches[1].text(), "abc");
    }

    #[test]
    fn test_zero_length_match_is_fatal() {
        let pattern = Pattern::regex("x*").expect("regex");
        let err = run_search("<div>abc</div>", pattern, false).expect_err("empty match");
        assert!(matches!(err, FinderError::ZeroLengthMatch { offset: 0 }));
    }

    #[test]
    fn test_segment_boundaries_block_matches() {
        let matches = run_search("<p>foo</p><p>bar</p>", Pattern::literal("oob"), true)
            .expect("search");
        assert!(matches.is_empty());
        let matches = run_search("<p>foo</p><p>bar</p>", Pattern::literal("oob"), false)
            .expect("search");
        assert_eq!(matches.len(), 1);
    }
}
