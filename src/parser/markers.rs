//! Scans for context, pattern, directional, branch and social markers.

use super::patterns::{
    BASIC_OPERATORS, BRANCH_END, BRANCH_INIT, BRANCH_MERGE, CONTEXT, DYNAMIC_PATTERN,
    ENHANCED_OPERATORS, KNOWN_BRACE_PREFIXES, MALFORMED_CONTEXT, SOCIAL_LAYER, STATUS_PATTERN,
};
use super::ranges::ClaimedRanges;
use crate::models::{
    BranchKind, BranchMarker, ContextMarker, DirectionalOperator, ParseError, PatternKind,
    PatternMarker, SocialLayer, Span,
};

/// Extracts context markers and flags unknown brace markers and malformed
/// context markers.
pub fn scan_contexts(text: &str, errors: &mut Vec<ParseError>) -> Vec<ContextMarker> {
    let contexts = CONTEXT
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ContextMarker {
                value: caps[1].to_string(),
                span: Span::new(whole.start(), whole.end()),
                raw: whole.as_str().to_string(),
            })
        })
        .collect();

    for span in unknown_brace_markers(text) {
        errors.push(ParseError::syntax("Invalid marker syntax", span));
    }

    for m in MALFORMED_CONTEXT.find_iter(text) {
        errors.push(ParseError::syntax(
            "Malformed context marker",
            Span::new(m.start(), m.end()),
        ));
    }

    contexts
}

/// Finds `{...}` groups whose prefix opens no known marker.
///
/// Matches are non-overlapping: after a hit the scan resumes past its
/// closing brace.
fn unknown_brace_markers(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('{') {
        let open = cursor + offset;
        let rest = &text[open + 1..];
        if KNOWN_BRACE_PREFIXES.iter().any(|p| rest.starts_with(p)) {
            cursor = open + 1;
            continue;
        }
        let Some(close) = rest.find('}') else {
            break;
        };
        let end = open + 1 + close + 1;
        spans.push(Span::new(open, end));
        cursor = end;
    }

    spans
}

/// Extracts dynamic pattern and static status markers, sorted by start.
pub fn scan_patterns(text: &str) -> Vec<PatternMarker> {
    let mut patterns: Vec<PatternMarker> = DYNAMIC_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(PatternMarker {
                kind: PatternKind::Pattern,
                category: caps[1].to_string(),
                flow: Some(caps[2].to_string()),
                span: Span::new(whole.start(), whole.end()),
                raw: whole.as_str().to_string(),
            })
        })
        .collect();

    patterns.extend(STATUS_PATTERN.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(PatternMarker {
            kind: PatternKind::Status,
            category: caps[1].to_string(),
            flow: None,
            span: Span::new(whole.start(), whole.end()),
            raw: whole.as_str().to_string(),
        })
    }));

    patterns.sort_by_key(|p| p.span.start);
    patterns
}

/// Returns the byte ranges of every `→merge{branch:id}` token.
pub fn merge_ranges(text: &str) -> ClaimedRanges {
    BRANCH_MERGE
        .find_iter(text)
        .map(|m| Span::new(m.start(), m.end()))
        .collect()
}

/// Extracts directional operators, sorted by start.
///
/// Enhanced operators claim their ranges first; a basic glyph starting inside
/// a claimed range or inside a branch merge token is not emitted.
pub fn scan_directionals(text: &str, merges: &ClaimedRanges) -> Vec<DirectionalOperator> {
    let mut directionals = Vec::new();
    let mut claimed = ClaimedRanges::new();

    for (glyph, direction) in ENHANCED_OPERATORS {
        for (start, raw) in text.match_indices(glyph) {
            let span = Span::new(start, start + raw.len());
            claimed.claim(span);
            directionals.push(DirectionalOperator {
                direction,
                enhanced: true,
                span,
                raw: raw.to_string(),
            });
        }
    }

    for (glyph, direction) in BASIC_OPERATORS {
        for (start, raw) in text.match_indices(glyph) {
            if claimed.contains(start) || merges.contains(start) {
                continue;
            }
            directionals.push(DirectionalOperator {
                direction,
                enhanced: false,
                span: Span::new(start, start + raw.len()),
                raw: raw.to_string(),
            });
        }
    }

    directionals.sort_by_key(|d| d.span.start);
    directionals
}

/// Extracts branch markers, sorted by start.
///
/// Init markers starting inside a merge token belong to the merge and are
/// skipped.
pub fn scan_branches(text: &str, merges: &ClaimedRanges) -> Vec<BranchMarker> {
    let mut branches: Vec<BranchMarker> = BRANCH_MERGE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(BranchMarker {
                kind: BranchKind::Merge,
                id: caps[1].to_string(),
                span: Span::new(whole.start(), whole.end()),
                raw: whole.as_str().to_string(),
            })
        })
        .collect();

    for caps in BRANCH_INIT.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if merges.contains(whole.start()) {
            continue;
        }
        branches.push(BranchMarker {
            kind: BranchKind::Init {
                label: caps.get(2).map(|l| l.as_str().to_string()),
            },
            id: caps[1].to_string(),
            span: Span::new(whole.start(), whole.end()),
            raw: whole.as_str().to_string(),
        });
    }

    branches.extend(BRANCH_END.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(BranchMarker {
            kind: BranchKind::End,
            id: caps[1].to_string(),
            span: Span::new(whole.start(), whole.end()),
            raw: whole.as_str().to_string(),
        })
    }));

    branches.sort_by_key(|b| b.span.start);
    branches
}

/// Extracts social layer markers with their optional mask.
pub fn scan_social_layers(text: &str) -> Vec<SocialLayer> {
    SOCIAL_LAYER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(SocialLayer {
                level: caps[1].to_string(),
                mask: caps.get(2).map(|m| m.as_str().to_string()),
                span: Span::new(whole.start(), whole.end()),
                raw: whole.as_str().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    #[test]
    fn test_unknown_brace_markers_skip_known_prefixes() {
        let text = "{state:x} {invalid} {source:direct} {oops";
        let spans = unknown_brace_markers(text);
        assert_eq!(spans, vec![Span::new(10, 19)]);
    }

    #[test]
    fn test_unknown_brace_scan_resumes_after_match() {
        let spans = unknown_brace_markers("{a{b} {c}");
        assert_eq!(spans, vec![Span::new(0, 5), Span::new(6, 9)]);
    }

    #[test]
    fn test_merge_glyph_is_not_a_directional() {
        let text = "→merge{branch:1} then → next";
        let merges = merge_ranges(text);
        let directionals = scan_directionals(text, &merges);
        assert_eq!(directionals.len(), 1);
        assert_eq!(directionals[0].direction, Direction::Forward);
        assert!(!directionals[0].enhanced);
    }

    #[test]
    fn test_enhanced_operator_claims_its_glyphs() {
        let directionals = scan_directionals("a →→ b ↔↔ c", &ClaimedRanges::new());
        assert_eq!(directionals.len(), 2);
        assert!(directionals.iter().all(|d| d.enhanced));
        assert_eq!(directionals[1].direction, Direction::Bidirectional);
    }

    #[test]
    fn test_branch_init_inside_merge_is_skipped() {
        let text = "{branch:alt|Try it} →merge{branch:alt} {branch_end:alt}";
        let merges = merge_ranges(text);
        let branches = scan_branches(text, &merges);
        let kinds: Vec<_> = branches.iter().map(|b| b.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                BranchKind::Init {
                    label: Some("Try it".to_string())
                },
                BranchKind::Merge,
                BranchKind::End,
            ]
        );
    }

    #[test]
    fn test_status_marker_has_no_flow() {
        let patterns = scan_patterns("Currently &status:processing|");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::Status);
        assert_eq!(patterns[0].flow, None);
        assert_eq!(patterns[0].span, Span::new(10, 29));
    }
}
