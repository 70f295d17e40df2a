//! Post-extraction passes: relationship linking, adjacent merging and final
//! shaping.

use super::patterns::LINK_GLYPH;
use crate::models::{AnchorId, AnchorType, SemanticAnchor, Span};
use std::collections::{HashMap, HashSet};

/// Maximum gap between a question and a following decision that answers it.
pub const ANSWER_DISTANCE: i64 = 200;

/// Maximum gap between two anchors that are merged.
pub const MERGE_DISTANCE: i64 = 50;

/// Boost applied to a breakthrough that follows a decision.
const BREAKTHROUGH_BOOST: f64 = 1.1;

/// Links anchors across directional glyphs, then links question/decision
/// pairs that sit close together.
pub fn link(anchors: &mut [SemanticAnchor], text: &str) {
    for glyph in LINK_GLYPH.find_iter(text) {
        let before = nearest_before(anchors, glyph.start());
        let after = nearest_after(anchors, glyph.end());
        if let (Some(b), Some(a)) = (before, after) {
            if a != b {
                connect(anchors, b, a);
            }
        }
    }

    let mut order: Vec<usize> = (0..anchors.len()).collect();
    order.sort_by_key(|&i| anchors[i].span.start);
    for pair in order.windows(2) {
        let (q, d) = (pair[0], pair[1]);
        if anchors[q].anchor_type == AnchorType::Question
            && anchors[d].anchor_type == AnchorType::Decision
            && gap(anchors[q].span, anchors[d].span) < ANSWER_DISTANCE
        {
            answer(anchors, q, d);
        }
    }
}

fn connect(anchors: &mut [SemanticAnchor], before: usize, after: usize) {
    let before_id = anchors[before].id.clone();
    let before_type = anchors[before].anchor_type;

    let target = &mut anchors[after];
    if !target.related_to.contains(&before_id) {
        target.related_to.push(before_id);
    }

    match (before_type, target.anchor_type) {
        (AnchorType::Decision, AnchorType::Breakthrough) => {
            target.confidence = (target.confidence * BREAKTHROUGH_BOOST).min(1.0);
        },
        (AnchorType::Question, AnchorType::Decision) => answer(anchors, before, after),
        _ => {},
    }
}

fn answer(anchors: &mut [SemanticAnchor], question: usize, decision: usize) {
    anchors[decision].answers_question = Some(anchors[question].id.clone());
    anchors[question].requires_answer = Some(false);
}

/// Anchor with the greatest end at or before `offset`.
fn nearest_before(anchors: &[SemanticAnchor], offset: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, anchor) in anchors.iter().enumerate() {
        if anchor.span.end <= offset && best.is_none_or(|b| anchor.span.end > anchors[b].span.end)
        {
            best = Some(i);
        }
    }
    best
}

/// Anchor with the smallest start at or after `offset`.
fn nearest_after(anchors: &[SemanticAnchor], offset: usize) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, anchor) in anchors.iter().enumerate() {
        if anchor.span.start >= offset
            && best.is_none_or(|b| anchor.span.start < anchors[b].span.start)
        {
            best = Some(i);
        }
    }
    best
}

/// Signed distance from the end of `first` to the start of `second`.
#[allow(clippy::cast_possible_wrap)]
const fn gap(first: Span, second: Span) -> i64 {
    second.start as i64 - first.end as i64
}

/// Merges neighbouring anchors of the same type.
///
/// Anchors are sorted by start and walked pairwise; a merged pair is not
/// considered again. A pair merges when the gap is below
/// [`MERGE_DISTANCE`] and no `.` lies between them. References to an
/// absorbed anchor are rewritten to the anchor that absorbed it.
pub fn merge_adjacent(mut anchors: Vec<SemanticAnchor>, text: &str) -> Vec<SemanticAnchor> {
    anchors.sort_by_key(|a| a.span.start);

    let mut absorbed: HashMap<AnchorId, AnchorId> = HashMap::new();
    let mut merged = Vec::with_capacity(anchors.len());
    let mut iter = anchors.into_iter().peekable();
    while let Some(current) = iter.next() {
        let mergeable = iter.peek().is_some_and(|next| {
            let between = if current.span.end < next.span.start {
                text.get(current.span.end..next.span.start).unwrap_or("")
            } else {
                ""
            };
            current.anchor_type == next.anchor_type
                && gap(current.span, next.span) < MERGE_DISTANCE
                && !between.contains('.')
        });

        match iter.next_if(|_| mergeable) {
            Some(next) => {
                absorbed.insert(next.id.clone(), current.id.clone());
                merged.push(combine(current, next));
            },
            None => merged.push(current),
        }
    }

    if !absorbed.is_empty() {
        for anchor in &mut merged {
            rewrite_references(anchor, |id| {
                Some(absorbed.get(id).cloned().unwrap_or_else(|| id.clone()))
            });
        }
    }
    merged
}

/// Maps every reference of `anchor` through `resolve`, dropping references
/// that resolve to `None`, to the anchor itself, or to an id already listed.
fn rewrite_references<F>(anchor: &mut SemanticAnchor, resolve: F)
where
    F: Fn(&AnchorId) -> Option<AnchorId>,
{
    let mut related_to: Vec<AnchorId> = Vec::with_capacity(anchor.related_to.len());
    for id in std::mem::take(&mut anchor.related_to) {
        if let Some(id) = resolve(&id) {
            if id != anchor.id && !related_to.contains(&id) {
                related_to.push(id);
            }
        }
    }
    anchor.related_to = related_to;
    anchor.answers_question = anchor
        .answers_question
        .take()
        .and_then(|id| resolve(&id))
        .filter(|id| *id != anchor.id);
}

fn combine(current: SemanticAnchor, next: SemanticAnchor) -> SemanticAnchor {
    let mut related_to = current.related_to;
    for id in next.related_to {
        if !related_to.contains(&id) {
            related_to.push(id);
        }
    }

    let requires_answer = match (current.requires_answer, next.requires_answer) {
        (Some(a), Some(b)) => Some(a && b),
        (a, None) => a,
        (None, b) => b,
    };

    // Overlapping spans already share text; keep the longer rendition.
    let text = if next.span.start < current.span.end {
        if next.text.len() > current.text.len() {
            next.text
        } else {
            current.text
        }
    } else {
        format!("{} {}", current.text, next.text)
    };

    SemanticAnchor {
        id: current.id,
        anchor_type: current.anchor_type,
        text,
        confidence: current.confidence.max(next.confidence),
        span: Span::new(
            current.span.start.min(next.span.start),
            current.span.end.max(next.span.end),
        ),
        rationale: current.rationale.or(next.rationale),
        requires_answer,
        answers_question: current.answers_question.or(next.answers_question),
        related_to,
        marker_context: current.marker_context.or(next.marker_context),
        extraction_method: current.extraction_method,
    }
}

/// Drops anchors below `min_confidence`, keeps the `max_per_type` most
/// confident anchors of each type and re-sorts by position. References to
/// dropped anchors are removed.
pub fn shape(
    anchors: Vec<SemanticAnchor>,
    min_confidence: f64,
    max_per_type: usize,
) -> Vec<SemanticAnchor> {
    let kept: Vec<SemanticAnchor> = anchors
        .into_iter()
        .filter(|a| a.confidence >= min_confidence)
        .collect();

    let mut shaped = Vec::with_capacity(kept.len());
    for anchor_type in AnchorType::ALL {
        let mut group: Vec<SemanticAnchor> = kept
            .iter()
            .filter(|a| a.anchor_type == anchor_type)
            .cloned()
            .collect();
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        group.truncate(max_per_type);
        shaped.extend(group);
    }

    shaped.sort_by_key(|a| a.span.start);

    let kept_ids: HashSet<AnchorId> = shaped.iter().map(|a| a.id.clone()).collect();
    for anchor in &mut shaped {
        rewrite_references(anchor, |id| kept_ids.contains(id).then(|| id.clone()));
    }
    shaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionMethod;

    fn anchor(id: &str, anchor_type: AnchorType, start: usize, end: usize) -> SemanticAnchor {
        SemanticAnchor {
            id: AnchorId::new(id),
            anchor_type,
            text: id.to_string(),
            confidence: 0.8,
            span: Span::new(start, end),
            rationale: None,
            requires_answer: (anchor_type == AnchorType::Question).then_some(true),
            answers_question: None,
            related_to: Vec::new(),
            marker_context: None,
            extraction_method: ExtractionMethod::Pattern,
        }
    }

    #[test]
    fn test_glyph_links_nearest_neighbours() {
        // "aaaa → bbbb"
        let text = "aaaa → bbbb";
        let mut anchors = vec![
            anchor("d", AnchorType::Decision, 0, 4),
            anchor("b", AnchorType::Breakthrough, 8, 12),
        ];
        link(&mut anchors, text);
        assert_eq!(anchors[1].related_to, vec![AnchorId::new("d")]);
        assert!((anchors[1].confidence - 0.88).abs() < 1e-9);
        assert!(anchors[0].related_to.is_empty());
    }

    #[test]
    fn test_boost_is_clamped() {
        let text = "aaaa → bbbb";
        let mut anchors = vec![
            anchor("d", AnchorType::Decision, 0, 4),
            anchor("b", AnchorType::Breakthrough, 8, 12),
        ];
        anchors[1].confidence = 0.95;
        link(&mut anchors, text);
        assert!((anchors[1].confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_close_question_is_answered_without_glyph() {
        let text = "q".repeat(300);
        let mut anchors = vec![
            anchor("d", AnchorType::Decision, 120, 150),
            anchor("q", AnchorType::Question, 0, 100),
        ];
        link(&mut anchors, &text);
        assert_eq!(anchors[0].answers_question, Some(AnchorId::new("q")));
        assert_eq!(anchors[1].requires_answer, Some(false));
    }

    #[test]
    fn test_distant_question_stays_open() {
        let text = "q".repeat(400);
        let mut anchors = vec![
            anchor("q", AnchorType::Question, 0, 10),
            anchor("d", AnchorType::Decision, 250, 260),
        ];
        link(&mut anchors, &text);
        assert_eq!(anchors[0].requires_answer, Some(true));
        assert_eq!(anchors[1].answers_question, None);
    }

    #[test]
    fn test_glyph_answers_distant_question() {
        let text = format!("{}→{}", "q".repeat(100), "d".repeat(200));
        let mut anchors = vec![
            anchor("q", AnchorType::Question, 0, 10),
            anchor("d", AnchorType::Decision, 250, 260),
        ];
        assert!(gap(anchors[0].span, anchors[1].span) >= ANSWER_DISTANCE);

        link(&mut anchors, &text);
        assert_eq!(anchors[1].answers_question, Some(AnchorId::new("q")));
        assert_eq!(anchors[1].related_to, vec![AnchorId::new("q")]);
        assert_eq!(anchors[0].requires_answer, Some(false));
    }

    #[test]
    fn test_question_without_decision_stays_open() {
        let text = format!("{}→{}", "q".repeat(100), "b".repeat(200));
        let mut anchors = vec![
            anchor("q", AnchorType::Question, 0, 10),
            anchor("b", AnchorType::Blocker, 150, 160),
        ];
        link(&mut anchors, &text);
        assert_eq!(anchors[0].requires_answer, Some(true));
        assert_eq!(anchors[1].answers_question, None);
        assert_eq!(anchors[1].related_to, vec![AnchorId::new("q")]);
    }

    #[test]
    fn test_merge_rewrites_references_to_absorbed_anchors() {
        let text = "x".repeat(80);
        let mut b = anchor("b", AnchorType::Decision, 5, 9);
        b.related_to = vec![AnchorId::new("a")];
        let mut c = anchor("c", AnchorType::Breakthrough, 20, 24);
        c.related_to = vec![AnchorId::new("b"), AnchorId::new("a")];
        let mut d = anchor("d", AnchorType::Decision, 60, 64);
        d.answers_question = Some(AnchorId::new("q2"));

        let merged = merge_adjacent(
            vec![
                anchor("a", AnchorType::Decision, 0, 4),
                b,
                c,
                anchor("q1", AnchorType::Question, 30, 34),
                anchor("q2", AnchorType::Question, 35, 39),
                d,
            ],
            &text,
        );

        let ids: Vec<_> = merged.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "q1", "d"]);
        assert!(merged[0].related_to.is_empty());
        assert_eq!(merged[1].related_to, vec![AnchorId::new("a")]);
        assert_eq!(merged[3].answers_question, Some(AnchorId::new("q1")));
    }

    #[test]
    fn test_merge_of_overlapping_spans_keeps_longer_text() {
        let text = "We decided to shard by tenant and region";
        let mut outer = anchor("outer", AnchorType::Decision, 0, 40);
        outer.text = text.to_string();
        let mut inner = anchor("inner", AnchorType::Decision, 0, 29);
        inner.text = "We decided to shard by tenant".to_string();

        let merged = merge_adjacent(vec![inner, outer], text);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, text);
        assert_eq!(merged[0].span, Span::new(0, 40));

        let mut left = anchor("left", AnchorType::Blocker, 0, 20);
        left.text = "stuck on the schema".to_string();
        let mut right = anchor("right", AnchorType::Blocker, 15, 40);
        right.text = "schema migration is blocked".to_string();
        let merged = merge_adjacent(vec![left, right], &"x".repeat(40));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "schema migration is blocked");
        assert_eq!(merged[0].span, Span::new(0, 40));
    }

    #[test]
    fn test_shape_drops_references_to_filtered_anchors() {
        let mut weak = anchor("weak", AnchorType::Question, 0, 10);
        weak.confidence = 0.1;
        let mut d = anchor("d", AnchorType::Decision, 20, 30);
        d.answers_question = Some(AnchorId::new("weak"));
        d.related_to = vec![AnchorId::new("weak")];

        let shaped = shape(vec![weak, d], 0.5, 10);
        assert_eq!(shaped.len(), 1);
        assert!(shaped[0].related_to.is_empty());
        assert_eq!(shaped[0].answers_question, None);
    }

    #[test]
    fn test_merge_respects_sentence_boundary() {
        let text = "aaaa bbbb. cccc";
        let merged = merge_adjacent(
            vec![
                anchor("a", AnchorType::Blocker, 0, 4),
                anchor("b", AnchorType::Blocker, 5, 9),
                anchor("c", AnchorType::Blocker, 11, 15),
            ],
            text,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "a b");
        assert_eq!(merged[0].span, Span::new(0, 9));
        assert_eq!(merged[1].id.as_str(), "c");
    }

    #[test]
    fn test_merge_skips_different_types() {
        let merged = merge_adjacent(
            vec![
                anchor("a", AnchorType::Blocker, 0, 4),
                anchor("b", AnchorType::Decision, 5, 9),
            ],
            "aaaa bbbb",
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_shape_caps_each_type() {
        let mut anchors: Vec<_> = (0..5)
            .map(|i| {
                let mut a = anchor(&format!("q{i}"), AnchorType::Question, i * 10, i * 10 + 5);
                a.confidence = 0.5 + f64::from(u32::try_from(i).unwrap()) * 0.1;
                a
            })
            .collect();
        anchors.push(anchor("low", AnchorType::Decision, 100, 110));
        anchors[5].confidence = 0.2;

        let shaped = shape(anchors, 0.5, 2);
        let ids: Vec<_> = shaped.iter().map(|a| a.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["q3", "q4"]);
    }
}
