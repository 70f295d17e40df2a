//! Anchor vocabulary and natural-language pattern library.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::AnchorType;
use regex::Regex;
use std::sync::LazyLock;

/// Marker labels that signal an anchor, with their base confidence.
///
/// State labels come first, pattern categories second. Lookups are
/// case-insensitive.
pub const MARKER_VOCABULARY: [(&str, AnchorType, f64); 22] = [
    ("decisive", AnchorType::Decision, 0.95),
    ("decided", AnchorType::Decision, 0.95),
    ("choosing", AnchorType::Decision, 0.85),
    ("blocked", AnchorType::Blocker, 0.95),
    ("stuck", AnchorType::Blocker, 0.95),
    ("waiting", AnchorType::Blocker, 0.85),
    ("eureka", AnchorType::Breakthrough, 0.98),
    ("breakthrough", AnchorType::Breakthrough, 0.95),
    ("solved", AnchorType::Breakthrough, 0.9),
    ("questioning", AnchorType::Question, 0.9),
    ("curious", AnchorType::Question, 0.85),
    ("uncertain", AnchorType::Question, 0.8),
    ("decision", AnchorType::Decision, 0.9),
    ("choice", AnchorType::Decision, 0.9),
    ("selection", AnchorType::Decision, 0.85),
    ("development", AnchorType::Blocker, 0.85),
    ("impediment", AnchorType::Blocker, 0.9),
    ("obstacle", AnchorType::Blocker, 0.9),
    ("solution", AnchorType::Breakthrough, 0.9),
    ("resolution", AnchorType::Breakthrough, 0.85),
    ("inquiry", AnchorType::Question, 0.85),
    ("exploration", AnchorType::Question, 0.8),
];

/// Looks up a marker label in [`MARKER_VOCABULARY`].
#[must_use]
pub fn marker_signal(label: &str) -> Option<(AnchorType, f64)> {
    let normalized = label.to_lowercase();
    MARKER_VOCABULARY
        .iter()
        .find(|(word, _, _)| *word == normalized)
        .map(|(_, anchor_type, confidence)| (*anchor_type, *confidence))
}

/// A group of expressions that detect one anchor type.
#[derive(Debug)]
pub struct AnchorPattern {
    /// Anchor type produced.
    pub anchor_type: AnchorType,
    /// Confidence before boosts.
    pub base_confidence: f64,
    /// Whether to look for a causal connective after the match.
    pub extract_rationale: bool,
    /// Expressions; capture group 1 is the anchor text and span.
    pub expressions: Vec<Regex>,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex: anchor pattern")
}

/// The pattern library, scanned in order. Questions come first so that
/// question phrasing is claimed before the decision patterns see it.
pub static ANCHOR_PATTERNS: LazyLock<Vec<AnchorPattern>> = LazyLock::new(|| {
    vec![
        AnchorPattern {
            anchor_type: AnchorType::Question,
            base_confidence: 0.7,
            extract_rationale: false,
            expressions: vec![
                compile(r"(?i)\b((should|could|would|can|will)\s+(?:we|i|the team)\s+(.+?))\?"),
                compile(r"(?i)\b((what|how|why|when|where|which)\s+(.+?))\?"),
                compile(
                    r"(?i)\b(the (?:main |key )?question\s+(?:is|remains)\s*(whether|if|how)?\s*(.+?))(?:\.|$)",
                ),
                compile(
                    r"(?i)\b((wondering|considering|thinking about)\s+(?:whether|if|how)\s+(.+?))(?:\.|$)",
                ),
            ],
        },
        AnchorPattern {
            anchor_type: AnchorType::Decision,
            base_confidence: 0.8,
            extract_rationale: true,
            expressions: vec![
                compile(
                    r"(?i)\b((we |i |the team )?(decided|chose|selected|opted|will go with|going with|agreed)\s+(?:to\s+)?([^\n.]+))",
                ),
                compile(r"(?i)\b((decision|choice|selection):\s*(.+?))(?:\.|$)"),
                compile(
                    r"(?i)\b((after\s+(?:discussion|consideration|analysis|reviewing))[,\s]+(.+?)\s+(was chosen|was selected|is the choice))(?:\.|$)",
                ),
                compile(r"(?i)\b((conclusion|final(?:ly)?|ultimately)[:\s]+(.+?))(?:\.|$)"),
                compile(
                    r"(?i)\b((?:i think |probably )?(?:we should|we will|should)\s+(?:probably\s+)?([^.\n]+))",
                ),
                compile(
                    r"(?i)\b((.+?)\s+(?:would be|is|seems|appears to be)\s+(?:ideal|perfect|the best choice|the right choice))(?:\.|\n|\z)",
                ),
            ],
        },
        AnchorPattern {
            anchor_type: AnchorType::Blocker,
            base_confidence: 0.75,
            extract_rationale: false,
            expressions: vec![
                compile(
                    r"(?i)\b((stuck|blocked|cannot proceed|waiting for|preventing progress)\s+(?:on|by|until)?\s*(.+?))(?:\.|$)",
                ),
                compile(r"(?i)\b((blocker|impediment|obstacle):\s*(.+?))(?:\.|$)"),
                compile(
                    r"(?i)\b((the (?:main |primary )?(?:issue|problem|challenge))\s+(?:is|preventing|blocking)\s*(.+?))(?:\.|$)",
                ),
                compile(
                    r"(?i)\b((need(?:s|ed)?|require(?:s|d)?|must have)\s+(.+?)\s+(?:before|to proceed|to continue))",
                ),
            ],
        },
        AnchorPattern {
            anchor_type: AnchorType::Breakthrough,
            base_confidence: 0.8,
            extract_rationale: false,
            expressions: vec![
                compile(
                    r"(?i)\b((found|discovered|realized|solved|fixed)\s+(?:the\s+)?(?:solution|answer|issue|problem)?:?\s*(.+?))(?:\.|$)",
                ),
                compile(r"(?i)\b((breakthrough|eureka|aha moment):\s*(.+?))(?:\.|$)"),
                compile(
                    r"(?i)\b((the (?:solution|fix|answer))\s+(?:is|was|turned out to be)\s*(.+?))(?:\.|$)",
                ),
                compile(r"(?i)\b((resolved|addressed|handled)\s+(?:by|through|with)\s*(.+?))(?:\.|$)"),
            ],
        },
        // Implicit decisions, weaker than the explicit phrasing above.
        AnchorPattern {
            anchor_type: AnchorType::Decision,
            base_confidence: 0.6,
            extract_rationale: true,
            expressions: vec![compile(
                r"(?i)\b((?:i think |probably )?(?:we should|should)\s+(?:probably\s+)?([^.\n]+))",
            )],
        },
    ]
});

/// Causal connective introducing a decision's rationale.
pub static RATIONALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(because|since|due to|as|given that)\s+(.+?)(?:\.|$)")
        .expect("static regex: rationale")
});

/// Directional glyphs that link the anchors on either side.
pub static LINK_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("→|←|↔|↠|⇄").expect("static regex: link glyph"));
