//! Static marker grammar.
//!
//! Every marker kind is recognised by one of these expressions. The `regex`
//! crate has no look-around, so rules that need it (unknown brace prefixes)
//! are handled by hand in the scanners.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use crate::models::Direction;
use regex::Regex;
use std::sync::LazyLock;

/// `{state:label}`
pub static SIMPLE_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{state:([a-zA-Z_]+)\}").expect("static regex: simple state")
});

/// `{state:intensity|a[0.5]|b[1]|}`
pub static INTENSITY_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{state:intensity\|((?:[a-zA-Z_]+\[\d+\.?\d*\]\|)*)\}")
        .expect("static regex: intensity state")
});

/// `{state:weighted[:shorthand]|a[0.6]|b|}`
pub static WEIGHTED_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{state:weighted(?::([a-zA-Z_]+))?\|((?:[a-zA-Z_]+(?:\[\d+\.?\d*\])?\|)*)\}")
        .expect("static regex: weighted state")
});

/// `{state:random!a[0.5]!b[0.5]!}`
pub static RANDOM_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{state:random!((?:[a-zA-Z_]+\[\d+\.?\d*\]!)*)\}")
        .expect("static regex: random state")
});

/// A label with a required bracketed number.
pub static MEASURED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z_]+)\[(\d+\.?\d*)\]").expect("static regex: measured value")
});

/// A label with an optional bracketed weight.
pub static WEIGHTED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z_]+)(?:\[(\d+\.?\d*)\])?").expect("static regex: weighted value")
});

/// Empty, whitespace-led or unterminated state markers.
pub static MALFORMED_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{state:\s*\}|\{state:\s+[^}]*\}|\{state:[^}]*$")
        .expect("static regex: malformed state")
});

/// A state marker containing another brace group.
pub static NESTED_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{state:[^}]*\{[^}]*\}[^}]*\}").expect("static regex: nested state")
});

/// Body of a nested weighted marker, used for the degraded re-parse.
pub static NESTED_WEIGHTED_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{state:weighted\|(.+)\}").expect("static regex: nested weighted body")
});

/// Any brace group, replaced by a placeholder label during the degraded re-parse.
pub static BRACE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("static regex: brace group"));

/// `[context:label]`
pub static CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[context:([a-zA-Z_]+)\]").expect("static regex: context")
});

/// Empty, whitespace-led or unterminated context markers.
pub static MALFORMED_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[context:\s*\]|\[context:\s+[^\]]*\]|\[context:[^\]]*$")
        .expect("static regex: malformed context")
});

/// Brace prefixes that open a known marker.
pub const KNOWN_BRACE_PREFIXES: [&str; 5] =
    ["state:", "branch:", "branch_end:", "social:", "source:"];

/// `&pattern:category|flow|`
pub static DYNAMIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&pattern:([a-zA-Z_]+)\|([a-zA-Z_]+)\|").expect("static regex: dynamic pattern")
});

/// `&status:category|`
pub static STATUS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&status:([a-zA-Z_]+)\|").expect("static regex: status pattern")
});

/// `{branch:id|label}`
pub static BRANCH_INIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{branch:([a-zA-Z0-9_]+)(?:\|([^}]+))?\}").expect("static regex: branch init")
});

/// `→merge{branch:id}`
pub static BRANCH_MERGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"→merge\{branch:([a-zA-Z0-9_]+)\}").expect("static regex: branch merge")
});

/// `{branch_end:id}`
pub static BRANCH_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{branch_end:([a-zA-Z0-9_]+)\}").expect("static regex: branch end")
});

/// `{social:level}[mask:name]`
pub static SOCIAL_LAYER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{social:([a-zA-Z_]+)\}(?:\[mask:([a-zA-Z_]+)\])?")
        .expect("static regex: social layer")
});

/// Intensified operators, scanned first.
pub const ENHANCED_OPERATORS: [(&str, Direction); 6] = [
    ("⇉", Direction::Forward),
    ("⇇", Direction::Backward),
    ("⇋", Direction::Bidirectional),
    ("↔↔", Direction::Bidirectional),
    ("→→", Direction::Forward),
    ("←←", Direction::Backward),
];

/// Single-glyph operators, discarded inside claimed ranges.
pub const BASIC_OPERATORS: [(&str, Direction); 5] = [
    ("⇄", Direction::Cascade),
    ("↠", Direction::Transition),
    ("↔", Direction::Bidirectional),
    ("→", Direction::Forward),
    ("←", Direction::Backward),
];
