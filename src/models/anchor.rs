//! Semantic anchor types.

use super::marker::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(String);

impl AnchorId {
    /// Creates a new anchor ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AnchorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The kind of event an anchor represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    /// A choice that was made.
    Decision,
    /// Something preventing progress.
    Blocker,
    /// A discovery or solution.
    Breakthrough,
    /// An open question.
    Question,
}

impl AnchorType {
    /// All anchor types.
    pub const ALL: [Self; 4] = [
        Self::Decision,
        Self::Blocker,
        Self::Breakthrough,
        Self::Question,
    ];

    /// Returns the type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Blocker => "blocker",
            Self::Breakthrough => "breakthrough",
            Self::Question => "question",
        }
    }

    /// Parses an anchor type (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "decision" | "decisions" => Some(Self::Decision),
            "blocker" | "blockers" => Some(Self::Blocker),
            "breakthrough" | "breakthroughs" => Some(Self::Breakthrough),
            "question" | "questions" => Some(Self::Question),
            _ => None,
        }
    }
}

impl fmt::Display for AnchorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which channel produced an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// A state or pattern marker label from the vocabulary table.
    Marker,
    /// A natural-language pattern.
    Pattern,
}

/// A detected decision, blocker, breakthrough or question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnchor {
    /// Unique identifier.
    pub id: AnchorId,
    /// Event kind.
    #[serde(rename = "type")]
    pub anchor_type: AnchorType,
    /// Text representing the event.
    pub text: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Location in the source text.
    pub span: Span,
    /// Reason given for a decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Set on questions; cleared once a following decision answers them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_answer: Option<bool>,
    /// The question a decision answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers_question: Option<AnchorId>,
    /// Anchors this one follows from.
    #[serde(default)]
    pub related_to: Vec<AnchorId>,
    /// The marker label that produced or surrounded this anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_context: Option<String>,
    /// Which channel produced the anchor.
    pub extraction_method: ExtractionMethod,
}

impl SemanticAnchor {
    /// Returns true for a question still waiting for an answer.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.requires_answer == Some(true)
    }
}
