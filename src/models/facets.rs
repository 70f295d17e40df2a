//! Classification facets scraped from entry text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One dimension of classification metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetDimension {
    /// `[type:x]`
    Type,
    /// `[insight:x]`
    Insight,
    /// `[level:x]`
    Level,
    /// `&pattern:name@status@`
    Pattern,
    /// `{source:x}`
    Source,
    /// `[anchor:x]`
    AnchorRef,
    /// `&resonance:kind@metric@`
    Resonance,
    /// `[temporal:x]`
    Temporal,
}

impl FacetDimension {
    /// All dimensions, in extraction order.
    pub const ALL: [Self; 8] = [
        Self::Type,
        Self::Insight,
        Self::Level,
        Self::Pattern,
        Self::Source,
        Self::AnchorRef,
        Self::Resonance,
        Self::Temporal,
    ];

    /// Returns the dimension as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Insight => "insight",
            Self::Level => "level",
            Self::Pattern => "pattern",
            Self::Source => "source",
            Self::AnchorRef => "anchor",
            Self::Resonance => "resonance",
            Self::Temporal => "temporal",
        }
    }
}

impl fmt::Display for FacetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// De-duplicated facet values per dimension, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationFacets {
    /// Content types (observation, analysis, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    /// Insight kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
    /// Depth levels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<String>,
    /// Patterns as `name` or `name@status`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    /// Information sources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// References to anchors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchor_refs: Vec<String>,
    /// Resonance as `kind` or `kind@metric`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resonance: Vec<String>,
    /// Temporal orientation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub temporal: Vec<String>,
}

impl ClassificationFacets {
    /// Returns the values recorded for one dimension.
    #[must_use]
    pub fn values(&self, dimension: FacetDimension) -> &[String] {
        match dimension {
            FacetDimension::Type => &self.types,
            FacetDimension::Insight => &self.insights,
            FacetDimension::Level => &self.levels,
            FacetDimension::Pattern => &self.patterns,
            FacetDimension::Source => &self.sources,
            FacetDimension::AnchorRef => &self.anchor_refs,
            FacetDimension::Resonance => &self.resonance,
            FacetDimension::Temporal => &self.temporal,
        }
    }

    /// Returns a mutable handle to one dimension's values.
    pub fn values_mut(&mut self, dimension: FacetDimension) -> &mut Vec<String> {
        match dimension {
            FacetDimension::Type => &mut self.types,
            FacetDimension::Insight => &mut self.insights,
            FacetDimension::Level => &mut self.levels,
            FacetDimension::Pattern => &mut self.patterns,
            FacetDimension::Source => &mut self.sources,
            FacetDimension::AnchorRef => &mut self.anchor_refs,
            FacetDimension::Resonance => &mut self.resonance,
            FacetDimension::Temporal => &mut self.temporal,
        }
    }

    /// Iterates over every `(dimension, value)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (FacetDimension, &str)> {
        FacetDimension::ALL.into_iter().flat_map(move |dimension| {
            self.values(dimension)
                .iter()
                .map(move |value| (dimension, value.as_str()))
        })
    }

    /// Returns true if `dimension` holds `value`.
    #[must_use]
    pub fn contains(&self, dimension: FacetDimension, value: &str) -> bool {
        self.values(dimension).iter().any(|v| v == value)
    }

    /// Returns true if no facets were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FacetDimension::ALL
            .iter()
            .all(|d| self.values(*d).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_yields_dimension_pairs() {
        let facets = ClassificationFacets {
            types: vec!["observation".to_string()],
            levels: vec!["experimental".to_string()],
            ..ClassificationFacets::default()
        };
        let pairs: Vec<_> = facets.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (FacetDimension::Type, "observation"),
                (FacetDimension::Level, "experimental"),
            ]
        );
        assert!(facets.contains(FacetDimension::Level, "experimental"));
        assert!(!facets.is_empty());
        assert!(ClassificationFacets::default().is_empty());
    }
}
