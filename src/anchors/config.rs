//! Anchor detector configuration.

/// Relative strength of each detection signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWeights {
    /// Weight of state and pattern markers.
    pub marker: f64,
    /// Weight of explicit phrases such as "decided".
    pub explicit_phrase: f64,
    /// Weight of contextual clues.
    pub context_clue: f64,
    /// Weight of punctuation clues such as `?`.
    pub punctuation: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            marker: 0.9,
            explicit_phrase: 0.8,
            context_clue: 0.6,
            punctuation: 0.7,
        }
    }
}

impl SignalWeights {
    /// Multiplier applied to a pattern match that sits next to a marker.
    #[must_use]
    pub fn marker_boost(&self) -> f64 {
        if self.explicit_phrase > 0.0 {
            self.marker / self.explicit_phrase
        } else {
            1.0
        }
    }
}

/// Configuration for [`AnchorDetector`](super::AnchorDetector).
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorConfig {
    /// Anchors below this confidence are dropped.
    pub min_confidence: f64,
    /// Signal weights.
    pub weights: SignalWeights,
    /// Link anchors across directional glyphs and question/decision pairs.
    pub include_relationships: bool,
    /// Merge adjacent anchors of the same type.
    pub merge_adjacent: bool,
    /// Most confident anchors kept per type.
    pub max_anchors_per_type: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            weights: SignalWeights::default(),
            include_relationships: true,
            merge_adjacent: true,
            max_anchors_per_type: 100,
        }
    }
}

impl AnchorConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum confidence.
    #[must_use]
    pub const fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Enables or disables relationship linking.
    #[must_use]
    pub const fn with_relationships(mut self, enabled: bool) -> Self {
        self.include_relationships = enabled;
        self
    }

    /// Enables or disables adjacent merging.
    #[must_use]
    pub const fn with_merge_adjacent(mut self, enabled: bool) -> Self {
        self.merge_adjacent = enabled;
        self
    }

    /// Sets the per-type cap.
    #[must_use]
    pub const fn with_max_per_type(mut self, max: usize) -> Self {
        self.max_anchors_per_type = max;
        self
    }
}
