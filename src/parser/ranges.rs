//! Interval set of byte ranges already claimed by a higher-priority scan.

use crate::models::Span;

/// Sorted, coalesced set of half-open ranges.
///
/// Lower-priority scans ask [`ClaimedRanges::contains`] whether a match start
/// was already taken before emitting a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedRanges {
    ranges: Vec<Span>,
}

impl ClaimedRanges {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Claims `span`, merging it with any range it touches or overlaps.
    pub fn claim(&mut self, span: Span) {
        if span.is_empty() {
            return;
        }

        // First range whose end reaches the new start.
        let first = self.ranges.partition_point(|r| r.end < span.start);
        // One past the last range whose start is within the new end.
        let last = self.ranges.partition_point(|r| r.start <= span.end);

        if first == last {
            self.ranges.insert(first, span);
            return;
        }

        let start = span.start.min(self.ranges[first].start);
        let end = span.end.max(self.ranges[last - 1].end);
        self.ranges.drain(first..last);
        self.ranges.insert(first, Span::new(start, end));
    }

    /// Returns true if `offset` lies inside a claimed range.
    #[must_use]
    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= offset);
        self.ranges.get(idx).is_some_and(|r| r.contains(offset))
    }

    /// Returns the number of disjoint ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if nothing is claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates over the disjoint ranges in order.
    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.ranges.iter()
    }
}

impl FromIterator<Span> for ClaimedRanges {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        let mut ranges = Self::new();
        for span in iter {
            ranges.claim(span);
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let mut ranges = ClaimedRanges::new();
        ranges.claim(Span::new(3, 6));
        assert!(!ranges.contains(2));
        assert!(ranges.contains(3));
        assert!(ranges.contains(5));
        assert!(!ranges.contains(6));
    }

    #[test]
    fn test_claim_coalesces_overlapping_and_adjacent() {
        let mut ranges = ClaimedRanges::new();
        ranges.claim(Span::new(10, 12));
        ranges.claim(Span::new(0, 2));
        ranges.claim(Span::new(2, 4));
        assert_eq!(ranges.len(), 2);

        ranges.claim(Span::new(3, 11));
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges.iter().next(), Some(&Span::new(0, 12)));
    }

    #[test]
    fn test_disjoint_ranges_stay_sorted() {
        let ranges: ClaimedRanges = [Span::new(20, 22), Span::new(5, 7), Span::new(12, 14)]
            .into_iter()
            .collect();
        let starts: Vec<_> = ranges.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![5, 12, 20]);
        assert!(ranges.contains(13));
        assert!(!ranges.contains(15));
    }

    #[test]
    fn test_empty_span_is_ignored() {
        let mut ranges = ClaimedRanges::new();
        ranges.claim(Span::new(4, 4));
        assert!(ranges.is_empty());
        assert!(!ranges.contains(4));
    }
}
