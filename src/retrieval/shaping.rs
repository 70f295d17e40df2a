//! Budgeted result shaping.

use crate::models::{ConversationEntry, RetrievedEntry};

/// Suffix appended to a body cut to fit the budget.
pub const CONTINUATION: &str = "...";

/// Approximate token count: whitespace-delimited words.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sorts newest first (ties by id, descending).
pub fn newest_first(entries: &mut [&ConversationEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}

/// Accumulates `entries` (already ordered) until `max_tokens` is reached.
///
/// The entry that would overflow is cut to the remaining allowance and
/// suffixed with [`CONTINUATION`]; accumulation stops right after it. The
/// cost of an entry is its body's word count even when bodies are omitted.
#[must_use]
pub fn shape(
    entries: &[&ConversationEntry],
    max_tokens: usize,
    anchors_only: bool,
) -> (Vec<RetrievedEntry>, usize) {
    let mut shaped = Vec::new();
    let mut total = 0;

    for entry in entries {
        let tokens = estimate_tokens(&entry.content);
        if total + tokens <= max_tokens {
            total += tokens;
            let body = (!anchors_only).then(|| entry.content.clone());
            shaped.push(retrieved(entry, tokens, body, false));
            continue;
        }

        let remaining = max_tokens - total;
        if remaining > 0 {
            let body = (!anchors_only).then(|| {
                let mut cut = entry
                    .content
                    .split_whitespace()
                    .take(remaining)
                    .collect::<Vec<_>>()
                    .join(" ");
                cut.push_str(CONTINUATION);
                cut
            });
            shaped.push(retrieved(entry, remaining, body, true));
            total = max_tokens;
        }
        break;
    }

    (shaped, total)
}

fn retrieved(
    entry: &ConversationEntry,
    tokens: usize,
    content: Option<String>,
    truncated: bool,
) -> RetrievedEntry {
    RetrievedEntry {
        entry_id: entry.id.clone(),
        timestamp: entry.timestamp,
        content,
        summary: entry.summary.clone(),
        tags: entry.tags.clone(),
        anchors: entry.anchors.clone(),
        tokens,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryId, NewEntry, ParsedDocument};
    use chrono::{Duration, Utc};

    fn entry(id: &str, words: usize, age_secs: i64) -> ConversationEntry {
        let content = vec!["word"; words].join(" ");
        ConversationEntry::from_new(
            NewEntry::new(content, ParsedDocument::default()),
            EntryId::new(id),
            Utc::now() - Duration::seconds(age_secs),
        )
    }

    #[test]
    fn test_newest_first() {
        let (a, b, c) = (entry("a", 1, 30), entry("b", 1, 10), entry("c", 1, 20));
        let mut refs = vec![&a, &b, &c];
        newest_first(&mut refs);
        let ids: Vec<_> = refs.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_everything_fits() {
        let (a, b) = (entry("a", 3, 0), entry("b", 4, 1));
        let (shaped, total) = shape(&[&a, &b], 100, false);
        assert_eq!(shaped.len(), 2);
        assert_eq!(total, 7);
        assert!(shaped.iter().all(|e| !e.truncated));
    }

    #[test]
    fn test_overflow_is_truncated_and_stops() {
        let (a, b, c) = (entry("a", 6, 0), entry("b", 10, 1), entry("c", 1, 2));
        let (shaped, total) = shape(&[&a, &b, &c], 8, false);
        assert_eq!(shaped.len(), 2);
        assert_eq!(total, 8);
        assert!(shaped[1].truncated);
        assert_eq!(shaped[1].tokens, 2);
        assert_eq!(shaped[1].content.as_deref(), Some("word word..."));
    }

    #[test]
    fn test_exact_budget_stops_without_empty_entry() {
        let (a, b) = (entry("a", 5, 0), entry("b", 5, 1));
        let (shaped, total) = shape(&[&a, &b], 5, false);
        assert_eq!(shaped.len(), 1);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_anchors_only_omits_bodies() {
        let a = entry("a", 3, 0);
        let (shaped, _) = shape(&[&a], 100, true);
        assert!(shaped[0].content.is_none());
        assert_eq!(shaped[0].tokens, 3);
    }
}
