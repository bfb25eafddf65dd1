//! Recent Searches
//!
//! A small most-recent-first list of queries that survives restarts.
//! Entries are unique ignoring case and the list never grows beyond
//! [`MAX_ENTRIES`]. Persistence goes through a [`HistoryStore`] so the list
//! logic does not depend on where it is kept.

pub mod store;

pub use store::*;

use serde::{Deserialize, Serialize};

pub const MAX_ENTRIES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored entries, re-applying the dedupe and size rules
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new();
        let mut stored: Vec<String> = entries.into_iter().map(Into::into).collect();
        // Oldest first so the first stored entry ends up on top
        stored.reverse();
        for entry in stored {
            history.record(&entry);
        }
        history
    }

    /// Put `query` on top, dropping any entry equal to it ignoring case
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let lowered = query.to_lowercase();
        self.entries.retain(|e| e.to_lowercase() != lowered);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_most_recent_first() {
        let mut history = SearchHistory::new();
        history.record("Stripe");
        history.record("Figma");
        assert_eq!(history.entries(), ["Figma", "Stripe"]);
    }

    #[test]
    fn test_case_insensitive_dedupe_moves_to_top() {
        let mut history = SearchHistory::new();
        history.record("Stripe");
        history.record("Figma");
        history.record("STRIPE");
        assert_eq!(history.entries(), ["STRIPE", "Figma"]);
    }

    #[test]
    fn test_capped_at_five() {
        let mut history = SearchHistory::new();
        for name in ["a", "b", "c", "d", "e", "f", "g"] {
            history.record(name);
        }
        assert_eq!(history.entries(), ["g", "f", "e", "d", "c"]);
    }

    #[test]
    fn test_invariants_hold_for_repeated_queries() {
        let queries = [
            "Acme", "acme", "Globex", "Initech", "ACME", "Umbrella", "Hooli", "globex", "Pied Piper",
            "hooli", "Vandelay",
        ];
        let mut history = SearchHistory::new();
        for query in queries {
            history.record(query);
            assert!(history.len() <= MAX_ENTRIES);
            let unique: HashSet<String> = history.entries().iter().map(|e| e.to_lowercase()).collect();
            assert_eq!(unique.len(), history.len());
            assert_eq!(history.entries()[0], query);
        }
    }

    #[test]
    fn test_blank_queries_ignored() {
        let mut history = SearchHistory::new();
        history.record("   ");
        assert!(history.is_empty());
    }

    #[test]
    fn test_from_entries_normalises() {
        let history = SearchHistory::from_entries(["a", "A", "b", "c", "d", "e", "f"]);
        assert_eq!(history.entries(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let history = SearchHistory::from_entries(["Figma", "Stripe"]);
        assert_eq!(serde_json::to_string(&history).unwrap(), r#"["Figma","Stripe"]"#);
    }
}
