//! Conversation memory that persists across turns within a session.
//!
//! Search history is append-only; nothing ever overwrites a prior snapshot.
//! The feedback router and successful generations are the only writers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::CandidateId;

use super::intent::{IntentDelta, ParsedIntent};

/// Reserved learned-preference key carrying a hard price ceiling.
///
/// Feedback deltas like "under $100" land here so the next retrieval's
/// filters pick the bound up without a separate side channel.
pub const MAX_PRICE_KEY: &str = "max_price";

/// Durable per-session memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMemory {
    /// Snapshot of every intent that drove a retrieval, in order.
    pub search_history: Vec<ParsedIntent>,
    /// Candidates the user has implicitly rejected (shown, then asked for
    /// alternatives). Excluded from future retrievals.
    pub rejected_ids: BTreeSet<CandidateId>,
    /// Preference keyword -> accumulated weight.
    pub learned_preferences: BTreeMap<String, f64>,
}

impl ConversationMemory {
    /// Appends an intent snapshot. Never replaces prior history.
    pub fn record_search(&mut self, intent: &ParsedIntent) {
        self.search_history.push(intent.clone());
    }

    /// Marks candidates as rejected.
    pub fn reject<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = CandidateId>,
    {
        self.rejected_ids.extend(ids);
    }

    /// Accumulates weight onto a preference keyword.
    pub fn bump_preference(&mut self, key: impl Into<String>, weight: f64) {
        *self.learned_preferences.entry(key.into()).or_insert(0.0) += weight;
    }

    /// Folds a retry-search delta in: weights accumulate, a price ceiling
    /// replaces the previous one.
    pub fn absorb(&mut self, delta: &IntentDelta) {
        for (key, weight) in &delta.preference_weights {
            self.bump_preference(key.clone(), *weight);
        }
        if let Some(max_price) = delta.max_price {
            self.learned_preferences
                .insert(MAX_PRICE_KEY.to_string(), max_price);
        }
    }

    /// The current hard price ceiling, if any feedback set one.
    pub fn max_price(&self) -> Option<f64> {
        self.learned_preferences.get(MAX_PRICE_KEY).copied()
    }

    /// Preference keywords with positive weight, strongest first, excluding
    /// the reserved filter keys.
    pub fn weighted_keywords(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .learned_preferences
            .iter()
            .filter(|(key, weight)| key.as_str() != MAX_PRICE_KEY && **weight > 0.0)
            .map(|(key, weight)| (key.as_str(), *weight))
            .collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_search_appends() {
        let mut memory = ConversationMemory::default();
        let first = ParsedIntent {
            destination: Some("Paris".to_string()),
            ..Default::default()
        };
        let second = ParsedIntent {
            destination: Some("Lyon".to_string()),
            ..Default::default()
        };
        memory.record_search(&first);
        memory.record_search(&second);
        assert_eq!(memory.search_history.len(), 2);
        assert_eq!(
            memory.search_history[0].destination.as_deref(),
            Some("Paris")
        );
    }

    #[test]
    fn absorb_accumulates_weights_and_replaces_price() {
        let mut memory = ConversationMemory::default();
        let delta = IntentDelta {
            preference_weights: BTreeMap::from([("budget".to_string(), 1.0)]),
            max_price: Some(150.0),
            ..Default::default()
        };
        memory.absorb(&delta);
        memory.absorb(&delta);
        assert_eq!(memory.learned_preferences.get("budget"), Some(&2.0));
        assert_eq!(memory.max_price(), Some(150.0));
    }

    #[test]
    fn weighted_keywords_exclude_reserved_keys() {
        let mut memory = ConversationMemory::default();
        memory.bump_preference("quiet", 2.0);
        memory.bump_preference(MAX_PRICE_KEY, 100.0);
        let keywords = memory.weighted_keywords();
        assert_eq!(keywords, vec![("quiet", 2.0)]);
    }
}
