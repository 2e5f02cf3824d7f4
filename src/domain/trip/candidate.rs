//! Retrieval candidates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::CandidateId;

/// One retrievable item (a hotel) after score fusion.
///
/// `fused_score` is derived from the two sub-scores by the fusion engine and
/// is never written by any other step. Re-ranking may rewrite `rank`;
/// enrichment may only add `decorations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub location: String,
    pub rating: f32,
    /// Review text excerpt the scorers ran against.
    pub snippet: String,
    pub tags: Vec<String>,
    /// Min-max normalized lexical sub-score in [0, 1].
    pub lexical_score: f32,
    /// Min-max normalized vector sub-score in [0, 1].
    pub vector_score: f32,
    /// `alpha * vector + (1 - alpha) * lexical` under the turn's alpha.
    pub fused_score: f32,
    /// 1-based position in the final ordering.
    pub rank: usize,
    /// Open decoration map written by enrichment steps (highlights,
    /// price bands, availability notes).
    #[serde(default)]
    pub decorations: BTreeMap<String, Value>,
}

impl Candidate {
    /// Attaches a decoration without touching scores or order.
    pub fn decorate(&mut self, key: impl Into<String>, value: Value) {
        self.decorations.insert(key.into(), value);
    }

    pub fn decoration(&self, key: &str) -> Option<&Value> {
        self.decorations.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate() -> Candidate {
        Candidate {
            id: CandidateId::new("hotel-1"),
            name: "Hotel Lumière".to_string(),
            location: "Paris".to_string(),
            rating: 4.5,
            snippet: "quiet and romantic, near the river".to_string(),
            tags: vec!["romantic".to_string()],
            lexical_score: 0.4,
            vector_score: 0.9,
            fused_score: 0.75,
            rank: 1,
            decorations: BTreeMap::new(),
        }
    }

    #[test]
    fn decorate_adds_without_touching_scores() {
        let mut c = candidate();
        c.decorate("highlights", json!(["quiet rooms"]));
        assert_eq!(c.decoration("highlights"), Some(&json!(["quiet rooms"])));
        assert_eq!(c.fused_score, 0.75);
        assert_eq!(c.rank, 1);
    }
}
