//! Lexical + vector score fusion.
//!
//! Both sub-scores are min-max normalized per result set before the weighted
//! combination so queries with very different raw score magnitudes behave
//! the same. Ties order by rating, then candidate id, for determinism.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::foundation::CandidateId;
use crate::domain::trip::Candidate;

/// One hit returned by the search index, carrying both raw sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    pub id: CandidateId,
    pub name: String,
    pub location: String,
    pub rating: f32,
    pub snippet: String,
    pub tags: Vec<String>,
    pub lexical_score: f32,
    pub vector_score: f32,
}

/// Fuses raw hits into ranked candidates under the given alpha.
///
/// `fused = alpha * norm_vector + (1 - alpha) * norm_lexical`.
pub fn fuse(hits: Vec<IndexHit>, alpha: f32) -> Vec<Candidate> {
    let alpha = alpha.clamp(0.0, 1.0);
    let lexical_norm = normalize(hits.iter().map(|h| h.lexical_score));
    let vector_norm = normalize(hits.iter().map(|h| h.vector_score));

    let mut candidates: Vec<Candidate> = hits
        .into_iter()
        .enumerate()
        .map(|(i, hit)| {
            let lexical = lexical_norm[i];
            let vector = vector_norm[i];
            Candidate {
                id: hit.id,
                name: hit.name,
                location: hit.location,
                rating: hit.rating,
                snippet: hit.snippet,
                tags: hit.tags,
                lexical_score: lexical,
                vector_score: vector,
                fused_score: alpha * vector + (1.0 - alpha) * lexical,
                rank: 0,
                decorations: BTreeMap::new(),
            }
        })
        .collect();

    candidates.sort_by(compare_fused);
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
    candidates
}

/// Fused-score ordering with the deterministic tie-break chain:
/// fused desc, rating desc, id asc.
pub fn compare_fused(a: &Candidate, b: &Candidate) -> Ordering {
    b.fused_score
        .partial_cmp(&a.fused_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
        .then_with(|| a.id.cmp(&b.id))
}

/// Min-max normalization over one result set.
///
/// A degenerate set (all scores equal) maps to all-1.0 when the shared score
/// is positive and all-0.0 otherwise, so a lone hit still fuses sensibly.
fn normalize(scores: impl Iterator<Item = f32>) -> Vec<f32> {
    let raw: Vec<f32> = scores.collect();
    let min = raw.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = raw.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    if raw.is_empty() {
        return raw;
    }
    if (max - min).abs() < f32::EPSILON {
        let fill = if max > 0.0 { 1.0 } else { 0.0 };
        return vec![fill; raw.len()];
    }
    raw.iter().map(|s| (s - min) / (max - min)).collect()
}
