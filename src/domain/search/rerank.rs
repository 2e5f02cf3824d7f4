//! Re-ranking strategies.
//!
//! The default re-ranker is a cheap lexical-overlap scorer. A heavier
//! cross-signal model can be substituted behind the same trait; when it is
//! unavailable the failover wrapper drops to the default without surfacing
//! an error, mirroring how the provider failover works elsewhere in this
//! codebase.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::domain::trip::Candidate;

/// Errors internal to re-ranking. Never escape to the retrieval caller; the
/// failover wrapper converts them into a fallback.
#[derive(Debug, Clone, Error)]
pub enum RerankError {
    #[error("re-rank model unavailable: {0}")]
    Unavailable(String),
}

/// Interchangeable re-ranking strategy.
pub trait Reranker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Reorders candidates against the query. May rewrite `rank` but must
    /// not fabricate `fused_score`.
    fn rerank(&self, candidates: Vec<Candidate>, query_text: &str)
        -> Result<Vec<Candidate>, RerankError>;
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Overlap ratio |query ∩ text| / |query| in [0, 1].
fn token_overlap(query_tokens: &BTreeSet<String>, text: &str) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let text_tokens = tokens(text);
    let overlap = query_tokens.intersection(&text_tokens).count();
    overlap as f32 / query_tokens.len() as f32
}

fn assign_ranks(candidates: &mut [Candidate]) {
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
}

/// Default re-ranker: token-overlap ratio against the query, linearly
/// blended with the existing fused score.
#[derive(Debug, Clone)]
pub struct LexicalOverlapReranker {
    /// Share of the blended score taken by the overlap signal.
    blend: f32,
}

impl LexicalOverlapReranker {
    pub fn new() -> Self {
        Self { blend: 0.5 }
    }

    pub fn with_blend(blend: f32) -> Self {
        Self {
            blend: blend.clamp(0.0, 1.0),
        }
    }
}

impl Default for LexicalOverlapReranker {
    fn default() -> Self {
        Self::new()
    }
}

impl Reranker for LexicalOverlapReranker {
    fn name(&self) -> &'static str {
        "lexical-overlap"
    }

    fn rerank(
        &self,
        mut candidates: Vec<Candidate>,
        query_text: &str,
    ) -> Result<Vec<Candidate>, RerankError> {
        let query_tokens = tokens(query_text);
        if query_tokens.is_empty() {
            // No overlap signal at all: the input order stands.
            return Ok(candidates);
        }

        let mut scored: Vec<(f32, Candidate)> = candidates
            .drain(..)
            .map(|candidate| {
                let overlap = token_overlap(&query_tokens, &candidate.snippet);
                let blended = self.blend * overlap + (1.0 - self.blend) * candidate.fused_score;
                (blended, candidate)
            })
            .collect();

        // Stable sort keeps the incoming order on blended-score ties.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut reranked: Vec<Candidate> = scored.into_iter().map(|(_, c)| c).collect();
        assign_ranks(&mut reranked);
        Ok(reranked)
    }
}

/// Signal weights for the cross-signal re-ranker, loaded from a YAML file.
#[derive(Debug, Clone, Deserialize)]
struct CrossSignalWeights {
    overlap: f32,
    rating: f32,
    tag_match: f32,
}

/// Heavier re-ranker combining overlap, rating and tag-match signals with
/// weights trained offline. Construction fails when the weights file is
/// missing or malformed; callers are expected to wrap it in
/// [`FailoverReranker`] rather than handle that themselves.
#[derive(Debug, Clone)]
pub struct CrossSignalReranker {
    weights: CrossSignalWeights,
}

impl CrossSignalReranker {
    pub fn load(weights_path: &Path) -> Result<Self, RerankError> {
        let raw = std::fs::read_to_string(weights_path)
            .map_err(|e| RerankError::Unavailable(format!("{}: {e}", weights_path.display())))?;
        let weights: CrossSignalWeights = serde_yaml::from_str(&raw)
            .map_err(|e| RerankError::Unavailable(format!("bad weights file: {e}")))?;
        Ok(Self { weights })
    }
}

impl Reranker for CrossSignalReranker {
    fn name(&self) -> &'static str {
        "cross-signal"
    }

    fn rerank(
        &self,
        mut candidates: Vec<Candidate>,
        query_text: &str,
    ) -> Result<Vec<Candidate>, RerankError> {
        let query_tokens = tokens(query_text);
        if query_tokens.is_empty() {
            return Ok(candidates);
        }

        let mut scored: Vec<(f32, Candidate)> = candidates
            .drain(..)
            .map(|candidate| {
                let overlap = token_overlap(&query_tokens, &candidate.snippet);
                let rating = (candidate.rating / 5.0).clamp(0.0, 1.0);
                let tag_match = candidate
                    .tags
                    .iter()
                    .any(|tag| query_tokens.contains(&tag.to_lowercase()));
                let score = self.weights.overlap * overlap
                    + self.weights.rating * rating
                    + self.weights.tag_match * if tag_match { 1.0 } else { 0.0 }
                    + candidate.fused_score;
                (score, candidate)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut reranked: Vec<Candidate> = scored.into_iter().map(|(_, c)| c).collect();
        assign_ranks(&mut reranked);
        Ok(reranked)
    }
}

/// Tries a primary strategy and silently falls back to a default when it
/// fails, so substituting a heavier model never becomes a caller concern.
pub struct FailoverReranker {
    primary: Option<Box<dyn Reranker>>,
    fallback: Box<dyn Reranker>,
}

impl FailoverReranker {
    pub fn new(primary: Option<Box<dyn Reranker>>, fallback: Box<dyn Reranker>) -> Self {
        Self { primary, fallback }
    }

    /// The common wiring: lexical overlap alone.
    pub fn lexical_only() -> Self {
        Self::new(None, Box::new(LexicalOverlapReranker::new()))
    }
}

impl Reranker for FailoverReranker {
    fn name(&self) -> &'static str {
        "failover"
    }

    fn rerank(
        &self,
        candidates: Vec<Candidate>,
        query_text: &str,
    ) -> Result<Vec<Candidate>, RerankError> {
        if let Some(primary) = &self.primary {
            match primary.rerank(candidates.clone(), query_text) {
                Ok(reranked) => return Ok(reranked),
                Err(err) => {
                    warn!(reranker = primary.name(), error = %err, "primary re-ranker failed, using fallback");
                }
            }
        }
        self.fallback.rerank(candidates, query_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CandidateId;
    use std::collections::BTreeMap;

    fn candidate(id: &str, fused: f32, snippet: &str) -> Candidate {
        Candidate {
            id: CandidateId::new(id),
            name: format!("Hotel {id}"),
            location: "Paris".to_string(),
            rating: 4.0,
            snippet: snippet.to_string(),
            tags: vec![],
            lexical_score: 0.5,
            vector_score: 0.5,
            fused_score: fused,
            rank: 0,
            decorations: BTreeMap::new(),
        }
    }

    mod lexical_overlap {
        use super::*;

        #[test]
        fn empty_query_leaves_order_untouched() {
            let input = vec![
                candidate("b", 0.2, "noisy downtown"),
                candidate("a", 0.9, "quiet riverside"),
            ];
            let reranker = LexicalOverlapReranker::new();
            let output = reranker.rerank(input.clone(), "").unwrap();
            let ids: Vec<&str> = output.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, vec!["b", "a"]);
        }

        #[test]
        fn strong_overlap_can_promote_a_lower_fused_candidate() {
            let input = vec![
                candidate("top", 0.8, "grand lobby and pool"),
                candidate("match", 0.6, "quiet romantic riverside retreat"),
            ];
            let output = LexicalOverlapReranker::new()
                .rerank(input, "quiet romantic riverside retreat")
                .unwrap();
            assert_eq!(output[0].id.as_str(), "match");
        }

        #[test]
        fn fused_scores_are_never_rewritten() {
            let input = vec![candidate("a", 0.8, "quiet"), candidate("b", 0.3, "quiet")];
            let output = LexicalOverlapReranker::new().rerank(input, "quiet").unwrap();
            let fused: BTreeMap<&str, f32> =
                output.iter().map(|c| (c.id.as_str(), c.fused_score)).collect();
            assert_eq!(fused["a"], 0.8);
            assert_eq!(fused["b"], 0.3);
        }

        #[test]
        fn ranks_are_reassigned_after_sorting() {
            let input = vec![
                candidate("a", 0.1, "quiet riverside"),
                candidate("b", 0.9, "busy center"),
            ];
            let output = LexicalOverlapReranker::with_blend(1.0)
                .rerank(input, "quiet riverside")
                .unwrap();
            assert_eq!(output[0].id.as_str(), "a");
            assert_eq!(output[0].rank, 1);
            assert_eq!(output[1].rank, 2);
        }
    }

    mod failover {
        use super::*;

        struct AlwaysFails;

        impl Reranker for AlwaysFails {
            fn name(&self) -> &'static str {
                "always-fails"
            }

            fn rerank(
                &self,
                _candidates: Vec<Candidate>,
                _query_text: &str,
            ) -> Result<Vec<Candidate>, RerankError> {
                Err(RerankError::Unavailable("model not loaded".to_string()))
            }
        }

        #[test]
        fn failing_primary_falls_back_silently() {
            let reranker = FailoverReranker::new(
                Some(Box::new(AlwaysFails)),
                Box::new(LexicalOverlapReranker::new()),
            );
            let input = vec![candidate("a", 0.9, "quiet"), candidate("b", 0.1, "loud")];
            let output = reranker.rerank(input, "quiet").unwrap();
            assert_eq!(output[0].id.as_str(), "a");
        }

        #[test]
        fn missing_weights_file_fails_construction_not_reranking() {
            let result = CrossSignalReranker::load(Path::new("/nonexistent/weights.yaml"));
            assert!(result.is_err());
        }
    }
}
