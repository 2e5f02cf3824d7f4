//! Hybrid retrieval with staged fallback.
//!
//! One retrieval call runs the index query, drops rejected candidates before
//! fusion, fuses under the turn's alpha, re-ranks, and decorates the top
//! results with review highlights. `search_with_fallback` walks the
//! relaxation ladder: never relax more than needed, never skip a stage.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::domain::search::{fuse, RelaxationStage, Reranker, SearchFilters};
use crate::domain::trip::{Candidate, ConversationMemory, ParsedIntent};
use crate::ports::{IndexError, SearchIndex};

/// Positive review phrases worth surfacing to the user.
const HIGHLIGHT_CUES: &[(&str, &str)] = &[
    ("excellent", "excellent service"),
    ("amazing", "praised by guests"),
    ("clean", "clean rooms"),
    ("friendly", "friendly staff"),
    ("comfortable", "comfortable rooms"),
    ("great location", "great location"),
    ("breakfast", "good breakfast"),
    ("spacious", "spacious rooms"),
    ("quiet", "quiet surroundings"),
    ("modern", "modern facilities"),
];

/// Result of one retrieval step, including whether fallback engaged.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub candidates: Vec<Candidate>,
    pub relaxed: bool,
    pub note: Option<String>,
}

impl RetrievalOutcome {
    fn unavailable(reason: &str) -> Self {
        Self {
            candidates: Vec::new(),
            relaxed: false,
            note: Some(format!(
                "The hotel index could not be reached ({reason}); I could not search for stays this time."
            )),
        }
    }
}

/// Executes hybrid retrieval against the index port.
pub struct RetrievalService {
    index: Arc<dyn SearchIndex>,
    reranker: Arc<dyn Reranker>,
    config: SearchConfig,
}

impl RetrievalService {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        reranker: Arc<dyn Reranker>,
        config: SearchConfig,
    ) -> Self {
        Self {
            index,
            reranker,
            config,
        }
    }

    /// Builds the free-text query from the intent plus learned preference
    /// keywords accumulated through feedback.
    pub fn build_query_text(intent: &ParsedIntent, memory: &ConversationMemory) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(destination) = &intent.destination {
            parts.push(destination.clone());
        }
        parts.extend(intent.preferences.iter().cloned());
        for (keyword, _) in memory.weighted_keywords() {
            if !parts.iter().any(|p| p == keyword) {
                parts.push(keyword.to_string());
            }
        }
        if parts.is_empty() {
            return "comfortable clean hotel".to_string();
        }
        parts.join(" ")
    }

    /// Builds the structured filter set from the intent and memory. Feedback
    /// deltas reach retrieval here: the learned price ceiling and rejected
    /// ids merge with the otherwise-unchanged intent filters.
    pub fn build_filters(
        &self,
        intent: &ParsedIntent,
        memory: &ConversationMemory,
    ) -> SearchFilters {
        SearchFilters {
            destination: intent.destination.clone(),
            min_rating: Some(self.config.default_min_rating),
            date_range: intent.date_range,
            max_price: memory.max_price().or(intent.budget),
            preference_tags: intent.preferences.iter().cloned().collect(),
            exclude_ids: memory.rejected_ids.clone(),
        }
    }

    /// One fused retrieval at a fixed alpha.
    ///
    /// # Errors
    ///
    /// Propagates `IndexError` so the fallback caller can decide; this is
    /// the only layer that sees index failures.
    pub async fn retrieve(
        &self,
        query_text: &str,
        filters: &SearchFilters,
        alpha: f32,
    ) -> Result<Vec<Candidate>, IndexError> {
        let fetch = self.config.top_k * self.config.fetch_multiplier.max(1);
        let hits = self.index.search(query_text, filters, fetch).await?;

        // Rejected candidates never enter the fused ranking.
        let hits: Vec<_> = hits
            .into_iter()
            .filter(|hit| !filters.exclude_ids.contains(&hit.id))
            .collect();

        let fused = fuse(hits, alpha);
        let mut candidates = match self.reranker.rerank(fused.clone(), query_text) {
            Ok(reranked) => reranked,
            Err(err) => {
                warn!(error = %err, "re-ranking failed, keeping fused order");
                fused
            }
        };
        candidates.truncate(self.config.top_k);
        for candidate in &mut candidates {
            decorate_highlights(candidate);
        }
        Ok(candidates)
    }

    /// Staged-relaxation search.
    ///
    /// 1. Full filter set; enough results returns unrelaxed.
    /// 2. Soft preferences dropped (destination + minimum rating kept).
    /// 3. Destination only; whatever is found is returned, possibly empty.
    ///
    /// An unreachable index short-circuits into an empty result with a
    /// notice; that is recoverable-with-notice, not an error.
    pub async fn search_with_fallback(
        &self,
        query_text: &str,
        filters: &SearchFilters,
        alpha: f32,
    ) -> RetrievalOutcome {
        let mut last_found: Vec<Candidate> = Vec::new();

        for stage in RelaxationStage::ORDERED {
            let staged = stage.apply(filters);
            match self.retrieve(query_text, &staged, alpha).await {
                Ok(candidates) => {
                    if candidates.len() >= self.config.min_results {
                        info!(
                            stage = ?stage,
                            count = candidates.len(),
                            "retrieval satisfied threshold"
                        );
                        return RetrievalOutcome {
                            candidates,
                            relaxed: stage.is_relaxed(),
                            note: stage.note(filters),
                        };
                    }
                    warn!(
                        stage = ?stage,
                        count = candidates.len(),
                        threshold = self.config.min_results,
                        "retrieval under-returned, relaxing"
                    );
                    last_found = candidates;
                }
                Err(IndexError::Unavailable(reason)) => {
                    warn!(%reason, "search index unavailable");
                    return RetrievalOutcome::unavailable(&reason);
                }
            }
        }

        // Even the broadest search under-returned; hand back what exists.
        RetrievalOutcome {
            candidates: last_found,
            relaxed: true,
            note: RelaxationStage::DestinationOnly.note(filters),
        }
    }
}

/// Attaches up to three positive review highlights as a decoration.
fn decorate_highlights(candidate: &mut Candidate) {
    let snippet = candidate.snippet.to_lowercase();
    let highlights: Vec<&str> = HIGHLIGHT_CUES
        .iter()
        .filter(|(cue, _)| snippet.contains(cue))
        .map(|(_, highlight)| *highlight)
        .take(3)
        .collect();
    if !highlights.is_empty() {
        candidate.decorate("highlights", serde_json::json!(highlights));
    }
}
