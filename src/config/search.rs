//! Search and ranking configuration.
//!
//! Read-mostly: loaded once at startup and shared across sessions. The
//! fallback threshold and alpha presets live here so operators can tune
//! them without a rebuild.

use serde::Deserialize;

use super::error::ValidationError;

/// Hybrid retrieval tuning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Results returned to the caller per retrieval.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Over-fetch multiplier handed to the index so fusion has a wider pool.
    #[serde(default = "default_fetch_multiplier")]
    pub fetch_multiplier: usize,

    /// Minimum result count below which the fallback ladder engages.
    #[serde(default = "default_min_results")]
    pub min_results: usize,

    /// Default minimum rating applied when the query names none.
    #[serde(default = "default_min_rating")]
    pub default_min_rating: f32,

    /// Share of the re-rank score taken by the overlap signal.
    #[serde(default = "default_rerank_blend")]
    pub rerank_blend: f32,

    /// Optional path to cross-signal re-ranker weights. When unset or
    /// unloadable the engine silently uses the lexical re-ranker.
    #[serde(default)]
    pub cross_signal_weights_path: Option<String>,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.top_k == 0 {
            return Err(ValidationError::InvalidTopK);
        }
        if self.min_results == 0 {
            return Err(ValidationError::InvalidFallbackThreshold);
        }
        if !(0.0..=1.0).contains(&self.rerank_blend) {
            return Err(ValidationError::InvalidRerankBlend);
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            fetch_multiplier: default_fetch_multiplier(),
            min_results: default_min_results(),
            default_min_rating: default_min_rating(),
            rerank_blend: default_rerank_blend(),
            cross_signal_weights_path: None,
        }
    }
}

fn default_top_k() -> usize {
    10
}

fn default_fetch_multiplier() -> usize {
    2
}

fn default_min_results() -> usize {
    3
}

fn default_min_rating() -> f32 {
    3.5
}

fn default_rerank_blend() -> f32 {
    0.5
}
