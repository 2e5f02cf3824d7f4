//! Review-keyword price heuristic.
//!
//! Estimates a nightly price band from the language of a candidate's review
//! snippet. Deliberately a stub behind the `PriceProvider` port: it is
//! low-confidence by design, and a real pricing API can replace it without
//! touching the orchestrator.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::foundation::CandidateId;
use crate::domain::trip::{Candidate, DateRange, PriceQuote};
use crate::ports::{PriceProvider, ProviderError};

const SOURCE: &str = "review-heuristic";

/// Price bands by review vocabulary, most expensive cue first.
const PRICE_BANDS: &[(&[&str], f64)] = &[
    (&["luxury", "premium", "high-end", "expensive"], 400.0),
    (&["upscale", "elegant", "pricey"], 300.0),
    (&["reasonable", "moderate", "fair price"], 180.0),
    (&["budget", "cheap", "affordable", "great value"], 90.0),
];

const DEFAULT_NIGHTLY: f64 = 150.0;

fn estimate_nightly(snippet: &str) -> f64 {
    let lower = snippet.to_lowercase();
    for (cues, rate) in PRICE_BANDS {
        if cues.iter().any(|cue| lower.contains(cue)) {
            return *rate;
        }
    }
    DEFAULT_NIGHTLY
}

/// Heuristic `PriceProvider` over review text.
#[derive(Debug, Clone, Default)]
pub struct ReviewHeuristicPriceProvider;

impl ReviewHeuristicPriceProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PriceProvider for ReviewHeuristicPriceProvider {
    async fn quotes(
        &self,
        candidates: &[Candidate],
        _range: Option<DateRange>,
    ) -> Result<Option<BTreeMap<CandidateId, PriceQuote>>, ProviderError> {
        if candidates.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            candidates
                .iter()
                .map(|candidate| {
                    (
                        candidate.id.clone(),
                        PriceQuote {
                            nightly_rate: estimate_nightly(&candidate.snippet),
                            currency: "USD".to_string(),
                            source: SOURCE.to_string(),
                        },
                    )
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luxury_vocabulary_maps_to_the_top_band() {
        assert_eq!(estimate_nightly("a luxury experience with premium service"), 400.0);
    }

    #[test]
    fn budget_vocabulary_maps_to_the_low_band() {
        assert_eq!(estimate_nightly("cheap and cheerful, great value"), 90.0);
    }

    #[test]
    fn neutral_text_uses_the_default_band() {
        assert_eq!(estimate_nightly("nice rooms near the park"), DEFAULT_NIGHTLY);
    }
}
