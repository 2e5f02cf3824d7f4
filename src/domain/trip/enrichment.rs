//! Enrichment results attached to a turn.
//!
//! Each field is owned by exactly one enrichment collaborator. Absence means
//! "not available", never an error: a provider that times out or fails simply
//! leaves its field unset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::CandidateId;

/// One day of forecast for the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub temp_min_c: f32,
    pub temp_max_c: f32,
    pub precipitation_mm: f32,
    pub description: String,
}

/// Live price quote for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub nightly_rate: f64,
    pub currency: String,
    /// Where the quote came from ("review-heuristic", "live-search").
    pub source: String,
}

/// Destination safety and practical information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyInfo {
    pub country: String,
    pub country_code: String,
    pub capital: Option<String>,
    pub languages: Vec<String>,
    pub currency: String,
    pub emergency_numbers: BTreeMap<String, String>,
    pub advisories: Vec<String>,
}

/// The join of all enrichment collaborator outputs for one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentData {
    pub weather: Option<Vec<DayForecast>>,
    pub live_price: Option<BTreeMap<CandidateId, PriceQuote>>,
    pub safety: Option<SafetyInfo>,
    /// Exchange rates keyed by ISO currency code, relative to USD.
    pub fx_rates: Option<BTreeMap<String, f64>>,
}

impl EnrichmentData {
    pub fn is_empty(&self) -> bool {
        self.weather.is_none()
            && self.live_price.is_none()
            && self.safety.is_none()
            && self.fx_rates.is_none()
    }

    /// Count of populated fields, for logging.
    pub fn populated_count(&self) -> usize {
        [
            self.weather.is_some(),
            self.live_price.is_some(),
            self.safety.is_some(),
            self.fx_rates.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count()
    }
}
