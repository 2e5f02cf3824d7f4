//! Enrichment provider ports.
//!
//! Weather, live price, currency and safety providers share one contract
//! shape: `Ok(None)` means "no data" and is perfectly normal; an `Err` is
//! reserved for genuine transport failure, and even then the orchestrator
//! only treats the field as absent. Providers have no ordering dependency on
//! each other and are dispatched concurrently with one timeout each.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::foundation::CandidateId;
use crate::domain::trip::{Candidate, DateRange, DayForecast, PriceQuote, SafetyInfo};

/// Genuine transport failure while talking to a provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }
}

/// Daily forecast for the destination over the stay.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(
        &self,
        destination: &str,
        range: DateRange,
    ) -> Result<Option<Vec<DayForecast>>, ProviderError>;
}

/// Live (or estimated) nightly prices for the retrieved candidates.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn quotes(
        &self,
        candidates: &[Candidate],
        range: Option<DateRange>,
    ) -> Result<Option<BTreeMap<CandidateId, PriceQuote>>, ProviderError>;
}

/// Exchange rates relative to a base currency.
#[async_trait]
pub trait CurrencyProvider: Send + Sync {
    async fn rates(&self, base: &str) -> Result<Option<BTreeMap<String, f64>>, ProviderError>;
}

/// Destination safety and practical information.
#[async_trait]
pub trait SafetyProvider: Send + Sync {
    async fn info(&self, destination: &str) -> Result<Option<SafetyInfo>, ProviderError>;
}
