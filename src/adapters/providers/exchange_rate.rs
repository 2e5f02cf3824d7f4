//! Exchange-rate provider with an in-process cache.
//!
//! Rates move slowly; one fetch per base currency per hour keeps the free
//! API tier happy. The cache is read-mostly shared state, bounded by the
//! number of distinct base currencies.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::ports::{CurrencyProvider, ProviderError};

const CACHE_TTL: Duration = Duration::from_secs(3600);

/// Currencies travelers actually ask about; the full response is trimmed
/// to these to keep state small.
const SUPPORTED_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "KRW", "CNY", "AUD", "CAD", "SGD", "HKD", "THB", "CHF",
];

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: BTreeMap<String, f64>,
}

struct CachedRates {
    fetched_at: Instant,
    rates: BTreeMap<String, f64>,
}

/// Currency provider backed by exchangerate-api.com.
pub struct ExchangeRateProvider {
    client: Client,
    base_url: String,
    cache: RwLock<HashMap<String, CachedRates>>,
}

impl ExchangeRateProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn cached(&self, base: &str) -> Option<BTreeMap<String, f64>> {
        let cache = self.cache.read().await;
        cache
            .get(base)
            .filter(|entry| entry.fetched_at.elapsed() < CACHE_TTL)
            .map(|entry| entry.rates.clone())
    }
}

#[async_trait]
impl CurrencyProvider for ExchangeRateProvider {
    async fn rates(&self, base: &str) -> Result<Option<BTreeMap<String, f64>>, ProviderError> {
        if let Some(rates) = self.cached(base).await {
            debug!(base, "fx rates served from cache");
            return Ok(Some(rates));
        }

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), base);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "fx endpoint returned non-success; no data");
            return Ok(None);
        }

        let body: RatesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        let rates: BTreeMap<String, f64> = body
            .rates
            .into_iter()
            .filter(|(code, _)| SUPPORTED_CURRENCIES.contains(&code.as_str()))
            .collect();

        if rates.is_empty() {
            return Ok(None);
        }

        self.cache.write().await.insert(
            base.to_string(),
            CachedRates {
                fetched_at: Instant::now(),
                rates: rates.clone(),
            },
        );
        Ok(Some(rates))
    }
}
