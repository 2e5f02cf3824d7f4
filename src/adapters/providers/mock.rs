//! Mock enrichment providers for testing.
//!
//! Configurable to return canned data, simulate latency for timeout tests,
//! or inject transport failures, with call counting for verification.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::CandidateId;
use crate::domain::trip::{Candidate, DateRange, DayForecast, PriceQuote, SafetyInfo};
use crate::ports::{
    CurrencyProvider, PriceProvider, ProviderError, SafetyProvider, WeatherProvider,
};

/// Shared behavior knobs for all mock providers.
#[derive(Debug, Default)]
struct MockBehavior {
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl MockBehavior {
    async fn run(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if self.fail {
            return Err(ProviderError::transport("injected failure"));
        }
        Ok(())
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Mock weather: one mild, partly cloudy day per date in the range.
#[derive(Debug, Default)]
pub struct MockWeatherProvider {
    behavior: MockBehavior,
}

impl MockWeatherProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = delay;
        self
    }

    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior {
                fail: true,
                ..Default::default()
            },
        }
    }

    pub fn calls(&self) -> usize {
        self.behavior.calls()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn forecast(
        &self,
        _destination: &str,
        range: DateRange,
    ) -> Result<Option<Vec<DayForecast>>, ProviderError> {
        self.behavior.run().await?;
        Ok(Some(
            range
                .iter_days()
                .map(|date| DayForecast {
                    date,
                    temp_min_c: 3.0,
                    temp_max_c: 9.0,
                    precipitation_mm: 0.2,
                    description: "Partly cloudy".to_string(),
                })
                .collect(),
        ))
    }
}

/// Mock prices: a flat nightly rate per candidate.
#[derive(Debug)]
pub struct MockPriceProvider {
    behavior: MockBehavior,
    nightly_rate: f64,
}

impl MockPriceProvider {
    pub fn new(nightly_rate: f64) -> Self {
        Self {
            behavior: MockBehavior::default(),
            nightly_rate,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = delay;
        self
    }

    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior {
                fail: true,
                ..Default::default()
            },
            nightly_rate: 0.0,
        }
    }

    pub fn calls(&self) -> usize {
        self.behavior.calls()
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    async fn quotes(
        &self,
        candidates: &[Candidate],
        _range: Option<DateRange>,
    ) -> Result<Option<BTreeMap<CandidateId, PriceQuote>>, ProviderError> {
        self.behavior.run().await?;
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
                            nightly_rate: self.nightly_rate,
                            currency: "USD".to_string(),
                            source: "mock".to_string(),
                        },
                    )
                })
                .collect(),
        ))
    }
}

/// Mock currency: a fixed EUR/GBP/KRW table.
#[derive(Debug, Default)]
pub struct MockCurrencyProvider {
    behavior: MockBehavior,
}

impl MockCurrencyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            behavior: MockBehavior {
                fail: true,
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl CurrencyProvider for MockCurrencyProvider {
    async fn rates(&self, _base: &str) -> Result<Option<BTreeMap<String, f64>>, ProviderError> {
        self.behavior.run().await?;
        Ok(Some(BTreeMap::from([
            ("EUR".to_string(), 0.91),
            ("GBP".to_string(), 0.78),
            ("KRW".to_string(), 1385.0),
        ])))
    }
}

/// Mock safety info: canned French data or nothing.
#[derive(Debug, Default)]
pub struct MockSafetyProvider {
    behavior: MockBehavior,
    empty: bool,
}

impl MockSafetyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_data() -> Self {
        Self {
            empty: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SafetyProvider for MockSafetyProvider {
    async fn info(&self, _destination: &str) -> Result<Option<SafetyInfo>, ProviderError> {
        self.behavior.run().await?;
        if self.empty {
            return Ok(None);
        }
        Ok(Some(SafetyInfo {
            country: "France".to_string(),
            country_code: "FR".to_string(),
            capital: Some("Paris".to_string()),
            languages: vec!["French".to_string()],
            currency: "EUR".to_string(),
            emergency_numbers: BTreeMap::from([
                ("police".to_string(), "17".to_string()),
                ("ambulance".to_string(), "15".to_string()),
            ]),
            advisories: vec!["Watch for pickpockets around major sights.".to_string()],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn mock_weather_yields_one_entry_per_day() {
        let provider = MockWeatherProvider::new();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 12, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 18).unwrap(),
        )
        .unwrap();
        let forecast = provider.forecast("Paris", range).await.unwrap().unwrap();
        assert_eq!(forecast.len(), 4);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn failing_mock_reports_transport_error() {
        let provider = MockWeatherProvider::failing();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 12, 15).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 15).unwrap(),
        )
        .unwrap();
        assert!(provider.forecast("Paris", range).await.is_err());
    }
}
