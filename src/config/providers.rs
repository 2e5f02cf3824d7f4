//! Enrichment provider configuration.

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Endpoints and deadlines for the enrichment collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Per-collaborator deadline for one enrichment call, in milliseconds.
    /// A collaborator missing it simply leaves its field absent.
    #[serde(default = "default_enrichment_timeout_ms")]
    pub enrichment_timeout_ms: u64,

    /// Open-Meteo forecast endpoint.
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,

    /// Open-Meteo geocoding endpoint.
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,

    /// Exchange-rate endpoint.
    #[serde(default = "default_fx_base_url")]
    pub fx_base_url: String,

    /// REST Countries endpoint.
    #[serde(default = "default_countries_base_url")]
    pub countries_base_url: String,

    /// Optional API key for a live price-search backend. Without it the
    /// review-heuristic price provider is used instead.
    #[serde(default)]
    pub price_search_api_key: Option<Secret<String>>,
}

impl ProvidersConfig {
    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(100..=30_000).contains(&self.enrichment_timeout_ms) {
            return Err(ValidationError::InvalidEnrichmentTimeout);
        }
        for (url, field) in [
            (&self.weather_base_url, "weather_base_url"),
            (&self.geocoding_base_url, "geocoding_base_url"),
            (&self.fx_base_url, "fx_base_url"),
            (&self.countries_base_url, "countries_base_url"),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidProviderUrl(field));
            }
        }
        Ok(())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            enrichment_timeout_ms: default_enrichment_timeout_ms(),
            weather_base_url: default_weather_base_url(),
            geocoding_base_url: default_geocoding_base_url(),
            fx_base_url: default_fx_base_url(),
            countries_base_url: default_countries_base_url(),
            price_search_api_key: None,
        }
    }
}

fn default_enrichment_timeout_ms() -> u64 {
    2_500
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_fx_base_url() -> String {
    "https://api.exchangerate-api.com/v4/latest".to_string()
}

fn default_countries_base_url() -> String {
    "https://restcountries.com/v3.1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ProvidersConfig::default().validate().is_ok());
    }

    #[test]
    fn non_http_url_fails() {
        let config = ProvidersConfig {
            fx_base_url: "ftp://rates.example".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sub_100ms_timeout_fails() {
        let config = ProvidersConfig {
            enrichment_timeout_ms: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
