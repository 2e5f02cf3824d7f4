//! Safety-information provider backed by the REST Countries API.
//!
//! Looks the destination up as a capital first, then as a country name.
//! Emergency numbers are not part of the API, so a small static table
//! covers the common cases with the regional defaults as fallback.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::trip::SafetyInfo;
use crate::ports::{ProviderError, SafetyProvider};

/// Per-country emergency numbers for frequent destinations.
fn emergency_numbers(country_code: &str) -> BTreeMap<String, String> {
    let entries: &[(&str, &str)] = match country_code {
        "FR" => &[("police", "17"), ("ambulance", "15"), ("fire", "18")],
        "IT" => &[("general", "112"), ("ambulance", "118")],
        "GB" => &[("general", "999")],
        "US" => &[("general", "911")],
        "KR" => &[("police", "112"), ("ambulance", "119")],
        "JP" => &[("police", "110"), ("ambulance", "119")],
        _ => &[("general", "112")],
    };
    entries
        .iter()
        .map(|(service, number)| ((*service).to_string(), (*number).to_string()))
        .collect()
}

fn default_advisories() -> Vec<String> {
    vec![
        "Keep a copy of your passport separate from the original.".to_string(),
        "Prefer licensed taxis or official ride apps at night.".to_string(),
        "Check your government's travel advisory before departure.".to_string(),
    ]
}

#[derive(Debug, Deserialize)]
struct CountryRecord {
    name: CountryName,
    cca2: String,
    capital: Option<Vec<String>>,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    currencies: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CountryName {
    common: String,
}

/// Safety provider over REST Countries.
pub struct RestCountriesSafetyProvider {
    client: Client,
    base_url: String,
}

impl RestCountriesSafetyProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn lookup(&self, path: &str) -> Result<Option<CountryRecord>, ProviderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let mut records: Vec<CountryRecord> = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        Ok(if records.is_empty() {
            None
        } else {
            Some(records.remove(0))
        })
    }
}

#[async_trait]
impl SafetyProvider for RestCountriesSafetyProvider {
    async fn info(&self, destination: &str) -> Result<Option<SafetyInfo>, ProviderError> {
        // A travel destination is usually a city; try capital lookup first.
        let record = match self.lookup(&format!("capital/{destination}")).await? {
            Some(record) => Some(record),
            None => self.lookup(&format!("name/{destination}")).await?,
        };

        let Some(record) = record else {
            debug!(destination, "no country information found");
            return Ok(None);
        };

        Ok(Some(SafetyInfo {
            emergency_numbers: emergency_numbers(&record.cca2),
            advisories: default_advisories(),
            country: record.name.common,
            capital: record.capital.and_then(|mut c| {
                if c.is_empty() {
                    None
                } else {
                    Some(c.remove(0))
                }
            }),
            languages: record.languages.into_values().collect(),
            currency: record
                .currencies
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| "USD".to_string()),
            country_code: record.cca2,
        }))
    }
}
