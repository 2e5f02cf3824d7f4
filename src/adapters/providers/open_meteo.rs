//! Open-Meteo weather provider.
//!
//! Two-step lookup: geocode the destination, then fetch the daily forecast
//! for the stay window. A destination that cannot be geocoded, or a window
//! outside the forecast horizon, is "no data" (`Ok(None)`), not a failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::trip::{DateRange, DayForecast};
use crate::ports::{ProviderError, WeatherProvider};

/// Open-Meteo WMO weather code, reduced to a short description.
fn describe_weather_code(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Partly cloudy",
        45 | 48 => "Fog",
        51..=57 => "Drizzle",
        61..=67 => "Rain",
        71..=77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95..=99 => "Thunderstorm",
        _ => "Mixed conditions",
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingHit>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingHit {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<chrono::NaiveDate>,
    temperature_2m_max: Vec<f32>,
    temperature_2m_min: Vec<f32>,
    precipitation_sum: Vec<f32>,
    weathercode: Vec<u8>,
}

/// Weather provider backed by the free Open-Meteo API.
pub struct OpenMeteoWeatherProvider {
    client: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteoWeatherProvider {
    pub fn new(forecast_url: impl Into<String>, geocoding_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            forecast_url: forecast_url.into(),
            geocoding_url: geocoding_url.into(),
        }
    }

    async fn geocode(&self, destination: &str) -> Result<Option<(f64, f64)>, ProviderError> {
        let response = self
            .client
            .get(&self.geocoding_url)
            .query(&[
                ("name", destination),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "geocoding returned non-success; treating as no data");
            return Ok(None);
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        Ok(body
            .results
            .and_then(|hits| hits.into_iter().next())
            .map(|hit| (hit.latitude, hit.longitude)))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeatherProvider {
    async fn forecast(
        &self,
        destination: &str,
        range: DateRange,
    ) -> Result<Option<Vec<DayForecast>>, ProviderError> {
        let Some((latitude, longitude)) = self.geocode(destination).await? else {
            debug!(destination, "destination could not be geocoded");
            return Ok(None);
        };

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                (
                    "daily",
                    "temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("start_date", range.start.to_string()),
                ("end_date", range.end.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        if !response.status().is_success() {
            // Typically a window beyond the forecast horizon
            debug!(status = %response.status(), "forecast returned non-success; treating as no data");
            return Ok(None);
        }

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        let Some(daily) = body.daily else {
            return Ok(None);
        };

        let days: Vec<DayForecast> = daily
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, date)| {
                Some(DayForecast {
                    date: *date,
                    temp_min_c: *daily.temperature_2m_min.get(i)?,
                    temp_max_c: *daily.temperature_2m_max.get(i)?,
                    precipitation_mm: *daily.precipitation_sum.get(i)?,
                    description: describe_weather_code(*daily.weathercode.get(i)?).to_string(),
                })
            })
            .collect();

        if days.is_empty() {
            Ok(None)
        } else {
            Ok(Some(days))
        }
    }
}
