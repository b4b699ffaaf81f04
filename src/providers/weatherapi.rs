//! WeatherAPI.com history client (secondary, credentialed weather tier)

use super::http::UpstreamClient;
use super::{Location, TemperatureReading, WeatherProvider};
use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "weatherapi";

/// History depth the provider serves on the plans we target
pub const MAX_HISTORY_DAYS: i64 = 14;

pub struct WeatherApiClient {
    http: UpstreamClient,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured("WEATHER_API_KEY"));
        }

        Ok(Self {
            http: UpstreamClient::new(PROVIDER, base_url, timeout)?,
            api_key,
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn daily_mean_temperature(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TemperatureReading>, ProviderError> {
        let earliest = end - chrono::Duration::days(MAX_HISTORY_DAYS - 1);
        let start = start.max(earliest);

        let response: HistoryResponse = self
            .http
            .get_json(
                "/v1/history.json",
                &[
                    ("key", self.api_key.clone()),
                    ("q", format!("{},{}", location.lat, location.lon)),
                    ("dt", start.format("%Y-%m-%d").to_string()),
                    ("end_dt", end.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        parse_history(response)
    }
}

fn parse_history(response: HistoryResponse) -> Result<Vec<TemperatureReading>, ProviderError> {
    let days = response.forecast.map(|f| f.forecastday).unwrap_or_default();

    days.into_iter()
        .map(|day| {
            let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").map_err(|e| {
                ProviderError::Decode {
                    provider: PROVIDER,
                    message: format!("bad date {:?}: {e}", day.date),
                }
            })?;
            Ok(TemperatureReading {
                date,
                mean_celsius: day.day.avgtemp_c,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    forecast: Option<Forecast>,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    day: DaySummary,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    avgtemp_c: Option<f64>,
}
