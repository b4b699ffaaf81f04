//! Open-Meteo forecast/history client (primary weather tier)

use super::http::UpstreamClient;
use super::{Location, TemperatureReading, WeatherProvider};
use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "open-meteo";

pub struct OpenMeteoClient {
    http: UpstreamClient,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: UpstreamClient::new(PROVIDER, base_url, timeout)?,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn daily_mean_temperature(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TemperatureReading>, ProviderError> {
        let response: ForecastResponse = self
            .http
            .get_json(
                "/v1/forecast",
                &[
                    ("latitude", location.lat.to_string()),
                    ("longitude", location.lon.to_string()),
                    ("daily", "temperature_2m_mean".to_string()),
                    ("start_date", start.format("%Y-%m-%d").to_string()),
                    ("end_date", end.format("%Y-%m-%d").to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        parse_daily(response)
    }
}

fn parse_daily(response: ForecastResponse) -> Result<Vec<TemperatureReading>, ProviderError> {
    let Some(daily) = response.daily else {
        return Ok(Vec::new());
    };

    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                ProviderError::Decode {
                    provider: PROVIDER,
                    message: format!("bad date {day:?}: {e}"),
                }
            })?;
            Ok(TemperatureReading {
                date,
                mean_celsius: daily.temperature_2m_mean.get(i).copied().flatten(),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
}
