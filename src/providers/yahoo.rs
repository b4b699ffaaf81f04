//! Yahoo Finance chart API client (market-data tier)

use super::http::UpstreamClient;
use super::{MarketDataProvider, PriceBar};
use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "yahoo-finance";

pub struct YahooChartClient {
    http: UpstreamClient,
}

impl YahooChartClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http: UpstreamClient::new(PROVIDER, base_url, timeout)?,
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn daily_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let path = format!("/v8/finance/chart/{}", symbol);
        let response: ChartResponse = self
            .http
            .get_json(
                &path,
                &[
                    ("period1", start.timestamp().to_string()),
                    ("period2", end.timestamp().to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?;

        parse_chart(response)
    }
}

fn parse_chart(response: ChartResponse) -> Result<Vec<PriceBar>, ProviderError> {
    if let Some(error) = response.chart.error {
        return Err(ProviderError::Empty {
            provider: PROVIDER,
            detail: error.description.unwrap_or(error.code),
        });
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let bars = timestamps
        .into_iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
            Some(PriceBar {
                timestamp,
                close: closes.get(i).copied().flatten(),
            })
        })
        .collect();

    Ok(bars)
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
