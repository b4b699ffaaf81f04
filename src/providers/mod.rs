//! Upstream provider traits
//!
//! Sources depend on these traits rather than on concrete HTTP clients,
//! so every tier can be swapped for a deterministic mock in tests.

use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub mod duckduckgo;
pub mod http;
pub mod open_meteo;
pub mod weatherapi;
pub mod yahoo;

pub use duckduckgo::DuckDuckGoClient;
pub use open_meteo::OpenMeteoClient;
pub use weatherapi::WeatherApiClient;
pub use yahoo::YahooChartClient;

/// One daily bar as reported upstream; the close may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    pub date: NaiveDate,
    pub mean_celsius: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

/// Geographic target of a weather lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily bars for `symbol` between `start` and `end`.
    async fn daily_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>, ProviderError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily mean temperature (°C) for the inclusive date range.
    async fn daily_mean_temperature(
        &self,
        location: &Location,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TemperatureReading>, ProviderError>;
}

#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError>;
}
