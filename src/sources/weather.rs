//! Weather source: daily mean temperature with a three-tier fallback
//!
//! primary provider → secondary provider (when configured) → synthetic.

use super::{sort_and_keep_latest, synthetic, target_points};
use crate::error::AcquisitionError;
use crate::models::{DomainMetadata, Observation, SeriesMetadata, SeriesResult};
use crate::providers::weatherapi::MAX_HISTORY_DAYS;
use crate::providers::{Location, TemperatureReading, WeatherProvider};
use crate::Result;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SOURCE_NAME: &str = "weather";

const TAIPEI: Location = Location {
    name: "Taipei",
    lat: 25.0330,
    lon: 121.5654,
};
const TAICHUNG: Location = Location {
    name: "Taichung",
    lat: 24.1477,
    lon: 120.6736,
};
const TAINAN: Location = Location {
    name: "Tainan",
    lat: 22.9997,
    lon: 120.2270,
};
const KAOHSIUNG: Location = Location {
    name: "Kaohsiung",
    lat: 22.6273,
    lon: 120.3014,
};
const NEW_TAIPEI: Location = Location {
    name: "New Taipei",
    lat: 25.0120,
    lon: 121.4659,
};
const TAOYUAN: Location = Location {
    name: "Taoyuan",
    lat: 24.9937,
    lon: 121.3010,
};
const TOKYO: Location = Location {
    name: "Tokyo",
    lat: 35.6762,
    lon: 139.6503,
};
const BEIJING: Location = Location {
    name: "Beijing",
    lat: 39.9042,
    lon: 116.4074,
};
const SHANGHAI: Location = Location {
    name: "Shanghai",
    lat: 31.2304,
    lon: 121.4737,
};
const HONG_KONG: Location = Location {
    name: "Hong Kong",
    lat: 22.3193,
    lon: 114.1694,
};
const SEOUL: Location = Location {
    name: "Seoul",
    lat: 37.5665,
    lon: 126.9780,
};
const SINGAPORE: Location = Location {
    name: "Singapore",
    lat: 1.3521,
    lon: 103.8198,
};
const NEW_YORK: Location = Location {
    name: "New York",
    lat: 40.7128,
    lon: -74.0060,
};
const LONDON: Location = Location {
    name: "London",
    lat: 51.5074,
    lon: -0.1278,
};
const PARIS: Location = Location {
    name: "Paris",
    lat: 48.8566,
    lon: 2.3522,
};
const BERLIN: Location = Location {
    name: "Berlin",
    lat: 52.5200,
    lon: 13.4050,
};
const SYDNEY: Location = Location {
    name: "Sydney",
    lat: -33.8688,
    lon: 151.2093,
};

/// Alias → location. Scanned in order; the first substring hit wins.
const LOCATION_ALIASES: &[(&str, Location)] = &[
    ("台北", TAIPEI),
    ("taipei", TAIPEI),
    ("台中", TAICHUNG),
    ("taichung", TAICHUNG),
    ("台南", TAINAN),
    ("tainan", TAINAN),
    ("高雄", KAOHSIUNG),
    ("kaohsiung", KAOHSIUNG),
    ("新北", NEW_TAIPEI),
    ("new taipei", NEW_TAIPEI),
    ("桃園", TAOYUAN),
    ("桃园", TAOYUAN),
    ("taoyuan", TAOYUAN),
    ("東京", TOKYO),
    ("东京", TOKYO),
    ("tokyo", TOKYO),
    ("北京", BEIJING),
    ("beijing", BEIJING),
    ("上海", SHANGHAI),
    ("shanghai", SHANGHAI),
    ("香港", HONG_KONG),
    ("hong kong", HONG_KONG),
    ("首爾", SEOUL),
    ("首尔", SEOUL),
    ("seoul", SEOUL),
    ("新加坡", SINGAPORE),
    ("singapore", SINGAPORE),
    ("紐約", NEW_YORK),
    ("纽约", NEW_YORK),
    ("new york", NEW_YORK),
    ("倫敦", LONDON),
    ("伦敦", LONDON),
    ("london", LONDON),
    ("巴黎", PARIS),
    ("paris", PARIS),
    ("柏林", BERLIN),
    ("berlin", BERLIN),
    ("雪梨", SYDNEY),
    ("悉尼", SYDNEY),
    ("sydney", SYDNEY),
];

/// Resolve a query to a location; unmatched queries use the alias
/// `default_key`, or Taipei when that key is unknown too.
pub fn resolve_location(query: &str, default_key: &str) -> Location {
    let lowered = query.trim().to_lowercase();

    if let Some((_, location)) = LOCATION_ALIASES
        .iter()
        .find(|(alias, _)| lowered.contains(alias))
    {
        return *location;
    }

    let default_key = default_key.trim().to_lowercase();
    LOCATION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == default_key)
        .map(|(_, location)| *location)
        .unwrap_or(TAIPEI)
}

pub struct WeatherSource {
    primary: Arc<dyn WeatherProvider>,
    secondary: Option<Arc<dyn WeatherProvider>>,
    default_location: String,
}

impl WeatherSource {
    pub fn new(
        primary: Arc<dyn WeatherProvider>,
        secondary: Option<Arc<dyn WeatherProvider>>,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            primary,
            secondary,
            default_location: default_location.into(),
        }
    }

    /// Fetch up to `2 × horizon_days` daily means, oldest first.
    pub async fn fetch(&self, query: &str, horizon_days: u32) -> Result<SeriesResult> {
        let location = resolve_location(query, &self.default_location);
        let wanted = target_points(horizon_days);
        let today = Utc::now().date_naive();

        let history_start = today
            .checked_sub_signed(Duration::days(wanted as i64))
            .ok_or_else(|| {
                AcquisitionError::InvalidArgument(format!(
                    "horizon of {} days reaches before the earliest representable date",
                    horizon_days
                ))
            })?;

        let (tier, observations) = self
            .fetch_tiers(&location, horizon_days, history_start, today)
            .await;
        let data = sort_and_keep_latest(observations, wanted);

        if data.is_empty() {
            return Err(AcquisitionError::source_unavailable(
                format!("No weather data available for location: {}", location.name),
                SOURCE_NAME,
                None,
            ));
        }

        let is_synthetic = tier == synthetic::SOURCE_NAME;
        info!(
            location = location.name,
            tier,
            points = data.len(),
            "Weather series ready"
        );

        Ok(SeriesResult {
            metadata: SeriesMetadata {
                source: tier.to_string(),
                units: "°C".to_string(),
                frequency: "daily".to_string(),
                domain: DomainMetadata::Weather {
                    location: location.name.to_string(),
                    lat: location.lat,
                    lon: location.lon,
                    synthetic: is_synthetic,
                },
                query: query.to_string(),
                data_points: data.len(),
                requested_horizon: horizon_days,
            },
            data,
        })
    }

    /// Walk the tiers in order; returns the tier name and its usable points.
    async fn fetch_tiers(
        &self,
        location: &Location,
        horizon_days: u32,
        history_start: NaiveDate,
        today: NaiveDate,
    ) -> (&'static str, Vec<Observation>) {
        if let Some(points) = try_tier(self.primary.as_ref(), location, history_start, today).await
        {
            return (self.primary.name(), points);
        }

        if let Some(secondary) = &self.secondary {
            let start = history_start.max(today - Duration::days(MAX_HISTORY_DAYS));
            if let Some(points) = try_tier(secondary.as_ref(), location, start, today).await {
                return (secondary.name(), points);
            }
        } else {
            debug!("Secondary weather provider not configured");
        }

        warn!(location = location.name, "All weather APIs failed, using synthetic data");
        (
            synthetic::SOURCE_NAME,
            synthetic::generate(location, horizon_days, today),
        )
    }
}

/// `None` when the tier errored or produced no usable reading.
async fn try_tier(
    provider: &dyn WeatherProvider,
    location: &Location,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<Vec<Observation>> {
    match provider.daily_mean_temperature(location, start, end).await {
        Ok(readings) => {
            let points = usable_observations(readings);
            if points.is_empty() {
                warn!(provider = provider.name(), "Weather tier returned no usable readings");
                None
            } else {
                Some(points)
            }
        }
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Weather tier failed");
            None
        }
    }
}

fn usable_observations(readings: Vec<TemperatureReading>) -> Vec<Observation> {
    readings
        .into_iter()
        .filter_map(|reading| {
            let value = reading.mean_celsius.filter(|v| v.is_finite())?;
            let timestamp = reading.date.and_time(NaiveTime::MIN).and_utc();
            Some(Observation::new(timestamp, value))
        })
        .collect()
}
