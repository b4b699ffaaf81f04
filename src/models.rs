//! Core data models for the acquisition pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizon used when a request leaves it out
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Largest horizon accepted (100 years of daily points)
pub const MAX_HORIZON_DAYS: u32 = 36_500;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Finance,
    Weather,
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Finance => "finance",
            Classification::Weather => "weather",
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Request =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequest {
    pub query: String,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

fn default_horizon_days() -> i64 {
    DEFAULT_HORIZON_DAYS
}

impl SeriesRequest {
    pub fn new(query: impl Into<String>, horizon_days: i64) -> Self {
        Self {
            query: query.into(),
            horizon_days,
        }
    }
}

//
// ================= Series =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub synthetic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub interpolated: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            synthetic: false,
            interpolated: false,
        }
    }

    pub fn synthetic(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            synthetic: true,
            ..Self::new(timestamp, value)
        }
    }

    pub fn interpolated(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            interpolated: true,
            ..Self::new(timestamp, value)
        }
    }
}

/// Domain-specific provenance fields, flattened into the metadata object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DomainMetadata {
    Finance {
        symbol: String,
    },
    Weather {
        location: String,
        lat: f64,
        lon: f64,
        synthetic: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMetadata {
    pub source: String,
    pub units: String,
    pub frequency: String,
    #[serde(flatten)]
    pub domain: DomainMetadata,
    pub query: String,
    pub data_points: usize,
    pub requested_horizon: u32,
}

impl SeriesMetadata {
    pub fn symbol(&self) -> Option<&str> {
        match &self.domain {
            DomainMetadata::Finance { symbol } => Some(symbol),
            DomainMetadata::Weather { .. } => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match &self.domain {
            DomainMetadata::Weather { location, .. } => Some(location),
            DomainMetadata::Finance { .. } => None,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match &self.domain {
            DomainMetadata::Weather { lat, lon, .. } => Some((*lat, *lon)),
            DomainMetadata::Finance { .. } => None,
        }
    }
}

/// Output of a single source stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesResult {
    pub data: Vec<Observation>,
    pub metadata: SeriesMetadata,
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    #[serde(flatten)]
    pub series: SeriesMetadata,
    pub fetched_at: DateTime<Utc>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub query: String,
    pub classification: Classification,
    pub horizon_days: u32,
    pub actual_data_points: usize,
    pub data: Vec<Observation>,
    pub metadata: PipelineMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_request_defaults_horizon() {
        let request: SeriesRequest = serde_json::from_str(r#"{"query":"台北氣溫"}"#).unwrap();
        assert_eq!(request.horizon_days, DEFAULT_HORIZON_DAYS);

        let request: SeriesRequest =
            serde_json::from_str(r#"{"query":"nasdaq","horizonDays":7}"#).unwrap();
        assert_eq!(request.horizon_days, 7);
    }

    #[test]
    fn test_observation_flags_omitted_when_false() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let plain = serde_json::to_value(Observation::new(ts, 1.5)).unwrap();
        assert!(plain.get("synthetic").is_none());
        assert!(plain.get("interpolated").is_none());

        let fake = serde_json::to_value(Observation::synthetic(ts, 1.5)).unwrap();
        assert_eq!(fake["synthetic"], true);
    }

    #[test]
    fn test_metadata_flattens_domain_fields() {
        let metadata = SeriesMetadata {
            source: "open-meteo".to_string(),
            units: "°C".to_string(),
            frequency: "daily".to_string(),
            domain: DomainMetadata::Weather {
                location: "Taipei".to_string(),
                lat: 25.033,
                lon: 121.5654,
                synthetic: false,
            },
            query: "台北氣溫".to_string(),
            data_points: 28,
            requested_horizon: 14,
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["location"], "Taipei");
        assert_eq!(json["units"], "°C");
        assert_eq!(json["dataPoints"], 28);
        assert_eq!(json["requestedHorizon"], 14);
        assert_eq!(metadata.coordinates(), Some((25.033, 121.5654)));
        assert!(metadata.symbol().is_none());
    }

    #[test]
    fn test_classification_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Classification::Finance).unwrap(),
            "\"finance\""
        );
        assert_eq!(Classification::Weather.to_string(), "weather");
    }
}
