//! Environment-driven configuration
//!
//! Every upstream base URL can be overridden so tests and staging
//! deployments can point the providers at local servers.

use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_WEATHER_API_BASE_URL: &str = "http://api.weatherapi.com";
pub const DEFAULT_WEB_SEARCH_BASE_URL: &str = "https://api.duckduckgo.com";
pub const DEFAULT_LOCATION_KEY: &str = "taipei";
pub const DEFAULT_SYMBOL: &str = "^TWII";

/// Upper bound for a single upstream call
const MAX_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    pub yahoo_base_url: String,
    pub open_meteo_base_url: String,
    pub weather_api_base_url: String,
    pub weather_api_key: Option<String>,
    pub web_search_base_url: String,
    pub web_search_enabled: bool,
    pub default_location: String,
    pub default_symbol: String,
    pub http_timeout: Duration,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            open_meteo_base_url: DEFAULT_OPEN_METEO_BASE_URL.to_string(),
            weather_api_base_url: DEFAULT_WEATHER_API_BASE_URL.to_string(),
            weather_api_key: None,
            web_search_base_url: DEFAULT_WEB_SEARCH_BASE_URL.to_string(),
            web_search_enabled: true,
            default_location: DEFAULT_LOCATION_KEY.to_string(),
            default_symbol: DEFAULT_SYMBOL.to_string(),
            http_timeout: Duration::from_secs(MAX_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AcquisitionConfig {
    /// Build from process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_timeout = match non_empty("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs.clamp(1, MAX_HTTP_TIMEOUT_SECS)),
                Err(_) => {
                    warn!(value = %raw, "Ignoring unparseable HTTP_TIMEOUT_SECS");
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        let web_search_enabled = match non_empty("WEB_SEARCH_ENABLED") {
            Some(raw) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    warn!(value = %raw, "Ignoring unparseable WEB_SEARCH_ENABLED");
                    defaults.web_search_enabled
                }
            },
            None => defaults.web_search_enabled,
        };

        Self {
            yahoo_base_url: non_empty("YAHOO_FINANCE_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            open_meteo_base_url: non_empty("OPEN_METEO_BASE_URL")
                .unwrap_or(defaults.open_meteo_base_url),
            weather_api_base_url: non_empty("WEATHER_API_BASE_URL")
                .unwrap_or(defaults.weather_api_base_url),
            weather_api_key: non_empty("WEATHER_API_KEY"),
            web_search_base_url: non_empty("WEB_SEARCH_BASE_URL")
                .unwrap_or(defaults.web_search_base_url),
            web_search_enabled,
            default_location: non_empty("DEFAULT_LOCATION").unwrap_or(defaults.default_location),
            default_symbol: non_empty("DEFAULT_SYMBOL").unwrap_or(defaults.default_symbol),
            http_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> AcquisitionConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AcquisitionConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_with(&[]);
        assert_eq!(config.default_symbol, "^TWII");
        assert_eq!(config.default_location, "taipei");
        assert!(config.weather_api_key.is_none());
        assert!(config.web_search_enabled);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides_and_clamping() {
        let config = config_with(&[
            ("WEATHER_API_KEY", "secret"),
            ("DEFAULT_LOCATION", "tokyo"),
            ("HTTP_TIMEOUT_SECS", "45"),
            ("WEB_SEARCH_ENABLED", "off"),
            ("OPEN_METEO_BASE_URL", "http://localhost:9000"),
        ]);

        assert_eq!(config.weather_api_key.as_deref(), Some("secret"));
        assert_eq!(config.default_location, "tokyo");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert!(!config.web_search_enabled);
        assert_eq!(config.open_meteo_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_blank_key_is_treated_as_unset() {
        let config = config_with(&[("WEATHER_API_KEY", "   "), ("HTTP_TIMEOUT_SECS", "abc")]);
        assert!(config.weather_api_key.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }
}
