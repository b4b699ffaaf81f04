//! Finance source: closing-price history for a resolved market symbol

use super::{sort_and_keep_latest, target_points};
use crate::error::AcquisitionError;
use crate::models::{DomainMetadata, Observation, SeriesMetadata, SeriesResult};
use crate::providers::MarketDataProvider;
use crate::Result;
use chrono::{Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SOURCE_NAME: &str = "finance";

/// Extra calendar days requested to absorb weekends and holidays
const NON_TRADING_BUFFER_DAYS: i64 = 30;

/// Alias → ticker. Scanned in order; the first substring hit wins.
const SYMBOL_ALIASES: &[(&str, &str)] = &[
    // Taiwan
    ("台股加權指數", "^TWII"),
    ("台股加权指数", "^TWII"),
    ("台股", "^TWII"),
    ("taiwan stock index", "^TWII"),
    ("twii", "^TWII"),
    ("taiwan weighted", "^TWII"),
    // Shanghai
    ("上證指數", "000001.SS"),
    ("上证指数", "000001.SS"),
    ("shanghai composite", "000001.SS"),
    ("shanghai index", "000001.SS"),
    ("sse", "000001.SS"),
    // Shenzhen
    ("深證成指", "399001.SZ"),
    ("深证成指", "399001.SZ"),
    ("shenzhen composite", "399001.SZ"),
    ("shenzhen index", "399001.SZ"),
    ("szse", "399001.SZ"),
    // Hong Kong
    ("恆生指數", "^HSI"),
    ("恒生指数", "^HSI"),
    ("hang seng", "^HSI"),
    ("hang seng index", "^HSI"),
    ("hsi", "^HSI"),
    // Japan
    ("日經指數", "^N225"),
    ("日经指数", "^N225"),
    ("nikkei", "^N225"),
    ("nikkei 225", "^N225"),
    // Korea
    ("韓國綜合指數", "^KS11"),
    ("韩国综合指数", "^KS11"),
    ("kospi", "^KS11"),
    ("korea composite", "^KS11"),
    // US
    ("nasdaq", "^IXIC"),
    ("那斯達克", "^IXIC"),
    ("那斯达克", "^IXIC"),
    ("dow", "^DJI"),
    ("dow jones", "^DJI"),
    ("道瓊", "^DJI"),
    ("道琼", "^DJI"),
    ("s&p 500", "^GSPC"),
    ("sp500", "^GSPC"),
    ("s&p500", "^GSPC"),
    ("標普500", "^GSPC"),
    ("标普500", "^GSPC"),
    // Europe
    ("ftse", "^FTSE"),
    ("ftse 100", "^FTSE"),
    ("dax", "^GDAXI"),
    ("cac 40", "^FCHI"),
    // India
    ("nifty", "^NSEI"),
    ("nifty 50", "^NSEI"),
];

lazy_static! {
    static ref TICKER_PATTERN: Regex =
        Regex::new(r"\b([A-Z]{1,5})\b").expect("ticker pattern is valid");
}

/// Resolve a query to a ticker: alias table, then a bare uppercase token,
/// then `default_symbol`.
pub fn resolve_symbol(query: &str, default_symbol: &str) -> String {
    let lowered = query.trim().to_lowercase();

    if let Some((_, symbol)) = SYMBOL_ALIASES
        .iter()
        .find(|(alias, _)| lowered.contains(alias))
    {
        return (*symbol).to_string();
    }

    if let Some(token) = TICKER_PATTERN.captures(query).and_then(|c| c.get(1)) {
        return token.as_str().to_string();
    }

    default_symbol.to_string()
}

pub struct FinanceSource {
    provider: Arc<dyn MarketDataProvider>,
    default_symbol: String,
}

impl FinanceSource {
    pub fn new(provider: Arc<dyn MarketDataProvider>, default_symbol: impl Into<String>) -> Self {
        Self {
            provider,
            default_symbol: default_symbol.into(),
        }
    }

    /// Fetch up to `2 × horizon_days` daily closes, oldest first.
    pub async fn fetch(&self, query: &str, horizon_days: u32) -> Result<SeriesResult> {
        let symbol = resolve_symbol(query, &self.default_symbol);
        let wanted = target_points(horizon_days);

        let end = Utc::now();
        let start = end
            .checked_sub_signed(Duration::days(wanted as i64 + NON_TRADING_BUFFER_DAYS))
            .ok_or_else(|| {
                AcquisitionError::InvalidArgument(format!(
                    "horizon of {} days reaches before the earliest representable date",
                    horizon_days
                ))
            })?;

        debug!(symbol = %symbol, %start, %end, "Fetching finance history");

        let bars = self
            .provider
            .daily_closes(&symbol, start, end)
            .await
            .map_err(|e| {
                AcquisitionError::source_unavailable(
                    format!("Failed to fetch finance data: {}", e),
                    SOURCE_NAME,
                    Some(e.into()),
                )
            })?;

        if bars.is_empty() {
            return Err(AcquisitionError::source_unavailable(
                format!("No data available for symbol: {}", symbol),
                SOURCE_NAME,
                None,
            ));
        }

        let observations: Vec<Observation> = bars
            .into_iter()
            .filter_map(|bar| bar.close.map(|close| Observation::new(bar.timestamp, close)))
            .collect();

        if observations.len() < horizon_days as usize {
            warn!(
                symbol = %symbol,
                available = observations.len(),
                requested = horizon_days,
                "Fewer closing prices than requested horizon"
            );
        }

        let data = sort_and_keep_latest(observations, wanted);

        info!(symbol = %symbol, points = data.len(), "Finance series ready");

        Ok(SeriesResult {
            metadata: SeriesMetadata {
                source: self.provider.name().to_string(),
                units: "points".to_string(),
                frequency: "daily".to_string(),
                domain: DomainMetadata::Finance { symbol },
                query: query.to_string(),
                data_points: data.len(),
                requested_horizon: horizon_days,
            },
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::providers::PriceBar;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use std::sync::Mutex;

    /// Returns canned bars and remembers the symbol and window it was asked for
    struct CannedMarket {
        bars: Vec<PriceBar>,
        fail: bool,
        requested: Mutex<Vec<String>>,
        windows: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    impl CannedMarket {
        fn with_bars(bars: Vec<PriceBar>) -> Self {
            Self {
                bars,
                fail: false,
                requested: Mutex::new(Vec::new()),
                windows: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                bars: Vec::new(),
                fail: true,
                requested: Mutex::new(Vec::new()),
                windows: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for CannedMarket {
        fn name(&self) -> &'static str {
            "yahoo-finance"
        }

        async fn daily_closes(
            &self,
            symbol: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> std::result::Result<Vec<PriceBar>, ProviderError> {
            self.requested.lock().unwrap().push(symbol.to_string());
            self.windows.lock().unwrap().push((start, end));
            if self.fail {
                return Err(ProviderError::Status {
                    provider: "yahoo-finance",
                    status: 502,
                    body: "bad gateway".to_string(),
                });
            }
            Ok(self.bars.clone())
        }
    }

    fn bars(count: i64) -> Vec<PriceBar> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        // Newest first, with every fifth close missing
        (0..count)
            .rev()
            .map(|i| PriceBar {
                timestamp: base + Duration::days(i),
                close: if i % 5 == 4 { None } else { Some(17000.0 + i as f64) },
            })
            .collect()
    }

    #[test]
    fn test_alias_table_resolution() {
        assert_eq!(resolve_symbol("台股加權指數", "^TWII"), "^TWII");
        assert_eq!(resolve_symbol("恒生指数走势", "^TWII"), "^HSI");
        assert_eq!(resolve_symbol("How is the NASDAQ doing", "^TWII"), "^IXIC");
        assert_eq!(resolve_symbol("Dow Jones last month", "^TWII"), "^DJI");
        assert_eq!(resolve_symbol("標普500", "^TWII"), "^GSPC");
    }

    #[test]
    fn test_uppercase_token_fallback() {
        assert_eq!(resolve_symbol("show me AAPL history", "^TWII"), "AAPL");
        assert_eq!(resolve_symbol("MSFT", "^TWII"), "MSFT");
    }

    #[test]
    fn test_default_symbol_when_nothing_matches() {
        assert_eq!(resolve_symbol("some stock chart", "^TWII"), "^TWII");
        assert_eq!(resolve_symbol("some stock chart", "^GSPC"), "^GSPC");
    }

    #[tokio::test]
    async fn test_fetch_filters_sorts_and_trims() {
        let provider = Arc::new(CannedMarket::with_bars(bars(100)));
        let source = FinanceSource::new(provider.clone(), "^TWII");

        let result = source.fetch("台股加權指數", 30).await.unwrap();

        assert_eq!(*provider.requested.lock().unwrap(), vec!["^TWII".to_string()]);
        assert_eq!(result.data.len(), 60);
        assert_eq!(result.metadata.data_points, 60);
        assert_eq!(result.metadata.symbol(), Some("^TWII"));
        assert_eq!(result.metadata.units, "points");
        assert!(result
            .data
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(result.data.last().unwrap().value, 17098.0);
        assert!(result.data.iter().all(|o| !o.synthetic && !o.interpolated));
    }

    #[tokio::test]
    async fn test_window_is_twice_horizon_plus_trading_buffer() {
        let provider = Arc::new(CannedMarket::with_bars(bars(100)));
        let source = FinanceSource::new(provider.clone(), "^TWII");

        let before = Utc::now();
        source.fetch("nasdaq", 30).await.unwrap();
        let after = Utc::now();

        let windows = provider.windows.lock().unwrap();
        assert_eq!(windows.len(), 1);
        let (start, end) = windows[0];
        assert_eq!(end - start, Duration::days(2 * 30 + 30));
        assert!(end >= before && end <= after);
    }

    #[tokio::test]
    async fn test_unrepresentable_window_is_invalid_argument() {
        let provider = Arc::new(CannedMarket::with_bars(bars(10)));
        let source = FinanceSource::new(provider.clone(), "^TWII");

        let err = source.fetch("nasdaq", u32::MAX).await.unwrap_err();

        assert!(matches!(err, AcquisitionError::InvalidArgument(_)));
        assert!(provider.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_history_is_returned_as_is() {
        let source = FinanceSource::new(Arc::new(CannedMarket::with_bars(bars(10))), "^TWII");
        let result = source.fetch("nikkei", 30).await.unwrap();
        assert_eq!(result.data.len(), 8);
        assert_eq!(result.metadata.symbol(), Some("^N225"));
    }

    #[tokio::test]
    async fn test_empty_result_is_source_unavailable() {
        let source = FinanceSource::new(Arc::new(CannedMarket::with_bars(vec![])), "^TWII");
        let err = source.fetch("kospi", 5).await.unwrap_err();

        match err {
            AcquisitionError::SourceUnavailable {
                message,
                failed_source,
                ..
            } => {
                assert_eq!(failed_source, "finance");
                assert!(message.contains("^KS11"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_error_is_wrapped_with_cause() {
        let source = FinanceSource::new(Arc::new(CannedMarket::failing()), "^TWII");
        let err = source.fetch("dax", 5).await.unwrap_err();

        assert_eq!(err.code(), "SOURCE_UNAVAILABLE");
        let AcquisitionError::SourceUnavailable { cause, .. } = err else {
            panic!("expected SourceUnavailable");
        };
        assert!(matches!(
            cause.as_deref(),
            Some(AcquisitionError::Provider(ProviderError::Status { status: 502, .. }))
        ));
    }
}
