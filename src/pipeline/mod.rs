//! Acquisition pipeline - the single entry point for callers
//!
//! VALIDATE → CLASSIFY → DISPATCH → DENSIFY → COMPLETE

pub mod density;

pub use density::{densify, PadPolicy};

use crate::classifier::QueryClassifier;
use crate::config::AcquisitionConfig;
use crate::error::AcquisitionError;
use crate::models::{
    Classification, PipelineMetadata, PipelineResult, SeriesMetadata, SeriesRequest, SeriesResult,
    MAX_HORIZON_DAYS,
};
use crate::providers::{
    DuckDuckGoClient, OpenMeteoClient, WeatherApiClient, WeatherProvider, WebSearchProvider,
    YahooChartClient,
};
use crate::sources::{FinanceSource, WeatherSource};
use crate::Result;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Coordinates classification, source dispatch and densification
pub struct AcquisitionPipeline {
    classifier: QueryClassifier,
    finance: FinanceSource,
    weather: WeatherSource,
}

impl AcquisitionPipeline {
    pub fn new(
        classifier: QueryClassifier,
        finance: FinanceSource,
        weather: WeatherSource,
    ) -> Self {
        Self {
            classifier,
            finance,
            weather,
        }
    }

    /// Wire the reqwest-backed providers described by `config`.
    ///
    /// The secondary weather tier exists only when an API key is configured,
    /// and web search only when enabled.
    pub fn from_config(config: &AcquisitionConfig) -> Result<Self> {
        let timeout = config.http_timeout;

        let market = Arc::new(YahooChartClient::new(&config.yahoo_base_url, timeout)?);
        let primary = Arc::new(OpenMeteoClient::new(&config.open_meteo_base_url, timeout)?);

        let secondary: Option<Arc<dyn WeatherProvider>> = match &config.weather_api_key {
            Some(key) => Some(Arc::new(WeatherApiClient::new(
                &config.weather_api_base_url,
                key.clone(),
                timeout,
            )?)),
            None => None,
        };

        let search: Option<Arc<dyn WebSearchProvider>> = if config.web_search_enabled {
            Some(Arc::new(DuckDuckGoClient::new(
                &config.web_search_base_url,
                timeout,
            )?))
        } else {
            None
        };

        info!(
            secondary_weather = secondary.is_some(),
            web_search = search.is_some(),
            timeout_secs = timeout.as_secs(),
            "Acquisition pipeline configured"
        );

        Ok(Self::new(
            QueryClassifier::new(search),
            FinanceSource::new(market, config.default_symbol.clone()),
            WeatherSource::new(primary, secondary, config.default_location.clone()),
        ))
    }

    /// Fetch a densified series for a free-text query
    pub async fn fetch_time_series(&self, request: SeriesRequest) -> Result<PipelineResult> {
        let request_id = Uuid::new_v4();
        let span = info_span!("fetch_time_series", %request_id);

        self.run(request).instrument(span).await
    }

    /// Same as [`fetch_time_series`](Self::fetch_time_series), abandoned as
    /// soon as `cancel` resolves. In-flight upstream requests are dropped.
    pub async fn fetch_time_series_until<C>(
        &self,
        request: SeriesRequest,
        cancel: C,
    ) -> Result<PipelineResult>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                warn!("Time-series request cancelled");
                Err(AcquisitionError::Cancelled)
            }
            result = self.fetch_time_series(request) => result,
        }
    }

    async fn run(&self, request: SeriesRequest) -> Result<PipelineResult> {
        // === VALIDATE ===
        debug!(
            stage = "validating",
            query = %request.query,
            horizon_days = request.horizon_days,
            "Validating request"
        );

        let query = request.query;
        if query.trim().is_empty() {
            return Err(AcquisitionError::unrecognized_topic(
                "Query must be a non-empty string",
                query,
            ));
        }
        let horizon_days = match u32::try_from(request.horizon_days) {
            Ok(h) if h > 0 => h,
            _ => {
                return Err(AcquisitionError::InvalidArgument(format!(
                    "horizonDays must be a positive integer, got {}",
                    request.horizon_days
                )))
            }
        };
        if horizon_days > MAX_HORIZON_DAYS {
            return Err(AcquisitionError::InvalidArgument(format!(
                "horizonDays must be at most {}, got {}",
                MAX_HORIZON_DAYS, horizon_days
            )));
        }

        // === CLASSIFY ===
        debug!(stage = "classifying", "Classifying query");
        let classification = self.classifier.classify(&query).await.map_err(|e| {
            warn!(error = %e, "Query classification failed");
            AcquisitionError::unrecognized_topic(format!("Failed to classify query: {}", e), &query)
        })?;

        if classification == Classification::Unknown {
            return Err(AcquisitionError::unrecognized_topic(
                format!(
                    "Unable to recognize the topic of query: \"{}\". Please try a finance or weather related query.",
                    query
                ),
                query,
            ));
        }

        // === DISPATCH ===
        debug!(stage = "dispatching", %classification, "Dispatching to source");
        let SeriesResult { data, metadata } = self
            .dispatch(&query, classification, horizon_days)
            .await
            .map_err(|e| wrap_source_error(e, classification))?;

        // === DENSIFY ===
        let target = horizon_days as usize;
        let data = if data.len() < target {
            debug!(stage = "densifying", from = data.len(), to = target, "Densifying series");
            warn!(
                %classification,
                available = data.len(),
                requested = target,
                "Padding series to requested horizon"
            );
            densify(data, target, PadPolicy::for_classification(classification))
        } else {
            data
        };

        if data.is_empty() {
            return Err(AcquisitionError::source_unavailable(
                format!("No data returned for query: \"{}\"", query),
                classification.as_str(),
                None,
            ));
        }

        // === COMPLETE ===
        let actual_data_points = data.len();
        info!(
            %classification,
            source = %metadata.source,
            points = actual_data_points,
            "Time series ready"
        );

        Ok(PipelineResult {
            query,
            classification,
            horizon_days,
            actual_data_points,
            data,
            metadata: PipelineMetadata {
                series: SeriesMetadata {
                    data_points: actual_data_points,
                    ..metadata
                },
                fetched_at: Utc::now(),
                classification,
            },
        })
    }

    async fn dispatch(
        &self,
        query: &str,
        classification: Classification,
        horizon_days: u32,
    ) -> Result<SeriesResult> {
        match classification {
            Classification::Finance => self.finance.fetch(query, horizon_days).await,
            Classification::Weather => self.weather.fetch(query, horizon_days).await,
            Classification::Unknown => Err(AcquisitionError::unrecognized_topic(
                format!("Unsupported classification: {}", classification),
                query,
            )),
        }
    }
}

/// Re-tag a source failure with the classification that was being served.
fn wrap_source_error(error: AcquisitionError, classification: Classification) -> AcquisitionError {
    if matches!(
        error,
        AcquisitionError::UnrecognizedTopic { .. } | AcquisitionError::InvalidArgument(_)
    ) {
        return error;
    }

    let message = match &error {
        AcquisitionError::SourceUnavailable { message, .. } => {
            format!("Data source temporarily unavailable: {}", message)
        }
        other => format!("Failed to fetch {} data: {}", classification, other),
    };

    warn!(%classification, error = %error, "Source stage failed");
    AcquisitionError::source_unavailable(message, classification.as_str(), Some(error))
}
