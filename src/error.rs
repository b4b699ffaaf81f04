//! Error types for the time-series acquisition pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AcquisitionError>;

#[derive(Error, Debug)]
pub enum AcquisitionError {

    // =============================
    // Caller-facing taxonomy
    // =============================

    /// The query's domain could not be determined.
    #[error("{message}")]
    UnrecognizedTopic { message: String, query: String },

    /// The domain was recognized but no data could be produced for it.
    #[error("{message}")]
    SourceUnavailable {
        message: String,
        failed_source: String,
        #[source]
        cause: Option<Box<AcquisitionError>>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // =============================
    // Upstream
    // =============================

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl AcquisitionError {
    pub fn unrecognized_topic(message: impl Into<String>, query: impl Into<String>) -> Self {
        Self::UnrecognizedTopic {
            message: message.into(),
            query: query.into(),
        }
    }

    pub fn source_unavailable(
        message: impl Into<String>,
        failed_source: impl Into<String>,
        cause: Option<AcquisitionError>,
    ) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
            failed_source: failed_source.into(),
            cause: cause.map(Box::new),
        }
    }

    /// Stable machine-readable code for callers that branch on error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedTopic { .. } => "UNRECOGNIZED_TOPIC",
            Self::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Cancelled => "CANCELLED",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Provider(_) => "PROVIDER_ERROR",
        }
    }

    /// Only missing upstream data is worth retrying later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

/// Failure talking to one upstream service.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Connection failures and timeouts.
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned no data: {detail}")]
    Empty {
        provider: &'static str,
        detail: String,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}
