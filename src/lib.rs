//! Time-Series Acquisition Pipeline
//!
//! Turns a free-text query and a horizon into a uniformly shaped daily series:
//! - Classifies the query as finance or weather (keywords, then web search)
//! - Fetches market closes or mean temperatures from upstream providers
//! - Falls back through weather tiers down to a labelled synthetic series
//! - Pads short series to the requested horizon, flagging padded points
//!
//! FLOW:
//! QUERY → CLASSIFY → DISPATCH → (FALLBACK) → DENSIFY → RESULT

pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod sources;

pub use error::{AcquisitionError, ProviderError, Result};

// Re-export common types
pub use classifier::QueryClassifier;
pub use config::AcquisitionConfig;
pub use models::*;
pub use pipeline::AcquisitionPipeline;
