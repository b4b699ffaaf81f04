//! Domain data sources
//!
//! Each source resolves the query to an upstream target, fetches,
//! and normalizes to at most `2 × horizon` ascending observations.

pub mod finance;
pub mod synthetic;
pub mod weather;

pub use finance::{resolve_symbol, FinanceSource};
pub use weather::{resolve_location, WeatherSource};

use crate::models::Observation;

/// Sort ascending by timestamp and keep the newest `keep` points.
pub(crate) fn sort_and_keep_latest(mut data: Vec<Observation>, keep: usize) -> Vec<Observation> {
    data.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    if data.len() > keep {
        data.drain(..data.len() - keep);
    }
    data
}

/// Number of points a source aims to return for a horizon.
pub(crate) fn target_points(horizon_days: u32) -> usize {
    horizon_days as usize * 2
}
