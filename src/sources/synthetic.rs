//! Synthetic weather tier
//!
//! Last resort when every live provider fails. Points are flagged
//! `synthetic` so they are never mistaken for measurements.

use crate::models::Observation;
use crate::providers::Location;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use std::f64::consts::PI;

pub const SOURCE_NAME: &str = "synthetic";

const BASE_TEMPERATURE: f64 = 15.0;
const SEASONAL_AMPLITUDE: f64 = 10.0;
const WEEKLY_AMPLITUDE: f64 = 3.0;
const WEEK_DAYS: f64 = 7.0;

/// Generate `2 × horizon_days` daily points ending the day before `today`.
///
/// The RNG is seeded from the location and date, so repeated calls within
/// one day return the same series. Empty when the start date is out of range.
pub fn generate(location: &Location, horizon_days: u32, today: NaiveDate) -> Vec<Observation> {
    let points = horizon_days as i64 * 2;
    let Some(start) = today.checked_sub_signed(Duration::days(points)) else {
        return Vec::new();
    };

    let base = BASE_TEMPERATURE - location.lat.abs() / 4.0;
    let seasonal = ((today.month0() as f64 / 12.0) * 2.0 * PI).sin() * SEASONAL_AMPLITUDE;
    let mut rng = StdRng::seed_from_u64(seed_for(location, today));

    (0..points)
        .map(|i| {
            let day = start + Duration::days(i);
            let weekly = ((i as f64 / WEEK_DAYS) * 2.0 * PI).sin() * WEEKLY_AMPLITUDE;
            let noise: f64 = rng.gen_range(-1.0..1.0);
            let value = round2(base + seasonal + weekly + noise);

            Observation::synthetic(day.and_time(NaiveTime::MIN).and_utc(), value)
        })
        .collect()
}

fn seed_for(location: &Location, today: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(location.name.as_bytes());
    hasher.update(today.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
