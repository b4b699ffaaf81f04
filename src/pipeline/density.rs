//! Density enforcement
//!
//! Pads an under-delivered series one day at a time until it reaches the
//! target length. Padded points carry `interpolated = true`.

use crate::models::{Classification, Observation};
use crate::sources::synthetic::round2;
use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadPolicy {
    /// Carry the last value forward (prices)
    RepeatLast,
    /// Mean of every point so far, padded ones included (temperatures)
    RunningMean,
}

impl PadPolicy {
    pub fn for_classification(classification: Classification) -> Self {
        match classification {
            Classification::Weather => PadPolicy::RunningMean,
            Classification::Finance | Classification::Unknown => PadPolicy::RepeatLast,
        }
    }
}

/// Pad `data` to `target` points. Longer series are returned unchanged and
/// an empty series stays empty.
pub fn densify(mut data: Vec<Observation>, target: usize, policy: PadPolicy) -> Vec<Observation> {
    let Some(last) = data.last() else {
        return data;
    };
    if data.len() >= target {
        return data;
    }

    let mut timestamp = last.timestamp;
    let mut last_value = last.value;
    let mut sum: f64 = data.iter().map(|o| o.value).sum();
    data.reserve(target - data.len());

    while data.len() < target {
        timestamp += Duration::days(1);
        let value = match policy {
            PadPolicy::RepeatLast => last_value,
            PadPolicy::RunningMean => round2(sum / data.len() as f64),
        };

        data.push(Observation::interpolated(timestamp, value));
        sum += value;
        last_value = value;
    }

    data
}
