use crate::types::Quake;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Derived summary handed to rendering collaborators alongside the record
/// list itself
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeStats {
    pub total: usize,
    pub average_magnitude: f64,
    pub max_magnitude: f64,
    pub min_magnitude: f64,
    pub average_depth_km: f64,
    /// Records with magnitude >= 5.0
    pub significant_count: usize,
    /// Records within the last 24 hours of wall-clock time
    pub recent_count: usize,
}

impl QuakeStats {
    pub fn empty() -> Self {
        Self {
            total: 0,
            average_magnitude: 0.0,
            max_magnitude: 0.0,
            min_magnitude: 0.0,
            average_depth_km: 0.0,
            significant_count: 0,
            recent_count: 0,
        }
    }

    pub fn from_records(quakes: &[Quake], now: NaiveDateTime) -> Self {
        if quakes.is_empty() {
            return Self::empty();
        }

        let total = quakes.len();
        let magnitude_sum: f64 = quakes.iter().map(|q| q.magnitude).sum();
        let depth_sum: f64 = quakes.iter().map(|q| q.depth_km).sum();
        let max_magnitude = quakes
            .iter()
            .map(|q| q.magnitude)
            .fold(f64::MIN, f64::max);
        let min_magnitude = quakes
            .iter()
            .map(|q| q.magnitude)
            .fold(f64::MAX, f64::min);

        let one_day_ago = now - Duration::hours(24);

        Self {
            total,
            average_magnitude: magnitude_sum / total as f64,
            max_magnitude,
            min_magnitude,
            average_depth_km: depth_sum / total as f64,
            significant_count: quakes.iter().filter(|q| q.magnitude >= 5.0).count(),
            recent_count: quakes
                .iter()
                .filter(|q| q.occurred_at >= one_day_ago)
                .count(),
        }
    }
}
