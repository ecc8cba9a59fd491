//! # Statistics Engine
//!
//! Pure functions over a user's cycle history. Every function takes the
//! history ordered most recent first, the order `AnalyticsStore::history_for_user`
//! returns, and windows it to the most recent measured cycles internally.
//!
//! No I/O happens here; the consumer layers persistence and event publishing
//! on top.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::statistics::{
    CYCLE_WINDOW, DEFAULT_CYCLE_LENGTH_DAYS, IRREGULAR_CONFIDENCE, REGULAR_CONFIDENCE,
    REGULAR_VARIANCE_BOUND, VERY_REGULAR_CONFIDENCE, VERY_REGULAR_VARIANCE_BOUND,
};
use crate::models::CycleAnalytics;

/// The cycle lengths the engine reasons over: the most recent
/// `CYCLE_WINDOW` rows that carry a measured length, in recency order.
pub fn recent_cycle_lengths(history: &[CycleAnalytics]) -> Vec<f64> {
    history
        .iter()
        .filter_map(|row| row.cycle_length)
        .take(CYCLE_WINDOW)
        .map(f64::from)
        .collect()
}

/// Average of the windowed cycle lengths, in days.
///
/// Users with no measured lengths yet get the assumed default so the first
/// prediction is still possible.
pub fn average_cycle_length(history: &[CycleAnalytics]) -> f64 {
    let lengths = recent_cycle_lengths(history);
    if lengths.is_empty() {
        return DEFAULT_CYCLE_LENGTH_DAYS;
    }
    lengths.iter().sum::<f64>() / lengths.len() as f64
}

/// Population variance of the windowed cycle lengths.
///
/// Variance over fewer than two samples carries no signal and reports 0.0.
pub fn cycle_variance(history: &[CycleAnalytics]) -> f64 {
    let lengths = recent_cycle_lengths(history);
    if lengths.len() < 2 {
        return 0.0;
    }

    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    lengths
        .iter()
        .map(|length| (length - mean).powi(2))
        .sum::<f64>()
        / lengths.len() as f64
}

/// Regularity band for a cycle-length variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regularity {
    VeryRegular,
    Regular,
    Irregular,
}

impl Regularity {
    /// Confidence attached to predictions made in this band.
    pub fn confidence(&self) -> f64 {
        match self {
            Regularity::VeryRegular => VERY_REGULAR_CONFIDENCE,
            Regularity::Regular => REGULAR_CONFIDENCE,
            Regularity::Irregular => IRREGULAR_CONFIDENCE,
        }
    }

    /// Whether the band counts as regular for reporting and notes.
    pub fn is_regular(&self) -> bool {
        !matches!(self, Regularity::Irregular)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regularity::VeryRegular => "very_regular",
            Regularity::Regular => "regular",
            Regularity::Irregular => "irregular",
        }
    }
}

/// Band a variance into a regularity classification.
pub fn classify_regularity(variance: f64) -> Regularity {
    if variance < VERY_REGULAR_VARIANCE_BOUND {
        Regularity::VeryRegular
    } else if variance < REGULAR_VARIANCE_BOUND {
        Regularity::Regular
    } else {
        Regularity::Irregular
    }
}

/// Predicted start of the next cycle: the latest observed start plus the
/// average cycle length rounded to whole days.
///
/// Nothing is predicted without history.
pub fn predict_next_start(history: &[CycleAnalytics]) -> Option<NaiveDate> {
    let latest = history.first()?;
    let days = average_cycle_length(history).round() as i64;
    Some(latest.start_date + Duration::days(days))
}

/// User-level summary served alongside insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStatistics {
    /// Every analytics row on file, not just the window
    pub total_cycles_tracked: usize,

    /// Mean of the measured cycle lengths in the window, one decimal
    pub average_cycle_length: Option<f64>,

    /// Mean of the measured period lengths in the window, one decimal
    pub average_period_length: Option<f64>,

    pub cycle_variance: f64,

    /// Absent until at least one cycle is tracked
    pub regularity: Option<Regularity>,
    pub confidence_score: Option<f64>,
}

/// Summarize a user's history for reporting.
///
/// The report means are plain window means and stay absent until something
/// is measured, unlike [`average_cycle_length`] which scans past unmeasured
/// rows and falls back to the default.
pub fn compute_statistics(history: &[CycleAnalytics]) -> CycleStatistics {
    let window = &history[..history.len().min(CYCLE_WINDOW)];

    let cycle_lengths: Vec<f64> = window
        .iter()
        .filter_map(|row| row.cycle_length)
        .map(f64::from)
        .collect();
    let period_lengths: Vec<f64> = window
        .iter()
        .filter_map(|row| row.period_length)
        .map(f64::from)
        .collect();

    let variance = cycle_variance(history);
    let regularity = (!history.is_empty()).then(|| classify_regularity(variance));

    CycleStatistics {
        total_cycles_tracked: history.len(),
        average_cycle_length: mean_to_one_decimal(&cycle_lengths),
        average_period_length: mean_to_one_decimal(&period_lengths),
        cycle_variance: variance,
        regularity,
        confidence_score: regularity.map(|band| band.confidence()),
    }
}

fn mean_to_one_decimal(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}
