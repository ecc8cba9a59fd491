//! Prediction rows
//!
//! At most one prediction per user is active at a time; activation of a new
//! one atomically retires the rest. Superseded rows are kept for accuracy
//! review once the actual start date is known.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a prediction was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    AverageCycleLength,
}

impl PredictionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMethod::AverageCycleLength => "average_cycle_length",
        }
    }
}

/// A predicted next period start for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,

    /// Owning user, opaque correlation key
    pub user_id: i64,

    pub predicted_start_date: NaiveDate,

    /// Projected period end when one was derived
    pub predicted_end_date: Option<NaiveDate>,

    /// Confidence in [0, 1], assigned from the regularity band
    pub confidence_score: f64,

    pub prediction_method: PredictionMethod,

    /// Number of cycles the statistics were computed from, capped at the
    /// engine window
    pub based_on_cycles: i32,

    /// Human-readable derivation summary
    pub notes: Option<String>,

    /// False once a newer prediction has been activated
    pub is_active: bool,

    /// Filled in retrospectively when the real period starts
    pub actual_start_date: Option<NaiveDate>,

    /// Signed error in days once the actual start is known
    pub accuracy_days: Option<i32>,

    pub created_at: DateTime<Utc>,
}

/// Field set for activating a prediction. The store assigns identity,
/// timestamps, and the active flag.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub user_id: i64,
    pub predicted_start_date: NaiveDate,
    pub predicted_end_date: Option<NaiveDate>,
    pub confidence_score: f64,
    pub prediction_method: PredictionMethod,
    pub based_on_cycles: i32,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serializes_snake_case() {
        let json = serde_json::to_string(&PredictionMethod::AverageCycleLength).unwrap();
        assert_eq!(json, "\"average_cycle_length\"");
        assert_eq!(
            PredictionMethod::AverageCycleLength.as_str(),
            "average_cycle_length"
        );
    }
}
