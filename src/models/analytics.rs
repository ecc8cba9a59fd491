//! Cycle analytics rows
//!
//! One row per observed cycle, keyed by `cycle_id` so replayed events land
//! on the same row. Statistics columns carry the user-level aggregates as
//! of the last recomputation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-cycle analytics as stored by the analytics service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleAnalytics {
    pub id: i64,

    /// Owning user, opaque correlation key
    pub user_id: i64,

    /// Source cycle, unique per row
    pub cycle_id: i64,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    /// Days between this cycle's start and the chronologically previous
    /// one's; absent for a user's first observed cycle
    pub cycle_length: Option<i32>,

    /// Inclusive day span of the period
    pub period_length: Option<i32>,

    /// Regularity as of the last recomputation; absent until two measured
    /// cycle lengths exist
    pub is_regular: Option<bool>,

    pub average_cycle_length: Option<f64>,
    pub cycle_variance: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set for an analytics upsert. The store assigns identity and
/// timestamps, preserving both when the cycle already has a row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCycleAnalytics {
    pub user_id: i64,
    pub cycle_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub cycle_length: Option<i32>,
    pub period_length: Option<i32>,
    pub is_regular: Option<bool>,
    pub average_cycle_length: Option<f64>,
    pub cycle_variance: Option<f64>,
}

impl NewCycleAnalytics {
    /// Create a row for a first sighting of a cycle, statistics unset.
    pub fn new(user_id: i64, cycle_id: i64, start_date: NaiveDate) -> Self {
        Self {
            user_id,
            cycle_id,
            start_date,
            end_date: None,
            cycle_length: None,
            period_length: None,
            is_regular: None,
            average_cycle_length: None,
            cycle_variance: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_row_has_no_statistics() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let row = NewCycleAnalytics::new(7, 3, start);
        assert!(row.cycle_length.is_none());
        assert!(row.average_cycle_length.is_none());
        assert!(row.is_regular.is_none());
    }
}
