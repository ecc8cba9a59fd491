use chrono::{Duration, NaiveDate, Utc};
use lunara_core::models::CycleAnalytics;
use proptest::prelude::*;

/// Strategy for plausible measured cycle lengths, in days
pub fn cycle_length_strategy() -> impl Strategy<Value = i32> {
    15i32..=60
}

/// Strategy for runs of measured cycle lengths, newest first
pub fn cycle_lengths_strategy() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(cycle_length_strategy(), 0..12)
}

/// Strategy for a user's analytics history, sometimes ending in the
/// unmeasured first-cycle row
pub fn history_strategy() -> impl Strategy<Value = Vec<CycleAnalytics>> {
    (cycle_lengths_strategy(), any::<bool>())
        .prop_map(|(lengths, with_first_row)| build_history(7, &lengths, with_first_row))
}

/// Strategy for variance values spanning every regularity band
pub fn variance_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![0.0..2.0f64, 2.0..5.0f64, 5.0..50.0f64]
}

/// Build analytics rows from measured lengths, most recent first, with
/// start dates spaced so each row's length matches the gap to the next
/// older row. When `with_first_row` is set an extra oldest row with no
/// measured length is appended, standing in for the user's first cycle.
pub fn build_history(user_id: i64, lengths: &[i32], with_first_row: bool) -> Vec<CycleAnalytics> {
    let mut rows = Vec::new();
    let mut start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    for (index, length) in lengths.iter().enumerate() {
        rows.push(analytics_row(
            user_id,
            index as i64 + 1,
            start,
            Some(*length),
        ));
        start = start - Duration::days(i64::from(*length));
    }

    if with_first_row {
        rows.push(analytics_row(user_id, lengths.len() as i64 + 1, start, None));
    }

    rows
}

/// A bare analytics row with the statistics columns unset.
pub fn analytics_row(
    user_id: i64,
    cycle_id: i64,
    start_date: NaiveDate,
    cycle_length: Option<i32>,
) -> CycleAnalytics {
    CycleAnalytics {
        id: cycle_id,
        user_id,
        cycle_id,
        start_date,
        end_date: None,
        cycle_length,
        period_length: None,
        is_regular: None,
        average_cycle_length: None,
        cycle_variance: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
