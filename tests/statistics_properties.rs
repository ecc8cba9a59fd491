mod common;

use common::strategies::*;
use lunara_core::analytics::{
    average_cycle_length, classify_regularity, compute_statistics, cycle_variance,
    predict_next_start, recent_cycle_lengths, Regularity,
};
use lunara_core::constants::statistics;
use proptest::prelude::*;

proptest! {
    /// Property: the averaging window never exceeds the engine window
    #[test]
    fn window_is_capped(history in history_strategy()) {
        let lengths = recent_cycle_lengths(&history);
        prop_assert!(lengths.len() <= statistics::CYCLE_WINDOW);
    }

    /// Property: only measured rows reach the window, newest first
    #[test]
    fn unmeasured_rows_are_skipped(history in history_strategy()) {
        let lengths = recent_cycle_lengths(&history);
        let measured = history
            .iter()
            .filter(|row| row.cycle_length.is_some())
            .count();
        prop_assert_eq!(lengths.len(), measured.min(statistics::CYCLE_WINDOW));
    }

    /// Property: the average stays within the sample bounds
    #[test]
    fn average_is_bounded_by_samples(lengths in cycle_lengths_strategy()) {
        prop_assume!(!lengths.is_empty());
        let history = build_history(7, &lengths, false);
        let average = average_cycle_length(&history);
        let window = recent_cycle_lengths(&history);
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(average >= min && average <= max);
    }

    /// Property: no measured lengths fall back to the population default
    #[test]
    fn empty_history_uses_default_average(with_first_row in any::<bool>()) {
        let history = build_history(7, &[], with_first_row);
        prop_assert_eq!(
            average_cycle_length(&history),
            statistics::DEFAULT_CYCLE_LENGTH_DAYS
        );
    }

    /// Property: variance is never negative and needs two samples
    #[test]
    fn variance_is_non_negative(lengths in cycle_lengths_strategy()) {
        let history = build_history(7, &lengths, false);
        let variance = cycle_variance(&history);
        prop_assert!(variance >= 0.0);
        if recent_cycle_lengths(&history).len() < 2 {
            prop_assert_eq!(variance, 0.0);
        }
    }

    /// Property: identical lengths are perfectly regular
    #[test]
    fn constant_lengths_have_zero_variance(
        length in cycle_length_strategy(),
        count in 2usize..6,
    ) {
        let history = build_history(7, &vec![length; count], false);
        prop_assert_eq!(cycle_variance(&history), 0.0);
        prop_assert_eq!(classify_regularity(0.0), Regularity::VeryRegular);
    }

    /// Property: every variance lands in exactly one confidence band
    #[test]
    fn regularity_bands_partition_variance(variance in variance_strategy()) {
        let regularity = classify_regularity(variance);
        let expected = if variance < statistics::VERY_REGULAR_VARIANCE_BOUND {
            Regularity::VeryRegular
        } else if variance < statistics::REGULAR_VARIANCE_BOUND {
            Regularity::Regular
        } else {
            Regularity::Irregular
        };
        prop_assert_eq!(regularity, expected);
        prop_assert!((0.0..=1.0).contains(&regularity.confidence()));
    }

    /// Property: the prediction offsets the latest start by the rounded
    /// average
    #[test]
    fn prediction_offsets_latest_start(lengths in cycle_lengths_strategy()) {
        prop_assume!(!lengths.is_empty());
        let history = build_history(7, &lengths, false);
        let predicted = predict_next_start(&history).unwrap();
        let expected_offset = average_cycle_length(&history).round() as i64;
        let actual_offset = (predicted - history[0].start_date).num_days();
        prop_assert_eq!(actual_offset, expected_offset);
        prop_assert!(predicted > history[0].start_date);
    }

    /// Property: rows older than the window cannot move the statistics
    #[test]
    fn rows_beyond_the_window_are_inert(
        lengths in prop::collection::vec(cycle_length_strategy(), 6..12),
    ) {
        let full = build_history(7, &lengths, false);
        let windowed = build_history(7, &lengths[..statistics::CYCLE_WINDOW], false);
        prop_assert_eq!(average_cycle_length(&full), average_cycle_length(&windowed));
        prop_assert_eq!(cycle_variance(&full), cycle_variance(&windowed));
    }

    /// Property: the summary counts every row but bands only with data
    #[test]
    fn summary_counts_all_rows(
        lengths in cycle_lengths_strategy(),
        with_first_row in any::<bool>(),
    ) {
        let history = build_history(7, &lengths, with_first_row);
        let summary = compute_statistics(&history);
        prop_assert_eq!(summary.total_cycles_tracked, history.len());
        if history.is_empty() {
            prop_assert!(summary.regularity.is_none());
            prop_assert!(summary.confidence_score.is_none());
        } else {
            prop_assert!(summary.regularity.is_some());
        }
    }
}

/// Regression cases pinned alongside the properties.
#[cfg(test)]
mod fixed_points {
    use super::common::strategies::*;
    use lunara_core::analytics::{average_cycle_length, cycle_variance};

    #[test]
    fn test_two_samples_population_variance() {
        // [30, 28] about a mean of 29.0
        let history = build_history(7, &[30, 28], true);
        assert_eq!(average_cycle_length(&history), 29.0);
        assert_eq!(cycle_variance(&history), 1.0);
    }

    #[test]
    fn test_window_takes_newest_six_of_seven() {
        // The oldest measured row falls outside the window
        let history = build_history(7, &[28, 28, 28, 28, 28, 28, 56], false);
        assert_eq!(average_cycle_length(&history), 28.0);
        assert_eq!(cycle_variance(&history), 0.0);
    }
}
