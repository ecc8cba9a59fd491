//! # Cycle Insights
//!
//! Human-readable observations over recent cycle history. The wording is
//! fixed: client applications and the non-Rust services render these
//! messages verbatim.

use serde::{Deserialize, Serialize};

use crate::constants::statistics::{
    CYCLE_WINDOW, LONG_CYCLE_BOUND, LONG_PERIOD_BOUND, REGULAR_VARIANCE_BOUND, SHORT_CYCLE_BOUND,
    VERY_REGULAR_VARIANCE_BOUND,
};
use crate::models::CycleAnalytics;

use super::statistics::{average_cycle_length, compute_statistics, cycle_variance, CycleStatistics};

/// Tone of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Positive,
    Info,
    Warning,
}

/// One observation about a user's recent cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Serialized as `type`, the field name the clients already consume
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    pub fn positive(message: impl Into<String>) -> Self {
        Self::new(InsightKind::Positive, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(InsightKind::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(InsightKind::Warning, message)
    }

    fn new(kind: InsightKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Statistics summary plus insights, as served to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub user_id: i64,
    pub statistics: CycleStatistics,
    pub insights: Vec<Insight>,
}

/// Derive insights from a user's history, ordered most recent first.
///
/// Until two cycles are in the window the only insight asks for more data.
pub fn generate_insights(history: &[CycleAnalytics]) -> Vec<Insight> {
    let window = &history[..history.len().min(CYCLE_WINDOW)];

    if window.len() < 2 {
        return vec![Insight::info("Track more cycles for personalized insights")];
    }

    let mut insights = Vec::new();
    let average = average_cycle_length(history);
    let variance = cycle_variance(history);

    if average < SHORT_CYCLE_BOUND {
        insights.push(Insight::warning(
            "Your cycles are shorter than average. Consider consulting a healthcare provider.",
        ));
    } else if average > LONG_CYCLE_BOUND {
        insights.push(Insight::warning(
            "Your cycles are longer than average. This may be normal for you, but consider tracking patterns.",
        ));
    } else {
        insights.push(Insight::positive(format!(
            "Your average cycle length is {average:.1} days, which is within normal range."
        )));
    }

    if variance < VERY_REGULAR_VARIANCE_BOUND {
        insights.push(Insight::positive(
            "Your cycles are very regular, making predictions more accurate.",
        ));
    } else if variance > REGULAR_VARIANCE_BOUND {
        insights.push(Insight::info(
            "Your cycles show some variation. This is common and usually normal.",
        ));
    }

    let period_lengths: Vec<f64> = window
        .iter()
        .filter_map(|row| row.period_length)
        .map(f64::from)
        .collect();
    if !period_lengths.is_empty() {
        let mean = period_lengths.iter().sum::<f64>() / period_lengths.len() as f64;
        if mean > LONG_PERIOD_BOUND {
            insights.push(Insight::info(
                "Your periods last longer than average. If concerned, consult a healthcare provider.",
            ));
        }
    }

    insights
}

/// Build the full report for one user's history.
pub fn build_report(user_id: i64, history: &[CycleAnalytics]) -> InsightReport {
    InsightReport {
        user_id,
        statistics: compute_statistics(history),
        insights: generate_insights(history),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(
        cycle_id: i64,
        start: NaiveDate,
        cycle_length: Option<i32>,
        period_length: Option<i32>,
    ) -> CycleAnalytics {
        CycleAnalytics {
            id: cycle_id,
            user_id: 7,
            cycle_id,
            start_date: start,
            end_date: None,
            cycle_length,
            period_length,
            is_regular: None,
            average_cycle_length: None,
            cycle_variance: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_user_is_asked_to_track_more() {
        let insights = generate_insights(&[]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Info);
        assert_eq!(
            insights[0].message,
            "Track more cycles for personalized insights"
        );

        // One cycle is still not enough
        let history = vec![row(1, date(2024, 1, 1), None, Some(5))];
        assert_eq!(generate_insights(&history).len(), 1);
        assert_eq!(generate_insights(&history)[0].kind, InsightKind::Info);
    }

    #[test]
    fn test_normal_regular_history_reads_positive() {
        let history = vec![
            row(3, date(2024, 1, 29), Some(30), Some(5)),
            row(2, date(2023, 12, 30), Some(28), Some(4)),
            row(1, date(2023, 12, 2), None, Some(5)),
        ];

        let insights = generate_insights(&history);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].kind, InsightKind::Positive);
        assert_eq!(
            insights[0].message,
            "Your average cycle length is 29.0 days, which is within normal range."
        );
        assert_eq!(insights[1].kind, InsightKind::Positive);
        assert_eq!(
            insights[1].message,
            "Your cycles are very regular, making predictions more accurate."
        );
    }

    #[test]
    fn test_short_cycles_warn() {
        let history = vec![
            row(2, date(2024, 1, 20), Some(19), None),
            row(1, date(2024, 1, 1), Some(18), None),
        ];

        let insights = generate_insights(&history);
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert!(insights[0].message.starts_with("Your cycles are shorter"));
    }

    #[test]
    fn test_long_cycles_warn_without_regularity_comment() {
        // Average 38.0 with variance 4.0: long, and squarely between the
        // regularity bounds so no regularity insight is added.
        let history = vec![
            row(2, date(2024, 2, 9), Some(40), None),
            row(1, date(2024, 1, 1), Some(36), None),
        ];

        let insights = generate_insights(&history);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert!(insights[0].message.starts_with("Your cycles are longer"));
    }

    #[test]
    fn test_irregular_cycles_get_variation_note() {
        let history = vec![
            row(2, date(2024, 2, 4), Some(35), None),
            row(1, date(2024, 1, 1), Some(25), None),
        ];

        let insights = generate_insights(&history);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].kind, InsightKind::Positive);
        assert_eq!(insights[1].kind, InsightKind::Info);
        assert_eq!(
            insights[1].message,
            "Your cycles show some variation. This is common and usually normal."
        );
    }

    #[test]
    fn test_long_periods_get_flagged() {
        let history = vec![
            row(2, date(2024, 1, 29), Some(28), Some(9)),
            row(1, date(2024, 1, 1), Some(28), Some(8)),
        ];

        let insights = generate_insights(&history);
        let long_period = insights
            .iter()
            .find(|insight| insight.message.starts_with("Your periods last longer"))
            .unwrap();
        assert_eq!(long_period.kind, InsightKind::Info);
    }

    #[test]
    fn test_report_bundles_statistics_and_insights() {
        let history = vec![
            row(2, date(2024, 1, 29), Some(28), Some(5)),
            row(1, date(2024, 1, 1), Some(28), Some(5)),
        ];

        let report = build_report(7, &history);
        assert_eq!(report.user_id, 7);
        assert_eq!(report.statistics.total_cycles_tracked, 2);
        assert!(!report.insights.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["insights"][0]["type"], "positive");
        assert_eq!(json["statistics"]["regularity"], "very_regular");
    }
}
