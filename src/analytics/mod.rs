//! # Cycle Analytics
//!
//! The analytics service core: a pure statistics engine over per-cycle
//! history, insight generation, and the consumer that keeps analytics rows
//! and predictions current as cycle events arrive.
//!
//! ## Architecture
//!
//! - **statistics**: Pure functions over cycle history, no I/O
//! - **insights**: Fixed-wording observations derived from recent history
//! - **consumer**: `EventHandler` for the cycle queue plus the on-demand
//!   service operations, wired to stores and a prediction publisher
//! - **publisher**: Owned publishing surface for `prediction.new` events

pub mod consumer;
pub mod insights;
pub mod publisher;
pub mod statistics;

use thiserror::Error;

use crate::messaging::BrokerError;
use crate::storage::StoreError;

pub use consumer::AnalyticsConsumer;
pub use insights::{build_report, generate_insights, Insight, InsightKind, InsightReport};
pub use publisher::PredictionEventPublisher;
pub use statistics::{
    average_cycle_length, classify_regularity, compute_statistics, cycle_variance,
    predict_next_start, recent_cycle_lengths, CycleStatistics, Regularity,
};

/// Errors from the analytics pipeline.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Prediction requested before enough cycles are on file
    #[error("Insufficient cycle history: at least {required} cycles required, have {have}")]
    InsufficientHistory { required: usize, have: usize },

    /// Event payload that cannot be interpreted as a cycle event
    #[error("Malformed cycle event: {message}")]
    MalformedEvent { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Broker(#[from] BrokerError),
}

impl AnalyticsError {
    pub fn insufficient_history(required: usize, have: usize) -> Self {
        Self::InsufficientHistory { required, have }
    }

    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(error: serde_json::Error) -> Self {
        Self::MalformedEvent {
            message: error.to_string(),
        }
    }
}

pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_names_the_requirement() {
        let error = AnalyticsError::insufficient_history(2, 1);
        assert_eq!(
            error.to_string(),
            "Insufficient cycle history: at least 2 cycles required, have 1"
        );
    }

    #[test]
    fn test_json_errors_convert_to_malformed_event() {
        let parse_error = serde_json::from_str::<i64>("not a number").unwrap_err();
        let error: AnalyticsError = parse_error.into();
        assert!(matches!(error, AnalyticsError::MalformedEvent { .. }));
    }
}
