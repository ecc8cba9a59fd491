//! # Event Envelopes
//!
//! Wire shapes for the events exchanged between services. The envelopes
//! carry correlation ids and a summary of the record alongside the full
//! snapshot under `data`, so consumers can route and log without parsing
//! the snapshot.
//!
//! These shapes are shared with non-Rust services on the same broker and
//! must not change incompatibly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::events;
use crate::models::{CycleRecord, Prediction};

/// Envelope published to `cycle_events` when a cycle or its symptoms change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleEventEnvelope {
    /// Event tag, `new_cycle_data` for every cycle mutation
    pub event_type: String,

    /// Source cycle, correlation key
    pub cycle_id: i64,

    /// Owning user, correlation key
    pub user_id: i64,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    /// Full cycle snapshot as of publish time
    pub data: CycleRecord,
}

impl CycleEventEnvelope {
    /// Wrap a cycle snapshot in the standard envelope.
    pub fn for_cycle(cycle: CycleRecord) -> Self {
        Self {
            event_type: events::NEW_CYCLE_DATA.to_string(),
            cycle_id: cycle.id,
            user_id: cycle.user_id,
            start_date: cycle.start_date,
            end_date: cycle.end_date,
            data: cycle,
        }
    }
}

/// Envelope published to `prediction_events` when a prediction is activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEventEnvelope {
    /// Event tag, `new_prediction`
    pub event_type: String,

    /// Activated prediction, correlation key
    pub prediction_id: i64,

    /// Owning user, correlation key
    pub user_id: i64,

    pub predicted_start_date: NaiveDate,
    pub confidence_score: f64,

    /// Full prediction snapshot as of publish time
    pub data: Prediction,
}

impl PredictionEventEnvelope {
    /// Wrap a prediction snapshot in the standard envelope.
    pub fn for_prediction(prediction: Prediction) -> Self {
        Self {
            event_type: events::NEW_PREDICTION.to_string(),
            prediction_id: prediction.id,
            user_id: prediction.user_id,
            predicted_start_date: prediction.predicted_start_date,
            confidence_score: prediction.confidence_score,
            data: prediction,
        }
    }
}
