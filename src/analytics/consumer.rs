//! # Analytics Consumer
//!
//! Applies cycle events to the analytics store and keeps each user's
//! prediction current. One instance serves both the event-driven path,
//! bound to the analytics cycle queue, and the on-demand service
//! operations.
//!
//! Processing is idempotent per cycle id: deliveries are at-least-once and
//! a replayed event lands on the same analytics row.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::statistics::{CYCLE_WINDOW, MIN_CYCLES_FOR_PREDICTION};
use crate::messaging::{CycleEventEnvelope, EventHandler, HandlerOutcome};
use crate::models::{
    CycleAnalytics, NewCycleAnalytics, NewPrediction, Prediction, PredictionMethod,
};
use crate::storage::{AnalyticsStore, PredictionStore};

use super::insights::{build_report, InsightReport};
use super::publisher::PredictionEventPublisher;
use super::statistics::{
    average_cycle_length, classify_regularity, cycle_variance, predict_next_start,
    recent_cycle_lengths,
};
use super::{AnalyticsError, AnalyticsResult};

/// Consumes cycle events and serves the analytics operations.
pub struct AnalyticsConsumer {
    analytics: Arc<dyn AnalyticsStore>,
    predictions: Arc<dyn PredictionStore>,
    publisher: PredictionEventPublisher,
}

impl AnalyticsConsumer {
    pub fn new(
        analytics: Arc<dyn AnalyticsStore>,
        predictions: Arc<dyn PredictionStore>,
        publisher: PredictionEventPublisher,
    ) -> Self {
        Self {
            analytics,
            predictions,
            publisher,
        }
    }

    /// Apply one cycle event: upsert the analytics row, refresh its
    /// statistics, and once two or more rows exist activate a fresh
    /// prediction and announce it.
    ///
    /// Returns the refreshed row.
    pub async fn apply_cycle_event(
        &self,
        event: &CycleEventEnvelope,
    ) -> AnalyticsResult<CycleAnalytics> {
        let mut row = NewCycleAnalytics::new(event.user_id, event.cycle_id, event.data.start_date);
        row.end_date = event.data.end_date;
        row.period_length = event
            .data
            .end_date
            .map(|end| (end - row.start_date).num_days() as i32 + 1);

        // Cycle length is measured against the chronologically preceding
        // cycle's start, not carried over from the producer.
        let preceding = self
            .analytics
            .preceding_for_user(event.user_id, row.start_date)
            .await?;
        row.cycle_length =
            preceding.map(|previous| (row.start_date - previous.start_date).num_days() as i32);

        self.analytics.upsert(row.clone()).await?;

        // Statistics are refreshed over the history including this event
        let history = self.analytics.history_for_user(event.user_id).await?;
        let variance = cycle_variance(&history);
        row.average_cycle_length = Some(average_cycle_length(&history));
        row.cycle_variance = Some(variance);
        row.is_regular = (recent_cycle_lengths(&history).len() >= 2)
            .then(|| classify_regularity(variance).is_regular());

        let stored = self.analytics.upsert(row).await?;

        if history.len() >= MIN_CYCLES_FOR_PREDICTION {
            self.refresh_prediction(event.user_id, &history).await?;
        } else {
            debug!(
                user_id = event.user_id,
                cycles = history.len(),
                "Not enough history for a prediction yet"
            );
        }

        Ok(stored)
    }

    /// Generate a prediction on demand, outside the event path.
    ///
    /// Fails with an insufficient-history error below two analytics rows.
    pub async fn generate_prediction(&self, user_id: i64) -> AnalyticsResult<Prediction> {
        let history = self.analytics.history_for_user(user_id).await?;

        if history.len() < MIN_CYCLES_FOR_PREDICTION {
            return Err(AnalyticsError::insufficient_history(
                MIN_CYCLES_FOR_PREDICTION,
                history.len(),
            ));
        }

        self.refresh_prediction(user_id, &history)
            .await?
            .ok_or_else(|| {
                AnalyticsError::insufficient_history(MIN_CYCLES_FOR_PREDICTION, history.len())
            })
    }

    /// Stored analytics rows for a user, most recent first.
    pub async fn analytics_for_user(&self, user_id: i64) -> AnalyticsResult<Vec<CycleAnalytics>> {
        Ok(self.analytics.history_for_user(user_id).await?)
    }

    /// Predictions for a user, newest first.
    pub async fn predictions_for_user(
        &self,
        user_id: i64,
        active_only: bool,
    ) -> AnalyticsResult<Vec<Prediction>> {
        Ok(self.predictions.for_user(user_id, active_only).await?)
    }

    /// Statistics summary and insights for a user.
    pub async fn insight_report(&self, user_id: i64) -> AnalyticsResult<InsightReport> {
        let history = self.analytics.history_for_user(user_id).await?;
        Ok(build_report(user_id, &history))
    }

    /// Activate a prediction built from `history` and announce it. The
    /// stored prediction survives a failed publish.
    async fn refresh_prediction(
        &self,
        user_id: i64,
        history: &[CycleAnalytics],
    ) -> AnalyticsResult<Option<Prediction>> {
        let Some(predicted_start_date) = predict_next_start(history) else {
            return Ok(None);
        };

        let regularity = classify_regularity(cycle_variance(history));
        let based_on_cycles = history.len().min(CYCLE_WINDOW);

        let stored = self
            .predictions
            .activate(NewPrediction {
                user_id,
                predicted_start_date,
                predicted_end_date: None,
                confidence_score: regularity.confidence(),
                prediction_method: PredictionMethod::AverageCycleLength,
                based_on_cycles: based_on_cycles as i32,
                notes: Some(format!(
                    "Predicted using {based_on_cycles} recent cycles. Cycle regularity: {}",
                    if regularity.is_regular() {
                        "regular"
                    } else {
                        "irregular"
                    }
                )),
            })
            .await?;

        info!(
            user_id,
            prediction_id = stored.id,
            predicted_start_date = %stored.predicted_start_date,
            confidence_score = stored.confidence_score,
            "Activated prediction"
        );

        if let Err(publish_error) = self.publisher.publish_new_prediction(&stored).await {
            warn!(
                user_id,
                prediction_id = stored.id,
                error = %publish_error,
                "Prediction stored but event publish failed"
            );
        }

        Ok(Some(stored))
    }
}

#[async_trait]
impl EventHandler for AnalyticsConsumer {
    fn name(&self) -> &'static str {
        "cycle-analytics"
    }

    #[instrument(skip(self, payload))]
    async fn handle(&self, routing_key: &str, payload: &[u8]) -> HandlerOutcome {
        let envelope: CycleEventEnvelope = match serde_json::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(parse_error) => {
                error!(routing_key, error = %parse_error, "Discarding undecodable cycle event");
                return HandlerOutcome::rejected(format!(
                    "undecodable cycle event: {parse_error}"
                ));
            }
        };

        debug!(
            routing_key,
            event_type = %envelope.event_type,
            cycle_id = envelope.cycle_id,
            user_id = envelope.user_id,
            "Received cycle event"
        );

        match self.apply_cycle_event(&envelope).await {
            Ok(row) => {
                info!(
                    user_id = row.user_id,
                    cycle_id = row.cycle_id,
                    "Processed cycle event"
                );
                HandlerOutcome::Processed
            }
            Err(apply_error) => {
                error!(
                    user_id = envelope.user_id,
                    cycle_id = envelope.cycle_id,
                    error = %apply_error,
                    "Error processing cycle event"
                );
                HandlerOutcome::rejected(apply_error.to_string())
            }
        }
    }
}
