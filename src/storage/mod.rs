//! # Storage Ports
//!
//! Each service owns its aggregates behind an async store trait; nothing in
//! this crate joins across aggregates, and cross-service ids stay opaque
//! correlation keys. The in-memory implementations in [`memory`] back tests
//! and embedded use; durable backends are a deployment concern.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{
    CycleAnalytics, NewCycleAnalytics, NewNotification, NewPrediction, Notification,
    NotificationPreference, NotificationStatus, Prediction, PreferenceUpdate,
};

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Store conflict: {message}")]
    Conflict { message: String },

    #[error("Internal store error: {message}")]
    Internal { message: String },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Per-cycle analytics rows, unique by cycle id.
#[async_trait]
pub trait AnalyticsStore: Send + Sync + 'static {
    async fn find_by_cycle_id(&self, cycle_id: i64) -> StoreResult<Option<CycleAnalytics>>;

    /// Insert or replace the row for `row.cycle_id`. A replayed event lands
    /// on the existing row, keeping its identity and creation timestamp.
    async fn upsert(&self, row: NewCycleAnalytics) -> StoreResult<CycleAnalytics>;

    /// All rows for a user, most recent start date first.
    async fn history_for_user(&self, user_id: i64) -> StoreResult<Vec<CycleAnalytics>>;

    /// The row with the greatest start date strictly before `before`.
    async fn preceding_for_user(
        &self,
        user_id: i64,
        before: NaiveDate,
    ) -> StoreResult<Option<CycleAnalytics>>;

    async fn count_for_user(&self, user_id: i64) -> StoreResult<usize>;
}

/// Prediction rows with single-active-per-user semantics.
#[async_trait]
pub trait PredictionStore: Send + Sync + 'static {
    /// Deactivate every active prediction for the user and insert the new
    /// one as active, in one atomic step. No interleaving may observe two
    /// active predictions for the same user.
    async fn activate(&self, prediction: NewPrediction) -> StoreResult<Prediction>;

    async fn active_for_user(&self, user_id: i64) -> StoreResult<Option<Prediction>>;

    /// Predictions for a user, newest first.
    async fn for_user(&self, user_id: i64, active_only: bool) -> StoreResult<Vec<Prediction>>;
}

/// Scheduled notifications with absorbing terminal states.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    async fn insert(&self, notification: NewNotification) -> StoreResult<Notification>;

    async fn find(&self, id: i64) -> StoreResult<Option<Notification>>;

    /// Pending notifications due on or before the given day.
    async fn pending_due(&self, on_or_before: NaiveDate) -> StoreResult<Vec<Notification>>;

    /// Transition to `Sent`. A row already in a terminal state is returned
    /// unchanged, which keeps dispatch sweeps idempotent.
    async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> StoreResult<Notification>;

    /// Transition to `Failed` with the delivery error. Terminal rows are
    /// returned unchanged.
    async fn mark_failed(&self, id: i64, error: String) -> StoreResult<Notification>;

    /// Notifications for a user, newest first, optionally filtered by status.
    async fn for_user(
        &self,
        user_id: i64,
        status: Option<NotificationStatus>,
    ) -> StoreResult<Vec<Notification>>;
}

/// Per-user notification preferences, created lazily with defaults.
#[async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
    /// Fetch the user's preference, creating the default row on first use.
    async fn load_or_create(&self, user_id: i64) -> StoreResult<NotificationPreference>;

    /// Apply a partial update, creating the default row first if absent.
    /// Values are validated by the caller.
    async fn update(
        &self,
        user_id: i64,
        changes: PreferenceUpdate,
    ) -> StoreResult<NotificationPreference>;
}
