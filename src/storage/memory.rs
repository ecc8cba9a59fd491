//! # In-Memory Stores
//!
//! Store implementations over `DashMap` and `parking_lot` for tests and
//! embedded use. The prediction store serializes activation behind one
//! write lock so the single-active-prediction invariant holds under
//! concurrent generation.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;

use super::{
    AnalyticsStore, NotificationStore, PredictionStore, PreferenceStore, StoreError, StoreResult,
};
use crate::constants::reminders;
use crate::models::{
    CycleAnalytics, NewCycleAnalytics, NewNotification, NewPrediction, Notification,
    NotificationPreference, NotificationStatus, Prediction, PreferenceUpdate,
};

/// Analytics rows keyed by cycle id.
#[derive(Debug, Default)]
pub struct InMemoryAnalyticsStore {
    rows: DashMap<i64, CycleAnalytics>,
    next_id: AtomicI64,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn find_by_cycle_id(&self, cycle_id: i64) -> StoreResult<Option<CycleAnalytics>> {
        Ok(self.rows.get(&cycle_id).map(|row| row.clone()))
    }

    async fn upsert(&self, row: NewCycleAnalytics) -> StoreResult<CycleAnalytics> {
        let now = Utc::now();

        if let Some(mut existing) = self.rows.get_mut(&row.cycle_id) {
            if existing.user_id != row.user_id {
                return Err(StoreError::conflict(format!(
                    "cycle {} belongs to user {}, not user {}",
                    row.cycle_id, existing.user_id, row.user_id
                )));
            }
            existing.start_date = row.start_date;
            existing.end_date = row.end_date;
            existing.cycle_length = row.cycle_length;
            existing.period_length = row.period_length;
            existing.is_regular = row.is_regular;
            existing.average_cycle_length = row.average_cycle_length;
            existing.cycle_variance = row.cycle_variance;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let stored = CycleAnalytics {
            id: self.assign_id(),
            user_id: row.user_id,
            cycle_id: row.cycle_id,
            start_date: row.start_date,
            end_date: row.end_date,
            cycle_length: row.cycle_length,
            period_length: row.period_length,
            is_regular: row.is_regular,
            average_cycle_length: row.average_cycle_length,
            cycle_variance: row.cycle_variance,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(stored.cycle_id, stored.clone());
        Ok(stored)
    }

    async fn history_for_user(&self, user_id: i64) -> StoreResult<Vec<CycleAnalytics>> {
        let mut rows: Vec<CycleAnalytics> = self
            .rows
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn preceding_for_user(
        &self,
        user_id: i64,
        before: NaiveDate,
    ) -> StoreResult<Option<CycleAnalytics>> {
        Ok(self
            .rows
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.start_date < before)
            .max_by_key(|entry| entry.start_date)
            .map(|entry| entry.clone()))
    }

    async fn count_for_user(&self, user_id: i64) -> StoreResult<usize> {
        Ok(self
            .rows
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .count())
    }
}

/// Prediction rows behind a single lock; activation needs the whole set.
#[derive(Debug, Default)]
pub struct InMemoryPredictionStore {
    rows: RwLock<Vec<Prediction>>,
    next_id: AtomicI64,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PredictionStore for InMemoryPredictionStore {
    async fn activate(&self, prediction: NewPrediction) -> StoreResult<Prediction> {
        // One critical section covers deactivation and insertion
        let mut rows = self.rows.write();

        for row in rows.iter_mut() {
            if row.user_id == prediction.user_id && row.is_active {
                row.is_active = false;
            }
        }

        let stored = Prediction {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id: prediction.user_id,
            predicted_start_date: prediction.predicted_start_date,
            predicted_end_date: prediction.predicted_end_date,
            confidence_score: prediction.confidence_score,
            prediction_method: prediction.prediction_method,
            based_on_cycles: prediction.based_on_cycles,
            notes: prediction.notes,
            is_active: true,
            actual_start_date: None,
            accuracy_days: None,
            created_at: Utc::now(),
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn active_for_user(&self, user_id: i64) -> StoreResult<Option<Prediction>> {
        let rows = self.rows.read();
        Ok(rows
            .iter()
            .find(|row| row.user_id == user_id && row.is_active)
            .cloned())
    }

    async fn for_user(&self, user_id: i64, active_only: bool) -> StoreResult<Vec<Prediction>> {
        let rows = self.rows.read();
        let mut matched: Vec<Prediction> = rows
            .iter()
            .filter(|row| row.user_id == user_id && (!active_only || row.is_active))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matched)
    }
}

/// Notifications keyed by id; per-key locking is enough because every
/// transition touches a single row.
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    rows: DashMap<i64, Notification>,
    next_id: AtomicI64,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: NewNotification) -> StoreResult<Notification> {
        let stored = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id: notification.user_id,
            prediction_id: notification.prediction_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            scheduled_for: notification.scheduled_for,
            status: NotificationStatus::Pending,
            sent_at: None,
            error_message: None,
            created_at: Utc::now(),
        };
        self.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: i64) -> StoreResult<Option<Notification>> {
        Ok(self.rows.get(&id).map(|row| row.clone()))
    }

    async fn pending_due(&self, on_or_before: NaiveDate) -> StoreResult<Vec<Notification>> {
        let mut due: Vec<Notification> = self
            .rows
            .iter()
            .filter(|entry| {
                entry.status == NotificationStatus::Pending && entry.scheduled_for <= on_or_before
            })
            .map(|entry| entry.clone())
            .collect();
        due.sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for).then(a.id.cmp(&b.id)));
        Ok(due)
    }

    async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> StoreResult<Notification> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("notification", id))?;

        if row.status.is_terminal() {
            return Ok(row.clone());
        }

        row.status = NotificationStatus::Sent;
        row.sent_at = Some(sent_at);
        Ok(row.clone())
    }

    async fn mark_failed(&self, id: i64, error: String) -> StoreResult<Notification> {
        let mut row = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("notification", id))?;

        if row.status.is_terminal() {
            return Ok(row.clone());
        }

        row.status = NotificationStatus::Failed;
        row.error_message = Some(error);
        Ok(row.clone())
    }

    async fn for_user(
        &self,
        user_id: i64,
        status: Option<NotificationStatus>,
    ) -> StoreResult<Vec<Notification>> {
        let mut matched: Vec<Notification> = self
            .rows
            .iter()
            .filter(|entry| {
                entry.user_id == user_id && status.map_or(true, |wanted| entry.status == wanted)
            })
            .map(|entry| entry.clone())
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matched)
    }
}

/// Preferences keyed by user id; the entry API makes lazy creation atomic.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    rows: DashMap<i64, NotificationPreference>,
    next_id: AtomicI64,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn default_preference(&self, user_id: i64) -> NotificationPreference {
        let now = Utc::now();
        NotificationPreference {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            user_id,
            period_reminder_enabled: true,
            reminder_days_before: reminders::DEFAULT_DAYS_BEFORE,
            email_enabled: true,
            push_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn load_or_create(&self, user_id: i64) -> StoreResult<NotificationPreference> {
        let entry = self
            .rows
            .entry(user_id)
            .or_insert_with(|| self.default_preference(user_id));
        Ok(entry.clone())
    }

    async fn update(
        &self,
        user_id: i64,
        changes: PreferenceUpdate,
    ) -> StoreResult<NotificationPreference> {
        let mut entry = self
            .rows
            .entry(user_id)
            .or_insert_with(|| self.default_preference(user_id));

        if let Some(enabled) = changes.period_reminder_enabled {
            entry.period_reminder_enabled = enabled;
        }
        if let Some(days) = changes.reminder_days_before {
            entry.reminder_days_before = days;
        }
        if let Some(email) = changes.email_enabled {
            entry.email_enabled = email;
        }
        if let Some(push) = changes.push_enabled {
            entry.push_enabled = push;
        }
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }
}
