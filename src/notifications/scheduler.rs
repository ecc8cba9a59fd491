//! # Reminder Scheduler
//!
//! Turns activated predictions into scheduled period reminders, honoring
//! each user's preferences. Preferences are created lazily with defaults
//! the first time they are needed, so the scheduler never depends on the
//! identity service having provisioned anything.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::{debug, error, info, instrument};

use crate::constants::reminders;
use crate::messaging::{EventHandler, HandlerOutcome, PredictionEventEnvelope};
use crate::models::{
    NewNotification, Notification, NotificationKind, NotificationPreference, NotificationStatus,
    PreferenceUpdate,
};
use crate::storage::{NotificationStore, PreferenceStore};

use super::{NotificationError, NotificationResult};

/// Consumes prediction events and serves the preference operations.
pub struct ReminderScheduler {
    notifications: Arc<dyn NotificationStore>,
    preferences: Arc<dyn PreferenceStore>,
}

impl ReminderScheduler {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            notifications,
            preferences,
        }
    }

    /// Schedule the period reminder for an activated prediction.
    ///
    /// Creates the user's preferences with defaults if none exist yet.
    /// Users with reminders disabled get nothing and `None` is returned.
    pub async fn create_period_reminder(
        &self,
        user_id: i64,
        prediction_id: i64,
        predicted_start_date: NaiveDate,
    ) -> NotificationResult<Option<Notification>> {
        let preference = self.preferences.load_or_create(user_id).await?;

        if !preference.period_reminder_enabled {
            info!(user_id, "Period reminders disabled for user");
            return Ok(None);
        }

        let scheduled_for = predicted_start_date - Duration::days(preference.reminder_days_before);
        let message = format!(
            "Your period is predicted to start in {} days (around {}). Make sure you are prepared!",
            preference.reminder_days_before,
            predicted_start_date.format("%B %d"),
        );

        let stored = self
            .notifications
            .insert(NewNotification {
                user_id,
                prediction_id,
                kind: NotificationKind::PeriodReminder,
                title: reminders::PERIOD_REMINDER_TITLE.to_string(),
                message,
                scheduled_for,
            })
            .await?;

        info!(
            user_id,
            notification_id = stored.id,
            scheduled_for = %stored.scheduled_for,
            "Created period reminder"
        );
        Ok(Some(stored))
    }

    /// Current preferences, created with defaults on first touch.
    pub async fn preferences(&self, user_id: i64) -> NotificationResult<NotificationPreference> {
        Ok(self.preferences.load_or_create(user_id).await?)
    }

    /// Apply a partial preference update. The lead time is validated before
    /// anything is written.
    pub async fn update_preferences(
        &self,
        user_id: i64,
        changes: PreferenceUpdate,
    ) -> NotificationResult<NotificationPreference> {
        if let Some(days) = changes.reminder_days_before {
            if !NotificationPreference::valid_reminder_days(days) {
                return Err(NotificationError::invalid_reminder_window(days));
            }
        }

        let updated = self.preferences.update(user_id, changes).await?;
        info!(user_id, "Updated notification preferences");
        Ok(updated)
    }

    /// Notifications for a user, newest first, optionally filtered by status.
    pub async fn notifications_for_user(
        &self,
        user_id: i64,
        status: Option<NotificationStatus>,
    ) -> NotificationResult<Vec<Notification>> {
        Ok(self.notifications.for_user(user_id, status).await?)
    }
}

#[async_trait]
impl EventHandler for ReminderScheduler {
    fn name(&self) -> &'static str {
        "prediction-reminders"
    }

    #[instrument(skip(self, payload))]
    async fn handle(&self, routing_key: &str, payload: &[u8]) -> HandlerOutcome {
        let envelope: PredictionEventEnvelope = match serde_json::from_slice(payload) {
            Ok(envelope) => envelope,
            Err(parse_error) => {
                error!(routing_key, error = %parse_error, "Discarding undecodable prediction event");
                return HandlerOutcome::rejected(format!(
                    "undecodable prediction event: {parse_error}"
                ));
            }
        };

        debug!(
            routing_key,
            event_type = %envelope.event_type,
            prediction_id = envelope.prediction_id,
            user_id = envelope.user_id,
            "Received prediction event"
        );

        match self
            .create_period_reminder(
                envelope.user_id,
                envelope.prediction_id,
                envelope.predicted_start_date,
            )
            .await
        {
            Ok(Some(notification)) => {
                info!(
                    user_id = envelope.user_id,
                    notification_id = notification.id,
                    "Processed prediction event"
                );
                HandlerOutcome::Processed
            }
            // A disabled preference is a handled event, not a failure
            Ok(None) => HandlerOutcome::Processed,
            Err(schedule_error) => {
                error!(
                    user_id = envelope.user_id,
                    prediction_id = envelope.prediction_id,
                    error = %schedule_error,
                    "Error processing prediction event"
                );
                HandlerOutcome::rejected(schedule_error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Prediction, PredictionMethod};
    use crate::storage::memory::{InMemoryNotificationStore, InMemoryPreferenceStore};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scheduler() -> ReminderScheduler {
        ReminderScheduler::new(
            Arc::new(InMemoryNotificationStore::new()),
            Arc::new(InMemoryPreferenceStore::new()),
        )
    }

    #[tokio::test]
    async fn test_reminder_uses_default_lead_and_wording() {
        let scheduler = scheduler();

        let notification = scheduler
            .create_period_reminder(7, 9, date(2024, 3, 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(notification.scheduled_for, date(2024, 2, 27));
        assert_eq!(notification.title, "Period Reminder");
        assert_eq!(
            notification.message,
            "Your period is predicted to start in 3 days (around March 01). Make sure you are prepared!"
        );
        assert_eq!(notification.status, NotificationStatus::Pending);
        assert_eq!(notification.prediction_id, 9);

        // The preference row was created lazily with defaults
        let preference = scheduler.preferences(7).await.unwrap();
        assert!(preference.period_reminder_enabled);
        assert_eq!(preference.reminder_days_before, 3);
    }

    #[tokio::test]
    async fn test_custom_lead_time_moves_the_schedule() {
        let scheduler = scheduler();
        scheduler
            .update_preferences(
                7,
                PreferenceUpdate {
                    reminder_days_before: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let notification = scheduler
            .create_period_reminder(7, 9, date(2024, 3, 1))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(notification.scheduled_for, date(2024, 2, 25));
        assert!(notification.message.contains("in 5 days"));
    }

    #[tokio::test]
    async fn test_disabled_preference_schedules_nothing() {
        let scheduler = scheduler();
        scheduler
            .update_preferences(
                7,
                PreferenceUpdate {
                    period_reminder_enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let outcome = scheduler
            .create_period_reminder(7, 9, date(2024, 3, 1))
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert!(scheduler
            .notifications_for_user(7, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_lead_time_outside_bounds_is_rejected() {
        let scheduler = scheduler();

        for days in [0, 8, -2] {
            let error = scheduler
                .update_preferences(
                    7,
                    PreferenceUpdate {
                        reminder_days_before: Some(days),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(
                error,
                NotificationError::InvalidReminderWindow { .. }
            ));
        }

        // Nothing was persisted by the rejected updates
        assert_eq!(scheduler.preferences(7).await.unwrap().reminder_days_before, 3);
    }

    #[tokio::test]
    async fn test_prediction_event_dispatch() {
        let scheduler = scheduler();

        let prediction = Prediction {
            id: 9,
            user_id: 7,
            predicted_start_date: date(2024, 3, 1),
            predicted_end_date: None,
            confidence_score: 0.9,
            prediction_method: PredictionMethod::AverageCycleLength,
            based_on_cycles: 2,
            notes: None,
            is_active: true,
            actual_start_date: None,
            accuracy_days: None,
            created_at: Utc::now(),
        };
        let payload =
            serde_json::to_vec(&PredictionEventEnvelope::for_prediction(prediction)).unwrap();

        let outcome = scheduler.handle("prediction.new", &payload).await;
        assert!(outcome.is_processed());

        let notifications = scheduler.notifications_for_user(7, None).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].scheduled_for, date(2024, 2, 27));
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_rejected() {
        let scheduler = scheduler();

        let outcome = scheduler.handle("prediction.new", b"{broken").await;
        assert!(matches!(
            outcome,
            HandlerOutcome::Rejected { reason } if reason.starts_with("undecodable prediction event")
        ));
    }
}
