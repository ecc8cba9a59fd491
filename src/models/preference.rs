//! Notification preferences
//!
//! Created lazily the first time a user's preference is needed, with
//! reminders enabled and the default lead time. The lead time is bounded to
//! keep reminders inside one cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::reminders;

/// Per-user notification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub id: i64,

    /// Owning user, opaque correlation key
    pub user_id: i64,

    /// Master switch for period reminders
    pub period_reminder_enabled: bool,

    /// Days ahead of the predicted start to schedule the reminder
    pub reminder_days_before: i64,

    pub email_enabled: bool,
    pub push_enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    /// Whether a lead time is inside the permitted 1..=7 day range.
    pub fn valid_reminder_days(days: i64) -> bool {
        (reminders::MIN_DAYS_BEFORE..=reminders::MAX_DAYS_BEFORE).contains(&days)
    }
}

/// Partial preference update; unset fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceUpdate {
    pub period_reminder_enabled: Option<bool>,
    pub reminder_days_before: Option<i64>,
    pub email_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
}

impl PreferenceUpdate {
    pub fn is_empty(&self) -> bool {
        self.period_reminder_enabled.is_none()
            && self.reminder_days_before.is_none()
            && self.email_enabled.is_none()
            && self.push_enabled.is_none()
    }
}
