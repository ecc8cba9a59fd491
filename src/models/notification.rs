//! Notification rows
//!
//! Scheduled reminders waiting for the dispatch sweep. `Sent` and `Failed`
//! are absorbing states so a rerun of the sweep cannot dispatch twice.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PeriodReminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PeriodReminder => "period_reminder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    /// Terminal states absorb further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NotificationStatus::Sent | NotificationStatus::Failed)
    }
}

/// A scheduled notification for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,

    /// Recipient, opaque correlation key
    pub user_id: i64,

    /// Prediction this reminder was derived from, correlation key only
    pub prediction_id: i64,

    pub kind: NotificationKind,

    pub title: String,
    pub message: String,

    /// Day the notification becomes due for dispatch
    pub scheduled_for: NaiveDate,

    pub status: NotificationStatus,

    /// Dispatch time, set on the transition to `Sent`
    pub sent_at: Option<DateTime<Utc>>,

    /// Delivery error, set on the transition to `Failed`
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Field set for scheduling a notification; the store assigns identity,
/// pending status, and the creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub prediction_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub scheduled_for: NaiveDate,
}
