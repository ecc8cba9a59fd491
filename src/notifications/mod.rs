//! # Notifications
//!
//! The notification service core: a scheduler that turns prediction events
//! into period reminders, and a dispatcher that sends due reminders through
//! a pluggable delivery channel.
//!
//! ## Architecture
//!
//! - **scheduler**: `EventHandler` for the prediction queue plus the
//!   preference operations
//! - **dispatcher**: `DeliveryChannel` transport seam and the pending-sweep
//!   that drives notifications to their terminal state

pub mod dispatcher;
pub mod scheduler;

use thiserror::Error;

use crate::storage::StoreError;

pub use dispatcher::{DeliveryChannel, LogDeliveryChannel, NotificationDispatcher};
pub use scheduler::ReminderScheduler;

/// Errors from the notification pipeline.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Lead time outside the permitted range
    #[error("reminder_days_before must be between 1 and 7, got {days}")]
    InvalidReminderWindow { days: i64 },

    /// Event payload that cannot be interpreted as a prediction event
    #[error("Malformed prediction event: {message}")]
    MalformedEvent { message: String },

    /// Transport-level delivery failure, recorded on the failed row
    #[error("Delivery failed: {message}")]
    Delivery { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl NotificationError {
    pub fn invalid_reminder_window(days: i64) -> Self {
        Self::InvalidReminderWindow { days }
    }

    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::MalformedEvent {
            message: message.into(),
        }
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(error: serde_json::Error) -> Self {
        Self::MalformedEvent {
            message: error.to_string(),
        }
    }
}

pub type NotificationResult<T> = std::result::Result<T, NotificationError>;
