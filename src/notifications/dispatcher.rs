//! # Notification Dispatcher
//!
//! Drives due notifications to their terminal state through a pluggable
//! delivery channel. The sweep is idempotent: terminal rows never come back
//! from the due query and the store absorbs repeated transitions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::models::{Notification, NotificationStatus};
use crate::storage::NotificationStore;

use super::NotificationResult;

/// Transport seam for notification delivery. Email and push transports are
/// deployment concerns; the core only depends on this trait.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Channel name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver one notification to the user.
    async fn deliver(&self, notification: &Notification) -> NotificationResult<()>;
}

/// Channel that records the delivery in the log and always succeeds.
/// Stands in until a real transport is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDeliveryChannel;

#[async_trait]
impl DeliveryChannel for LogDeliveryChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, notification: &Notification) -> NotificationResult<()> {
        info!(
            user_id = notification.user_id,
            kind = notification.kind.as_str(),
            title = %notification.title,
            message = %notification.message,
            "Delivering notification"
        );
        Ok(())
    }
}

/// Sends due notifications and records the outcome on each row.
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationStore>,
    channel: Arc<dyn DeliveryChannel>,
}

impl NotificationDispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        channel: Arc<dyn DeliveryChannel>,
    ) -> Self {
        Self {
            notifications,
            channel,
        }
    }

    /// Dispatch one notification and persist the terminal state. A channel
    /// failure marks the row failed with the error stored; only store
    /// failures propagate.
    pub async fn dispatch(&self, notification: &Notification) -> NotificationResult<Notification> {
        match self.channel.deliver(notification).await {
            Ok(()) => {
                let sent = self
                    .notifications
                    .mark_sent(notification.id, Utc::now())
                    .await?;
                info!(
                    notification_id = sent.id,
                    user_id = sent.user_id,
                    channel = self.channel.name(),
                    "Notification sent"
                );
                Ok(sent)
            }
            Err(delivery_error) => {
                warn!(
                    notification_id = notification.id,
                    user_id = notification.user_id,
                    channel = self.channel.name(),
                    error = %delivery_error,
                    "Notification delivery failed"
                );
                let failed = self
                    .notifications
                    .mark_failed(notification.id, delivery_error.to_string())
                    .await?;
                Ok(failed)
            }
        }
    }

    /// Dispatch every pending notification scheduled for `today` or
    /// earlier. Returns the number sent. Safe to re-run.
    pub async fn process_pending(&self, today: NaiveDate) -> NotificationResult<usize> {
        let due = self.notifications.pending_due(today).await?;
        let mut sent_count = 0;

        for notification in due {
            let dispatched = self.dispatch(&notification).await?;
            if dispatched.status == NotificationStatus::Sent {
                sent_count += 1;
            }
        }

        info!(sent_count, "Processed pending notifications");
        Ok(sent_count)
    }
}
