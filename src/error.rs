//! Crate-level error type.
//!
//! Domain modules define their own error enums (`BrokerError`, `StoreError`,
//! `AnalyticsError`, `NotificationError`); this umbrella exists for callers
//! that cross domains, such as the service binaries and bootstrap wiring.

use thiserror::Error;

use crate::analytics::AnalyticsError;
use crate::messaging::BrokerError;
use crate::notifications::NotificationError;
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum LunaraError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl LunaraError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LunaraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_convert_into_umbrella() {
        let err: LunaraError = BrokerError::connection("refused").into();
        assert!(matches!(err, LunaraError::Broker(_)));

        let err: LunaraError = StoreError::not_found("prediction", 42).into();
        assert!(matches!(err, LunaraError::Store(_)));
    }

    #[test]
    fn test_configuration_error_display() {
        let err = LunaraError::configuration("RABBITMQ_URL is not valid UTF-8");
        let display = format!("{err}");
        assert!(display.contains("Configuration error"));
        assert!(display.contains("RABBITMQ_URL"));
    }
}
