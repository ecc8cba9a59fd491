//! # Broker Error Types
//!
//! Structured error handling for the broker gateway using thiserror
//! instead of `Box<dyn Error>` patterns.

use thiserror::Error;

/// Broker gateway error types
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Broker connection error: {message}")]
    Connection { message: String },

    #[error("Broker connection failed after {attempts} attempts: {message}")]
    ConnectionExhausted { attempts: u32, message: String },

    #[error("Topology declaration failed: {entity}: {message}")]
    Topology { entity: String, message: String },

    #[error("Publish failed: exchange {exchange}, routing key {routing_key}: {message}")]
    Publish {
        exchange: String,
        routing_key: String,
        message: String,
    },

    #[error("Consume failed: queue {queue}: {message}")]
    Consume { queue: String, message: String },

    #[error("Ack failed: queue {queue}, delivery tag {delivery_tag}: {message}")]
    Ack {
        queue: String,
        delivery_tag: u64,
        message: String,
    },

    #[error("Nack failed: queue {queue}, delivery tag {delivery_tag}: {message}")]
    Nack {
        queue: String,
        delivery_tag: u64,
        message: String,
    },

    #[error("Event serialization error: {message}")]
    Serialization { message: String },

    #[error("Gateway is shut down")]
    ShutDown,

    #[error("Internal broker error: {message}")]
    Internal { message: String },
}

impl BrokerError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a connection-exhausted error
    pub fn connection_exhausted(attempts: u32, message: impl Into<String>) -> Self {
        Self::ConnectionExhausted {
            attempts,
            message: message.into(),
        }
    }

    /// Create a topology error
    pub fn topology(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Topology {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Create a publish error
    pub fn publish(
        exchange: impl Into<String>,
        routing_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Publish {
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            message: message.into(),
        }
    }

    /// Create a consume error
    pub fn consume(queue: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Consume {
            queue: queue.into(),
            message: message.into(),
        }
    }

    /// Create an ack error
    pub fn ack(queue: impl Into<String>, delivery_tag: u64, message: impl Into<String>) -> Self {
        Self::Ack {
            queue: queue.into(),
            delivery_tag,
            message: message.into(),
        }
    }

    /// Create a nack error
    pub fn nack(queue: impl Into<String>, delivery_tag: u64, message: impl Into<String>) -> Self {
        Self::Nack {
            queue: queue.into(),
            delivery_tag,
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Conversion from serde_json::Error to BrokerError
impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        BrokerError::serialization(err.to_string())
    }
}

/// Result type alias for broker operations
pub type BrokerResult<T> = Result<T, BrokerError>;
