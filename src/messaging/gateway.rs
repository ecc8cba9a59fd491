//! # Broker Gateway Traits
//!
//! The seam between business components and the broker. Components own
//! `Arc<dyn BrokerGateway>` instances injected at construction; there is no
//! process-global publisher handle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::errors::{BrokerError, BrokerResult};
use super::topology::TopologySpec;

/// Point-in-time view of a gateway's delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayStats {
    pub published: u64,
    pub consumed: u64,
    pub acked: u64,
    pub rejected: u64,
}

/// Result of handling one delivery. Rejection is a normal, tagged outcome,
/// not an escaped error: the consume loop turns `Processed` into an ack and
/// `Rejected` into a nack without requeue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Processed,
    Rejected { reason: String },
}

impl HandlerOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, HandlerOutcome::Processed)
    }
}

/// A consumer's message callback.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stable name used in logs and consumer tags.
    fn name(&self) -> &'static str;

    /// Handle one delivery. Must be idempotent: deliveries are at-least-once
    /// and a crash between processing and ack causes redelivery.
    async fn handle(&self, routing_key: &str, payload: &[u8]) -> HandlerOutcome;
}

/// Connection-owning gateway to a topic-routed broker.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Declare the exchanges, queues, and bindings in `spec`. Durable
    /// entities, idempotent under redeclaration.
    async fn declare_topology(&self, spec: &TopologySpec) -> BrokerResult<()>;

    /// Publish a persistent JSON payload. Implementations may transparently
    /// recover a dropped connection once; a second failure surfaces.
    async fn publish(&self, exchange: &str, routing_key: &str, payload: &[u8])
        -> BrokerResult<()>;

    /// Consume from `queue`, dispatching deliveries to `handler` strictly
    /// one at a time. Returns once the gateway is shut down.
    async fn consume(&self, queue: &str, handler: Arc<dyn EventHandler>) -> BrokerResult<()>;

    /// Whether the underlying transport currently considers itself healthy.
    async fn is_connected(&self) -> bool;

    /// Stop consumers and release the transport.
    async fn shutdown(&self) -> BrokerResult<()>;
}

/// Serialize an event to JSON and publish it through `gateway`.
pub async fn publish_json<T: Serialize + Sync>(
    gateway: &dyn BrokerGateway,
    exchange: &str,
    routing_key: &str,
    event: &T,
) -> BrokerResult<()> {
    let payload = serde_json::to_vec(event).map_err(BrokerError::from)?;
    gateway.publish(exchange, routing_key, &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        assert!(HandlerOutcome::Processed.is_processed());

        let rejected = HandlerOutcome::rejected("malformed payload");
        assert!(!rejected.is_processed());
        assert!(matches!(rejected, HandlerOutcome::Rejected { reason } if reason == "malformed payload"));
    }
}
