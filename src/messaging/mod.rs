//! # Messaging Module
//!
//! Broker-agnostic event transport for the service choreography.
//! Supports RabbitMQ and in-memory backends behind the `BrokerGateway` trait.
//!
//! ## Module Structure
//!
//! - `gateway` - `BrokerGateway` / `EventHandler` traits and handler outcomes
//! - `topology` - Exchange/queue/binding specs and topic-pattern matching
//! - `envelope` - Wire shapes shared with the other services on the broker
//! - `amqp` - RabbitMQ gateway over `lapin`
//! - `in_memory` - In-process gateway for tests and embedded use
//! - `errors` - Broker error types

pub mod amqp;
pub mod envelope;
pub mod errors;
pub mod gateway;
pub mod in_memory;
pub mod topology;

// Re-export error types
pub use errors::{BrokerError, BrokerResult};

// Re-export the gateway seam
pub use gateway::{publish_json, BrokerGateway, EventHandler, GatewayStats, HandlerOutcome};

// Re-export concrete gateways
pub use amqp::AmqpGateway;
pub use in_memory::InMemoryGateway;

// Re-export topology and envelope types
pub use envelope::{CycleEventEnvelope, PredictionEventEnvelope};
pub use topology::{routing_key_matches, QueueBindingSpec, TopologySpec};
