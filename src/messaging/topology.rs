//! # Broker Topology
//!
//! Declarative exchange/queue/binding specs and the standard topologies for
//! each service role. Declaration is idempotent: AMQP declares are no-ops
//! when the entity already exists with the same attributes, and the
//! in-process gateway mirrors that.

use crate::constants::topology;

/// A queue and the pattern binding it to the spec's exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBindingSpec {
    pub queue: String,
    /// Topic pattern: `*` matches one word, `#` zero or more
    pub pattern: String,
}

/// One topic exchange plus the queues bound to it. Everything declared from
/// a spec is durable; lossy topologies are not used here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologySpec {
    pub exchange: String,
    pub bindings: Vec<QueueBindingSpec>,
}

impl TopologySpec {
    /// Spec for a topic exchange with no queues, for publish-only roles.
    pub fn exchange_only(exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            bindings: Vec::new(),
        }
    }

    /// Add a queue bound to this spec's exchange.
    pub fn with_queue(mut self, queue: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.bindings.push(QueueBindingSpec {
            queue: queue.into(),
            pattern: pattern.into(),
        });
        self
    }

    /// Topology declared by the cycle-tracking publisher: the cycle exchange
    /// and the durable intake queue, so cycle events survive even before any
    /// consumer has started.
    pub fn cycle_publisher() -> Self {
        Self::exchange_only(topology::CYCLE_EXCHANGE)
            .with_queue(topology::CYCLE_QUEUE, topology::CYCLE_NEW_BINDING)
    }

    /// Topology declared by the analytics consumer: its queue receives every
    /// action in the cycle domain.
    pub fn analytics_consumer() -> Self {
        Self::exchange_only(topology::CYCLE_EXCHANGE).with_queue(
            topology::ANALYTICS_CYCLE_QUEUE,
            topology::CYCLE_ALL_BINDING,
        )
    }

    /// Topology declared by the analytics service's publishing side.
    pub fn prediction_publisher() -> Self {
        Self::exchange_only(topology::PREDICTION_EXCHANGE)
    }

    /// Topology declared by the notification consumer.
    pub fn notification_consumer() -> Self {
        Self::exchange_only(topology::PREDICTION_EXCHANGE).with_queue(
            topology::NOTIFICATION_PREDICTION_QUEUE,
            topology::PREDICTION_ALL_BINDING,
        )
    }
}

/// AMQP topic match: patterns are dot-separated words where `*` consumes
/// exactly one word and `#` consumes zero or more.
pub fn routing_key_matches(pattern: &str, routing_key: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = routing_key.split('.').collect();
    match_words(&pattern, &key)
}

fn match_words(pattern: &[&str], key: &[&str]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((&"#", rest)) => {
            // `#` absorbs zero words, or one word and stays greedy
            match_words(rest, key) || (!key.is_empty() && match_words(pattern, &key[1..]))
        }
        Some((&"*", rest)) => !key.is_empty() && match_words(rest, &key[1..]),
        Some((word, rest)) => key.split_first().is_some_and(|(first, key_rest)| {
            word == first && match_words(rest, key_rest)
        }),
    }
}
