//! # In-Memory Broker Gateway
//!
//! Thread-safe in-process `BrokerGateway` for testing and embedded use.
//!
//! ## Features
//!
//! - **Topic Routing**: Full `*` / `#` wildcard semantics, same matcher as
//!   the broker-backed gateway's bindings
//! - **Thread-Safe**: Uses `tokio::sync::RwLock` for concurrent access
//! - **Deterministic Tests**: `deliver_pending` drains a queue inline,
//!   no spawned consumer or sleeps required
//!
//! ## Usage
//!
//! ```rust
//! use lunara_core::constants::topology;
//! use lunara_core::messaging::{BrokerGateway, InMemoryGateway, TopologySpec};
//!
//! # tokio_test::block_on(async {
//! let gateway = InMemoryGateway::new();
//! gateway
//!     .declare_topology(&TopologySpec::analytics_consumer())
//!     .await
//!     .unwrap();
//!
//! gateway
//!     .publish(topology::CYCLE_EXCHANGE, "cycle.new", b"{}")
//!     .await
//!     .unwrap();
//! assert_eq!(gateway.queue_depth(topology::ANALYTICS_CYCLE_QUEUE).await, 1);
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::errors::{BrokerError, BrokerResult};
use super::gateway::{BrokerGateway, EventHandler, GatewayStats, HandlerOutcome};
use super::topology::{routing_key_matches, QueueBindingSpec, TopologySpec};

/// How long the consume loop sleeps when its queue is empty.
const CONSUME_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One routed event waiting in a queue.
#[derive(Debug, Clone)]
struct QueuedEvent {
    routing_key: String,
    payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct Counters {
    total_published: AtomicU64,
    total_consumed: AtomicU64,
    total_acked: AtomicU64,
    total_rejected: AtomicU64,
}

/// In-process topic broker. A single instance stands in for the broker, so
/// tests share one across producer and consumer roles.
#[derive(Debug)]
pub struct InMemoryGateway {
    /// Exchange name to its queue bindings
    exchanges: RwLock<HashMap<String, Vec<QueueBindingSpec>>>,
    /// Queue name to pending events, FIFO
    queues: RwLock<HashMap<String, VecDeque<QueuedEvent>>>,
    running: Arc<AtomicBool>,
    stats: Counters,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            exchanges: RwLock::new(HashMap::new()),
            queues: RwLock::new(HashMap::new()),
            running: Arc::new(AtomicBool::new(true)),
            stats: Counters::default(),
        }
    }

    /// Number of events waiting in a queue. Unknown queues report zero.
    pub async fn queue_depth(&self, queue: &str) -> usize {
        let queues = self.queues.read().await;
        queues.get(queue).map(VecDeque::len).unwrap_or(0)
    }

    /// Drop all pending events from a queue.
    pub async fn clear_queue(&self, queue: &str) {
        let mut queues = self.queues.write().await;
        if let Some(pending) = queues.get_mut(queue) {
            pending.clear();
        }
    }

    /// Dispatch every event currently pending in `queue` through `handler`,
    /// inline and in order. Returns the number of events handled. Events
    /// published by the handler itself are left for a later pass, matching
    /// one sweep of a real consumer.
    pub async fn deliver_pending(
        &self,
        queue: &str,
        handler: &dyn EventHandler,
    ) -> BrokerResult<usize> {
        let initial = self.queue_depth(queue).await;
        let mut handled = 0;

        while handled < initial {
            let Some(event) = self.pop_front(queue).await? else {
                break;
            };
            self.dispatch(queue, handler, event).await;
            handled += 1;
        }

        Ok(handled)
    }

    async fn pop_front(&self, queue: &str) -> BrokerResult<Option<QueuedEvent>> {
        let mut queues = self.queues.write().await;
        match queues.get_mut(queue) {
            Some(pending) => Ok(pending.pop_front()),
            None => Err(BrokerError::consume(queue, "queue not declared")),
        }
    }

    async fn dispatch(&self, queue: &str, handler: &dyn EventHandler, event: QueuedEvent) {
        self.stats.total_consumed.fetch_add(1, Ordering::Relaxed);
        match handler.handle(&event.routing_key, &event.payload).await {
            HandlerOutcome::Processed => {
                self.stats.total_acked.fetch_add(1, Ordering::Relaxed);
                debug!(
                    queue = %queue,
                    routing_key = %event.routing_key,
                    handler = %handler.name(),
                    "Delivery processed and acked"
                );
            }
            HandlerOutcome::Rejected { reason } => {
                self.stats.total_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    queue = %queue,
                    routing_key = %event.routing_key,
                    handler = %handler.name(),
                    reason = %reason,
                    "Delivery rejected, discarded without requeue"
                );
            }
        }
    }

    /// Counters for assertions and operator visibility.
    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            published: self.stats.total_published.load(Ordering::Relaxed),
            consumed: self.stats.total_consumed.load(Ordering::Relaxed),
            acked: self.stats.total_acked.load(Ordering::Relaxed),
            rejected: self.stats.total_rejected.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl BrokerGateway for InMemoryGateway {
    async fn declare_topology(&self, spec: &TopologySpec) -> BrokerResult<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(BrokerError::ShutDown);
        }

        {
            let mut queues = self.queues.write().await;
            for binding in &spec.bindings {
                queues.entry(binding.queue.clone()).or_default();
            }
        }

        let mut exchanges = self.exchanges.write().await;
        let bindings = exchanges.entry(spec.exchange.clone()).or_default();
        for binding in &spec.bindings {
            if !bindings.contains(binding) {
                bindings.push(binding.clone());
            }
        }

        Ok(())
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
    ) -> BrokerResult<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(BrokerError::ShutDown);
        }

        let matched: Vec<String> = {
            let exchanges = self.exchanges.read().await;
            let bindings = exchanges.get(exchange).ok_or_else(|| {
                BrokerError::publish(exchange, routing_key, "exchange not declared")
            })?;
            bindings
                .iter()
                .filter(|binding| routing_key_matches(&binding.pattern, routing_key))
                .map(|binding| binding.queue.clone())
                .collect()
        };

        let mut queues = self.queues.write().await;
        for queue in matched {
            queues.entry(queue).or_default().push_back(QueuedEvent {
                routing_key: routing_key.to_string(),
                payload: payload.to_vec(),
            });
        }

        self.stats.total_published.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn consume(&self, queue: &str, handler: Arc<dyn EventHandler>) -> BrokerResult<()> {
        {
            let queues = self.queues.read().await;
            if !queues.contains_key(queue) {
                return Err(BrokerError::consume(queue, "queue not declared"));
            }
        }

        while self.running.load(Ordering::SeqCst) {
            match self.pop_front(queue).await? {
                Some(event) => self.dispatch(queue, handler.as_ref(), event).await,
                None => tokio::time::sleep(CONSUME_POLL_INTERVAL).await,
            }
        }

        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn shutdown(&self) -> BrokerResult<()> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}
