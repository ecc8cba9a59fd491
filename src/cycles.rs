//! # Cycle Event Production
//!
//! Publishing surface used by the cycle-tracking service once a cycle is
//! committed locally. Other domains learn about cycle changes only through
//! these events; there are no direct calls between services.

use std::sync::Arc;

use tracing::info;

use crate::constants::{events, topology};
use crate::messaging::{publish_json, BrokerGateway, BrokerResult, CycleEventEnvelope};
use crate::models::CycleRecord;

/// Publishes `cycle.new` events to the cycle exchange.
#[derive(Clone)]
pub struct CycleEventPublisher {
    gateway: Arc<dyn BrokerGateway>,
}

impl CycleEventPublisher {
    pub fn new(gateway: Arc<dyn BrokerGateway>) -> Self {
        Self { gateway }
    }

    /// Publish a changed cycle, full snapshot under `data`.
    ///
    /// Called after the local commit. A publish failure surfaces to the
    /// caller; the committed cycle stays committed either way.
    pub async fn publish_cycle_changed(&self, cycle: &CycleRecord) -> BrokerResult<()> {
        let envelope = CycleEventEnvelope::for_cycle(cycle.clone());
        publish_json(
            self.gateway.as_ref(),
            topology::CYCLE_EXCHANGE,
            events::CYCLE_NEW,
            &envelope,
        )
        .await?;

        info!(
            cycle_id = cycle.id,
            user_id = cycle.user_id,
            routing_key = events::CYCLE_NEW,
            "Published cycle event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{InMemoryGateway, TopologySpec};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_cycle_event_reaches_every_bound_queue() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway
            .declare_topology(&TopologySpec::cycle_publisher())
            .await
            .unwrap();
        gateway
            .declare_topology(&TopologySpec::analytics_consumer())
            .await
            .unwrap();

        let publisher = CycleEventPublisher::new(gateway.clone());
        let cycle = CycleRecord::new(3, 7, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        publisher.publish_cycle_changed(&cycle).await.unwrap();

        assert_eq!(gateway.queue_depth(topology::CYCLE_QUEUE).await, 1);
        assert_eq!(
            gateway.queue_depth(topology::ANALYTICS_CYCLE_QUEUE).await,
            1
        );
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces() {
        let gateway = Arc::new(InMemoryGateway::new());
        let publisher = CycleEventPublisher::new(gateway);

        let cycle = CycleRecord::new(3, 7, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(publisher.publish_cycle_changed(&cycle).await.is_err());
    }
}
