//! # Prediction Event Publisher
//!
//! Publishing surface for activated predictions. Owned by the analytics
//! consumer and injected at construction; downstream services receive the
//! events through their own `prediction.#` bindings.

use std::sync::Arc;

use tracing::info;

use crate::constants::{events, topology};
use crate::messaging::{publish_json, BrokerGateway, BrokerResult, PredictionEventEnvelope};
use crate::models::Prediction;

/// Publishes `prediction.new` events to the prediction exchange.
#[derive(Clone)]
pub struct PredictionEventPublisher {
    gateway: Arc<dyn BrokerGateway>,
}

impl PredictionEventPublisher {
    pub fn new(gateway: Arc<dyn BrokerGateway>) -> Self {
        Self { gateway }
    }

    /// Publish one activated prediction, full snapshot under `data`.
    pub async fn publish_new_prediction(&self, prediction: &Prediction) -> BrokerResult<()> {
        let envelope = PredictionEventEnvelope::for_prediction(prediction.clone());
        publish_json(
            self.gateway.as_ref(),
            topology::PREDICTION_EXCHANGE,
            events::PREDICTION_NEW,
            &envelope,
        )
        .await?;

        info!(
            user_id = prediction.user_id,
            prediction_id = prediction.id,
            routing_key = events::PREDICTION_NEW,
            "Published prediction event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{InMemoryGateway, TopologySpec};
    use crate::models::PredictionMethod;
    use chrono::{NaiveDate, Utc};

    fn prediction() -> Prediction {
        Prediction {
            id: 9,
            user_id: 7,
            predicted_start_date: NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(),
            predicted_end_date: None,
            confidence_score: 0.9,
            prediction_method: PredictionMethod::AverageCycleLength,
            based_on_cycles: 2,
            notes: None,
            is_active: true,
            actual_start_date: None,
            accuracy_days: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publishes_to_the_notification_queue() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway
            .declare_topology(&TopologySpec::notification_consumer())
            .await
            .unwrap();

        let publisher = PredictionEventPublisher::new(gateway.clone());
        publisher.publish_new_prediction(&prediction()).await.unwrap();

        assert_eq!(
            gateway
                .queue_depth(topology::NOTIFICATION_PREDICTION_QUEUE)
                .await,
            1
        );
    }

    #[tokio::test]
    async fn test_publish_surfaces_missing_exchange() {
        let gateway = Arc::new(InMemoryGateway::new());
        let publisher = PredictionEventPublisher::new(gateway);

        let result = publisher.publish_new_prediction(&prediction()).await;
        assert!(result.is_err());
    }
}
