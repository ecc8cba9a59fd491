//! # Service Bootstrap
//!
//! Wires gateways, stores, and consumers into running services. The
//! binaries and embedding applications both go through these helpers so
//! startup keeps the same order everywhere: connect, declare topology,
//! build components, spawn the consume loop.
//!
//! Every `start_*` function has a `*_with` twin taking an injected gateway,
//! which is how tests run the full wiring over the in-memory broker.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::analytics::{AnalyticsConsumer, PredictionEventPublisher};
use crate::config::LunaraConfig;
use crate::constants::{system, topology};
use crate::error::{LunaraError, Result};
use crate::messaging::{
    AmqpGateway, BrokerError, BrokerGateway, BrokerResult, EventHandler, TopologySpec,
};
use crate::notifications::{
    DeliveryChannel, LogDeliveryChannel, NotificationDispatcher, ReminderScheduler,
};
use crate::storage::memory::{
    InMemoryAnalyticsStore, InMemoryNotificationStore, InMemoryPredictionStore,
    InMemoryPreferenceStore,
};
use crate::storage::NotificationStore;

/// A running consumer service. Dropping the handle does not stop the
/// service; call [`ServiceHandle::shutdown`].
pub struct ServiceHandle {
    service_name: &'static str,
    queue: String,
    gateway: Arc<dyn BrokerGateway>,
    consumer_task: JoinHandle<BrokerResult<()>>,
}

impl ServiceHandle {
    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    /// The gateway this service runs on, for embedding callers that also
    /// publish.
    pub fn gateway(&self) -> Arc<dyn BrokerGateway> {
        self.gateway.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.gateway.is_connected().await
    }

    /// Stop the consume loop and release the transport.
    pub async fn shutdown(self) -> Result<()> {
        info!(service = self.service_name, "Shutting down service");
        self.gateway.shutdown().await?;

        match self.consumer_task.await {
            Ok(loop_result) => loop_result.map_err(LunaraError::from),
            Err(join_error) => Err(LunaraError::from(BrokerError::consume(
                self.queue,
                format!("consumer task aborted: {join_error}"),
            ))),
        }
    }
}

/// Spawn a consume loop for `handler` and wrap it in a handle.
pub fn start_consumer_service(
    service_name: &'static str,
    gateway: Arc<dyn BrokerGateway>,
    queue: &str,
    handler: Arc<dyn EventHandler>,
) -> ServiceHandle {
    let queue = queue.to_string();
    let consumer_gateway = gateway.clone();
    let consumer_queue = queue.clone();

    let consumer_task = tokio::spawn(async move {
        let result = consumer_gateway.consume(&consumer_queue, handler).await;
        if let Err(consume_error) = &result {
            error!(queue = %consumer_queue, error = %consume_error, "Consumer loop ended with error");
        }
        result
    });

    info!(service = service_name, queue = %queue, "Consumer started");
    ServiceHandle {
        service_name,
        queue,
        gateway,
        consumer_task,
    }
}

/// Build the analytics consumer over fresh in-memory stores.
pub fn build_analytics_consumer(gateway: Arc<dyn BrokerGateway>) -> Arc<AnalyticsConsumer> {
    Arc::new(AnalyticsConsumer::new(
        Arc::new(InMemoryAnalyticsStore::new()),
        Arc::new(InMemoryPredictionStore::new()),
        PredictionEventPublisher::new(gateway),
    ))
}

/// Connect to the broker and start the analytics service.
pub async fn start_analytics_service(
    config: &LunaraConfig,
) -> Result<(ServiceHandle, Arc<AnalyticsConsumer>)> {
    info!("🚀 BOOTSTRAP: Starting analytics service");

    let broker_config = config
        .broker
        .clone()
        .with_connection_name(system::ANALYTICS_SERVICE_NAME);
    let gateway: Arc<dyn BrokerGateway> = Arc::new(AmqpGateway::connect(broker_config).await?);

    start_analytics_service_with(gateway).await
}

/// Start the analytics service on an already-connected gateway.
pub async fn start_analytics_service_with(
    gateway: Arc<dyn BrokerGateway>,
) -> Result<(ServiceHandle, Arc<AnalyticsConsumer>)> {
    gateway
        .declare_topology(&TopologySpec::analytics_consumer())
        .await?;
    gateway
        .declare_topology(&TopologySpec::prediction_publisher())
        .await?;

    let consumer = build_analytics_consumer(gateway.clone());
    let handle = start_consumer_service(
        system::ANALYTICS_SERVICE_NAME,
        gateway,
        topology::ANALYTICS_CYCLE_QUEUE,
        consumer.clone(),
    );

    info!("✅ BOOTSTRAP: Analytics service started");
    Ok((handle, consumer))
}

/// The notification service's moving parts, sharing one notification
/// store.
pub struct NotificationComponents {
    pub scheduler: Arc<ReminderScheduler>,
    pub dispatcher: Arc<NotificationDispatcher>,
}

/// Build the scheduler and dispatcher over fresh in-memory stores.
pub fn build_notification_components(
    channel: Arc<dyn DeliveryChannel>,
) -> NotificationComponents {
    let notifications: Arc<dyn NotificationStore> = Arc::new(InMemoryNotificationStore::new());
    let preferences = Arc::new(InMemoryPreferenceStore::new());

    NotificationComponents {
        scheduler: Arc::new(ReminderScheduler::new(notifications.clone(), preferences)),
        dispatcher: Arc::new(NotificationDispatcher::new(notifications, channel)),
    }
}

/// Connect to the broker and start the notification service with the log
/// delivery channel.
pub async fn start_notification_service(
    config: &LunaraConfig,
) -> Result<(ServiceHandle, NotificationComponents)> {
    info!("🚀 BOOTSTRAP: Starting notification service");

    let broker_config = config
        .broker
        .clone()
        .with_connection_name(system::NOTIFICATION_SERVICE_NAME);
    let gateway: Arc<dyn BrokerGateway> = Arc::new(AmqpGateway::connect(broker_config).await?);

    start_notification_service_with(gateway, Arc::new(LogDeliveryChannel)).await
}

/// Start the notification service on an already-connected gateway.
pub async fn start_notification_service_with(
    gateway: Arc<dyn BrokerGateway>,
    channel: Arc<dyn DeliveryChannel>,
) -> Result<(ServiceHandle, NotificationComponents)> {
    gateway
        .declare_topology(&TopologySpec::notification_consumer())
        .await?;

    let components = build_notification_components(channel);
    let handle = start_consumer_service(
        system::NOTIFICATION_SERVICE_NAME,
        gateway,
        topology::NOTIFICATION_PREDICTION_QUEUE,
        components.scheduler.clone(),
    );

    info!("✅ BOOTSTRAP: Notification service started");
    Ok((handle, components))
}
