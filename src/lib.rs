//! # Lunara Core
//!
//! Event-driven core for menstrual cycle tracking. Services never call
//! each other directly: the cycle service publishes `cycle.*` events, the
//! analytics service consumes them and publishes `prediction.*` events,
//! and the notification service consumes those to schedule reminders.
//! Everything rides on a topic-routed broker behind the
//! [`messaging::BrokerGateway`] trait.
//!
//! ## Architecture
//!
//! ```text
//! cycle service ──cycle.new──> cycle_events (topic)
//!                                ├── cycle_updates_queue
//!                                └── analytics_cycle_queue ──> analytics service
//!                                                                 │
//!                                         prediction_events <─prediction.new
//!                                                 │
//!                                  notification_prediction_queue
//!                                                 │
//!                                        notification service ──> reminders
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lunara_core::bootstrap;
//! use lunara_core::config::LunaraConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     lunara_core::logging::init_structured_logging();
//!     let config = LunaraConfig::from_env()?;
//!     let (handle, _consumer) = bootstrap::start_analytics_service(&config).await?;
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod cycles;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod notifications;
pub mod storage;

pub use config::{BrokerConfig, LunaraConfig};
pub use error::{LunaraError, Result};
pub use messaging::{BrokerGateway, EventHandler, HandlerOutcome};
