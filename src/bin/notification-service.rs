//! # Notification Service
//!
//! Consumes `prediction.*` events to schedule period reminders, and sweeps
//! due reminders through the delivery channel on a fixed interval.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use lunara_core::bootstrap;
use lunara_core::config::LunaraConfig;
use tracing::{info, warn};

const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<()> {
    lunara_core::logging::init_structured_logging();

    let config = LunaraConfig::from_env()?;
    let (handle, components) = bootstrap::start_notification_service(&config).await?;

    let sweep_interval = sweep_interval_from_env();
    let mut sweep = tokio::time::interval(sweep_interval);
    // The first tick fires immediately; consume it so startup does not
    // double-send reminders scheduled in a previous run
    sweep.tick().await;

    info!(
        sweep_interval_seconds = sweep_interval.as_secs(),
        "🔄 Notification service running... Press Ctrl+C to shutdown gracefully"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Received Ctrl+C, initiating graceful shutdown...");
                break;
            }
            result = wait_for_sigterm() => {
                match result {
                    Ok(_) => info!("🛑 Received SIGTERM, initiating graceful shutdown..."),
                    Err(e) => warn!("⚠️  Error setting up SIGTERM handler: {}", e),
                }
                break;
            }
            _ = sweep.tick() => {
                let today = Utc::now().date_naive();
                match components.dispatcher.process_pending(today).await {
                    Ok(sent) => info!(sent, "Reminder sweep complete"),
                    Err(e) => warn!("Reminder sweep failed: {}", e),
                }
            }
        }
    }

    handle.shutdown().await?;
    info!("✅ Notification service shutdown complete");

    Ok(())
}

fn sweep_interval_from_env() -> Duration {
    let seconds = std::env::var("LUNARA_SWEEP_INTERVAL_SECONDS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECONDS);
    Duration::from_secs(seconds.max(1))
}

/// Wait for SIGTERM signal (for container deployments)
#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    std::future::pending::<()>().await;
    Ok(())
}
