//! # Analytics Service
//!
//! Consumes `cycle.*` events, maintains per-cycle analytics, and publishes
//! `prediction.new` events whenever a user crosses the prediction
//! threshold.

use anyhow::Result;
use lunara_core::bootstrap;
use lunara_core::config::LunaraConfig;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    lunara_core::logging::init_structured_logging();

    let config = LunaraConfig::from_env()?;
    let (handle, _consumer) = bootstrap::start_analytics_service(&config).await?;

    info!("🔄 Analytics service running... Press Ctrl+C to shutdown gracefully");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Received Ctrl+C, initiating graceful shutdown...");
        }
        result = wait_for_sigterm() => {
            match result {
                Ok(_) => info!("🛑 Received SIGTERM, initiating graceful shutdown..."),
                Err(e) => warn!("⚠️  Error setting up SIGTERM handler: {}", e),
            }
        }
    }

    handle.shutdown().await?;
    info!("✅ Analytics service shutdown complete");

    Ok(())
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
