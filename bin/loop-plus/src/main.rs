//! # Loop+ Binary
//!
//! Assembles the context from settings and the compiled-in storage plugin,
//! keeps the chat expiry sweep running, and shuts down cleanly on Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use lp_config::Settings;
use lp_core::clock::SystemClock;
use lp_core::traits::KeyValueStore;
use lp_core::{AppContext, ContextOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "storage-local")]
use lp_storage_local::LocalFileStore;

#[cfg(not(feature = "storage-local"))]
use lp_core::storage::MemoryStore;

fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(feature = "storage-local")]
async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store = LocalFileStore::open(&settings.storage.dir)
        .await
        .context("failed to open local storage")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "storage-local"))]
async fn open_store(_settings: &Settings) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    tracing::warn!("no storage plugin compiled in, state will not survive a restart");
    Ok(Arc::new(MemoryStore::new()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("invalid configuration")?;
    init_logging(&settings.log.filter);

    let store = open_store(&settings).await?;
    let options = ContextOptions {
        match_window: settings.match_window(),
        min_shared_tokens: settings.matcher.min_shared_tokens,
        thread_expiry: settings.thread_expiry(),
        sweep_every: settings.sweep_interval(),
    };
    let ctx = AppContext::start(store, Arc::new(SystemClock), options).await;

    match ctx.current_suggestion().await {
        Some(found) => tracing::info!(
            ride_id = %found.ride.id,
            driver = %found.ride.driver_name,
            overlap_minutes = found.overlap_minutes,
            "smart match available for the stored draft"
        ),
        None => tracing::info!("no smart match for the stored draft"),
    }

    tracing::info!("🚗 Loop+ running, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    ctx.shutdown().await;
    Ok(())
}
