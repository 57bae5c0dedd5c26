//! lobbywatch runtime
//!
//! - Initializes the SQLite database with schema
//! - Loads the subscription cache
//! - Spawns the delivery worker, the poller and (optionally) the status scheduler
//! - Shuts down on CTRL+C once the current tick finishes
//!
//! Usage:
//!   cargo run --release --bin lobbywatch
//!
//! Environment variables: see `PipelineConfig::from_env`

use dotenv::dotenv;
use lobbywatch::pipeline::{
    config::PipelineConfig,
    db::SqliteStore,
    delivery::{spawn_delivery_worker, LogNotifier},
    poller::Poller,
    reader::{ActivityReader, SubscriptionStore, WatermarkStore},
    status::status_task,
    subscriptions::SubscriptionCache,
};
use log::{error, info};
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize environment and logging
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚀 lobbywatch v{}", env!("CARGO_PKG_VERSION"));

    let config = PipelineConfig::from_env();

    info!("   ├─ Database: {}", config.db_path);
    info!("   ├─ Poll delay: {}ms (watermark: {})", config.poll_interval_ms, config.watermark_name);
    info!("   ├─ Events: {} | Scoreboards: {} | Status: {}",
        config.events_enabled, config.scoreboards_enabled, config.status_enabled);
    info!("   └─ Delivery: parallelism {}, delay {}ms", config.delivery_parallelism, config.delivery_delay_ms);

    // Initialize database (migrations are idempotent)
    info!("🔧 Initializing database...");
    let store = Arc::new(SqliteStore::initialize(&config.db_path, &config.schema_dir)?);
    let reader: Arc<dyn ActivityReader> = store.clone();
    let watermarks: Arc<dyn WatermarkStore> = store.clone();
    let subscription_store: Arc<dyn SubscriptionStore> = store;
    info!("✅ Database initialized");

    let subscriptions = Arc::new(SubscriptionCache::new(subscription_store));
    subscriptions.load().await?;

    let (queue, delivery_handle) = spawn_delivery_worker(
        Arc::new(LogNotifier),
        config.delivery_parallelism,
        config.delivery_delay(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller = Poller::new(&config, reader.clone(), watermarks, subscriptions.clone(), queue.clone());
    let poller_handle = tokio::spawn(poller.run(shutdown_rx.clone()));
    info!("   ├─ ✅ Poller spawned");

    let status_handle = if config.status_enabled {
        let handle = tokio::spawn(status_task(
            reader,
            subscriptions,
            queue.clone(),
            config.status_interval(),
            shutdown_rx,
        ));
        info!("   ├─ ✅ Status scheduler spawned (every {}ms)", config.status_interval_ms);
        Some(handle)
    } else {
        None
    };

    info!("   └─ ✅ Delivery worker running");
    info!("🔄 Press CTRL+C to shutdown gracefully");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
        Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = poller_handle.await {
        error!("❌ Poller task failed: {}", e);
    }
    if let Some(handle) = status_handle {
        if let Err(e) = handle.await {
            error!("❌ Status task failed: {}", e);
        }
    }

    // Last queue handle gone: worker drains the backlog and exits
    drop(queue);
    if let Err(e) = delivery_handle.await {
        error!("❌ Delivery worker failed: {}", e);
    }

    info!("✅ lobbywatch stopped");
    Ok(())
}
