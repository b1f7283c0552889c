use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use econ_dashboard::config::Config;
use econ_dashboard::notify::ChangeSignal;
use econ_dashboard::sync::SyncEngine;
use econ_dashboard::{db, scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("econ_dashboard=info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = db::init(&config.database_url).await?;

    let changes = Arc::new(ChangeSignal::new());
    let engine = Arc::new(SyncEngine::with_default_sources(
        pool.clone(),
        config.fred_api_key.clone(),
        changes.clone(),
    ));

    let _scheduler = scheduler::start(pool.clone(), engine.clone(), &config.sync_cron).await?;

    // Stand-in consumer for the streaming push endpoint: drains the signal
    // and logs each refresh so connected dashboards know to re-query views.
    let refresh = changes.clone();
    tokio::spawn(async move {
        loop {
            refresh.await_and_clear().await;
            tracing::info!("new data landed, notifying dashboard consumers");
        }
    });

    tracing::info!(cron = %config.sync_cron, range = %config.time_range, "econ dashboard backend running");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
