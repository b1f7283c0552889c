//! Runs one sync pass right now, outside the cron cadence.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use econ_dashboard::config::Config;
use econ_dashboard::notify::ChangeSignal;
use econ_dashboard::sync::SyncEngine;
use econ_dashboard::db;

#[derive(Parser)]
#[command(name = "force_sync", about = "Run an ad-hoc sync pass")]
struct Cli {
    /// Indicator names to sync; omit for the full catalog
    names: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("econ_dashboard=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = db::init(&config.database_url).await?;

    let engine = SyncEngine::with_default_sources(
        pool,
        config.fred_api_key,
        Arc::new(ChangeSignal::new()),
    );

    let names = (!cli.names.is_empty()).then_some(cli.names);
    let report = engine.sync(names.as_deref()).await?;

    println!(
        "Sync finished: {} synced, {} failed, {} rows changed.",
        report.synced.len(),
        report.failed.len(),
        report.rows_changed
    );
    for name in &report.failed {
        println!("  failed: {}", name);
    }
    for name in &report.unknown {
        println!("  not found: {}", name);
    }

    if !report.unknown.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
