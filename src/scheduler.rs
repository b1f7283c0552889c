use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::catalog::Catalog;
use crate::db;
use crate::sync::SyncEngine;

/// Indicators untouched for this long are re-synced at startup. Covers the
/// restart-after-missed-cron case instead of waiting for the next slot.
const STALE_AFTER_HOURS: i64 = 24;

/// Wires the daily cron job and the startup staleness check.
pub async fn start(pool: SqlitePool, engine: Arc<SyncEngine>, cron: &str) -> Result<JobScheduler> {
    let sched = JobScheduler::new().await?;

    let job_engine = engine.clone();
    sched
        .add(Job::new_async(cron, move |_uuid, _lock| {
            let engine = job_engine.clone();
            Box::pin(async move {
                tracing::info!("running scheduled sync pass");
                if let Err(e) = engine.sync(None).await {
                    tracing::error!(error = %e, "scheduled sync pass failed");
                }
            })
        })?)
        .await?;

    // Startup check, off the startup path.
    let startup_engine = engine.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;

        let stale = match stale_indicator_names(&pool).await {
            Ok(stale) => stale,
            Err(e) => {
                tracing::error!(error = %e, "startup staleness check failed");
                return;
            }
        };

        if stale.is_empty() {
            tracing::info!("all indicators fresh, skipping startup sync");
            return;
        }

        tracing::info!(count = stale.len(), "startup sync for stale indicators");
        if let Err(e) = startup_engine.sync(Some(&stale)).await {
            tracing::error!(error = %e, "startup sync failed");
        }
    });

    sched.start().await?;
    Ok(sched)
}

/// Catalog indicators never synced, or last synced more than
/// `STALE_AFTER_HOURS` ago.
pub async fn stale_indicator_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let last_updated = db::last_updated_map(pool).await?;
    let cutoff = Utc::now() - ChronoDuration::hours(STALE_AFTER_HOURS);

    Ok(Catalog::all()
        .iter()
        .filter(|meta| match last_updated.get(meta.name) {
            Some(Some(at)) => *at < cutoff,
            _ => true,
        })
        .map(|meta| meta.name.to_string())
        .collect())
}
