use anyhow::{Context, Result};
use chrono::{Months, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{Catalog, FetchStrategy, IndicatorMeta};
use crate::db;
use crate::fetcher::fred::FredFetcher;
use crate::fetcher::yahoo::YahooFetcher;
use crate::fetcher::{DataSource, FetchError, SeriesData};
use crate::notify::ChangeSignal;

/// The remote source revises history, so every pass re-fetches a full fixed
/// window instead of an incremental tail.
const LOOKBACK_YEARS: u32 = 20;

/// Outcome of one sync pass. The caller gets this instead of a silent
/// fire-and-forget task: failures are listed, not lost.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Indicators whose window was fetched and committed.
    pub synced: Vec<String>,
    /// Indicators skipped this pass (fetch or commit failure).
    pub failed: Vec<String>,
    /// Requested names with no catalog entry.
    pub unknown: Vec<String>,
    /// Observation rows inserted or revised across the whole pass.
    pub rows_changed: usize,
}

impl SyncReport {
    pub fn data_changed(&self) -> bool {
        self.rows_changed > 0
    }
}

/// Reconciles the remote sources against the local store.
pub struct SyncEngine {
    pool: SqlitePool,
    statistics: Arc<dyn DataSource>,
    equities: Arc<dyn DataSource>,
    changes: Arc<ChangeSignal>,
}

impl SyncEngine {
    pub fn new(
        pool: SqlitePool,
        statistics: Arc<dyn DataSource>,
        equities: Arc<dyn DataSource>,
        changes: Arc<ChangeSignal>,
    ) -> Self {
        Self {
            pool,
            statistics,
            equities,
            changes,
        }
    }

    /// Engine wired to the real FRED and Yahoo adapters.
    pub fn with_default_sources(
        pool: SqlitePool,
        fred_api_key: String,
        changes: Arc<ChangeSignal>,
    ) -> Self {
        Self::new(
            pool,
            Arc::new(FredFetcher::new(fred_api_key)),
            Arc::new(YahooFetcher::new()),
            changes,
        )
    }

    /// Runs one sync pass over `names`, or the whole catalog when `None`.
    ///
    /// Per-indicator failures are absorbed into the report; the only `Err`
    /// is a store that cannot be reached at all, which fails the pass as a
    /// whole before any indicator is touched.
    pub async fn sync(&self, names: Option<&[String]>) -> Result<SyncReport> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("store unreachable, aborting sync pass")?;

        let mut report = SyncReport::default();

        let targets: Vec<&IndicatorMeta> = match names {
            Some(names) => {
                let mut targets = Vec::with_capacity(names.len());
                for name in names {
                    match Catalog::get(name) {
                        Some(meta) => targets.push(meta),
                        None => {
                            tracing::warn!(indicator = %name, "not found in catalog");
                            report.unknown.push(name.clone());
                        }
                    }
                }
                targets
            }
            None => Catalog::all().iter().collect(),
        };

        let window_start = Utc::now().date_naive() - Months::new(12 * LOOKBACK_YEARS);

        for meta in targets {
            match self.fetch(meta, window_start).await {
                Ok(series) => match self.store(meta.name, &series).await {
                    Ok(changed) => {
                        tracing::info!(
                            indicator = meta.name,
                            points = series.points.len(),
                            changed,
                            "indicator synced"
                        );
                        report.synced.push(meta.name.to_string());
                        report.rows_changed += changed;
                    }
                    Err(e) => {
                        tracing::error!(indicator = meta.name, error = %e, "commit failed, skipping indicator");
                        report.failed.push(meta.name.to_string());
                    }
                },
                Err(e) => {
                    tracing::warn!(indicator = meta.name, error = %e, "fetch failed, skipping indicator");
                    report.failed.push(meta.name.to_string());
                }
            }

            pace().await;
        }

        // One signal per pass, regardless of how many indicators changed.
        if report.data_changed() {
            self.changes.signal();
        }

        tracing::info!(
            synced = report.synced.len(),
            failed = report.failed.len(),
            unknown = report.unknown.len(),
            rows_changed = report.rows_changed,
            "sync pass finished"
        );

        Ok(report)
    }

    async fn fetch(
        &self,
        meta: &IndicatorMeta,
        start: chrono::NaiveDate,
    ) -> Result<SeriesData, FetchError> {
        match &meta.strategy {
            FetchStrategy::Statistics { series_id } => {
                self.statistics.fetch(series_id, start).await
            }
            FetchStrategy::EquityPrice {
                symbol,
                fallback_series_id,
            } => match self.equities.fetch(symbol, start).await {
                Ok(series) => Ok(series),
                Err(e) => {
                    tracing::warn!(
                        indicator = meta.name,
                        error = %e,
                        fallback = %fallback_series_id,
                        "equity source failed, trying statistics fallback"
                    );
                    self.statistics.fetch(fallback_series_id, start).await
                }
            },
        }
    }

    /// Commits one indicator's window in a single transaction and returns
    /// how many observation rows were actually written.
    async fn store(&self, name: &str, series: &SeriesData) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let indicator_id =
            db::upsert_indicator(&mut *tx, name, series.unit.as_deref(), Utc::now()).await?;

        let mut changed = 0;
        for point in &series.points {
            if db::upsert_observation(&mut *tx, indicator_id, point.date, point.value).await? {
                changed += 1;
            }
        }

        tx.commit().await?;
        Ok(changed)
    }
}

/// Jittered pause between indicators, to stay polite with the sources.
async fn pace() {
    let delay = {
        let mut rng = rand::thread_rng();
        rng.gen_range(300..800)
    };
    tokio::time::sleep(Duration::from_millis(delay)).await;
}
