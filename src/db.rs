use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Row, SqliteExecutor};
use std::collections::HashMap;

use crate::models::{DataPoint, Indicator, IndicatorSummary, StoredSeries};

/// Opens the database and runs pending migrations.
pub async fn init(database_url: &str) -> Result<SqlitePool> {
    tracing::info!(url = %database_url, "connecting to database");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("database initialized");
    Ok(pool)
}

/// Creates the indicator if missing, otherwise refreshes its metadata.
/// A `None` unit never clobbers a unit learned from an earlier fetch.
pub async fn upsert_indicator(
    ex: impl SqliteExecutor<'_>,
    name: &str,
    unit: Option<&str>,
    synced_at: DateTime<Utc>,
) -> Result<i64> {
    let row = sqlx::query(
        "INSERT INTO indicators (name, unit, last_updated)
         VALUES ($1, $2, $3)
         ON CONFLICT (name) DO UPDATE
         SET unit = COALESCE(excluded.unit, indicators.unit),
             last_updated = excluded.last_updated
         RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .bind(synced_at)
    .fetch_one(ex)
    .await?;

    Ok(row.try_get("id")?)
}

pub async fn get_indicator(ex: impl SqliteExecutor<'_>, name: &str) -> Result<Option<Indicator>> {
    let indicator = sqlx::query_as::<_, Indicator>(
        "SELECT id, name, unit, last_updated FROM indicators WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(ex)
    .await?;

    Ok(indicator)
}

pub async fn get_indicator_id(ex: impl SqliteExecutor<'_>, name: &str) -> Result<Option<i64>> {
    let row = sqlx::query("SELECT id FROM indicators WHERE name = $1")
        .bind(name)
        .fetch_optional(ex)
        .await?;

    match row {
        Some(record) => Ok(Some(record.try_get("id")?)),
        None => Ok(None),
    }
}

/// Writes one observation, updating in place on a revision.
///
/// Returns whether a row was actually written: false means the stored value
/// for this (indicator, date) is already bit-identical, so the write was
/// skipped and no change should be counted.
pub async fn upsert_observation(
    ex: impl SqliteExecutor<'_>,
    indicator_id: i64,
    date: NaiveDate,
    value: f64,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO historical_data (indicator_id, date, value)
         VALUES ($1, $2, $3)
         ON CONFLICT (indicator_id, date) DO UPDATE
         SET value = excluded.value
         WHERE historical_data.value <> excluded.value",
    )
    .bind(indicator_id)
    .bind(date)
    .bind(value)
    .execute(ex)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All observations for `name` from `start` forward, ascending by date,
/// together with the indicator's unit. `None` if the indicator is unknown.
pub async fn query_observations(
    pool: &SqlitePool,
    name: &str,
    start: NaiveDate,
) -> Result<Option<StoredSeries>> {
    let indicator = sqlx::query("SELECT id, unit FROM indicators WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    let Some(indicator) = indicator else {
        return Ok(None);
    };

    let id: i64 = indicator.try_get("id")?;
    let unit: Option<String> = indicator.try_get("unit")?;

    let points = sqlx::query_as::<_, DataPoint>(
        "SELECT date, value FROM historical_data
         WHERE indicator_id = $1 AND date >= $2
         ORDER BY date ASC",
    )
    .bind(id)
    .bind(start)
    .fetch_all(pool)
    .await?;

    Ok(Some(StoredSeries { unit, points }))
}

/// name -> last_updated for every stored indicator.
pub async fn last_updated_map(
    pool: &SqlitePool,
) -> Result<HashMap<String, Option<DateTime<Utc>>>> {
    let rows = sqlx::query("SELECT name, last_updated FROM indicators")
        .fetch_all(pool)
        .await?;

    let mut map = HashMap::new();
    for row in rows {
        let name: String = row.try_get("name")?;
        let last_updated: Option<DateTime<Utc>> = row.try_get("last_updated")?;
        map.insert(name, last_updated);
    }
    Ok(map)
}

/// Per-indicator row counts and date ranges for the operator CLIs.
pub async fn indicator_summaries(pool: &SqlitePool) -> Result<Vec<IndicatorSummary>> {
    let rows = sqlx::query_as::<_, IndicatorSummary>(
        "SELECT
             i.name,
             i.unit,
             COUNT(h.date) AS observations,
             MIN(h.date) AS first_date,
             MAX(h.date) AS last_date,
             i.last_updated
         FROM indicators i
         LEFT JOIN historical_data h ON h.indicator_id = i.id
         GROUP BY i.id
         ORDER BY i.name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes one indicator and its observations (observations first, same
/// transaction). Returns false if the name is unknown.
pub async fn delete_indicator(pool: &SqlitePool, name: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let Some(id) = get_indicator_id(&mut *tx, name).await? else {
        return Ok(false);
    };

    sqlx::query("DELETE FROM historical_data WHERE indicator_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM indicators WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Empties both tables. Returns (indicators, observations) deleted.
pub async fn clear_all(pool: &SqlitePool) -> Result<(u64, u64)> {
    let mut tx = pool.begin().await?;

    let observations = sqlx::query("DELETE FROM historical_data")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let indicators = sqlx::query("DELETE FROM indicators")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok((indicators, observations))
}

/// In-memory pool for unit tests. Single connection: each SQLite `:memory:`
/// connection is its own database.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn upsert_indicator_keeps_learned_unit() {
        let pool = memory_pool().await;

        let id = upsert_indicator(&pool, "GDP", Some("Billions of Dollars"), Utc::now())
            .await
            .unwrap();
        let id2 = upsert_indicator(&pool, "GDP", None, Utc::now()).await.unwrap();
        assert_eq!(id, id2);

        let series = query_observations(&pool, "GDP", date(2000, 1, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(series.unit.as_deref(), Some("Billions of Dollars"));
    }

    #[tokio::test]
    async fn upsert_observation_reports_real_writes_only() {
        let pool = memory_pool().await;
        let id = upsert_indicator(&pool, "GDP", None, Utc::now()).await.unwrap();
        let d = date(2024, 1, 1);

        assert!(upsert_observation(&pool, id, d, 100.0).await.unwrap());
        assert!(!upsert_observation(&pool, id, d, 100.0).await.unwrap());
        assert!(upsert_observation(&pool, id, d, 100.5).await.unwrap());

        let series = query_observations(&pool, "GDP", date(2000, 1, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].value, 100.5);
    }

    #[tokio::test]
    async fn delete_indicator_removes_observations() {
        let pool = memory_pool().await;
        let id = upsert_indicator(&pool, "GDP", None, Utc::now()).await.unwrap();
        upsert_observation(&pool, id, date(2024, 1, 1), 1.0).await.unwrap();
        upsert_observation(&pool, id, date(2024, 4, 1), 2.0).await.unwrap();

        assert!(delete_indicator(&pool, "GDP").await.unwrap());
        assert!(!delete_indicator(&pool, "GDP").await.unwrap());

        let orphans: i64 = sqlx::query("SELECT COUNT(*) AS n FROM historical_data")
            .fetch_one(&pool)
            .await
            .unwrap()
            .try_get("n")
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn query_observations_unknown_indicator_is_none() {
        let pool = memory_pool().await;
        assert!(query_observations(&pool, "Nope", date(2000, 1, 1))
            .await
            .unwrap()
            .is_none());
    }
}
