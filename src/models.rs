use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked economic time series, as stored in the `indicators` table.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Indicator {
    pub id: i64,
    pub name: String,
    pub unit: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One observation of an indicator. Day granularity, no time-of-day.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, FromRow)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An indicator's observations for some window, plus its unit label.
#[derive(Debug, Clone)]
pub struct StoredSeries {
    pub unit: Option<String>,
    pub points: Vec<DataPoint>,
}

/// Per-indicator summary row used by the operator CLIs.
#[derive(Debug, FromRow)]
pub struct IndicatorSummary {
    pub name: String,
    pub unit: Option<String>,
    pub observations: i64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub last_updated: Option<DateTime<Utc>>,
}
