use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::DataPoint;

pub mod fred;
pub mod yahoo;

/// Failure of a single fetch. The sync engine treats every variant the same
/// way (skip this indicator for this pass); the variants exist so logs say
/// what actually went wrong.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no observations returned for {0}")]
    Empty(String),

    #[error("source error: {0}")]
    Source(String),
}

/// Raw observations for one series, plus the unit label when the source
/// reports one.
#[derive(Debug, Clone)]
pub struct SeriesData {
    pub unit: Option<String>,
    pub points: Vec<DataPoint>,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches observations for `series_id` from `start` through today.
    async fn fetch(&self, series_id: &str, start: NaiveDate) -> Result<SeriesData, FetchError>;
}
