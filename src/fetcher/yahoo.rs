use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::{DataSource, FetchError, SeriesData};
use crate::models::DataPoint;

/// Equity-price adapter: daily closing prices from Yahoo Finance.
pub struct YahooFetcher;

impl YahooFetcher {
    pub fn new() -> Self {
        YahooFetcher
    }
}

impl Default for YahooFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for YahooFetcher {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &str, start: NaiveDate) -> Result<SeriesData, FetchError> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| FetchError::Source(format!("failed to init Yahoo connector: {}", e)))?;

        // yahoo_finance_api speaks the `time` crate, not chrono
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let start_odt = OffsetDateTime::from_unix_timestamp(start_ts)
            .map_err(|e| FetchError::Source(format!("bad start date {}: {}", start, e)))?;
        let end_odt = OffsetDateTime::now_utc();

        let resp = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| FetchError::Source(format!("Yahoo API error: {}", e)))?;

        let quotes = resp
            .quotes()
            .map_err(|e| FetchError::Malformed(format!("failed to parse Yahoo quotes: {}", e)))?;

        // Last quote per calendar day wins; the store is day-granular.
        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for quote in quotes {
            let Some(timestamp) = Utc.timestamp_opt(quote.timestamp as i64, 0).single() else {
                continue;
            };
            by_day.insert(timestamp.date_naive(), quote.close);
        }

        if by_day.is_empty() {
            return Err(FetchError::Empty(symbol.to_string()));
        }

        let points = by_day
            .into_iter()
            .map(|(date, value)| DataPoint { date, value })
            .collect();

        Ok(SeriesData { unit: None, points })
    }
}
