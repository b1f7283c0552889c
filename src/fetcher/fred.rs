use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;

use super::{DataSource, FetchError, SeriesData};
use crate::models::DataPoint;

const BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Statistics-API adapter for FRED series.
pub struct FredFetcher {
    api_key: String,
    client: Client,
}

impl FredFetcher {
    pub fn new(api_key: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("EconDashboard/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key: api_key.trim().to_string(),
            client,
        }
    }

    /// Unit label from the series metadata endpoint. Best effort: a failure
    /// here must not sink the observation fetch.
    async fn fetch_unit(&self, series_id: &str) -> Option<String> {
        let url = format!(
            "{}/series?series_id={}&api_key={}&file_type=json",
            BASE_URL, series_id, self.api_key
        );

        let json: Value = match self.client.get(&url).send().await {
            Ok(resp) => match resp.json().await {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!(series_id, error = %e, "could not parse series metadata");
                    return None;
                }
            },
            Err(e) => {
                tracing::warn!(series_id, error = %e, "could not fetch series metadata");
                return None;
            }
        };

        json["seriess"][0]["units"].as_str().map(str::to_string)
    }

    fn parse_observations(json: &Value) -> Result<Vec<DataPoint>, FetchError> {
        let observations = json["observations"].as_array().ok_or_else(|| {
            FetchError::Malformed("no observations array in response".to_string())
        })?;

        let mut points = Vec::new();

        for obs in observations {
            // {"date": "2023-01-01", "value": "123.45"}
            if let (Some(date_str), Some(value_str)) = (obs["date"].as_str(), obs["value"].as_str())
            {
                // "." is FRED's marker for a missing observation
                if value_str == "." {
                    continue;
                }

                if let (Ok(date), Ok(value)) = (
                    NaiveDate::parse_from_str(date_str, "%Y-%m-%d"),
                    value_str.parse::<f64>(),
                ) {
                    points.push(DataPoint { date, value });
                }
            }
        }

        Ok(points)
    }
}

#[async_trait]
impl DataSource for FredFetcher {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch(&self, series_id: &str, start: NaiveDate) -> Result<SeriesData, FetchError> {
        if self.api_key.is_empty() {
            return Err(FetchError::Source("FRED API key is missing".to_string()));
        }

        let unit = self.fetch_unit(series_id).await;

        let url = format!(
            "{}/series/observations?series_id={}&api_key={}&file_type=json&observation_start={}",
            BASE_URL,
            series_id,
            self.api_key,
            start.format("%Y-%m-%d")
        );

        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Malformed(format!(
                "FRED returned {}: {}",
                status, body
            )));
        }

        let json: Value = resp.json().await?;
        let points = Self::parse_observations(&json)?;

        if points.is_empty() {
            return Err(FetchError::Empty(series_id.to_string()));
        }

        Ok(SeriesData { unit, points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_valid_response() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "123.45" },
                { "date": "2023-02-01", "value": "124.56" }
            ]
        });

        let points = FredFetcher::parse_observations(&json_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 123.45);
        assert_eq!(
            points[0].date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn parse_skips_missing_value_marker() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "." },
                { "date": "2023-02-01", "value": "100.0" }
            ]
        });

        let points = FredFetcher::parse_observations(&json_data).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 100.0);
    }

    #[test]
    fn parse_rejects_invalid_shape() {
        let json_data = json!({ "error": "bad request" });
        assert!(FredFetcher::parse_observations(&json_data).is_err());
    }
}
