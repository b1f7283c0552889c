use anyhow::{Context, Result};

/// Runtime configuration, read once from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx connection string for the SQLite store.
    pub database_url: String,
    /// Credential for the statistics API.
    pub fred_api_key: String,
    /// Six-field cron expression for the daily refresh, evaluated in UTC.
    pub sync_cron: String,
    /// Default display lookback for view consumers.
    pub time_range: String,
}

/// Store location alone, for the operator tools that never talk to the
/// remote sources.
pub fn database_url_from_env() -> String {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://econ.db?mode=rwc".to_string())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = database_url_from_env();
        let fred_api_key =
            std::env::var("FRED_API_KEY").context("FRED_API_KEY is not set")?;
        let sync_cron =
            std::env::var("SYNC_CRON").unwrap_or_else(|_| "0 0 6 * * *".to_string());
        let time_range = std::env::var("TIME_RANGE").unwrap_or_else(|_| "5y".to_string());

        Ok(Self {
            database_url,
            fred_api_key,
            sync_cron,
            time_range,
        })
    }
}
