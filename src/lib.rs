//! Economic-dashboard backend.
//!
//! Pulls macroeconomic series from FRED and an equity price source into a
//! SQLite store, detects real value changes, and builds resampled/derived
//! chart views for a requested lookback range. A daily cron pass plus a
//! startup staleness check keep the store fresh; [`notify::ChangeSignal`]
//! tells streaming consumers when new data has landed.

pub mod catalog;
pub mod config;
pub mod db;
pub mod fetcher;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod sync;
pub mod timeseries;
pub mod views;
