use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::db;
use crate::models::DataPoint;
use crate::timeseries::{pct_change, resample_last_monthly, resample_last_weekly};

/// Symbolic display lookback, much shorter than the sync window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    ThreeMonths,
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
    TwentyYears,
}

impl TimeRange {
    /// Unrecognized input falls back to the five-year default.
    pub fn parse(s: &str) -> Self {
        match s {
            "3m" => Self::ThreeMonths,
            "1y" => Self::OneYear,
            "3y" => Self::ThreeYears,
            "5y" => Self::FiveYears,
            "10y" => Self::TenYears,
            "20y" => Self::TwentyYears,
            _ => Self::FiveYears,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeMonths => "3m",
            Self::OneYear => "1y",
            Self::ThreeYears => "3y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::TwentyYears => "20y",
        }
    }

    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        let days = match self {
            Self::ThreeMonths => 90,
            Self::OneYear => 365,
            Self::ThreeYears => 3 * 365,
            Self::FiveYears => 5 * 365,
            Self::TenYears => 10 * 365,
            Self::TwentyYears => 20 * 365,
        };
        today - Duration::days(days)
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::FiveYears
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum ViewData {
    /// A single plotted line.
    Series(Vec<DataPoint>),
    /// Multiple labeled lines sharing one chart (the treasury tenors).
    Grouped(Vec<(String, Vec<DataPoint>)>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub name: String,
    pub unit: Option<String>,
    pub data: ViewData,
}

impl ChartView {
    fn series(name: &str, unit: Option<String>, points: Vec<DataPoint>) -> Self {
        Self {
            name: name.to_string(),
            unit,
            data: ViewData::Series(points),
        }
    }
}

const INFLATION_BASE: &str = "PCE (Inflation)";
const GDP_BASE: &str = "GDP";
const TREASURY_GROUP: &str = "Treasury Yields";
const PERCENT: &str = "Percent";

/// Output sequence for the chart grid. Names with no data for the requested
/// range are simply omitted.
const PRESENTATION_ORDER: &[&str] = &[
    "GDP",
    "GDP Change",
    "Unemployment Rate",
    "CPI (Inflation)",
    "PCE (Inflation)",
    "Inflation Rate",
    "Federal Funds Rate",
    "Treasury Yields",
    "S&P 500 Index",
    "Trade Balance",
    "M2 Money Supply",
    "Corporate Profits",
    "Consumer Sentiment",
];

/// Builds the presentation-ready view set for `range`. Read-only: derived
/// series are computed on the fly and never written back.
pub async fn build_views(pool: &SqlitePool, range: TimeRange) -> Result<Vec<ChartView>> {
    let cutoff = range.start_date(Utc::now().date_naive());
    let mut views: HashMap<&str, ChartView> = HashMap::new();

    for meta in Catalog::all() {
        let Some(series) = db::query_observations(pool, meta.name, cutoff).await? else {
            continue;
        };
        if series.points.is_empty() {
            continue;
        }

        let points = if meta.high_frequency {
            match range {
                TimeRange::ThreeYears | TimeRange::FiveYears => {
                    resample_last_weekly(&series.points)
                }
                TimeRange::TenYears | TimeRange::TwentyYears => {
                    resample_last_monthly(&series.points)
                }
                _ => series.points,
            }
        } else {
            series.points
        };

        views.insert(meta.name, ChartView::series(meta.name, series.unit, points));
    }

    // Derived series: approximate year-over-year inflation from the monthly
    // PCE index, and an annualized quarterly GDP growth rate.
    let inflation = derive(&views, INFLATION_BASE, 12, 100.0);
    if !inflation.is_empty() {
        views.insert(
            "Inflation Rate",
            ChartView::series("Inflation Rate", Some(PERCENT.to_string()), inflation),
        );
    }
    let gdp_change = derive(&views, GDP_BASE, 1, 400.0);
    if !gdp_change.is_empty() {
        views.insert(
            "GDP Change",
            ChartView::series("GDP Change", Some(PERCENT.to_string()), gdp_change),
        );
    }

    // All available tenors collapse into one multi-line chart; the
    // standalone per-tenor views disappear once merged.
    let mut tenor_columns = Vec::new();
    for meta in Catalog::all() {
        let Some(tenor) = meta.treasury_tenor else {
            continue;
        };
        if let Some(view) = views.remove(meta.name) {
            if let ViewData::Series(points) = view.data {
                tenor_columns.push((tenor.to_string(), points));
            }
        }
    }
    if !tenor_columns.is_empty() {
        views.insert(
            TREASURY_GROUP,
            ChartView {
                name: TREASURY_GROUP.to_string(),
                unit: Some(PERCENT.to_string()),
                data: ViewData::Grouped(tenor_columns),
            },
        );
    }

    let mut out = Vec::with_capacity(views.len());
    for name in PRESENTATION_ORDER {
        if let Some(view) = views.remove(name) {
            out.push(view);
        }
    }
    Ok(out)
}

fn derive(
    views: &HashMap<&str, ChartView>,
    base_name: &str,
    lag: usize,
    factor: f64,
) -> Vec<DataPoint> {
    match views.get(base_name).map(|v| &v.data) {
        Some(ViewData::Series(base)) => pct_change(base, lag, factor),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Months};

    async fn seed(pool: &SqlitePool, name: &str, unit: Option<&str>, points: &[DataPoint]) {
        let id = db::upsert_indicator(pool, name, unit, Utc::now())
            .await
            .unwrap();
        for p in points {
            db::upsert_observation(pool, id, p.date, p.value)
                .await
                .unwrap();
        }
    }

    fn find<'a>(views: &'a [ChartView], name: &str) -> Option<&'a ChartView> {
        views.iter().find(|v| v.name == name)
    }

    #[test]
    fn parse_ranges() {
        assert_eq!(TimeRange::parse("10y"), TimeRange::TenYears);
        assert_eq!(TimeRange::parse("3m"), TimeRange::ThreeMonths);
        assert_eq!(TimeRange::parse("anything else"), TimeRange::FiveYears);
    }

    #[tokio::test]
    async fn empty_store_builds_no_views() {
        let pool = db::memory_pool().await;
        let views = build_views(&pool, TimeRange::FiveYears).await.unwrap();
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn gdp_change_annualizes_quarterly_growth() {
        let pool = db::memory_pool().await;
        let today = Utc::now().date_naive();
        seed(
            &pool,
            "GDP",
            Some("Billions of Dollars"),
            &[
                DataPoint { date: today - Duration::days(200), value: 100.0 },
                DataPoint { date: today - Duration::days(110), value: 101.0 },
            ],
        )
        .await;

        let views = build_views(&pool, TimeRange::FiveYears).await.unwrap();

        let change = find(&views, "GDP Change").expect("derived GDP view");
        assert_eq!(change.unit.as_deref(), Some("Percent"));
        let ViewData::Series(points) = &change.data else {
            panic!("expected single series");
        };
        assert_eq!(points.len(), 1);
        assert!((points[0].value - 4.0).abs() < 1e-12);

        // the base series is still shown, and first in the grid
        assert_eq!(views[0].name, "GDP");
    }

    #[tokio::test]
    async fn inflation_rate_is_compounded_twelve_month_change() {
        let pool = db::memory_pool().await;
        let today = Utc::now().date_naive();

        let points: Vec<DataPoint> = (0..24)
            .map(|i| DataPoint {
                date: today - Months::new(23 - i),
                value: 100.0 * 1.01f64.powi(i as i32),
            })
            .collect();
        seed(&pool, "PCE (Inflation)", Some("Index"), &points).await;

        let views = build_views(&pool, TimeRange::ThreeYears).await.unwrap();

        let inflation = find(&views, "Inflation Rate").expect("derived inflation view");
        assert_eq!(inflation.unit.as_deref(), Some("Percent"));
        let ViewData::Series(series) = &inflation.data else {
            panic!("expected single series");
        };
        assert_eq!(series.len(), 12);

        let expected = (1.01f64.powi(12) - 1.0) * 100.0;
        for p in series {
            assert!((p.value - expected).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn long_range_resamples_equity_to_monthly_last() {
        let pool = db::memory_pool().await;
        let today = Utc::now().date_naive();

        let daily: Vec<DataPoint> = (0..700)
            .map(|i| DataPoint {
                date: today - Duration::days(699 - i),
                value: i as f64,
            })
            .collect();
        seed(&pool, "S&P 500 Index", None, &daily).await;

        let views = build_views(&pool, TimeRange::TenYears).await.unwrap();
        let spx = find(&views, "S&P 500 Index").expect("equity view");
        let ViewData::Series(monthly) = &spx.data else {
            panic!("expected single series");
        };

        let mut seen = std::collections::HashSet::new();
        for p in monthly {
            assert!(
                seen.insert((p.date.year(), p.date.month())),
                "more than one point in {}-{}",
                p.date.year(),
                p.date.month()
            );
            // each point is its month's last raw observation
            let last_raw = daily
                .iter()
                .filter(|d| d.date.year() == p.date.year() && d.date.month() == p.date.month())
                .last()
                .unwrap();
            assert_eq!(p.date, last_raw.date);
            assert_eq!(p.value, last_raw.value);
        }
    }

    #[tokio::test]
    async fn short_range_keeps_native_frequency() {
        let pool = db::memory_pool().await;
        let today = Utc::now().date_naive();

        let daily: Vec<DataPoint> = (0..60)
            .map(|i| DataPoint {
                date: today - Duration::days(59 - i),
                value: i as f64,
            })
            .collect();
        seed(&pool, "S&P 500 Index", None, &daily).await;

        let views = build_views(&pool, TimeRange::ThreeMonths).await.unwrap();
        let spx = find(&views, "S&P 500 Index").unwrap();
        let ViewData::Series(points) = &spx.data else {
            panic!("expected single series");
        };
        assert_eq!(points.len(), 60);
    }

    #[tokio::test]
    async fn treasury_tenors_merge_into_one_group() {
        let pool = db::memory_pool().await;
        let today = Utc::now().date_naive();

        let mk = |offset: f64| {
            (0..10)
                .map(|i| DataPoint {
                    date: today - Duration::days(9 - i),
                    value: offset + i as f64 * 0.01,
                })
                .collect::<Vec<_>>()
        };
        seed(&pool, "2-Year Treasury Yield", Some("Percent"), &mk(4.0)).await;
        seed(&pool, "10-Year Treasury Yield", Some("Percent"), &mk(4.5)).await;

        let views = build_views(&pool, TimeRange::OneYear).await.unwrap();

        assert!(find(&views, "2-Year Treasury Yield").is_none());
        assert!(find(&views, "10-Year Treasury Yield").is_none());

        let group = find(&views, "Treasury Yields").expect("merged view");
        assert_eq!(group.unit.as_deref(), Some("Percent"));
        let ViewData::Grouped(columns) = &group.data else {
            panic!("expected grouped data");
        };
        let labels: Vec<&str> = columns.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["2Y", "10Y"]);
        assert!(columns.iter().all(|(_, points)| points.len() == 10));
    }
}
