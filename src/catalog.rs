use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How an indicator's raw observations are obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    /// A named series on the statistics API (FRED).
    Statistics { series_id: &'static str },
    /// Daily closing prices from the equity source, with a statistics-API
    /// series as the documented fallback when the equity source fails.
    EquityPrice {
        symbol: &'static str,
        fallback_series_id: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorMeta {
    pub name: &'static str,
    pub strategy: FetchStrategy,
    /// Daily/irregular series that get resampled for long display ranges.
    pub high_frequency: bool,
    /// Set for treasury-yield series; drives the combined "Treasury Yields"
    /// view, keyed by this label.
    pub treasury_tenor: Option<&'static str>,
}

macro_rules! fred {
    ($name:expr, $series:expr) => {
        IndicatorMeta {
            name: $name,
            strategy: FetchStrategy::Statistics { series_id: $series },
            high_frequency: false,
            treasury_tenor: None,
        }
    };
    ($name:expr, $series:expr, tenor = $tenor:expr) => {
        IndicatorMeta {
            name: $name,
            strategy: FetchStrategy::Statistics { series_id: $series },
            high_frequency: true,
            treasury_tenor: Some($tenor),
        }
    };
}

static INDICATORS: Lazy<Vec<IndicatorMeta>> = Lazy::new(|| {
    vec![
        fred!("GDP", "GDP"),
        fred!("Unemployment Rate", "UNRATE"),
        fred!("CPI (Inflation)", "CPIAUCSL"),
        fred!("PCE (Inflation)", "PCE"),
        fred!("Federal Funds Rate", "FEDFUNDS"),
        IndicatorMeta {
            name: "S&P 500 Index",
            strategy: FetchStrategy::EquityPrice {
                symbol: "^GSPC",
                fallback_series_id: "SP500",
            },
            high_frequency: true,
            treasury_tenor: None,
        },
        fred!("Trade Balance", "BOPGSTB"),
        fred!("2-Year Treasury Yield", "DGS2", tenor = "2Y"),
        fred!("10-Year Treasury Yield", "DGS10", tenor = "10Y"),
        fred!("20-Year Treasury Yield", "DGS20", tenor = "20Y"),
        fred!("M2 Money Supply", "M2SL"),
        fred!("Corporate Profits", "CP"),
        fred!("Consumer Sentiment", "UMCSENT"),
    ]
});

/// name -> index, for O(1) lookup.
static INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    INDICATORS
        .iter()
        .enumerate()
        .map(|(idx, meta)| (meta.name, idx))
        .collect()
});

pub struct Catalog;

impl Catalog {
    pub fn all() -> &'static [IndicatorMeta] {
        &INDICATORS
    }

    pub fn get(name: &str) -> Option<&'static IndicatorMeta> {
        INDEX.get(name).map(|&idx| &INDICATORS[idx])
    }

    pub fn names() -> Vec<&'static str> {
        INDICATORS.iter().map(|meta| meta.name).collect()
    }
}
