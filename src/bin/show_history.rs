//! Prints every stored observation for one indicator, newest first.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

use econ_dashboard::{config, db};

#[derive(Parser)]
#[command(name = "show_history", about = "Show all stored observations for an indicator")]
struct Cli {
    /// Indicator name, e.g. "Unemployment Rate"
    indicator: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pool = db::init(&config::database_url_from_env()).await?;

    let Some(indicator) = db::get_indicator(&pool, &cli.indicator).await? else {
        eprintln!("No data found for indicator: '{}'", cli.indicator);
        std::process::exit(1);
    };

    let beginning = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    let points = db::query_observations(&pool, &cli.indicator, beginning)
        .await?
        .map(|series| series.points)
        .unwrap_or_default();

    println!("Historical data for '{}':", indicator.name);
    if let Some(unit) = &indicator.unit {
        println!("Unit: {}", unit);
    }
    if let Some(at) = indicator.last_updated {
        println!("Last synced: {}", at.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("{:<12} | {:>16}", "Date", "Value");
    println!("{}", "-".repeat(31));

    for point in points.iter().rev() {
        println!("{:<12} | {:>16.4}", point.date.to_string(), point.value);
    }
    println!("{} observations.", points.len());

    Ok(())
}
