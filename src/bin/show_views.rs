//! Builds the chart views for a range and prints what the dashboard would
//! plot.

use anyhow::Result;
use clap::Parser;

use econ_dashboard::views::{self, TimeRange, ViewData};
use econ_dashboard::{config, db};

#[derive(Parser)]
#[command(name = "show_views", about = "Print the built chart views for a lookback range")]
struct Cli {
    /// One of 3m, 1y, 3y, 5y, 10y, 20y (anything else means 5y)
    #[arg(long, default_value = "5y")]
    range: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pool = db::init(&config::database_url_from_env()).await?;
    let range = TimeRange::parse(&cli.range);
    let charts = views::build_views(&pool, range).await?;

    if charts.is_empty() {
        println!("No data in store for range {}.", range.as_str());
        return Ok(());
    }

    println!("Views for range {}:", range.as_str());
    for chart in &charts {
        let unit = chart.unit.as_deref().unwrap_or("-");
        match &chart.data {
            ViewData::Series(points) => {
                let first = points.first().map(|p| format!("{} = {:.3}", p.date, p.value));
                let last = points.last().map(|p| format!("{} = {:.3}", p.date, p.value));
                println!(
                    "  {:<24} [{}] {} points ({} .. {})",
                    chart.name,
                    unit,
                    points.len(),
                    first.unwrap_or_default(),
                    last.unwrap_or_default(),
                );
            }
            ViewData::Grouped(columns) => {
                println!("  {:<24} [{}] {} columns", chart.name, unit, columns.len());
                for (label, points) in columns {
                    println!("    {:<8} {} points", label, points.len());
                }
            }
        }
    }

    Ok(())
}
