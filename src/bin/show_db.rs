//! Prints a per-indicator summary of the store.

use anyhow::Result;
use clap::Parser;

use econ_dashboard::{config, db};

#[derive(Parser)]
#[command(name = "show_db", about = "Summarize the indicator store")]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    Cli::parse();

    let pool = db::init(&config::database_url_from_env()).await?;
    let summaries = db::indicator_summaries(&pool).await?;

    if summaries.is_empty() {
        println!("Store is empty.");
        return Ok(());
    }

    println!(
        "{:<28} | {:<24} | {:>6} | {:<10} | {:<10} | {:<20}",
        "Indicator", "Unit", "Rows", "First", "Last", "Last Synced"
    );
    println!("{}", "-".repeat(112));

    for s in summaries {
        println!(
            "{:<28} | {:<24} | {:>6} | {:<10} | {:<10} | {:<20}",
            s.name,
            s.unit.unwrap_or_else(|| "-".to_string()),
            s.observations,
            s.first_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            s.last_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            s.last_updated
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string()),
        );
    }

    Ok(())
}
