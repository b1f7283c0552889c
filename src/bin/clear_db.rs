//! Deletes one indicator (observations first) or empties the whole store.

use anyhow::Result;
use clap::Parser;

use econ_dashboard::{config, db};

#[derive(Parser)]
#[command(name = "clear_db", about = "Clear entries from the indicator store")]
struct Cli {
    /// Delete only this indicator; omit to empty both tables
    #[arg(long)]
    indicator: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pool = db::init(&config::database_url_from_env()).await?;

    match cli.indicator {
        Some(name) => {
            if db::delete_indicator(&pool, &name).await? {
                println!("All entries for indicator '{}' have been deleted.", name);
            } else {
                eprintln!("No such indicator: '{}'", name);
                std::process::exit(1);
            }
        }
        None => {
            let (indicators, observations) = db::clear_all(&pool).await?;
            println!(
                "Store emptied: {} indicators, {} observations deleted.",
                indicators, observations
            );
        }
    }

    Ok(())
}
