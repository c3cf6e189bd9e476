//! Download the screenshots from a Play Store listing into the database.

use adforge::config::setup_logging;
use adforge::db::with_storage;
use adforge::scrape::scrape_screenshots;
use anyhow::{Context, Result, anyhow};
use clap::Parser;

/// Scrape app screenshots into the `screenshots` table.
#[derive(Parser, Debug)]
#[command(name = "scrape_screenshots")]
struct Args {
    /// Play Store listing to scrape
    #[arg(
        default_value = "https://play.google.com/store/apps/details?id=zolve.credit.card.us&hl=en_IN&pli=1"
    )]
    page_url: String,

    /// Path to the database file
    #[arg(long, default_value = "adforge.sqlite", env = "ADFORGE_DATABASE_PATH")]
    database_path: String,

    /// Enable debug logging
    #[arg(long, env = "ADFORGE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug).map_err(|err| anyhow!("Failed to set up logging: {err}"))?;

    let client = reqwest::Client::new();
    let stored = with_storage(&args.database_path, async |storage| {
        scrape_screenshots(&client, storage, &args.page_url).await
    })
    .await
    .with_context(|| format!("Failed to scrape {}", args.page_url))?;

    eprintln!("Stored {} screenshots.", stored.len());
    Ok(())
}
