//! Register the inputs for one ad.

use adforge::batch::ImageRecord;
use adforge::config::setup_logging;
use adforge::db::with_storage;
use anyhow::{Context, Result, anyhow};
use clap::Parser;

/// Add a row to `ad_sources`.
///
///   add_ad_source <screenshot url> stored:extracted_screenshot_1.jpg <play url> <app store url>
#[derive(Parser, Debug)]
#[command(name = "add_ad_source")]
struct Args {
    /// Original screenshot, used for color and font detection
    url: String,

    /// Background-removed overlay: a URL or `stored:<filename>`
    extracted_url: String,

    /// Play Store listing
    google_play_url: String,

    /// App Store listing
    apple_app_url: String,

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

    let record = ImageRecord {
        url: args.url,
        extracted_url: args.extracted_url,
        google_play_url: args.google_play_url,
        apple_app_url: args.apple_app_url,
    };
    let id = with_storage(&args.database_path, async |storage| {
        storage.insert_ad_source(&record).await
    })
    .await
    .context("Failed to store ad source")?;

    eprintln!("Stored ad source {id}.");
    Ok(())
}
