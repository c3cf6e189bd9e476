//! Strip the background from every stored screenshot.

use adforge::clients::RemoveBgClient;
use adforge::clients::remove_bg::remove_backgrounds;
use adforge::config::setup_logging;
use adforge::db::with_storage;
use anyhow::{Context, Result, anyhow};
use clap::Parser;

/// Send stored screenshots through remove.bg and keep the results.
#[derive(Parser, Debug)]
#[command(name = "remove_backgrounds")]
struct Args {
    /// remove.bg API key
    #[arg(required = true, long, env = "REMOVE_BG_API_KEY", hide_env_values = true)]
    api_key: String,

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

    let client = RemoveBgClient::new(reqwest::Client::new(), args.api_key.clone());
    let report = with_storage(&args.database_path, async |storage| {
        remove_backgrounds(&client, storage).await
    })
    .await
    .context("Error processing images")?;

    eprintln!(
        "Extracted {} images, {} failed.",
        report.stored.len(),
        report.failures.len()
    );
    Ok(())
}
