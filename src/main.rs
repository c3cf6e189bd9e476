use std::process::ExitCode;

use adforge::batch::{BatchDirs, BatchDriver};
use adforge::clients::{
    BackgroundDetector, CommandClassifier, DominantColorClassifier, HttpFetcher, PhraseClient,
    RecordFetcher,
};
use adforge::compose::{AdComposer, FontBook, GlyphRenderer};
use adforge::config::setup_logging;
use adforge::db::with_storage;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = adforge::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return ExitCode::FAILURE;
    }

    let client = reqwest::Client::new();
    let backgrounds = if cli.in_process_background {
        BackgroundDetector::InProcess(DominantColorClassifier)
    } else {
        BackgroundDetector::Command(CommandClassifier::background_script(
            &cli.python,
            &cli.background_script,
        ))
    };
    let fonts = CommandClassifier::font_script(&cli.python, &cli.font_script, &cli.font_model);
    let composer = AdComposer::new(GlyphRenderer::new(FontBook::new(cli.font_dir.clone())));
    let dirs = BatchDirs {
        work_dir: cli.work_dir.clone(),
        output_dir: cli.output_dir.clone(),
    };

    let phrases = PhraseClient::new(client.clone(), cli.phrase_endpoint.clone());
    let http = HttpFetcher::new(client);

    let result = with_storage(&cli.database_path, async move |storage| {
        let records = storage.ad_sources().await?;
        let driver = BatchDriver::new(
            phrases,
            backgrounds,
            fonts,
            RecordFetcher::new(http, storage),
            composer,
            dirs,
        );
        driver.run_batch(&records).await
    })
    .await;

    match result {
        Ok(report) => {
            info!(
                "Created {} ads in {}",
                report.succeeded(),
                cli.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Error processing ad images: {}", err);
            ExitCode::FAILURE
        }
    }
}
