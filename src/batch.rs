//! Sequential ad generation over stored records

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::clients::{Classifier, ImageFetcher, PhraseSource};
use crate::compose::{AdComposer, BackgroundColor, RasterImage, TextRenderer};
use crate::error::AdforgeError;

/// Everything needed to build one ad.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRecord {
    /// original screenshot, fed to the classifiers
    pub url: String,
    /// background-removed overlay, a URL or `stored:<filename>`
    pub extracted_url: String,
    /// Play Store listing
    pub google_play_url: String,
    /// App Store listing
    pub apple_app_url: String,
}

/// Output file name for record `index`, unique within a run.
pub fn ad_filename(index: usize, at: DateTime<Utc>) -> String {
    format!("Ads-{index}-{}.png", at.timestamp_millis())
}

/// A record that didn't make it.
#[derive(Debug)]
pub struct RecordFailure {
    /// position in the batch
    pub index: usize,
    /// what went wrong
    pub error: AdforgeError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// ads written, in record order
    pub produced: Vec<PathBuf>,
    /// records that were skipped
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    /// Number of ads produced.
    pub fn succeeded(&self) -> usize {
        self.produced.len()
    }
}

/// Where a batch reads and writes files.
#[derive(Clone, Debug)]
pub struct BatchDirs {
    /// downloaded source images for the classifiers
    pub work_dir: PathBuf,
    /// finished ads
    pub output_dir: PathBuf,
}

/// Runs records through phrase generation, classification and composition.
pub struct BatchDriver<P, B, F, I, R> {
    phrases: P,
    backgrounds: B,
    fonts: F,
    fetcher: I,
    composer: AdComposer<R>,
    dirs: BatchDirs,
}

impl<P, B, F, I, R> BatchDriver<P, B, F, I, R>
where
    P: PhraseSource,
    B: Classifier,
    F: Classifier,
    I: ImageFetcher,
    R: TextRenderer,
{
    /// Driver wired to its collaborators.
    pub fn new(
        phrases: P,
        backgrounds: B,
        fonts: F,
        fetcher: I,
        composer: AdComposer<R>,
        dirs: BatchDirs,
    ) -> Self {
        Self {
            phrases,
            backgrounds,
            fonts,
            fetcher,
            composer,
            dirs,
        }
    }

    /// Builds an ad for every record, one at a time in order. A record that
    /// fails is logged and skipped; only being unable to create the output
    /// directories stops the run.
    pub async fn run_batch(&self, records: &[ImageRecord]) -> Result<BatchReport, AdforgeError> {
        for dir in [&self.dirs.work_dir, &self.dirs.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|err| AdforgeError::io_at(dir, err))?;
        }

        let mut report = BatchReport::default();
        for (index, record) in records.iter().enumerate() {
            let phrase = self
                .phrases
                .generate_phrase(&record.google_play_url, &record.apple_app_url)
                .await;
            match self.create_ad(index, record, &phrase).await {
                Ok(path) => {
                    info!("Ad image created at {}", path.display());
                    report.produced.push(path);
                }
                Err(err) => {
                    error!("Error creating ad image for record {}: {}", index, err);
                    report.failures.push(RecordFailure { index, error: err });
                }
            }
        }
        info!(
            "Batch finished: {} produced, {} failed",
            report.succeeded(),
            report.failures.len()
        );
        Ok(report)
    }

    async fn create_ad(
        &self,
        index: usize,
        record: &ImageRecord,
        phrase: &str,
    ) -> Result<PathBuf, AdforgeError> {
        let local_path = self
            .dirs
            .work_dir
            .join(format!("downloaded_image_{index}.png"));
        let source = self.fetcher.fetch(&record.url).await?;
        write_file(&local_path, &source).await?;
        info!("Downloaded image to {}", local_path.display());

        let background: BackgroundColor =
            self.backgrounds.classify(&local_path).await?.parse()?;
        info!("Background color is {}", background);

        let font_family = self.fonts.classify(&local_path).await?;
        info!("Font style predicted: {}", font_family);

        let overlay = RasterImage::decode(&self.fetcher.fetch(&record.extracted_url).await?)?;
        let ad = self
            .composer
            .compose(background, &overlay, phrase, &font_family)?;

        let output = self.dirs.output_dir.join(ad_filename(index, Utc::now()));
        write_file(&output, ad.png()).await?;
        Ok(output)
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AdforgeError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|err| AdforgeError::io_at(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ad_filenames_embed_index_and_millis() {
        let at = Utc
            .timestamp_millis_opt(1_700_000_000_123)
            .single()
            .expect("timestamp");
        assert_eq!(ad_filename(4, at), "Ads-4-1700000000123.png");
        assert_ne!(ad_filename(4, at), ad_filename(5, at));
    }
}
