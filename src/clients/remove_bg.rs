//! remove.bg background removal

use reqwest::multipart::{Form, Part};
use tracing::{error, info};

use crate::constants::REMOVE_BG_ENDPOINT;
use crate::db::Storage;
use crate::db::entities::screenshots;
use crate::error::AdforgeError;

/// Client for the remove.bg API.
#[derive(Clone, Debug)]
pub struct RemoveBgClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl RemoveBgClient {
    /// Client authenticating with `api_key` against the public API.
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(client, api_key, REMOVE_BG_ENDPOINT)
    }

    /// Client posting somewhere other than the public API.
    pub fn with_endpoint(
        client: reqwest::Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Sends `image` off and returns the PNG with its background removed.
    pub async fn remove_background(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<Vec<u8>, AdforgeError> {
        let form = Form::new()
            .text("size", "auto")
            .part("image_file", Part::bytes(image).file_name(filename.to_string()));

        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-Api-Key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AdforgeError::Network(format!(
                "background removal failed with {status}: {body}"
            )));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Name an extracted copy of `filename` is stored under.
pub fn extracted_filename(filename: &str) -> String {
    format!("extracted_{filename}")
}

/// What a background removal run got through.
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// filenames stored in `extracted_images`
    pub stored: Vec<String>,
    /// screenshots that failed, with why
    pub failures: Vec<(String, AdforgeError)>,
}

/// Removes the background of every stored screenshot and stores the
/// results. A failing screenshot is logged and skipped.
pub async fn remove_backgrounds(
    client: &RemoveBgClient,
    storage: &Storage,
) -> Result<RemovalReport, AdforgeError> {
    let rows = storage.screenshots().await?;
    info!("Found {} images", rows.len());

    let mut report = RemovalReport::default();
    for row in rows {
        let screenshots::Model { filename, data, .. } = row;
        info!("Processing image {}", filename);
        let extracted = extracted_filename(&filename);
        let result = async {
            let data = client.remove_background(data, &filename).await?;
            storage.insert_extracted_image(&extracted, data).await
        }
        .await;
        match result {
            Ok(()) => {
                info!("Processed and stored {}", extracted);
                report.stored.push(extracted);
            }
            Err(err) => {
                error!("Error processing {}: {}", filename, err);
                report.failures.push((filename, err));
            }
        }
    }
    Ok(report)
}
