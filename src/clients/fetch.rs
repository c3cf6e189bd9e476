//! Fetching raw image bytes

use std::future::Future;

use tracing::debug;
use url::Url;

use crate::constants::STORED_SCHEME;
use crate::db::Storage;
use crate::error::AdforgeError;

/// Gets the bytes of an image from wherever it lives.
pub trait ImageFetcher {
    /// The encoded image at `location`.
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>, AdforgeError>> + Send;
}

/// Where an image lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceLocation {
    /// Somewhere on the web
    Remote(Url),
    /// A row in `extracted_images`, written as `stored:<filename>`
    Stored(String),
}

impl SourceLocation {
    /// Parses a location. Protocol-relative `//host/..` URLs become https.
    pub fn parse(raw: &str) -> Result<Self, AdforgeError> {
        let raw = raw.trim();
        if let Some(filename) = raw
            .strip_prefix(STORED_SCHEME)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            if filename.is_empty() {
                return Err(AdforgeError::MissingImage(raw.to_string()));
            }
            return Ok(Self::Stored(filename.to_string()));
        }

        let url = match raw.strip_prefix("//") {
            Some(rest) => Url::parse(&format!("https://{rest}"))?,
            None => Url::parse(raw)?,
        };
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            other => Err(AdforgeError::Network(format!(
                "unsupported URL scheme {other:?} in {raw}"
            ))),
        }
    }
}

/// Downloads images over HTTP.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Fetcher sharing `client`.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Downloads `url`; non-2xx responses are errors.
    pub async fn download(&self, url: Url) -> Result<Vec<u8>, AdforgeError> {
        debug!("Downloading {}", url);
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AdforgeError::Network(format!(
                "Failed to fetch image from {url}: {status}"
            )));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, AdforgeError> {
        match SourceLocation::parse(location)? {
            SourceLocation::Remote(url) => self.download(url).await,
            SourceLocation::Stored(filename) => Err(AdforgeError::MissingImage(format!(
                "{filename} (no database to read from)"
            ))),
        }
    }
}

/// Fetches web images over HTTP and `stored:` images from the database.
#[derive(Clone, Debug)]
pub struct RecordFetcher<'a> {
    http: HttpFetcher,
    storage: &'a Storage,
}

impl<'a> RecordFetcher<'a> {
    /// Fetcher reading stored images from `storage`.
    pub fn new(http: HttpFetcher, storage: &'a Storage) -> Self {
        Self { http, storage }
    }
}

impl ImageFetcher for RecordFetcher<'_> {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, AdforgeError> {
        match SourceLocation::parse(location)? {
            SourceLocation::Remote(url) => self.http.download(url).await,
            SourceLocation::Stored(filename) => self.storage.extracted_image(&filename).await,
        }
    }
}
