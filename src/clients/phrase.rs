//! Marketing phrase generation

use std::future::Future;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::constants::DEFAULT_PHRASE;
use crate::error::AdforgeError;

/// Something that can come up with a phrase for an app.
pub trait PhraseSource {
    /// A short phrase for the app listed at the two store URLs. Never fails;
    /// implementations fall back to [`DEFAULT_PHRASE`].
    fn generate_phrase(
        &self,
        google_play_url: &str,
        apple_app_url: &str,
    ) -> impl Future<Output = String> + Send;
}

/// A `N. **phrase**` line from the phrase service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberedPhrase {
    /// the list number
    pub number: u32,
    /// the text between the `**` markers
    pub text: String,
}

/// Parses a numbered markdown line: digits, `.`, one whitespace character,
/// then text wrapped in `**`. Anything after the closing `**` is ignored.
pub fn parse_numbered_line(line: &str) -> Option<NumberedPhrase> {
    let digits = line.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 {
        return None;
    }
    let number = line[..digits].parse().ok()?;

    let rest = line[digits..].strip_prefix('.')?;
    let mut chars = rest.chars();
    if !chars.next()?.is_whitespace() {
        return None;
    }
    let rest = chars.as_str().strip_prefix("**")?;
    let end = rest.find("**")?;
    let text = &rest[..end];
    if text.contains('\n') {
        return None;
    }
    Some(NumberedPhrase {
        number,
        text: text.to_string(),
    })
}

/// First numbered phrase among the service's lines, skipping headers.
pub fn first_numbered_phrase<S: AsRef<str>>(lines: &[S]) -> Option<NumberedPhrase> {
    lines
        .iter()
        .find_map(|line| parse_numbered_line(line.as_ref()))
}

#[derive(Serialize, Debug)]
struct PhraseRequest<'a> {
    google_play: &'a str,
    apple_app: &'a str,
}

/// Client for the local phrase generation service.
#[derive(Clone, Debug)]
pub struct PhraseClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PhraseClient {
    /// Client posting to `endpoint`.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn request_lines(
        &self,
        google_play_url: &str,
        apple_app_url: &str,
    ) -> Result<Vec<String>, AdforgeError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&PhraseRequest {
                google_play: google_play_url,
                apple_app: apple_app_url,
            })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AdforgeError::Network(format!(
                "phrase service returned {status}"
            )));
        }
        Ok(resp.json::<Vec<String>>().await?)
    }
}

impl PhraseSource for PhraseClient {
    async fn generate_phrase(&self, google_play_url: &str, apple_app_url: &str) -> String {
        match self.request_lines(google_play_url, apple_app_url).await {
            Ok(lines) => match first_numbered_phrase(&lines[..]) {
                Some(phrase) => {
                    info!("Selected phrase: {}", phrase.text);
                    phrase.text
                }
                None => {
                    warn!(
                        "No numbered phrase in {} lines from the phrase service",
                        lines.len()
                    );
                    DEFAULT_PHRASE.to_string()
                }
            },
            Err(err) => {
                error!("Error fetching USP phrase: {}", err);
                DEFAULT_PHRASE.to_string()
            }
        }
    }
}
