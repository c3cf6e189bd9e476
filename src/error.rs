//! Error handling

use std::path::Path;

/// Errors raised by the adforge pipeline.
#[derive(Debug)]
pub enum AdforgeError {
    /// Fetch or API call failed
    Network(String),
    /// Image bytes could not be decoded
    Decode(image::ImageError),
    /// Canvas could not be encoded
    Encode(image::ImageError),
    /// Classifier process failed or printed nothing useful
    Subprocess(String),
    /// When DB operations fail
    Storage(sea_orm::DbErr),
    /// Local file handling failed
    Io(std::io::Error),
    /// No usable font for the requested family
    Font(String),
    /// Classifier output wasn't an `(r, g, b)` triple
    MalformedColor(String),
    /// A stored image named by a `stored:` location doesn't exist
    MissingImage(String),
    /// The ad source table is empty
    NoRecords,
    /// A listing page couldn't be scraped
    Scrape(String),
}

impl std::fmt::Display for AdforgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "Network error: {message}"),
            Self::Decode(err) => write!(f, "Failed to decode image: {err}"),
            Self::Encode(err) => write!(f, "Failed to encode image: {err}"),
            Self::Subprocess(message) => write!(f, "Classifier error: {message}"),
            Self::Storage(err) => write!(f, "Database error: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Font(family) => write!(f, "No usable font found for family {family:?}"),
            Self::MalformedColor(raw) => write!(f, "Malformed background color: {raw:?}"),
            Self::MissingImage(name) => write!(f, "Stored image not found: {name}"),
            Self::NoRecords => write!(f, "No image data found in the database"),
            Self::Scrape(message) => write!(f, "Scrape error: {message}"),
        }
    }
}

impl std::error::Error for AdforgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sea_orm::DbErr> for AdforgeError {
    fn from(err: sea_orm::DbErr) -> Self {
        AdforgeError::Storage(err)
    }
}

impl From<std::io::Error> for AdforgeError {
    fn from(err: std::io::Error) -> Self {
        AdforgeError::Io(err)
    }
}

impl From<reqwest::Error> for AdforgeError {
    fn from(err: reqwest::Error) -> Self {
        AdforgeError::Network(err.to_string())
    }
}

impl From<url::ParseError> for AdforgeError {
    fn from(err: url::ParseError) -> Self {
        AdforgeError::Network(err.to_string())
    }
}

impl AdforgeError {
    /// Wraps an I/O failure with the path it happened on.
    pub fn io_at(path: &Path, err: std::io::Error) -> Self {
        AdforgeError::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.display(), err),
        ))
    }
}
