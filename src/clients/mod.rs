//! Clients for the services the pipeline leans on
//!
//! Each collaborator sits behind a narrow trait so the batch driver can be
//! handed in-process, out-of-process or fake implementations.

pub mod classifier;
pub mod fetch;
pub mod phrase;
pub mod remove_bg;

pub use classifier::{BackgroundDetector, Classifier, CommandClassifier, DominantColorClassifier};
pub use fetch::{HttpFetcher, ImageFetcher, RecordFetcher, SourceLocation};
pub use phrase::{NumberedPhrase, PhraseClient, PhraseSource, parse_numbered_line};
pub use remove_bg::RemoveBgClient;
