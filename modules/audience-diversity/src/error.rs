use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiversityError>;

/// Startup failures: configuration and static table loading.
#[derive(Error, Debug)]
pub enum DiversityError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Table error in {path} (line {line}): {message}")]
    Table {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while scoring a batch. Per-post misses (no URL, malformed URL,
/// short text) are not errors; these abort the whole call.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Topic {0} has no entry in the topic diversity table")]
    UnknownTopic(i64),

    #[error("{stage} returned {got} results for {expected} inputs")]
    LengthMismatch {
        stage: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Topic classification failed: {0:#}")]
    Classifier(anyhow::Error),
}
