//! Audience diversity scoring for social media posts.
//!
//! A post is scored from the news domain it links to when that domain is in
//! the audience diversity table, otherwise from the topic its text falls into,
//! otherwise it gets the population mean. Both sources are z-scored against
//! fixed population statistics.

pub mod config;
pub mod context;
pub mod error;
pub mod scorer;
pub mod tables;
pub mod text;
pub mod traits;
pub mod types;
pub mod urls;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::Config;
pub use context::{DiversityContext, Normalization};
pub use error::{DiversityError, ScoringError};
pub use scorer::DiversityScorer;
pub use traits::{PassthroughUnshortener, TopicClassifier, Unshortener};
pub use types::{Platform, Post, PostScore, ScoreSource, NO_TOPIC};
