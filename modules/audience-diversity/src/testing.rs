// Test mocks for the scorer.
//
// Two mocks matching the two collaborator seams:
// - MockUnshortener (Unshortener) — HashMap-based short→final URL
// - MockTopicClassifier (TopicClassifier) — HashMap-based text→topic
//
// Both record every call so tests can assert what reached the collaborator.
// Plus helpers for building a DiversityContext and a scorer around the mocks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::context::DiversityContext;
use crate::scorer::DiversityScorer;
use crate::tables::{DomainTable, TopicTable};
use crate::traits::{TopicClassifier, Unshortener};
use crate::types::NO_TOPIC;

// ---------------------------------------------------------------------------
// MockUnshortener
// ---------------------------------------------------------------------------

/// Maps registered short URLs to their destination; anything else passes
/// through unchanged.
#[derive(Default)]
pub struct MockUnshortener {
    redirects: HashMap<String, String>,
    drop_last: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockUnshortener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, short: &str, resolved: &str) -> Self {
        self.redirects.insert(short.to_string(), resolved.to_string());
        self
    }

    /// Break the 1:1 contract by dropping the last result.
    pub fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Unshortener for MockUnshortener {
    async fn unshorten(&self, urls: &[String]) -> Vec<String> {
        self.calls.lock().unwrap().push(urls.to_vec());
        let mut out: Vec<String> = urls
            .iter()
            .map(|u| self.redirects.get(u).cloned().unwrap_or_else(|| u.clone()))
            .collect();
        if self.drop_last {
            out.pop();
        }
        out
    }
}

// ---------------------------------------------------------------------------
// MockTopicClassifier
// ---------------------------------------------------------------------------

/// Maps exact texts to topics; unregistered texts get `NO_TOPIC`.
#[derive(Default)]
pub struct MockTopicClassifier {
    topics: HashMap<String, i64>,
    fail: bool,
    panic: bool,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockTopicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, text: &str, topic: i64) -> Self {
        self.topics.insert(text.to_string(), topic);
        self
    }

    /// Every call fails, as if the model service were down.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Every call panics, as a crashing model binding would.
    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn classified_texts(&self) -> Vec<String> {
        self.calls().into_iter().flatten().collect()
    }
}

#[async_trait]
impl TopicClassifier for MockTopicClassifier {
    async fn classify_topics(&self, texts: &[String]) -> Result<Vec<i64>> {
        self.calls.lock().unwrap().push(texts.to_vec());
        if self.panic {
            panic!("topic model crashed");
        }
        if self.fail {
            bail!("topic model unavailable");
        }
        Ok(texts
            .iter()
            .map(|t| self.topics.get(t).copied().unwrap_or(NO_TOPIC))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn context_with(domains: &[(&str, f64)], topics: &[(i64, f64)]) -> DiversityContext {
    DiversityContext::new(
        DomainTable::from_entries(domains.iter().map(|&(d, v)| (d, v))),
        TopicTable::from_entries(topics.iter().copied()),
    )
}

/// Scorer wired to the given mocks. Keep the `Arc`s to inspect calls.
pub fn scorer_with(
    context: DiversityContext,
    unshortener: Arc<MockUnshortener>,
    classifier: Arc<MockTopicClassifier>,
) -> DiversityScorer {
    DiversityScorer::new(Arc::new(context), unshortener, classifier)
}
