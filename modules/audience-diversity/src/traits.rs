// Collaborator seams for the scorer.
//
// Unshortener resolves shortened links; TopicClassifier assigns topics to text.
// Production implementations wrap the HTTP clients; tests use the mocks in
// `testing`.

use anyhow::Result;
use async_trait::async_trait;

use topic_client::TopicClient;
use unshorten_client::UnshortenClient;

#[async_trait]
pub trait Unshortener: Send + Sync {
    /// Resolve each URL to its final destination. Must return exactly one URL
    /// per input, in order; a URL that cannot be resolved comes back as-is.
    async fn unshorten(&self, urls: &[String]) -> Vec<String>;
}

#[async_trait]
pub trait TopicClassifier: Send + Sync {
    /// Assign one topic ID per text, in order. `NO_TOPIC` (-1) marks texts
    /// that fit no cluster.
    async fn classify_topics(&self, texts: &[String]) -> Result<Vec<i64>>;
}

#[async_trait]
impl Unshortener for UnshortenClient {
    async fn unshorten(&self, urls: &[String]) -> Vec<String> {
        self.resolve_all(urls).await
    }
}

#[async_trait]
impl TopicClassifier for TopicClient {
    async fn classify_topics(&self, texts: &[String]) -> Result<Vec<i64>> {
        Ok(self.transform(texts).await?)
    }
}

/// Returns URLs untouched. For inputs whose links are already expanded.
pub struct PassthroughUnshortener;

#[async_trait]
impl Unshortener for PassthroughUnshortener {
    async fn unshorten(&self, urls: &[String]) -> Vec<String> {
        urls.to_vec()
    }
}
