pub mod error;

pub use error::{Result, TopicClientError};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Topic ID the model assigns to texts that fit no cluster.
pub const OUTLIER_TOPIC: i64 = -1;

#[derive(Debug, Serialize)]
struct TransformRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct TransformResponse {
    topics: Vec<i64>,
}

/// Client for a hosted topic model exposing `POST /transform`.
///
/// Request: `{"texts": ["...", ...]}`. Response: `{"topics": [3, -1, ...]}`,
/// one topic per text in request order.
pub struct TopicClient {
    client: reqwest::Client,
    base_url: String,
}

impl TopicClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Assign a topic to every text. Order and count match the input.
    pub async fn transform(&self, texts: &[String]) -> Result<Vec<i64>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = format!("{}/transform", self.base_url);
        let resp = self
            .client
            .post(&endpoint)
            .json(&TransformRequest { texts })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TopicClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let parsed: TransformResponse = serde_json::from_str(&body)?;
        if parsed.topics.len() != texts.len() {
            return Err(TopicClientError::Mismatch {
                expected: texts.len(),
                got: parsed.topics.len(),
            });
        }

        tracing::debug!(count = texts.len(), "Topic model transform complete");
        Ok(parsed.topics)
    }
}
