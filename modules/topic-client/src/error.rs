use thiserror::Error;

pub type Result<T> = std::result::Result<T, TopicClientError>;

#[derive(Debug, Error)]
pub enum TopicClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Topic service returned {got} topics for {expected} texts")]
    Mismatch { expected: usize, got: usize },
}

impl From<reqwest::Error> for TopicClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TopicClientError::Parse(err.to_string())
        } else {
            TopicClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TopicClientError {
    fn from(err: serde_json::Error) -> Self {
        TopicClientError::Parse(err.to_string())
    }
}
