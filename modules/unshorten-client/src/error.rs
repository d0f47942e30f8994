use thiserror::Error;

pub type Result<T> = std::result::Result<T, UnshortenError>;

#[derive(Debug, Error)]
pub enum UnshortenError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Client build error: {0}")]
    Build(String),
}

impl From<reqwest::Error> for UnshortenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            UnshortenError::Build(err.to_string())
        } else {
            UnshortenError::Network(err.to_string())
        }
    }
}
