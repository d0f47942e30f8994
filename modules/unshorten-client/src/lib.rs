pub mod error;

pub use error::{Result, UnshortenError};

use std::time::Duration;

use tracing::{debug, warn};

/// Per-request timeout used by [`UnshortenClient::default_timeout`].
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Redirect hops followed before giving up on a URL.
const MAX_REDIRECTS: usize = 10;

/// Resolves shortened links (bit.ly, t.co, ...) to the URL they finally land on
/// by issuing `HEAD` requests and following redirects.
pub struct UnshortenClient {
    client: reqwest::Client,
}

impl UnshortenClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }

    pub fn default_timeout() -> Result<Self> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Follow redirects for a single URL and return where it ends up.
    ///
    /// The final response status is not checked: a 404 at the end of the
    /// chain still tells us which domain the link points at.
    pub async fn resolve(&self, url: &str) -> Result<String> {
        let resp = self.client.head(url).send().await?;
        Ok(resp.url().to_string())
    }

    /// Resolve every URL in order. Never fails: a URL that cannot be resolved
    /// comes back unchanged, so the output is always 1:1 with the input.
    pub async fn resolve_all(&self, urls: &[String]) -> Vec<String> {
        let mut resolved = Vec::with_capacity(urls.len());
        for url in urls {
            match self.resolve(url).await {
                Ok(final_url) => {
                    if final_url != *url {
                        debug!(from = url.as_str(), to = final_url.as_str(), "Unshortened URL");
                    }
                    resolved.push(final_url);
                }
                Err(e) => {
                    warn!(url = url.as_str(), error = %e, "Failed to unshorten URL, keeping original");
                    resolved.push(url.clone());
                }
            }
        }
        resolved
    }
}
