//! HTTP helpers shared by the service clients.

use anyhow::Result;
use std::time::Duration;

/// Extension trait for `reqwest::Response` to handle common error patterns.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Ensure the response status is successful, returning an error with details if not.
    ///
    /// # Errors
    ///
    /// Returns an error naming `service`, the status code and the response
    /// body if the status is not 2xx.
    async fn ensure_success(self, service: &str) -> Result<Self>
    where
        Self: Sized;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn ensure_success(self, service: &str) -> Result<Self> {
        if !self.status().is_success() {
            let status = self.status();
            let error_text = self.text().await.unwrap_or_default();
            anyhow::bail!("{service} error ({status}): {}", error_text.trim());
        }
        Ok(self)
    }
}

/// Build a client whose every request is bounded by `timeout`
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn client_with_timeout(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("proctor/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
