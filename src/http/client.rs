use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;

/// Thin wrapper over a configured reqwest Client.
///
/// Requests are attempted once; the timeout configured on the wrapped client
/// bounds each fetch.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET `url` and return the full response body.
    /// Non-success status codes are errors.
    #[tracing::instrument(skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let response = response
            .error_for_status()
            .with_context(|| format!("Request to {} failed", url))?;

        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        debug!(
            "Downloaded {:.2} MB",
            body.len() as f64 / (1024.0 * 1024.0)
        );

        Ok(body.to_vec())
    }
}
