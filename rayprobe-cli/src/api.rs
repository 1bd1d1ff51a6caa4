///! HTTP client for the Ray dashboard REST API

use anyhow::Result;
use rayprobe_common::Endpoint;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct ApiClient {
    endpoint: Endpoint,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client for `endpoint`; `None` keeps reqwest's default (no timeout)
    pub fn new(endpoint: Endpoint, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint,
            client: builder.build()?,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint.url(path);
        tracing::debug!(method = "GET", url = %url, "API request");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed: {} - {}", status, error_text);
        }

        let data = response.json().await?;
        Ok(data)
    }
}
