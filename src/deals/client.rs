//! JSON HTTP client for storefront APIs, using wreq with a browser profile.

use crate::config::Config;
use crate::deals::error::ScrapeError;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use wreq::{Client, RequestBuilder};
use wreq_util::Emulation;

/// Shared client for the JSON-speaking adapters.
pub struct ApiClient {
    client: Client,
    timeout_secs: u64,
}

impl ApiClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, timeout_secs: config.request_timeout_secs })
    }

    /// Performs a GET and decodes the body as JSON.
    pub async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, ScrapeError> {
        debug!("GET {}", url);
        let request = self.client.get(url);
        self.send(with_headers(request, headers), url).await
    }

    /// Performs a POST with a JSON body and decodes the response as JSON.
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Result<Value, ScrapeError> {
        debug!("POST {}", url);
        let request = self.client.post(url).json(body);
        self.send(with_headers(request, headers), url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Value, ScrapeError> {
        let response = request
            .emulation(Emulation::Chrome131)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| self.transport_error(url, source))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(ScrapeError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let body = response.text().await.map_err(|source| self.transport_error(url, source))?;

        serde_json::from_str(&body)
            .map_err(|e| ScrapeError::Decode { url: url.to_string(), reason: e.to_string() })
    }

    fn transport_error(&self, url: &str, source: wreq::Error) -> ScrapeError {
        if source.is_timeout() {
            ScrapeError::Timeout { what: format!("response from {}", url), seconds: self.timeout_secs }
        } else {
            ScrapeError::Transport { url: url.to_string(), source }
        }
    }
}

fn with_headers(mut request: RequestBuilder, headers: &[(&str, &str)]) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    request
}
