//! Remote image source.
//!
//! [`ImageSource`] is the one asynchronous boundary of the gallery: given a
//! [`QueryRequest`] it returns the raw JSON payload, leaving normalization to
//! the store. [`NasaClient`] is the HTTP implementation backed by
//! [`reqwest`]. Tests substitute their own sources.

use crate::config::ApiConfig;
use crate::query::QueryRequest;
use reqwest::Url;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API answered with a non-2xx status.
    #[error("image API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("invalid API endpoint '{0}'")]
    Endpoint(String),
}

/// Something that can answer a search query with a raw payload.
pub trait ImageSource {
    fn fetch(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<serde_json::Value, FetchError>>;
}

/// HTTP client for the NASA Image and Video Library search endpoint.
#[derive(Debug, Clone)]
pub struct NasaClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl NasaClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let endpoint =
            Url::parse(&config.base_url).map_err(|_| FetchError::Endpoint(config.base_url.clone()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl ImageSource for NasaClient {
    async fn fetch(&self, request: &QueryRequest) -> Result<serde_json::Value, FetchError> {
        let url = request.url(&self.endpoint);
        tracing::debug!(url = %url, "requesting search page");
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}
