use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; FetchRecipes/0.1)";

/// Errors raised while performing a GET request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The string is not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Connection(String),

    /// The server answered with a non-success status
    #[error("Server responded with status {0}")]
    Status(u16),

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Parse a string into an absolute http(s) URL.
pub fn parse_url(raw: &str) -> Result<Url, TransportError> {
    let url = Url::parse(raw.trim()).map_err(|_| TransportError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(TransportError::InvalidUrl(raw.to_string())),
    }
}

/// Seam over HTTP GET so the client and image loader can run against
/// in-memory transports in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch the body at `url` as raw bytes.
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;
}

/// Production transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self, TransportError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        debug!("GET {} returned {} bytes", url, body.len());
        Ok(body.to_vec())
    }
}
