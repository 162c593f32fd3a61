//! HTTP collaborator
//!
//! This module provides:
//! - The HttpTransport capability every adapter requests through
//! - A reqwest-backed client with configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries)
//! - Error sentinels that keep the forge's JSON error payload

use crate::config::AdapterConfig;
use crate::domain::{Headers, RawResponse};
use crate::error::{ConfigError, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// Performs GET requests on behalf of an adapter
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url` with the given headers.
    ///
    /// Successful bodies come back as [`RawResponse::Text`]; failures as
    /// [`RawResponse::Failure`].
    async fn get(&self, url: &str, headers: &Headers) -> RawResponse;
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(&AdapterConfig::default())
    }

    /// Create a new HTTP client from adapter configuration
    pub fn from_config(config: &AdapterConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Perform a GET request with retry logic
    async fn send_with_retry(
        &self,
        url: &str,
        headers: &Headers,
    ) -> Result<reqwest::Response, TransportError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }

            match request.send().await {
                Ok(response) => {
                    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(TransportError::rate_limit_exceeded(url));

                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            delay *= 2;
                            continue;
                        }
                        break;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(TransportError::timeout(url));
                    } else {
                        last_error = Some(TransportError::network(url, e.to_string()));
                    }

                    if attempt < self.max_retries {
                        debug!(url, attempt, "request failed, retrying");
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TransportError::network(url, "unknown error")))
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> RawResponse {
        let response = match self.send_with_retry(url, headers).await {
            Ok(response) => response,
            Err(e) => return RawResponse::Failure(e),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return RawResponse::Failure(TransportError::InvalidBody {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        };
        debug!(url, status = status.as_u16(), bytes = body.len(), "forge response");

        if status.is_success() {
            return RawResponse::Text(body);
        }

        let payload = serde_json::from_str(&body).ok();
        if status == reqwest::StatusCode::NOT_FOUND {
            RawResponse::Failure(TransportError::NotFound {
                url: url.to_string(),
                payload,
            })
        } else {
            RawResponse::Failure(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                payload,
            })
        }
    }
}
