//! Core HTTP client with retry, timeouts, and CRM-specific status handling.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::retry::RetryPolicy;

/// Shape of the platform's error response body (a JSON array of these).
#[derive(Debug, serde::Deserialize)]
struct CrmErrorBody {
    #[serde(rename = "errorCode")]
    error_code: String,
    message: String,
}

/// HTTP client for the CRM platform with built-in retry and error handling.
///
/// The gateway only ever reads, so this client exposes a single verb:
/// an authenticated GET returning deserialized JSON. Retries apply to
/// the whole request (GETs are idempotent); 4xx responses are never
/// retried.
#[derive(Debug, Clone)]
pub struct CrmHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl CrmHttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Authenticated GET returning deserialized JSON, with automatic
    /// retry on retryable failures.
    #[instrument(skip(self, bearer_token), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, bearer_token: &str) -> Result<T> {
        let mut retry_policy = self
            .config
            .retry
            .as_ref()
            .map(|c| RetryPolicy::new(c.clone()));

        loop {
            match self.get_json_once(url, bearer_token).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    if let Some(ref mut policy) = retry_policy {
                        if let Some(delay) = policy.next_delay(err.retry_after()) {
                            warn!(
                                attempt = policy.attempt(),
                                delay_ms = delay.as_millis(),
                                error = %err,
                                "Request failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }

                        // Exhausted retries
                        return Err(Error::new(ErrorKind::RetriesExhausted {
                            attempts: policy.attempt(),
                        }));
                    }

                    // No retry policy configured
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Execute a single GET without retry logic.
    async fn get_json_once<T: DeserializeOwned>(&self, url: &str, bearer_token: &str) -> Result<T> {
        if self.config.enable_tracing {
            debug!("Sending request");
        }

        let response = self.inner.get(url).bearer_auth(bearer_token).send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            debug!(status, "Response received");
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);

            return Err(Error::new(ErrorKind::RateLimited { retry_after }));
        }

        if status == 401 {
            return Err(Error::new(ErrorKind::Authentication(
                "Access token rejected by the platform".to_string(),
            )));
        }

        // Retryable server errors
        if matches!(status, 500 | 502 | 503 | 504) {
            return Err(Error::new(ErrorKind::Http {
                status,
                message: format!("Server error: {}", status),
            }));
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            // The platform reports errors as a JSON array
            if let Ok(errors) = serde_json::from_str::<Vec<CrmErrorBody>>(&body) {
                if let Some(first) = errors.into_iter().next() {
                    return Err(Error::new(ErrorKind::CrmApi {
                        error_code: first.error_code,
                        message: first.message,
                    }));
                }
            }
            return Err(Error::new(ErrorKind::Http {
                status,
                message: body,
            }));
        }

        let value = response.json::<T>().await?;
        Ok(value)
    }
}
