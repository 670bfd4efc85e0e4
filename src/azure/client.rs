//! HTTP executor for Azure REST API calls
//!
//! All Resource Graph queries go through [`ArgClient::post`]: a single POST
//! with bearer auth, query params, and a JSON body. A 429 response is retried
//! in place after a fixed delay; any other non-200 status is terminal.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default wait between retries of a rate-limited request
const RATE_LIMIT_DELAY: Duration = Duration::from_secs(10);

/// Per-request timeout applied to the underlying client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Terminal request failure: any non-200, non-429 response.
/// Carries the status and response body for the caller to inspect.
#[derive(Debug)]
pub struct RequestFailure {
    pub status: StatusCode,
    pub body: String,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request failed with {} - {}", self.status, self.body)
    }
}

impl std::error::Error for RequestFailure {}

/// Retry behavior on rate-limited (429) responses
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Fixed wait before each retry; no jitter, no backoff growth
    pub delay: Duration,
    /// Maximum total attempts; `None` retries until the throttle lifts
    pub max_attempts: Option<usize>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: RATE_LIMIT_DELAY,
            max_attempts: None,
        }
    }
}

/// HTTP client wrapper for Resource Graph API calls
#[derive(Clone)]
pub struct ArgClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ArgClient {
    /// Create a client with the default retry policy
    pub fn new() -> Result<Self> {
        Self::with_retry(RetryPolicy::default())
    }

    /// Create a client with an explicit retry policy
    pub fn with_retry(retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("argexport/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, retry })
    }

    /// Issue a POST and return the parsed JSON body.
    ///
    /// Retries the identical request after a fixed delay for as long as the
    /// service answers 429 (bounded by the policy's attempt cap, if any).
    pub async fn post(
        &self,
        endpoint: &Url,
        params: &[(&str, &str)],
        token: &str,
        body: &Value,
    ) -> Result<Value> {
        let mut attempts = 0usize;

        loop {
            tracing::debug!("POST {}", endpoint);

            let response = self
                .client
                .post(endpoint.clone())
                .query(params)
                .bearer_auth(token)
                .json(body)
                .send()
                .await
                .with_context(|| format!("Failed to send request to {}", endpoint))?;

            let status = response.status();
            let response_body = response
                .text()
                .await
                .context("Failed to read response body")?;

            if status == StatusCode::OK {
                return serde_json::from_str(&response_body)
                    .context("Failed to parse response JSON");
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempts += 1;
                if let Some(cap) = self.retry.max_attempts {
                    if attempts >= cap {
                        return Err(RequestFailure {
                            status,
                            body: response_body,
                        })
                        .with_context(|| {
                            format!("Still rate limited after {} attempts", attempts)
                        });
                    }
                }
                tracing::info!(
                    "Request was rate limited. Backing off for {} seconds...",
                    self.retry.delay.as_secs_f64()
                );
                tokio::time::sleep(self.retry.delay).await;
                continue;
            }

            return Err(RequestFailure {
                status,
                body: response_body,
            }
            .into());
        }
    }
}
