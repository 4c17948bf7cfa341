//! Retrying HTTP client
//!
//! Issues GET requests against the bibliographic API with bounded retries,
//! a fixed inter-request delay, and exponential backoff on rate limiting and
//! errors. Each client owns its own request counter and start time; nothing
//! is process-global.

use async_trait::async_trait;
use citegraph_common::errors::{AppError, Result};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Raw response handed back by the transport seam
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// The network seam. The production implementation is reqwest-backed;
/// tests script responses through a mock.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issue one GET; `Err` means a network-level fault before any status
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<ApiResponse>;
}

/// reqwest-backed transport with a per-request socket timeout
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<ApiResponse> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

/// Retry and rate-limit policy for one client instance
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per request (>= 1)
    pub max_retries: u32,
    /// Base delay between requests (> 0)
    pub delay: Duration,
}

/// HTTP client with retry logic and rate limiting
pub struct ApiClient {
    transport: Box<dyn ApiTransport>,
    policy: RetryPolicy,
    request_count: u64,
    started: Instant,
}

impl ApiClient {
    pub fn new(transport: Box<dyn ApiTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            request_count: 0,
            started: Instant::now(),
        }
    }

    /// Issue one GET with retry logic, returning the parsed JSON body.
    ///
    /// Retries transport faults and non-200 statuses with exponential
    /// backoff until the retry budget is spent, then fails with
    /// [`AppError::ExhaustedRetries`] carrying the last failure. A 200
    /// response whose body is not valid JSON is terminal, not retried.
    pub async fn request(&mut self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut last_failure: Option<AppError> = None;

        for attempt in 0..self.policy.max_retries {
            // Rate limiting: fixed delay before every request after the first
            if self.request_count > 0 {
                tokio::time::sleep(self.policy.delay).await;
            }

            match self.transport.get(url, params).await {
                Ok(response) => {
                    self.request_count += 1;

                    match response.status {
                        200 => return Ok(serde_json::from_str(&response.body)?),
                        429 => {
                            let wait = self.backoff(attempt);
                            warn!(
                                wait_secs = wait.as_secs_f64(),
                                attempt = attempt + 1,
                                "Rate limited, backing off before retry"
                            );
                            tokio::time::sleep(wait).await;
                            last_failure = Some(AppError::RateLimited);
                        }
                        status => {
                            error!(status, attempt = attempt + 1, "Unexpected HTTP status");
                            last_failure = Some(AppError::UnexpectedStatus { status });
                            if attempt + 1 < self.policy.max_retries {
                                tokio::time::sleep(self.backoff(attempt)).await;
                            }
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, attempt = attempt + 1, "Request failed");
                    if err.is_retryable() && attempt + 1 < self.policy.max_retries {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                    last_failure = Some(err);
                }
            }
        }

        Err(AppError::ExhaustedRetries {
            attempts: self.policy.max_retries,
            last: Box::new(last_failure.unwrap_or(AppError::Transport {
                message: "no attempts were made".to_string(),
            })),
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(self.policy.delay.as_secs_f64() * 2f64.powi(attempt as i32))
    }

    /// Requests that reached the network over this client's lifetime
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Wall seconds since this client was constructed
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{test_client, ScriptedTransport};
    use super::*;

    #[tokio::test]
    async fn test_succeeds_after_rate_limiting() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(429, ""),
            ScriptedTransport::ok(429, ""),
            ScriptedTransport::ok(200, r#"{"results": []}"#),
        ]);
        let mut client = test_client(Box::new(transport), 3);

        let body = client.request("https://api.test/works", &[]).await.unwrap();
        assert!(body.get("results").is_some());
        assert_eq!(client.request_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausts_retries_on_server_errors() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(500, ""),
            ScriptedTransport::ok(500, ""),
            ScriptedTransport::ok(500, ""),
        ]);
        let mut client = test_client(Box::new(transport), 3);

        let err = client.request("https://api.test/works", &[]).await.unwrap_err();
        match err {
            AppError::ExhaustedRetries { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, AppError::UnexpectedStatus { status: 500 }));
            }
            other => panic!("expected ExhaustedRetries, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retries_transport_faults() {
        let transport = ScriptedTransport::new(vec![
            Err(AppError::Transport {
                message: "connection reset".to_string(),
            }),
            ScriptedTransport::ok(200, "{}"),
        ]);
        let mut client = test_client(Box::new(transport), 3);

        assert!(client.request("https://api.test/works", &[]).await.is_ok());
        // The failed attempt never reached a response, so only one counts
        assert_eq!(client.request_count(), 1);
    }

    #[test]
    fn test_invalid_json_body_is_terminal() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(200, "not json")]);
        let mut client = test_client(Box::new(transport), 3);

        let err = tokio_test::block_on(client.request("https://api.test/works", &[])).unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
        assert_eq!(client.request_count(), 1);
    }
}
