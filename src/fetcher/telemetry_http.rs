//! Rate-limited HTTP transport for the device query endpoint
//!
//! Each batch is sent as a signed POST. The client:
//! - keeps at least `min_interval` between consecutive sends
//! - retries 429 responses with a fixed backoff, up to a bounded count
//! - treats every other failure as permanent

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::downloader::config::TransportConfig;
use crate::downloader::rate_limit::RequestPacer;
use crate::fetcher::envelope::{parse_response, TelemetryRequest};
use crate::fetcher::retry_formatter::{extract_error_type, RetryContext, RetryErrorType};
use crate::fetcher::signature::{current_timestamp_millis, generate_signature};
use crate::fetcher::{BatchTransport, FetcherError, FetcherResult};
use crate::metrics::{self, HttpRequestMetrics};
use crate::{Batch, DeviceRecord};

/// Header carrying the millisecond timestamp used in the signature
pub const TIMESTAMP_HEADER: &str = "timestamp";

/// Header carrying the hex MD5 signature
pub const SIGNATURE_HEADER: &str = "signature";

/// HTTP transport for one fleet fetch
///
/// Owns its [`RequestPacer`], so independent clients never throttle each
/// other.
pub struct TelemetryHttpClient {
    client: Client,
    api_url: String,
    token: String,
    config: TransportConfig,
    pacer: RequestPacer,
}

impl TelemetryHttpClient {
    /// Build a client with its own `reqwest::Client` using the configured timeout
    ///
    /// # Errors
    /// Returns [`FetcherError::NetworkError`] if the HTTP client cannot be built
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        config: TransportConfig,
    ) -> FetcherResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetcherError::NetworkError {
                message: format!("failed to build HTTP client: {e}"),
                attempts: 0,
            })?;

        Ok(Self::with_client(client, api_url, token, config))
    }

    /// Wrap an existing `reqwest::Client`
    pub fn with_client(
        client: Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
        config: TransportConfig,
    ) -> Self {
        let pacer = RequestPacer::new(config.min_interval);
        Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
            config,
            pacer,
        }
    }

    /// Transport settings in use
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Pacing state of this client
    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// Send the batch, retrying only on 429
    async fn request_with_retry(&mut self, batch: &Batch) -> FetcherResult<Vec<DeviceRecord>> {
        let body = serde_json::to_vec(&TelemetryRequest::from(batch))
            .map_err(|e| FetcherError::SerializationError(e.to_string()))?;

        let max_attempts = self.config.max_attempts();
        let context = RetryContext::new(
            batch.number(),
            Some((batch.offset(), batch.last_index())),
            self.api_url.clone(),
        );
        let mut attempt: u32 = 1;

        loop {
            let (status, response_body) = self.send(batch, &body, attempt).await?;

            match status {
                StatusCode::OK => {
                    let envelope = parse_response(&response_body)?;
                    if let Some(message) = envelope.error.as_deref().filter(|m| !m.is_empty()) {
                        warn!(batch = batch.number(), "API reported error alongside data: {}", message);
                    }
                    if attempt > 1 {
                        info!("{}", context.clone().with_attempt(attempt, max_attempts).format_success());
                    }
                    debug!(
                        batch = batch.number(),
                        records = envelope.data.len(),
                        "Batch request succeeded on attempt {}",
                        attempt
                    );
                    return Ok(envelope.data);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    if attempt >= max_attempts {
                        return Err(FetcherError::RateLimitExceeded { attempts: attempt });
                    }

                    let backoff = self.config.rate_limit_backoff;
                    let retry = context
                        .clone()
                        .with_attempt(attempt, max_attempts)
                        .with_error(RetryErrorType::RateLimit, "HTTP 429 Too Many Requests")
                        .with_backoff(backoff);
                    warn!("{}", retry.format_retry());
                    metrics::record_retry_backoff(backoff, attempt + 1);

                    sleep(backoff).await;
                    attempt += 1;
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(FetcherError::AuthenticationFailed {
                        body: String::from_utf8_lossy(&response_body).into_owned(),
                    });
                }
                other => {
                    return Err(FetcherError::ApiError {
                        status: other.as_u16(),
                        body: String::from_utf8_lossy(&response_body).into_owned(),
                    });
                }
            }
        }
    }

    /// One paced, signed POST
    async fn send(
        &mut self,
        batch: &Batch,
        body: &[u8],
        attempt: u32,
    ) -> FetcherResult<(StatusCode, Vec<u8>)> {
        let waited = self.pacer.wait_for_slot().await;
        if !waited.is_zero() {
            debug!(wait_ms = waited.as_millis() as u64, "Paced before sending");
            metrics::record_pacing_wait(waited);
        }

        let timestamp = current_timestamp_millis();
        let signature = generate_signature(&self.config.signing_path, &self.token, &timestamp);

        let request = self
            .client
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .header(TIMESTAMP_HEADER, timestamp.as_str())
            .header(SIGNATURE_HEADER, signature.as_str())
            .body(body.to_vec());

        let request_metrics = HttpRequestMetrics::start(batch.number(), attempt);
        // recorded before dispatch so pacing follows send cadence, not latency
        self.pacer.mark_sent();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                request_metrics.record_network_error();
                let kind = extract_error_type(None, Some(&e));
                return Err(FetcherError::NetworkError {
                    message: format!("{}: {e}", kind.description()),
                    attempts: attempt,
                });
            }
        };

        let status = response.status();
        request_metrics.record_complete(status.as_u16());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetcherError::NetworkError {
                message: format!("failed to read response: {e}"),
                attempts: attempt,
            })?;

        Ok((status, bytes.to_vec()))
    }
}

#[async_trait::async_trait]
impl BatchTransport for TelemetryHttpClient {
    async fn fetch_batch(&mut self, batch: &Batch) -> FetcherResult<Vec<DeviceRecord>> {
        self.request_with_retry(batch).await
    }

    fn endpoint(&self) -> &str {
        &self.api_url
    }
}
