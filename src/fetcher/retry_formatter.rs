//! Retry and failure message formatting
//!
//! Keeps the wording of throttle retries and final batch failures in one
//! place so the transport, orchestrator and CLI report them consistently.

use reqwest::{Error as ReqwestError, StatusCode};
use std::time::Duration;

use super::FetcherError;

/// Classification of fetch errors for user messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// HTTP 429 throttling
    RateLimit,
    /// HTTP 401 signature or token rejected
    AuthFailed,
    /// HTTP 5xx
    ServerError(u16),
    /// Other 4xx
    ClientError(u16),
    /// Success status with an unreadable body
    MalformedResponse,
    /// Request could not be encoded
    Serialization,
    /// Request timed out
    NetworkTimeout,
    /// Connection refused or DNS failure
    NetworkOffline,
    /// Any other transport failure
    NetworkGeneric,
}

impl RetryErrorType {
    /// Short description used inside log lines
    pub fn description(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate limit exceeded",
            Self::AuthFailed => "authentication failed (401)",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::ClientError(code) => match code {
                400 => "invalid request",
                404 => "endpoint not found",
                _ => "client error",
            },
            Self::MalformedResponse => "malformed response",
            Self::Serialization => "request encoding failed",
            Self::NetworkTimeout => "network timeout",
            Self::NetworkOffline => "connection failed",
            Self::NetworkGeneric => "network error",
        }
    }

    /// Actionable guidance shown after a permanent failure
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::RateLimit => "Increase --min-interval-ms or --backoff-ms and try again",
            Self::AuthFailed => "Verify the API token and that the host clock is accurate",
            Self::ServerError(_) => "The API may be experiencing issues, try again later",
            Self::ClientError(_) => "Check --api-url and --batch-size against the API limits",
            Self::MalformedResponse => "Confirm --api-url points at the device query endpoint",
            Self::Serialization => "Report this as a bug",
            Self::NetworkTimeout => "Check network latency or raise --timeout-secs",
            Self::NetworkOffline => "Verify the API host is reachable",
            Self::NetworkGeneric => "Check network connectivity and try again",
        }
    }

    /// Only throttling is retried by the transport
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryErrorType::RateLimit)
    }
}

impl From<&FetcherError> for RetryErrorType {
    fn from(err: &FetcherError) -> Self {
        match err {
            FetcherError::RateLimitExceeded { .. } => Self::RateLimit,
            FetcherError::AuthenticationFailed { .. } => Self::AuthFailed,
            FetcherError::ApiError { status, .. } if *status >= 500 => Self::ServerError(*status),
            FetcherError::ApiError { status, .. } => Self::ClientError(*status),
            FetcherError::ParseError(_) => Self::MalformedResponse,
            FetcherError::SerializationError(_) => Self::Serialization,
            FetcherError::NetworkError { message, .. } => {
                // the transport prefixes messages with the classified description
                if message.starts_with(Self::NetworkOffline.description()) {
                    Self::NetworkOffline
                } else if message.contains("timed out") || message.contains("timeout") {
                    Self::NetworkTimeout
                } else {
                    Self::NetworkGeneric
                }
            }
        }
    }
}

/// Context for retry and failure messages about one batch
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Attempt that just completed (1-based)
    pub attempt: u32,
    /// Maximum attempts allowed for the batch
    pub max_attempts: u32,
    /// Error that triggered the message
    pub error_type: RetryErrorType,
    /// Wait before the next attempt
    pub backoff_duration: Duration,
    /// 1-based batch number
    pub batch_number: usize,
    /// Fleet device indexes covered by the batch
    pub device_range: Option<(usize, usize)>,
    /// Original error text
    pub error_message: String,
    /// Endpoint being called
    pub endpoint: String,
}

impl RetryContext {
    /// Context for a batch with no error detail yet
    pub fn new(
        batch_number: usize,
        device_range: Option<(usize, usize)>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt: 1,
            max_attempts: 1,
            error_type: RetryErrorType::NetworkGeneric,
            backoff_duration: Duration::ZERO,
            batch_number,
            device_range,
            error_message: String::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Set attempt counters
    pub fn with_attempt(mut self, attempt: u32, max_attempts: u32) -> Self {
        self.attempt = attempt;
        self.max_attempts = max_attempts;
        self
    }

    /// Set the error classification and message
    pub fn with_error(mut self, error_type: RetryErrorType, message: impl Into<String>) -> Self {
        self.error_type = error_type;
        self.error_message = message.into();
        self
    }

    /// Set the wait before the next attempt
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff_duration = backoff;
        self
    }

    /// "Rate limited ... retrying" line
    pub fn format_retry(&self) -> String {
        let mut message = format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds...",
            self.attempt + 1,
            self.max_attempts,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64()
        );
        self.append_batch(&mut message);
        message
    }

    /// Line logged when a retried batch finally succeeds
    pub fn format_success(&self) -> String {
        let mut message = format!(
            "Attempt {}/{} succeeded",
            self.attempt, self.max_attempts
        );
        self.append_batch(&mut message);
        message
    }

    /// Multi-line summary of a permanent batch failure
    pub fn format_failure(&self) -> String {
        let mut lines = vec![
            format!(
                "[FAILED] Batch {} failed after {} attempt(s)",
                self.batch_number, self.attempt
            ),
            format!("  Last error: {}", self.error_message),
        ];

        let range_display = self
            .device_range
            .map(|(first, last)| format!("{first:03}-{last:03}"))
            .unwrap_or_else(|| "unknown".to_string());
        lines.push(format!("  Devices: {range_display}"));
        lines.push(format!("  Endpoint: {}", self.endpoint));
        lines.push("  Suggestions:".to_string());
        lines.extend(
            self.format_suggestions()
                .into_iter()
                .map(|s| format!("    - {s}")),
        );

        lines.join("\n")
    }

    /// Suggestions tailored to the error
    pub fn format_suggestions(&self) -> Vec<String> {
        let mut suggestions = vec![self.error_type.suggestion().to_string()];
        if self.error_type.is_retryable() {
            suggestions.push(format!(
                "Try increasing --max-rate-limit-retries (current: {})",
                self.max_attempts.saturating_sub(1)
            ));
        }
        suggestions
    }

    fn append_batch(&self, buffer: &mut String) {
        buffer.push_str(&format!(" (batch {}", self.batch_number));
        if let Some((first, last)) = self.device_range {
            buffer.push_str(&format!(", devices {first:03}-{last:03}"));
        }
        buffer.push(')');
    }
}

/// Classify an HTTP status or reqwest error
pub fn extract_error_type(
    status: Option<StatusCode>,
    err: Option<&ReqwestError>,
) -> RetryErrorType {
    if let Some(status) = status {
        match status.as_u16() {
            401 => return RetryErrorType::AuthFailed,
            429 => return RetryErrorType::RateLimit,
            _ => {}
        }

        if status.is_server_error() {
            return RetryErrorType::ServerError(status.as_u16());
        }

        if status.is_client_error() {
            return RetryErrorType::ClientError(status.as_u16());
        }
    }

    if let Some(err) = err {
        if err.is_timeout() {
            return RetryErrorType::NetworkTimeout;
        }

        if err.is_connect() {
            return RetryErrorType::NetworkOffline;
        }
    }

    RetryErrorType::NetworkGeneric
}
