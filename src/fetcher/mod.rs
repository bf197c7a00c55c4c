//! Telemetry API transport

use crate::{Batch, DeviceRecord};
use async_trait::async_trait;

pub mod envelope;
pub mod retry_formatter;
pub mod signature;
pub mod telemetry_http;

pub use telemetry_http::TelemetryHttpClient;

/// Fetcher errors
///
/// Every variant is permanent from the orchestrator's point of view: 429
/// retries happen inside the transport before [`FetcherError::RateLimitExceeded`]
/// is produced.
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Server kept throttling after all retries
    #[error("rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded {
        /// Total attempts made, including the first
        attempts: u32,
    },

    /// Server rejected the signature or token (401)
    #[error("authentication failed (401): {body}")]
    AuthenticationFailed {
        /// Raw response body for diagnostics
        body: String,
    },

    /// Any other non-success status
    #[error("API error (status {status}): {body}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Success response did not match the expected envelope
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Connection, timeout or body read failure
    #[error("network error on attempt {attempts}: {message}")]
    NetworkError {
        /// Underlying transport error text
        message: String,
        /// Attempt that failed, counting earlier 429 retries (0 if no request was sent)
        attempts: u32,
    },

    /// Request body could not be encoded
    #[error("failed to marshal request: {0}")]
    SerializationError(String),
}

impl FetcherError {
    /// Number of attempts recorded in the error, when known
    pub fn attempts(&self) -> Option<u32> {
        match self {
            FetcherError::RateLimitExceeded { attempts } => Some(*attempts),
            FetcherError::NetworkError { attempts, .. } if *attempts > 0 => Some(*attempts),
            _ => None,
        }
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Sends one batch and returns its device records
///
/// Implementations own their pacing state, hence `&mut self`; the
/// orchestrator calls them strictly sequentially.
#[async_trait]
pub trait BatchTransport: Send {
    /// Fetch telemetry for every serial in `batch`, in request order
    async fn fetch_batch(&mut self, batch: &Batch) -> FetcherResult<Vec<DeviceRecord>>;

    /// Endpoint used for log and error context
    fn endpoint(&self) -> &str;
}
