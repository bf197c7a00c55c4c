//! Fetch configuration and defaults

use std::fmt;
use std::time::Duration;

use crate::fetcher::signature::SIGNING_PATH;

/// Number of devices in the default fleet (SN-000 .. SN-499)
pub const DEFAULT_TOTAL_DEVICES: usize = 500;

/// Maximum serials the API accepts per request
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default device query endpoint
pub const DEFAULT_API_URL: &str = "http://localhost:3000/device/real/query";

/// Minimum spacing between two sends.
/// The API allows one request per second.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1000;

/// Fixed wait before resending a throttled (429) batch
pub const RATE_LIMIT_BACKOFF_MS: u64 = 2000;

/// Retries after the first 429 for one batch (4 attempts in total)
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Upper bound on a single HTTP call
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Pacing, retry and timeout settings for the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Minimum send-to-send spacing
    pub min_interval: Duration,
    /// Wait between 429 retries
    pub rate_limit_backoff: Duration,
    /// Retries allowed after the first throttled attempt
    pub max_rate_limit_retries: u32,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Path fed into the request signature
    pub signing_path: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(MIN_REQUEST_INTERVAL_MS),
            rate_limit_backoff: Duration::from_millis(RATE_LIMIT_BACKOFF_MS),
            max_rate_limit_retries: MAX_RATE_LIMIT_RETRIES,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            signing_path: SIGNING_PATH.to_string(),
        }
    }
}

impl TransportConfig {
    /// Total attempts a throttled batch may consume
    pub fn max_attempts(&self) -> u32 {
        self.max_rate_limit_retries + 1
    }
}

/// Immutable inputs for one fleet fetch
#[derive(Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Number of devices to query
    pub total_devices: usize,
    /// Serials per request
    pub batch_size: usize,
    /// Full URL of the device query endpoint
    pub api_url: String,
    /// Shared secret used in request signatures
    pub token: String,
    /// Transport tuning
    pub transport: TransportConfig,
}

impl FetchConfig {
    /// Configuration with default fleet size, batch size and transport settings
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            total_devices: DEFAULT_TOTAL_DEVICES,
            batch_size: DEFAULT_BATCH_SIZE,
            api_url: api_url.into(),
            token: token.into(),
            transport: TransportConfig::default(),
        }
    }

    /// Set the number of devices to fetch
    pub fn with_total_devices(mut self, total_devices: usize) -> Self {
        self.total_devices = total_devices;
        self
    }

    /// Set the number of serials per request
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Replace the transport settings
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Number of requests needed to cover the fleet
    pub fn batch_count(&self) -> usize {
        if self.batch_size == 0 {
            return 0;
        }
        self.total_devices.div_ceil(self.batch_size)
    }

    /// Reject configurations that can never produce a valid fetch
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_devices == 0 {
            return Err(ConfigError::ZeroTotalDevices);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchConfig")
            .field("total_devices", &self.total_devices)
            .field("batch_size", &self.batch_size)
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("transport", &self.transport)
            .finish()
    }
}

/// Configuration errors, reported once and never retried
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Fleet size of zero
    #[error("total device count must be at least 1")]
    ZeroTotalDevices,

    /// Batch size of zero
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// Empty API URL
    #[error("API URL must not be empty")]
    MissingApiUrl,

    /// Empty shared token
    #[error("API token must not be empty")]
    MissingToken,
}
