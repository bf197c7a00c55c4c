//! Fleet fetch orchestration and pacing
//!
//! # Overview
//!
//! 1. **Configuration**: Describe the fleet and endpoint with [`config::FetchConfig`]
//! 2. **Batching**: Serials are generated and partitioned by [`crate::serial`]
//! 3. **Execution**: [`executor::FleetFetcher`] sends batches one at a time
//! 4. **Pacing**: [`rate_limit::RequestPacer`] spaces out consecutive sends
//! 5. **Progress**: Per-batch observations through [`progress::ProgressObserver`]
//!
//! # Quick Start
//!
//! ```no_run
//! use energygrid_aggregator::downloader::{FetchConfig, FleetFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FetchConfig::new("http://localhost:3000/device/real/query", "secret")
//!     .with_total_devices(25)
//!     .with_batch_size(10);
//!
//! let mut fetcher = FleetFetcher::from_config(&config)?;
//! let records = fetcher.run(&config).await?;
//! assert_eq!(records.len(), 25);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, DownloadError>`. The first batch that
//! fails permanently aborts the fetch and no partial collection is returned.

pub mod config;
pub mod executor;
pub mod progress;
pub mod rate_limit;

pub use config::{ConfigError, FetchConfig, TransportConfig};
pub use executor::FleetFetcher;
pub use progress::{BatchProgress, FetchSummary, LogProgress, ProgressObserver};
pub use rate_limit::RequestPacer;

use crate::fetcher::retry_formatter::{RetryContext, RetryErrorType};
use crate::fetcher::FetcherError;
use crate::serial::SerialError;

/// Fleet fetch errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Invalid fetch configuration
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Serials could not be batched
    #[error("configuration error: {0}")]
    Batching(#[from] SerialError),

    /// HTTP transport could not be created
    #[error("failed to initialise transport: {0}")]
    Setup(#[source] FetcherError),

    /// A batch failed permanently
    #[error("failed to fetch batch {batch}/{total_batches} (devices {first_device:03}-{last_device:03}): {source}")]
    BatchFailed {
        /// 1-based batch number
        batch: usize,
        /// Number of batches in the fleet
        total_batches: usize,
        /// Fleet index of the batch's first device
        first_device: usize,
        /// Fleet index of the batch's last device
        last_device: usize,
        /// Underlying transport error
        #[source]
        source: FetcherError,
    },
}

impl DownloadError {
    /// 1-based number of the batch that failed, if the fetch got that far
    pub fn failed_batch(&self) -> Option<usize> {
        match self {
            DownloadError::BatchFailed { batch, .. } => Some(*batch),
            _ => None,
        }
    }

    /// Failure context for user-facing reporting of a batch failure
    pub fn failure_context(&self, endpoint: &str) -> Option<RetryContext> {
        let DownloadError::BatchFailed {
            batch,
            first_device,
            last_device,
            source,
            ..
        } = self
        else {
            return None;
        };

        let attempts = source.attempts().unwrap_or(1);
        Some(
            RetryContext::new(*batch, Some((*first_device, *last_device)), endpoint)
                .with_attempt(attempts, attempts)
                .with_error(RetryErrorType::from(source), source.to_string()),
        )
    }
}
