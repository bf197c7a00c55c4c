//! # EnergyGrid Aggregator Library
//!
//! Fetches telemetry for a fleet of solar inverters from the EnergyGrid
//! device API, which only accepts small batches per call and throttles
//! callers that exceed one request per second.
//!
//! ## Features
//!
//! - **Batching**: Serial numbers are generated and split into fixed-size batches
//! - **Pacing**: A minimum spacing is enforced between consecutive requests
//! - **Signed Requests**: Every call carries a timestamp and MD5 signature
//! - **Throttle Retries**: HTTP 429 responses are retried with a fixed backoff
//! - **Fail-Fast**: Any permanent batch failure aborts the whole fleet fetch
//! - **Reporting**: Fleet summaries plus JSON, CSV and text exports
//!
//! ## Quick Start
//!
//! ```no_run
//! use energygrid_aggregator::downloader::{FetchConfig, FleetFetcher};
//! use energygrid_aggregator::aggregate::FleetSummary;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FetchConfig::new("http://localhost:3000/device/real/query", "secret");
//! let mut fetcher = FleetFetcher::from_config(&config)?;
//!
//! let records = fetcher.run(&config).await?;
//! println!("{}", FleetSummary::from_records(&records).format_report());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`serial`] - Serial number generation and batching
//! - [`fetcher`] - Request signing and the rate-limited HTTP transport
//! - [`downloader`] - Fleet fetch orchestration, pacing and progress
//! - [`aggregate`] - Online/offline and power statistics
//! - [`output`] - JSON, CSV and text report exports
//! - [`metrics`] - Prometheus metrics for requests, retries and batches

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Fleet statistics over fetched records
pub mod aggregate;

/// CLI command implementations
pub mod cli;

/// Fleet fetch orchestration
pub mod downloader;

/// Telemetry API transport
pub mod fetcher;

/// Observability metrics
pub mod metrics;

/// Export writers
pub mod output;

/// Serial number generation and batching
pub mod serial;

pub use serial::{Batch, SerialNumber};

/// Status value reported by devices that are online
pub const ONLINE_STATUS: &str = "Online";

/// Telemetry for a single device as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceRecord {
    /// Device serial number
    pub sn: SerialNumber,
    /// Power output as reported (free text, e.g. "2.45 kW")
    pub power: String,
    /// Device status ("Online" or anything else for offline)
    pub status: String,
    /// Last update timestamp as reported by the device
    pub last_update: String,
}

impl DeviceRecord {
    /// Whether the device reported itself online
    pub fn is_online(&self) -> bool {
        self.status == ONLINE_STATUS
    }

    /// Best-effort numeric power reading; see [`aggregate::parse_power`]
    pub fn power_value(&self) -> f64 {
        aggregate::parse_power(&self.power)
    }
}
