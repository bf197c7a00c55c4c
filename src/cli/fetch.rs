//! Fleet fetch command

use crate::aggregate::FleetSummary;
use crate::downloader::config::{
    DEFAULT_API_URL, DEFAULT_BATCH_SIZE, DEFAULT_TOTAL_DEVICES, MAX_RATE_LIMIT_RETRIES,
    MIN_REQUEST_INTERVAL_MS, RATE_LIMIT_BACKOFF_MS, REQUEST_TIMEOUT_SECS,
};
use crate::downloader::{
    BatchProgress, FetchConfig, FetchSummary, FleetFetcher, ProgressObserver, TransportConfig,
};
use crate::fetcher::signature::SIGNING_PATH;
use crate::fetcher::BatchTransport;
use crate::output;
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use super::CliError;

/// Parse a count that must be at least 1
fn parse_positive(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("value must be at least 1".to_string());
    }
    Ok(value)
}

/// Fetch real-time telemetry for an EnergyGrid inverter fleet and report on it
#[derive(Debug, Parser)]
#[command(name = "energygrid-aggregator")]
#[command(about = "Fetch and aggregate EnergyGrid solar inverter telemetry", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Number of devices in the fleet (SN-000 onwards)
    #[arg(long, env = "ENERGYGRID_TOTAL_DEVICES", default_value_t = DEFAULT_TOTAL_DEVICES, value_parser = parse_positive)]
    pub total_devices: usize,

    /// Serial numbers per request (the API accepts at most 10)
    #[arg(long, env = "ENERGYGRID_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_positive)]
    pub batch_size: usize,

    /// Device query endpoint
    #[arg(long, env = "ENERGYGRID_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Shared secret used to sign requests
    #[arg(long, env = "ENERGYGRID_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Directory for the JSON, CSV and report exports
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip writing export files
    #[arg(long, default_value_t = false)]
    pub no_export: bool,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9000)
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,

    /// Minimum milliseconds between two requests
    #[arg(long, default_value_t = MIN_REQUEST_INTERVAL_MS)]
    pub min_interval_ms: u64,

    /// Milliseconds to wait before retrying a throttled (429) batch
    #[arg(long, default_value_t = RATE_LIMIT_BACKOFF_MS)]
    pub backoff_ms: u64,

    /// Retries after a 429 before the batch fails (range: 0-10)
    #[arg(long, default_value_t = MAX_RATE_LIMIT_RETRIES, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_rate_limit_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Cli {
    /// Collapse the parsed flags into a fetch configuration
    pub fn to_fetch_config(&self) -> FetchConfig {
        let transport = TransportConfig {
            min_interval: Duration::from_millis(self.min_interval_ms),
            rate_limit_backoff: Duration::from_millis(self.backoff_ms),
            max_rate_limit_retries: self.max_rate_limit_retries,
            request_timeout: Duration::from_secs(self.timeout_secs),
            signing_path: SIGNING_PATH.to_string(),
        };

        FetchConfig::new(self.api_url.clone(), self.token.clone())
            .with_total_devices(self.total_devices)
            .with_batch_size(self.batch_size)
            .with_transport(transport)
    }

    /// Fetch the whole fleet, print the aggregation report and export
    ///
    /// A failed fetch is returned as an error and nothing is aggregated.
    /// Export problems are logged and do not fail the command.
    pub async fn execute(&self) -> Result<(), CliError> {
        let config = self.to_fetch_config();

        if let Some(addr) = self.metrics_addr {
            crate::metrics::init_metrics(addr)
                .await
                .map_err(|e| CliError::MetricsError(e.to_string()))?;
        }

        info!(
            total_devices = config.total_devices,
            batch_size = config.batch_size,
            api_url = %config.api_url,
            "Starting fleet fetch"
        );

        let mut fetcher = FleetFetcher::from_config(&config)?.with_observer(BarProgress::new());
        let endpoint = fetcher.transport().endpoint().to_string();

        let records = match fetcher.run(&config).await {
            Ok(records) => records,
            Err(e) => {
                if let Some(context) = e.failure_context(&endpoint) {
                    error!("{}", context.format_failure());
                }
                return Err(e.into());
            }
        };

        let summary = FleetSummary::from_records(&records);
        println!("{}", summary.format_report());

        if self.no_export {
            info!("Export skipped (--no-export)");
            return Ok(());
        }

        match output::export_all(&records, &self.output_dir, Local::now()) {
            Ok(paths) => info!(
                json = %paths.json.display(),
                csv = %paths.csv.display(),
                report = %paths.report.display(),
                "Export complete"
            ),
            Err(e) => warn!("Export failed: {}", e),
        }

        Ok(())
    }
}

/// Progress observer backed by an `indicatif` bar
///
/// When stderr is not a terminal the bar stays hidden and progress lines go
/// through `tracing` instead.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Create a bar; its length is set once the batch count is known
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Wrap an existing bar (a hidden bar in tests)
    pub fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    /// Underlying bar
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&mut self, total_devices: usize, total_batches: usize) {
        self.bar.set_length(total_batches as u64);
        self.bar.set_position(0);
        self.bar
            .set_message(format!("Fetching {total_devices} devices"));
        info!("Processing {} batches...", total_batches);
    }

    fn on_batch(&mut self, progress: &BatchProgress) {
        self.bar.set_position(progress.batch as u64);
        self.bar.set_message(format!(
            "Devices: {:03}-{:03}",
            progress.first_device, progress.last_device
        ));
        if self.bar.is_hidden() {
            info!("{}", progress.format_progress());
        }
    }

    fn on_complete(&mut self, summary: &FetchSummary) {
        self.bar.finish_and_clear();
        info!("{}", summary.format_summary());
    }
}
