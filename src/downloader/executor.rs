//! Fleet fetcher: drives every batch through the transport in order

use std::time::Instant;
use tracing::{debug, warn};

use crate::downloader::config::FetchConfig;
use crate::downloader::progress::{BatchProgress, FetchSummary, LogProgress, ProgressObserver};
use crate::downloader::DownloadError;
use crate::fetcher::{BatchTransport, TelemetryHttpClient};
use crate::metrics::{self, FetchMetrics};
use crate::serial::{generate_serial_numbers, partition, Batch, SerialNumber};
use crate::DeviceRecord;

/// Sequential, fail-fast fleet fetcher
///
/// Batches are sent one after another through a single transport, so the
/// transport's own pacing is enough to respect the API rate limit.
pub struct FleetFetcher<T = TelemetryHttpClient> {
    transport: T,
    observer: Box<dyn ProgressObserver>,
}

impl FleetFetcher<TelemetryHttpClient> {
    /// Build a fetcher over a new HTTP transport for `config`
    ///
    /// The configuration itself is validated by [`FleetFetcher::run`].
    pub fn from_config(config: &FetchConfig) -> Result<Self, DownloadError> {
        let transport = TelemetryHttpClient::new(
            config.api_url.clone(),
            config.token.clone(),
            config.transport.clone(),
        )
        .map_err(DownloadError::Setup)?;
        Ok(Self::new(transport))
    }
}

impl<T: BatchTransport> FleetFetcher<T> {
    /// Create a fetcher that logs progress through `tracing`
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            observer: Box::new(LogProgress),
        }
    }

    /// Replace the progress observer
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Generate the fleet described by `config` and fetch all of it
    pub async fn run(&mut self, config: &FetchConfig) -> Result<Vec<DeviceRecord>, DownloadError> {
        config.validate()?;
        let serials = generate_serial_numbers(config.total_devices);
        self.fetch_all(serials, config.batch_size).await
    }

    /// Fetch telemetry for `serials`, `batch_size` serials per request
    ///
    /// Records come back in serial order. The first permanent batch failure
    /// aborts the fetch and discards everything accumulated so far.
    pub async fn fetch_all(
        &mut self,
        serials: Vec<SerialNumber>,
        batch_size: usize,
    ) -> Result<Vec<DeviceRecord>, DownloadError> {
        let total_devices = serials.len();
        let batches = partition(serials, batch_size)?;
        self.fetch_batches(batches, total_devices).await
    }

    async fn fetch_batches(
        &mut self,
        batches: Vec<Batch>,
        total_devices: usize,
    ) -> Result<Vec<DeviceRecord>, DownloadError> {
        let total_batches = batches.len();
        let fetch_metrics = FetchMetrics::start(total_devices);
        self.observer.on_start(total_devices, total_batches);

        let mut records: Vec<DeviceRecord> = Vec::with_capacity(total_devices);
        let start = Instant::now();

        for batch in &batches {
            let batch_start = Instant::now();
            debug!(
                batch = batch.number(),
                devices = batch.len(),
                endpoint = %self.transport.endpoint(),
                "Fetching batch"
            );

            let data = match self.transport.fetch_batch(batch).await {
                Ok(data) => data,
                Err(source) => {
                    fetch_metrics.record_failure(batch.number(), &source.to_string());
                    return Err(DownloadError::BatchFailed {
                        batch: batch.number(),
                        total_batches,
                        first_device: batch.offset(),
                        last_device: batch.last_index(),
                        source,
                    });
                }
            };

            if data.len() != batch.len() {
                warn!(
                    batch = batch.number(),
                    requested = batch.len(),
                    returned = data.len(),
                    "API returned a different number of records than requested"
                );
            }

            metrics::record_batch_complete(data.len());
            records.extend(data);

            self.observer.on_batch(&BatchProgress {
                batch: batch.number(),
                total_batches,
                first_device: batch.offset(),
                last_device: batch.last_index(),
                elapsed: batch_start.elapsed(),
                devices_fetched: records.len(),
            });
        }

        fetch_metrics.record_success(records.len());
        self.observer.on_complete(&FetchSummary {
            devices_fetched: records.len(),
            batches: total_batches,
            elapsed: start.elapsed(),
        });

        Ok(records)
    }
}
