//! Progress observations for fleet fetches
//!
//! The orchestrator reports each completed batch and the final result to a
//! [`ProgressObserver`]. Observers only watch; nothing they do feeds back
//! into the fetch.

use std::time::Duration;
use tracing::info;

/// Snapshot taken after a batch succeeds
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProgress {
    /// 1-based batch number
    pub batch: usize,
    /// Number of batches in the fleet
    pub total_batches: usize,
    /// Fleet index of the first device in the batch
    pub first_device: usize,
    /// Fleet index of the last device in the batch
    pub last_device: usize,
    /// Time spent on this batch, including pacing and retries
    pub elapsed: Duration,
    /// Records accumulated so far
    pub devices_fetched: usize,
}

impl BatchProgress {
    /// Cumulative completion (0-100) by batch count
    pub fn percentage(&self) -> f64 {
        if self.total_batches == 0 {
            return 100.0;
        }
        self.batch as f64 / self.total_batches as f64 * 100.0
    }

    /// `Batch  3/50 | Devices: 020-029 | Time: 1.02s | Progress: 6.0%`
    pub fn format_progress(&self) -> String {
        let width = self.total_batches.to_string().len();
        format!(
            "Batch {:>width$}/{} | Devices: {:03}-{:03} | Time: {:.2}s | Progress: {:.1}%",
            self.batch,
            self.total_batches,
            self.first_device,
            self.last_device,
            self.elapsed.as_secs_f64(),
            self.percentage(),
        )
    }
}

/// Result of a completed fleet fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    /// Records returned
    pub devices_fetched: usize,
    /// Batches sent
    pub batches: usize,
    /// Wall time of the whole fetch
    pub elapsed: Duration,
}

impl FetchSummary {
    /// Average fetch throughput
    pub fn devices_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.devices_fetched as f64 / secs
        } else {
            0.0
        }
    }

    /// One-line completion message
    pub fn format_summary(&self) -> String {
        format!(
            "Complete! Fetched {} devices in {:.2} seconds ({} batches)",
            self.devices_fetched,
            self.elapsed.as_secs_f64(),
            self.batches
        )
    }
}

/// Receives fetch progress
pub trait ProgressObserver: Send {
    /// Called once before the first batch
    fn on_start(&mut self, _total_devices: usize, _total_batches: usize) {}

    /// Called after each successful batch
    fn on_batch(&mut self, progress: &BatchProgress);

    /// Called once after the last batch succeeds
    fn on_complete(&mut self, _summary: &FetchSummary) {}
}

/// Observer that writes progress lines through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_start(&mut self, total_devices: usize, total_batches: usize) {
        info!(
            total_devices = total_devices,
            total_batches = total_batches,
            "Processing {} batches...",
            total_batches
        );
    }

    fn on_batch(&mut self, progress: &BatchProgress) {
        info!("{}", progress.format_progress());
    }

    fn on_complete(&mut self, summary: &FetchSummary) {
        info!("{}", summary.format_summary());
    }
}
