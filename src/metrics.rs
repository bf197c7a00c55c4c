//! Observability metrics for fleet fetches
//!
//! Tracks requests per status, 429 throttling, retry backoff, pacing waits
//! and batch throughput.
//!
//! ## Architecture
//!
//! - Uses the `metrics` facade; recording is a no-op until a recorder exists
//! - Optional Prometheus exporter (`--metrics-addr`) serves `/metrics`

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Install the Prometheus exporter and register metric descriptions
///
/// Idempotent: later calls return `Ok(())` without rebinding.
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "http_requests_total",
        Unit::Count,
        "Total number of HTTP requests sent to the telemetry API"
    );
    describe_counter!(
        "http_429_errors_total",
        Unit::Count,
        "Total number of 429 rate limit responses received"
    );
    describe_counter!(
        "http_retries_total",
        Unit::Count,
        "Total number of throttle retries"
    );
    describe_histogram!(
        "http_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );
    describe_histogram!(
        "retry_backoff_duration_seconds",
        Unit::Seconds,
        "Duration of throttle backoff in seconds"
    );
    describe_histogram!(
        "pacing_wait_seconds",
        Unit::Seconds,
        "Time spent waiting for the minimum request interval"
    );
    describe_counter!(
        "batches_completed_total",
        Unit::Count,
        "Total number of batches fetched successfully"
    );
    describe_counter!(
        "fetches_completed_total",
        Unit::Count,
        "Total number of complete fleet fetches"
    );
    describe_counter!(
        "fetches_failed_total",
        Unit::Count,
        "Total number of aborted fleet fetches"
    );

    *initialized = true;
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Next correlation ID for request tracing (`req-0000002a`)
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Timing and outcome of one HTTP attempt
pub struct HttpRequestMetrics {
    batch: usize,
    attempt: u32,
    start_time: Instant,
    correlation_id: String,
}

impl HttpRequestMetrics {
    /// Start timing an attempt for the given batch
    pub fn start(batch: usize, attempt: u32) -> Self {
        let correlation_id = generate_correlation_id();

        debug!(
            correlation_id = %correlation_id,
            batch = batch,
            attempt = attempt,
            "Sending telemetry request"
        );

        Self {
            batch,
            attempt,
            start_time: Instant::now(),
            correlation_id,
        }
    }

    /// Record a response with the given status
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "status" => status_code.to_string(),
            "attempt" => self.attempt.to_string(),
        )
        .increment(1);
        histogram!("http_request_duration_seconds").record(duration.as_secs_f64());

        if status_code == 429 {
            counter!("http_429_errors_total").increment(1);
            warn!(
                correlation_id = %self.correlation_id,
                batch = self.batch,
                attempt = self.attempt,
                duration_ms = duration.as_millis() as u64,
                "Rate limit error (429) recorded"
            );
        }

        debug!(
            correlation_id = %self.correlation_id,
            batch = self.batch,
            status = status_code,
            duration_ms = duration.as_millis() as u64,
            "HTTP request completed"
        );
    }

    /// Record a failure with no HTTP status
    pub fn record_network_error(&self) {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "status" => "network_error",
            "attempt" => self.attempt.to_string(),
        )
        .increment(1);
        histogram!("http_request_duration_seconds").record(duration.as_secs_f64());

        warn!(
            correlation_id = %self.correlation_id,
            batch = self.batch,
            attempt = self.attempt,
            duration_ms = duration.as_millis() as u64,
            "Network error recorded"
        );
    }

    /// Correlation ID attached to this attempt's log lines
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Record a throttle backoff before the given retry attempt
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!("http_retries_total", "attempt" => attempt.to_string()).increment(1);
    histogram!("retry_backoff_duration_seconds").record(duration.as_secs_f64());
}

/// Record time spent waiting on request pacing
pub fn record_pacing_wait(duration: Duration) {
    histogram!("pacing_wait_seconds").record(duration.as_secs_f64());
}

/// Record a successfully fetched batch
pub fn record_batch_complete(devices: usize) {
    counter!("batches_completed_total").increment(1);
    debug!(devices = devices, "Batch metrics recorded");
}

/// Outcome tracking for one fleet fetch
pub struct FetchMetrics {
    total_devices: usize,
    start_time: Instant,
}

impl FetchMetrics {
    /// Start tracking a fleet fetch
    pub fn start(total_devices: usize) -> Self {
        info!(total_devices = total_devices, "Fleet fetch started");
        Self {
            total_devices,
            start_time: Instant::now(),
        }
    }

    /// Record a complete fetch
    pub fn record_success(&self, records: usize) {
        counter!("fetches_completed_total").increment(1);
        info!(
            total_devices = self.total_devices,
            records = records,
            duration_secs = self.start_time.elapsed().as_secs_f64(),
            "Fleet fetch completed"
        );
    }

    /// Record an aborted fetch
    pub fn record_failure(&self, batch: usize, error: &str) {
        counter!("fetches_failed_total", "batch" => batch.to_string()).increment(1);
        error!(
            total_devices = self.total_devices,
            batch = batch,
            error = %error,
            duration_secs = self.start_time.elapsed().as_secs_f64(),
            "Fleet fetch failed"
        );
    }
}
