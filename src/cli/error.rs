//! CLI error types and conversions

use crate::downloader::DownloadError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Fleet fetch failed
    #[error("fetch error: {0}")]
    DownloadError(#[from] DownloadError),

    /// Prometheus exporter could not be installed
    #[error("metrics error: {0}")]
    MetricsError(String),
}
