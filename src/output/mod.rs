//! Export writers for fetched fleet telemetry
//!
//! A finished fetch is written as a pretty-printed JSON array, a CSV table
//! and a human-readable text report, all sharing one timestamp suffix.

use crate::DeviceRecord;
use chrono::{DateTime, Local};
use std::path::Path;
use tracing::info;

pub mod csv;
pub mod json;
pub mod path;
pub mod report;

pub use path::ExportPaths;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer trait
pub trait OutputWriter {
    /// Flush any buffered data to disk
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Trait for writing device records
pub trait DevicesWriter: OutputWriter {
    /// Write a single record
    fn write_device(&mut self, record: &DeviceRecord) -> OutputResult<()>;

    /// Write multiple records in order
    fn write_devices(&mut self, records: &[DeviceRecord]) -> OutputResult<()> {
        for record in records {
            self.write_device(record)?;
        }
        Ok(())
    }
}

/// Write JSON, CSV and text report exports into `dir`
///
/// File names carry `generated_at` so repeated runs never overwrite each
/// other.
pub fn export_all(
    records: &[DeviceRecord],
    dir: &Path,
    generated_at: DateTime<Local>,
) -> OutputResult<ExportPaths> {
    let paths = ExportPaths::new(dir, generated_at);

    std::fs::create_dir_all(dir)
        .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;

    json::write_json(records, &paths.json)?;
    info!("JSON exported: {}", paths.json.display());

    let mut writer = csv::CsvDevicesWriter::new(&paths.csv)?;
    writer.write_devices(records)?;
    writer.close()?;
    info!("CSV exported: {}", paths.csv.display());

    report::write_report(records, generated_at, &paths.report)?;
    info!("Detailed report exported: {}", paths.report.display());

    Ok(paths)
}
