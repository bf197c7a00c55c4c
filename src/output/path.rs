//! Timestamped export file names
//!
//! Every export run produces `energygrid_devices_<ts>.json`,
//! `energygrid_devices_<ts>.csv` and `energygrid_report_<ts>.txt`, where
//! `<ts>` is the local export time as `YYYYMMDD_HHMMSS`.

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Prefix for the device data exports
pub const DEVICES_PREFIX: &str = "energygrid_devices";

/// Prefix for the text report
pub const REPORT_PREFIX: &str = "energygrid_report";

/// Format used for the file name timestamp
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Paths for one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Pretty-printed JSON array
    pub json: PathBuf,
    /// CSV table
    pub csv: PathBuf,
    /// Text report
    pub report: PathBuf,
}

impl ExportPaths {
    /// Build the export paths under `dir` for the given time
    pub fn new<Tz>(dir: &Path, generated_at: DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let stamp = filename_timestamp(&generated_at);
        Self {
            json: dir.join(format!("{DEVICES_PREFIX}_{stamp}.json")),
            csv: dir.join(format!("{DEVICES_PREFIX}_{stamp}.csv")),
            report: dir.join(format!("{REPORT_PREFIX}_{stamp}.txt")),
        }
    }
}

/// `YYYYMMDD_HHMMSS` for file names
pub fn filename_timestamp<Tz>(generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    generated_at.format(FILENAME_TIMESTAMP_FORMAT).to_string()
}
