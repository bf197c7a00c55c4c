//! Human-readable text report

use crate::aggregate::FleetSummary;
use crate::DeviceRecord;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::Path;

use super::{OutputError, OutputResult};

const HEAVY_RULE: &str = "=================================================================";
const LIGHT_RULE: &str = "-----------------------------------------------------------------";

/// Report over a finished fetch: header, summary statistics and a device table
pub struct FleetReport<'a> {
    records: &'a [DeviceRecord],
    summary: FleetSummary,
    generated_at: DateTime<Local>,
}

impl<'a> FleetReport<'a> {
    /// Summarise `records` for a report stamped with `generated_at`
    pub fn new(records: &'a [DeviceRecord], generated_at: DateTime<Local>) -> Self {
        Self {
            records,
            summary: FleetSummary::from_records(records),
            generated_at,
        }
    }
}

impl fmt::Display for FleetReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;

        writeln!(f, "EnergyGrid Solar Inverter Telemetry Report")?;
        writeln!(f, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Total Devices: {}", summary.total_devices)?;
        writeln!(f, "{HEAVY_RULE}\n")?;

        writeln!(f, "SUMMARY STATISTICS")?;
        writeln!(f, "{LIGHT_RULE}")?;
        writeln!(
            f,
            "Online Devices:       {} ({:.1}%)",
            summary.online,
            summary.online_percentage()
        )?;
        writeln!(
            f,
            "Offline Devices:      {} ({:.1}%)",
            summary.offline,
            summary.offline_percentage()
        )?;
        writeln!(f, "Total Power Output:   {:.2} kW", summary.total_power)?;
        writeln!(f, "Average Power/Device: {:.2} kW", summary.average_power())?;
        writeln!(f, "\n{HEAVY_RULE}\n")?;

        writeln!(f, "DETAILED DEVICE INFORMATION")?;
        writeln!(f, "{LIGHT_RULE}")?;
        writeln!(
            f,
            "{:<10} {:<12} {:<10} {:<25}",
            "Serial #", "Power", "Status", "Last Updated"
        )?;
        writeln!(f, "{LIGHT_RULE}")?;
        for record in self.records {
            writeln!(
                f,
                "{:<10} {:<12} {:<10} {:<25}",
                record.sn.as_str(),
                record.power,
                record.status,
                record.last_update
            )?;
        }
        writeln!(f, "{HEAVY_RULE}")
    }
}

/// Render the report to a string
pub fn render_report(records: &[DeviceRecord], generated_at: DateTime<Local>) -> String {
    FleetReport::new(records, generated_at).to_string()
}

/// Render and write the report to `path`
pub fn write_report(
    records: &[DeviceRecord],
    generated_at: DateTime<Local>,
    path: &Path,
) -> OutputResult<()> {
    std::fs::write(path, render_report(records, generated_at))
        .map_err(|e| OutputError::IoError(format!("Failed to write report file: {e}")))
}
