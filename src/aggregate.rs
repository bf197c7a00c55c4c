//! Fleet-level statistics computed from fetched device records

use crate::DeviceRecord;
use tracing::warn;

const RULE: &str = "==================================================";

/// Aggregated online/offline counts and power totals for a fleet
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSummary {
    /// Number of devices in the collection
    pub total_devices: usize,
    /// Devices whose status is exactly "Online"
    pub online: usize,
    /// Every other device
    pub offline: usize,
    /// Sum of parsed power readings (kW)
    pub total_power: f64,
}

impl FleetSummary {
    /// Compute a summary over the given records
    pub fn from_records(records: &[DeviceRecord]) -> Self {
        let mut online = 0;
        let mut total_power = 0.0;

        for record in records {
            if record.is_online() {
                online += 1;
            }
            if parse_power_prefix(&record.power).is_none() {
                warn!(sn = %record.sn, power = %record.power, "Unparsable power reading counted as 0");
            }
            total_power += record.power_value();
        }

        Self {
            total_devices: records.len(),
            online,
            offline: records.len() - online,
            total_power,
        }
    }

    /// Percentage of devices online (0 for an empty fleet)
    pub fn online_percentage(&self) -> f64 {
        percentage(self.online, self.total_devices)
    }

    /// Percentage of devices offline (0 for an empty fleet)
    pub fn offline_percentage(&self) -> f64 {
        percentage(self.offline, self.total_devices)
    }

    /// Average power per device (0 for an empty fleet)
    pub fn average_power(&self) -> f64 {
        if self.total_devices == 0 {
            return 0.0;
        }
        self.total_power / self.total_devices as f64
    }

    /// Multi-line aggregation report for console output
    pub fn format_report(&self) -> String {
        [
            RULE.to_string(),
            "AGGREGATION REPORT".to_string(),
            RULE.to_string(),
            format!("Total Devices: {}", self.total_devices),
            format!("Online: {} ({:.1}%)", self.online, self.online_percentage()),
            format!("Offline: {} ({:.1}%)", self.offline, self.offline_percentage()),
            format!("Total Power: {:.2} kW", self.total_power),
            format!("Average Power: {:.2} kW per device", self.average_power()),
            RULE.to_string(),
        ]
        .join("\n")
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Parse a free-text power reading, defaulting to 0.0
///
/// Leading whitespace is skipped and the longest decimal number at the start
/// of the string is used, so `"2.45 kW"` reads as 2.45. Text without a
/// leading number yields 0.0.
pub fn parse_power(raw: &str) -> f64 {
    parse_power_prefix(raw).unwrap_or(0.0)
}

fn parse_power_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
