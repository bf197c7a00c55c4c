//! Tracing subscriber setup as used by the binary

use std::io::Write;
use std::sync::{Arc, Mutex};

use energygrid_aggregator::aggregate::FleetSummary;
use energygrid_aggregator::{DeviceRecord, SerialNumber};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_default_filter_levels() {
    let filter = EnvFilter::new("energygrid_aggregator=info");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));

    let filter = EnvFilter::new("energygrid_aggregator=debug");
    assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
}

#[test]
fn test_json_output_carries_fields_and_respects_filter() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("energygrid_aggregator=info"))
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        info!(target: "energygrid_aggregator", batch = 3, "Batch fetched");
        debug!(target: "energygrid_aggregator", "below the filter");
        info!(target: "other_crate", "outside the filter");
    });

    let output = logs.contents();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 1, "{output}");

    let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["level"], "INFO");
    assert_eq!(event["fields"]["message"], "Batch fetched");
    assert_eq!(event["fields"]["batch"], 3);
}

#[test]
fn test_unparsable_power_is_logged_as_warning() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("energygrid_aggregator=warn"))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let records = vec![DeviceRecord {
        sn: SerialNumber::from_index(7),
        power: "n/a".to_string(),
        status: "Online".to_string(),
        last_update: "now".to_string(),
    }];

    let summary = tracing::subscriber::with_default(subscriber, || {
        FleetSummary::from_records(&records)
    });

    assert_eq!(summary.total_power, 0.0);
    let output = logs.contents();
    assert!(output.contains("WARN"), "{output}");
    assert!(output.contains("SN-007"), "{output}");
}

#[test]
fn test_env_filter_directives_parse() {
    for directive in [
        "info",
        "energygrid_aggregator=debug",
        "energygrid_aggregator=info,reqwest=warn",
    ] {
        assert!(directive.parse::<EnvFilter>().is_ok(), "{directive}");
    }
}
