//! CSV export of device records

use crate::DeviceRecord;
use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

use super::{DevicesWriter, OutputError, OutputResult, OutputWriter};

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// CSV row for one device
#[derive(Debug, Serialize)]
struct DeviceRow<'a> {
    sn: &'a str,
    power: &'a str,
    status: &'a str,
    last_update: &'a str,
}

impl<'a> From<&'a DeviceRecord> for DeviceRow<'a> {
    fn from(record: &'a DeviceRecord) -> Self {
        Self {
            sn: record.sn.as_str(),
            power: &record.power,
            status: &record.status,
            last_update: &record.last_update,
        }
    }
}

/// Buffered CSV writer for device records
pub struct CsvDevicesWriter {
    writer: Writer<BufWriter<File>>,
    devices_written: u64,
}

impl CsvDevicesWriter {
    /// Create the file (and parent directories) and a buffered writer over it
    pub fn new<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;
        let writer = Writer::from_writer(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));

        Ok(Self {
            writer,
            devices_written: 0,
        })
    }

    /// Records written so far
    pub fn devices_written(&self) -> u64 {
        self.devices_written
    }
}

impl DevicesWriter for CsvDevicesWriter {
    fn write_device(&mut self, record: &DeviceRecord) -> OutputResult<()> {
        self.writer
            .serialize(DeviceRow::from(record))
            .map_err(|e| OutputError::CsvError(format!("Failed to write device: {e}")))?;
        self.devices_written += 1;
        Ok(())
    }
}

impl OutputWriter for CsvDevicesWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;
        debug!("CSV writer closed after {} devices", self.devices_written);
        Ok(())
    }
}
