//! JSON export of device records

use crate::DeviceRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{OutputError, OutputResult};

/// Write records as a pretty-printed JSON array
pub fn write_json(records: &[DeviceRecord], path: &Path) -> OutputResult<()> {
    let file = File::create(path)
        .map_err(|e| OutputError::IoError(format!("Failed to create JSON file: {e}")))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| OutputError::SerializationError(format!("Failed to write JSON: {e}")))?;
    writer
        .write_all(b"\n")
        .map_err(|e| OutputError::IoError(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
}
