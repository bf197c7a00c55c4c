//! Serial number generation and batching
//!
//! Devices are addressed by sequential serial numbers of the form `SN-000`.
//! The telemetry API accepts a bounded number of serials per call, so the
//! full fleet is split into ordered [`Batch`]es before fetching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every device serial number
pub const SERIAL_PREFIX: &str = "SN-";

/// Device serial number (e.g. `SN-042`)
///
/// Serialises as a plain JSON string so it can be placed directly in the
/// `sn_list` request field.
///
/// # Examples
///
/// ```
/// use energygrid_aggregator::serial::SerialNumber;
///
/// let sn = SerialNumber::from_index(7);
/// assert_eq!(sn.as_str(), "SN-007");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Build the serial number for a zero-based device index
    pub fn from_index(index: usize) -> Self {
        Self(format!("{SERIAL_PREFIX}{index:03}"))
    }

    /// Borrow the serial as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SerialNumber> for String {
    fn from(sn: SerialNumber) -> Self {
        sn.0
    }
}

/// Generate the serial numbers `SN-000 .. SN-{total-1}` in order
pub fn generate_serial_numbers(total: usize) -> Vec<SerialNumber> {
    (0..total).map(SerialNumber::from_index).collect()
}

/// Ordered group of serial numbers sent in one API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    number: usize,
    offset: usize,
    serial_numbers: Vec<SerialNumber>,
}

impl Batch {
    /// 1-based position of this batch in the fleet
    pub fn number(&self) -> usize {
        self.number
    }

    /// Zero-based fleet index of the first device in this batch
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Zero-based fleet index of the last device in this batch
    pub fn last_index(&self) -> usize {
        (self.offset + self.serial_numbers.len()).saturating_sub(1)
    }

    /// Serial numbers in request order
    pub fn serial_numbers(&self) -> &[SerialNumber] {
        &self.serial_numbers
    }

    /// Number of devices in this batch
    pub fn len(&self) -> usize {
        self.serial_numbers.len()
    }

    /// Always false for batches produced by [`partition`]
    pub fn is_empty(&self) -> bool {
        self.serial_numbers.is_empty()
    }
}

/// Split serial numbers into ordered batches of at most `batch_size`
///
/// Concatenating the returned batches reproduces `serials` exactly. Every
/// batch but the last holds `batch_size` serials and no batch is empty, so
/// an empty input yields no batches at all.
///
/// # Errors
///
/// Returns [`SerialError::InvalidBatchSize`] when `batch_size` is zero.
pub fn partition(serials: Vec<SerialNumber>, batch_size: usize) -> Result<Vec<Batch>, SerialError> {
    if batch_size == 0 {
        return Err(SerialError::InvalidBatchSize(batch_size));
    }

    let batches = serials
        .chunks(batch_size)
        .enumerate()
        .map(|(i, chunk)| Batch {
            number: i + 1,
            offset: i * batch_size,
            serial_numbers: chunk.to_vec(),
        })
        .collect();

    Ok(batches)
}

/// Errors raised while preparing serial numbers
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SerialError {
    /// Batch size must be at least one
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),
}
