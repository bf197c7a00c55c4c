//! Request and response bodies for the device query endpoint

use crate::{Batch, DeviceRecord, SerialNumber};
use serde::{Deserialize, Serialize};

use super::{FetcherError, FetcherResult};

/// Request body: `{"sn_list": [...]}`
#[derive(Debug, Serialize)]
pub struct TelemetryRequest<'a> {
    /// Serial numbers to query, in batch order
    pub sn_list: &'a [SerialNumber],
}

impl<'a> From<&'a Batch> for TelemetryRequest<'a> {
    fn from(batch: &'a Batch) -> Self {
        Self {
            sn_list: batch.serial_numbers(),
        }
    }
}

/// Success envelope: `{"data": [...], "error": "..."}`
#[derive(Debug, Deserialize)]
pub struct TelemetryResponse {
    /// Device records for the requested serials
    pub data: Vec<DeviceRecord>,
    /// Optional server-side message
    #[serde(default)]
    pub error: Option<String>,
}

/// Parse a 200 response body into the envelope
pub fn parse_response(body: &[u8]) -> FetcherResult<TelemetryResponse> {
    serde_json::from_slice(body).map_err(|e| FetcherError::ParseError(e.to_string()))
}
