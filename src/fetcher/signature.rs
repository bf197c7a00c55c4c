//! Request signing for the telemetry API
//!
//! The server authenticates each call with `md5(path + token + timestamp)`.
//! MD5 is what the server verifies against, so it cannot be swapped for a
//! stronger digest on this side alone.

use chrono::Utc;
use md5::{Digest, Md5};

/// Path the server signs against, independent of the configured base URL
pub const SIGNING_PATH: &str = "/device/real/query";

/// Compute the hex-encoded request signature
pub fn generate_signature(path: &str, token: &str, timestamp: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(path.as_bytes());
    hasher.update(token.as_bytes());
    hasher.update(timestamp.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Current Unix time in milliseconds as a decimal string
pub fn current_timestamp_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}
