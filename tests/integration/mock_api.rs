//! Mock device query API shared by the integration tests

use energygrid_aggregator::downloader::TransportConfig;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN: &str = "interview_token_123";
pub const QUERY_PATH: &str = "/device/real/query";

/// Endpoint URL on the mock server
pub fn api_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), QUERY_PATH)
}

/// Transport settings scaled down for tests
pub fn fast_transport(min_interval_ms: u64) -> TransportConfig {
    TransportConfig {
        min_interval: Duration::from_millis(min_interval_ms),
        rate_limit_backoff: Duration::from_millis(10),
        request_timeout: Duration::from_secs(5),
        ..TransportConfig::default()
    }
}

/// Serial numbers listed in a request body
pub fn requested_serials(request: &Request) -> Vec<String> {
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    body["sn_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sn| sn.as_str().unwrap().to_string())
        .collect()
}

/// Answers every serial it is asked for
///
/// Devices whose index modulo 5 is 0, 1 or 2 are online; every device
/// reports 20.0 kW.
pub struct EchoFleet;

impl Respond for EchoFleet {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let data: Vec<Value> = requested_serials(request)
            .into_iter()
            .map(|sn| {
                let index: usize = sn.trim_start_matches("SN-").parse().unwrap();
                let status = if index % 5 < 3 { "Online" } else { "Offline" };
                json!({
                    "sn": sn,
                    "power": "20.0 kW",
                    "status": status,
                    "last_update": "2025-01-01T00:00:00Z",
                })
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
    }
}

impl EchoFleet {
    /// Same answers, each held back by `delay`
    pub fn delayed(self, delay: Duration) -> DelayedEcho {
        DelayedEcho(delay)
    }
}

/// [`EchoFleet`] with a fixed response delay
pub struct DelayedEcho(Duration);

impl Respond for DelayedEcho {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        EchoFleet.respond(request).set_delay(self.0)
    }
}
