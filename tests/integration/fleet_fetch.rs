//! End-to-end fleet fetches against a mock device API

use energygrid_aggregator::aggregate::FleetSummary;
use energygrid_aggregator::downloader::{DownloadError, FetchConfig, FleetFetcher};
use energygrid_aggregator::fetcher::FetcherError;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::mock_api::{api_url, fast_transport, requested_serials, EchoFleet, TOKEN};

fn config(server: &MockServer, total_devices: usize, batch_size: usize) -> FetchConfig {
    FetchConfig::new(api_url(server), TOKEN)
        .with_total_devices(total_devices)
        .with_batch_size(batch_size)
        .with_transport(fast_transport(20))
}

#[tokio::test]
async fn test_fleet_of_25_in_batches_of_10() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoFleet)
        .expect(3)
        .mount(&server)
        .await;

    let config = config(&server, 25, 10);
    let mut fetcher = FleetFetcher::from_config(&config).unwrap();
    let records = fetcher.run(&config).await.unwrap();

    assert_eq!(records.len(), 25);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.sn.as_str(), format!("SN-{i:03}"));
    }

    let sizes: Vec<usize> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| requested_serials(r).len())
        .collect();
    assert_eq!(sizes, vec![10, 10, 5]);

    let summary = FleetSummary::from_records(&records);
    assert_eq!(summary.total_devices, 25);
    assert_eq!(summary.online, 15);
    assert_eq!(summary.offline, 10);
    assert!((summary.online_percentage() - 60.0).abs() < 1e-9);
    assert!((summary.offline_percentage() - 40.0).abs() < 1e-9);
    assert!((summary.average_power() - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_second_batch_401_aborts_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("SN-010"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid signature"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(EchoFleet)
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server, 25, 10);
    let mut fetcher = FleetFetcher::from_config(&config).unwrap();
    let err = fetcher.run(&config).await.unwrap_err();

    assert_eq!(err.failed_batch(), Some(2));
    assert!(err.to_string().contains("batch 2/3"));
    assert!(matches!(
        err,
        DownloadError::BatchFailed {
            source: FetcherError::AuthenticationFailed { .. },
            ..
        }
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    let report = err.failure_context(&config.api_url).unwrap().format_failure();
    assert!(report.contains("Batch 2"));
    assert!(report.contains("010-019"));
}

#[tokio::test]
async fn test_throttled_fleet_reports_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let config = config(&server, 10, 10);
    let mut fetcher = FleetFetcher::from_config(&config).unwrap();
    let err = fetcher.run(&config).await.unwrap_err();

    assert_eq!(err.failed_batch(), Some(1));
    assert!(err.to_string().contains("rate limit exceeded after 4 attempts"));
}

#[tokio::test]
async fn test_invalid_config_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoFleet)
        .expect(0)
        .mount(&server)
        .await;

    let config = config(&server, 25, 0);
    let mut fetcher = FleetFetcher::from_config(&config).unwrap();
    let err = fetcher.run(&config).await.unwrap_err();

    assert!(matches!(err, DownloadError::Configuration(_)));
}
