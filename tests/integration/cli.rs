//! Binary behaviour: configuration errors and a full run against a mock API

use assert_cmd::Command;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer};

use super::mock_api::{api_url, EchoFleet, TOKEN};

fn binary() -> Command {
    let mut cmd = Command::cargo_bin("energygrid-aggregator").unwrap();
    cmd.env_remove("ENERGYGRID_TOKEN")
        .env_remove("ENERGYGRID_TOTAL_DEVICES")
        .env_remove("ENERGYGRID_BATCH_SIZE")
        .env_remove("ENERGYGRID_API_URL");
    cmd
}

#[test]
fn test_zero_batch_size_is_rejected() {
    binary()
        .args(["--token", TOKEN, "--batch-size", "0", "--no-export"])
        .assert()
        .failure();
}

#[test]
fn test_missing_token_is_rejected() {
    binary().args(["--no-export"]).assert().failure();
}

#[tokio::test]
async fn test_full_run_prints_report_and_exports() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoFleet)
        .expect(2)
        .mount(&server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let url = api_url(&server);
    let dir = output_dir.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        binary()
            .args(["--token", TOKEN, "--api-url", url.as_str()])
            .args(["--total-devices", "15", "--batch-size", "10"])
            .args(["--min-interval-ms", "10"])
            .arg("--output-dir")
            .arg(&dir)
            .assert()
            .success()
            .get_output()
            .clone()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    assert!(stdout.contains("AGGREGATION REPORT"));
    assert!(stdout.contains("Total Devices: 15"));
    assert!(stdout.contains("Online: 9 (60.0%)"));

    let mut names: Vec<String> = std::fs::read_dir(output_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 3);
    assert!(names[0].starts_with("energygrid_devices_") && names[0].ends_with(".csv"));
    assert!(names[1].starts_with("energygrid_devices_") && names[1].ends_with(".json"));
    assert!(names[2].starts_with("energygrid_report_") && names[2].ends_with(".txt"));
}
