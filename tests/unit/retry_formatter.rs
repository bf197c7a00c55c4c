use std::time::Duration;

use energygrid_aggregator::fetcher::retry_formatter::{
    extract_error_type, RetryContext, RetryErrorType,
};
use energygrid_aggregator::fetcher::FetcherError;
use reqwest::StatusCode;

fn sample_context(error_type: RetryErrorType) -> RetryContext {
    RetryContext::new(3, Some((20, 29)), "http://localhost:3000/device/real/query")
        .with_attempt(2, 4)
        .with_error(error_type, "HTTP 429 Too Many Requests")
        .with_backoff(Duration::from_secs(2))
}

#[test]
fn format_retry_captures_attempt_and_wait() {
    let message = sample_context(RetryErrorType::RateLimit).format_retry();
    assert!(message.contains("attempt 3/4"));
    assert!(message.contains("rate limit exceeded"));
    assert!(message.contains("2.0 seconds"));
    assert!(message.contains("batch 3, devices 020-029"));
}

#[test]
fn format_success_includes_batch_context() {
    let message = sample_context(RetryErrorType::RateLimit).format_success();
    assert!(message.contains("Attempt 2/4 succeeded"));
    assert!(message.contains("batch 3"));
}

#[test]
fn format_failure_lists_suggestions() {
    let output = sample_context(RetryErrorType::RateLimit)
        .with_attempt(4, 4)
        .format_failure();
    assert!(output.contains("[FAILED] Batch 3 failed after 4 attempt(s)"));
    assert!(output.contains("Devices: 020-029"));
    assert!(output.contains("Endpoint: http://localhost:3000/device/real/query"));
    assert!(output.contains("--max-rate-limit-retries (current: 3)"));
}

#[test]
fn non_retryable_failure_has_single_suggestion() {
    let ctx = sample_context(RetryErrorType::AuthFailed);
    assert_eq!(ctx.format_suggestions().len(), 1);
    assert!(ctx.format_failure().contains("Verify the API token"));
}

#[test]
fn extract_error_type_classifies_status_codes() {
    assert_eq!(
        extract_error_type(Some(StatusCode::UNAUTHORIZED), None),
        RetryErrorType::AuthFailed
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::TOO_MANY_REQUESTS), None),
        RetryErrorType::RateLimit
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::BAD_GATEWAY), None),
        RetryErrorType::ServerError(502)
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::BAD_REQUEST), None),
        RetryErrorType::ClientError(400)
    );
}

#[test]
fn fetcher_errors_map_to_error_types() {
    let cases = [
        (FetcherError::RateLimitExceeded { attempts: 4 }, RetryErrorType::RateLimit),
        (
            FetcherError::ApiError { status: 503, body: String::new() },
            RetryErrorType::ServerError(503),
        ),
        (
            FetcherError::ApiError { status: 404, body: String::new() },
            RetryErrorType::ClientError(404),
        ),
        (FetcherError::ParseError("eof".into()), RetryErrorType::MalformedResponse),
        (
            FetcherError::NetworkError {
                message: "network timeout: operation timed out".into(),
                attempts: 1,
            },
            RetryErrorType::NetworkTimeout,
        ),
        (
            FetcherError::NetworkError {
                message: "connection failed: tcp connect error".into(),
                attempts: 3,
            },
            RetryErrorType::NetworkOffline,
        ),
    ];

    for (err, expected) in &cases {
        assert_eq!(RetryErrorType::from(err), *expected, "{err}");
    }
}
