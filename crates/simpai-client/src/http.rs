//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`ClientError::Api`]) and typed body decoding so
//! the client methods stay focused on request construction.

use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`ClientError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`ClientError::Api`] with the status code and
///   the backend's `error`/`detail`/`message` field, or the raw body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(ClientError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status,
            message: error_message(&body),
        });
    }
    Ok(resp)
}

/// Decode a successful response body into `T`.
///
/// Any shape mismatch becomes [`ClientError::MalformedResponse`] naming the
/// endpoint, so a missing field never turns into a silent default.
pub async fn decode_json<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::malformed(endpoint, e.to_string()))
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_string))
        });
    from_json.unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    fn mock_response_with_retry_after(status: u16, value: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Retry-After", value)
                .body("")
                .unwrap(),
        )
    }

    #[test]
    fn parse_retry_after_from_header() {
        let resp = mock_response_with_retry_after(429, "120");
        assert_eq!(parse_retry_after(&resp), 120);
    }

    #[test]
    fn parse_retry_after_non_numeric() {
        let resp = mock_response_with_retry_after(429, "soon");
        assert_eq!(parse_retry_after(&resp), 60);
    }

    #[tokio::test]
    async fn check_response_rate_limited() {
        let resp = mock_response_with_retry_after(429, "30");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[tokio::test]
    async fn check_response_extracts_error_field() {
        let resp = mock_response(404, r#"{"error": "User with this email does not exist."}"#);
        let err = check_response(resp).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "User with this email does not exist.");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_response_keeps_plain_body() {
        let resp = mock_response(500, "Internal Server Error\n");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Api { status: 500, ref message } if message == "Internal Server Error"
        ));
    }

    #[tokio::test]
    async fn check_response_success() {
        let resp = mock_response(200, "{}");
        assert!(check_response(resp).await.is_ok());
    }

    #[derive(Debug, Deserialize)]
    struct NeedsId {
        #[allow(dead_code)]
        file_id: String,
    }

    #[tokio::test]
    async fn decode_json_reports_endpoint_on_missing_field() {
        let resp = mock_response(200, r#"{"preview": []}"#);
        let err = decode_json::<NeedsId>("csv/upload/", resp).await.unwrap_err();
        match err {
            ClientError::MalformedResponse { endpoint, reason } => {
                assert_eq!(endpoint, "csv/upload/");
                assert!(reason.contains("file_id"), "reason: {reason}");
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }
}
