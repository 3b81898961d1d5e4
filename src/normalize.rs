//! Response normalization.
//!
//! Maps a raw [`TransportResponse`] to a parsed JSON payload or to one of the
//! classified errors of [`VenmoError`]:
//!
//! | Status | Condition                                   | Result                           |
//! |--------|---------------------------------------------|----------------------------------|
//! | 200    | body is JSON                                | `Ok(body)`                       |
//! | 200    | body is not JSON                            | `Api` / `MalformedBody`          |
//! | 401    |                                             | `Auth`, message `Venmo: {msg}`   |
//! | 400    | upstream message is `Resource not found.`   | `Api` / `NotFound`               |
//! | other  |                                             | `Api` / `Status`, `{msg} (HTTP {status})` |
//!
//! Error bodies are read defensively: `error.message` falls back to
//! `Unknown error` and `error.code` to the numeric status.

use http::StatusCode;
use serde::Deserialize;

use crate::error::{ApiErrorKind, PROVIDER_NAME, VenmoError};
use crate::transport::TransportResponse;

const UNKNOWN_ERROR: &str = "Unknown error";
const NOT_FOUND_MESSAGE: &str = "Resource not found.";

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    /// Seen both as a number and as a string.
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Turns a transport response into a JSON payload or a classified error.
pub fn normalize_response(response: TransportResponse) -> Result<serde_json::Value, VenmoError> {
    let status = response.status;
    if status == StatusCode::OK {
        return serde_json::from_slice(&response.body).map_err(|_| VenmoError::Api {
            kind: ApiErrorKind::MalformedBody,
            message: format!("{} (HTTP {})", UNKNOWN_ERROR, status.as_u16()),
            status,
            code: status.as_u16().to_string(),
        });
    }

    let detail = serde_json::from_slice::<ErrorEnvelope>(&response.body)
        .ok()
        .and_then(|envelope| envelope.error)
        .unwrap_or_default();
    let message = detail.message.unwrap_or_else(|| UNKNOWN_ERROR.to_string());
    let code = match detail.code {
        Some(serde_json::Value::String(code)) => code,
        Some(serde_json::Value::Number(code)) => code.to_string(),
        _ => status.as_u16().to_string(),
    };

    Err(classify(status, message, code))
}

fn classify(status: StatusCode, message: String, code: String) -> VenmoError {
    if status == StatusCode::UNAUTHORIZED {
        VenmoError::Auth {
            message: format!("{}: {}", PROVIDER_NAME, message),
            status,
            code,
        }
    } else if status == StatusCode::BAD_REQUEST && message == NOT_FOUND_MESSAGE {
        VenmoError::Api {
            kind: ApiErrorKind::NotFound,
            message,
            status,
            code,
        }
    } else {
        VenmoError::Api {
            kind: ApiErrorKind::Status,
            message: format!("{} (HTTP {})", message, status.as_u16()),
            status,
            code,
        }
    }
}

/// Rejects a successful GraphQL response that reports errors in its body.
pub fn reject_graphql_errors(
    status: StatusCode,
    body: serde_json::Value,
) -> Result<serde_json::Value, VenmoError> {
    match venmo_types::proto::graphql::first_error_message(&body) {
        Some(message) => Err(VenmoError::Api {
            kind: ApiErrorKind::GraphQl,
            message,
            status,
            code: "graphql".to_string(),
        }),
        None => Ok(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: serde_json::Value) -> TransportResponse {
        TransportResponse::new(
            StatusCode::from_u16(status).unwrap(),
            serde_json::to_vec(&body).unwrap(),
        )
    }

    #[test]
    fn test_ok_returns_body() {
        let body = normalize_response(response(200, json!({ "data": { "id": "x" } }))).unwrap();
        assert_eq!(body["data"]["id"], "x");
    }

    #[test]
    fn test_401_is_auth_error() {
        let err = normalize_response(response(
            401,
            json!({ "error": { "message": "OAuth token expired", "code": 261 } }),
        ))
        .unwrap_err();
        match err {
            VenmoError::Auth {
                message,
                status,
                code,
            } => {
                assert_eq!(message, "Venmo: OAuth token expired");
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(code, "261");
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_400_resource_not_found() {
        let err = normalize_response(response(
            400,
            json!({ "error": { "message": "Resource not found.", "code": "283" } }),
        ))
        .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Resource not found.");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.code(), Some("283"));
    }

    #[test]
    fn test_other_400_is_generic_api_error() {
        let err = normalize_response(response(
            400,
            json!({ "error": { "message": "Insufficient funds", "code": 13006 } }),
        ))
        .unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Insufficient funds (HTTP 400)");
        assert_eq!(err.code(), Some("13006"));
    }

    #[test]
    fn test_missing_message_and_code_use_defaults() {
        let err = normalize_response(response(503, json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Unknown error (HTTP 503)");
        assert_eq!(err.code(), Some("503"));
    }

    #[test]
    fn test_non_json_error_body() {
        let err = normalize_response(TransportResponse::new(
            StatusCode::BAD_GATEWAY,
            "<html>bad gateway</html>",
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            VenmoError::Api {
                kind: ApiErrorKind::Status,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Unknown error (HTTP 502)");
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn test_non_json_ok_body_is_not_swallowed() {
        let err = normalize_response(TransportResponse::new(StatusCode::OK, "not json")).unwrap_err();
        assert!(matches!(
            err,
            VenmoError::Api {
                kind: ApiErrorKind::MalformedBody,
                ..
            }
        ));
        assert_eq!(err.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_graphql_errors_rejected() {
        let err = reject_graphql_errors(
            StatusCode::OK,
            json!({ "data": null, "errors": [{ "message": "Unauthorized" }] }),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VenmoError::Api {
                kind: ApiErrorKind::GraphQl,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Unauthorized");
    }
}
