//! Error taxonomy for every operation of this crate.
//!
//! Failures are never retried here. Each variant carries enough context to log
//! the failure and let the caller decide whether to try again:
//!
//! - [`VenmoError::Auth`] - the token was rejected (HTTP 401)
//! - [`VenmoError::Api`] - any other unsuccessful HTTP or GraphQL response
//! - [`VenmoError::Validation`] - a local precondition failed; nothing was sent
//! - [`VenmoError::Extraction`] - a response lacked a field we rely on
//! - [`VenmoError::Transport`] - the transport itself failed (DNS, TLS, timeout, ...)

use http::StatusCode;
use venmo_types::Decimal;
use venmo_types::proto::ExtractionError;

use crate::transport::TransportError;

/// Provider name used to prefix authentication failures.
pub const PROVIDER_NAME: &str = "Venmo";

/// Subdivision of [`VenmoError::Api`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP 400 with the upstream message `Resource not found.`
    NotFound,
    /// Any other non-200 status.
    Status,
    /// HTTP 200 carrying a GraphQL `errors` array.
    GraphQl,
    /// HTTP 200 whose body is not JSON.
    MalformedBody,
}

/// Local precondition failures. No request is issued when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The funding-source policy found no eligible instrument for a payment.
    #[error("No funding source available.")]
    NoFundingSource,
    /// A call needing the cached identity ran before [`crate::VenmoSession::get_identity`].
    #[error("Identity has not been fetched; call get_identity first ({operation})")]
    IdentityNotFetched { operation: &'static str },
    /// Transfer amounts are magnitudes and must be strictly positive.
    #[error("Amount must be positive, got {amount} ({operation})")]
    NonPositiveAmount {
        operation: &'static str,
        amount: Decimal,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum VenmoError {
    #[error("{message}")]
    Auth {
        message: String,
        status: StatusCode,
        code: String,
    },
    #[error("{message}")]
    Api {
        kind: ApiErrorKind,
        message: String,
        status: StatusCode,
        code: String,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Transport error: {context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("Invalid endpoint URL: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header value: {context}: {source}")]
    InvalidHeader {
        context: &'static str,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("Failed to encode request body: {context}: {source}")]
    Encode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl VenmoError {
    /// HTTP status of the response that caused the error, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            VenmoError::Auth { status, .. } | VenmoError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream error code, when the response carried (or implied) one.
    pub fn code(&self) -> Option<&str> {
        match self {
            VenmoError::Auth { code, .. } | VenmoError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, VenmoError::Auth { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VenmoError::Api {
                kind: ApiErrorKind::NotFound,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let err = VenmoError::Api {
            kind: ApiErrorKind::NotFound,
            message: "Resource not found.".to_string(),
            status: StatusCode::BAD_REQUEST,
            code: "283".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_auth());
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.code(), Some("283"));
        assert_eq!(err.to_string(), "Resource not found.");
    }

    #[test]
    fn test_validation_has_no_status() {
        let err = VenmoError::from(ValidationError::NoFundingSource);
        assert_eq!(err.status(), None);
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "No funding source available.");
    }
}
