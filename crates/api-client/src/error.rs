//! Error types for the API client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<Envelope<T>, ApiError>;

/// Successful response payload together with CMS metadata
///
/// The CMS wraps most responses as `{"data": ..., "meta": ...}`; the client
/// unwraps that shape so callers receive the inner `data` directly. Payloads
/// without a `data` key are carried whole with `meta` absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The unwrapped response payload
    pub data: T,
    /// CMS metadata (`filter_count`, `total_count`, ...) when present
    pub meta: Option<Value>,
}

impl<T> Envelope<T> {
    /// Wrap a payload without metadata
    pub fn new(data: T) -> Self {
        Self { data, meta: None }
    }

    /// Wrap a payload with metadata
    pub fn with_meta(data: T, meta: Option<Value>) -> Self {
        Self { data, meta }
    }
}

/// Failure classification
///
/// Closed taxonomy; every failure reachable from the client terminates in
/// exactly one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The CMS returned a structured error payload
    Api,
    /// Required client configuration (base URL) is absent
    Config,
    /// Non-2xx status without a structured error payload
    Http,
    /// The transport call itself failed (connection refused, abort, ...)
    Network,
    /// Reserved for callers layering resource semantics on top; the client
    /// itself never produces it
    NotFound,
    /// The response body could not be decoded
    Parse,
    /// Caller-supplied input failed a precondition
    Validation,
}

impl ErrorKind {
    /// The snake_case wire name of this kind
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Config => "config",
            Self::Http => "http",
            Self::Network => "network",
            Self::NotFound => "not_found",
            Self::Parse => "parse",
            Self::Validation => "validation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API client error
///
/// A value, not a panic: every fallible operation in this crate returns one
/// of these instead of throwing. `details` carries the original error payload
/// or exception text for logging; calling code must not parse it.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct ApiError {
    /// Failure classification
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
    /// HTTP status code when known
    pub status: Option<u16>,
    /// CMS-defined error code string when present
    pub code: Option<String>,
    /// Opaque diagnostic payload, for logging only
    pub details: Option<Value>,
    /// Advisory hint that the failure is plausibly transient
    pub retryable: bool,
}

impl ApiError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
            details: None,
            retryable: false,
        }
    }

    /// Missing or invalid client configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Caller-supplied input failed a precondition
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Resource-level not-found, raised by callers above the client
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// The transport call failed before a response arrived
    pub fn network(message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            retryable: true,
            details,
            ..Self::new(ErrorKind::Network, message)
        }
    }

    /// The response body could not be decoded
    pub fn parse(status: u16, details: Option<Value>) -> Self {
        Self {
            status: Some(status),
            details,
            ..Self::new(ErrorKind::Parse, "response body could not be decoded")
        }
    }

    /// Structured error payload returned by the CMS
    pub fn api(
        status: u16,
        message: impl Into<String>,
        code: Option<String>,
        details: Option<Value>,
    ) -> Self {
        Self {
            status: Some(status),
            code,
            details,
            retryable: status >= 500,
            ..Self::new(ErrorKind::Api, message)
        }
    }

    /// Non-2xx status without a structured error payload
    pub fn http(status: u16, details: Option<Value>) -> Self {
        Self {
            status: Some(status),
            details,
            retryable: status >= 500,
            ..Self::new(
                ErrorKind::Http,
                format!("request failed with status {status}"),
            )
        }
    }

    /// Check if this error is plausibly transient
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(status) if (400..500).contains(&status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(status) if status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_network_is_retryable() {
        let err = ApiError::network("connection refused", None);
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(err.is_retryable());
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_status_drives_retryability() {
        assert!(ApiError::http(503, None).is_retryable());
        assert!(!ApiError::http(400, None).is_retryable());
        assert!(ApiError::api(500, "boom", None, None).is_retryable());
        assert!(!ApiError::api(404, "missing", None, None).is_retryable());
    }

    #[test]
    fn test_serializes_with_wire_field_names() {
        let err = ApiError::api(
            403,
            "forbidden",
            Some("FORBIDDEN".to_string()),
            Some(json!({"message": "forbidden"})),
        );
        let value = serde_json::to_value(&err).expect("serialize");
        assert_eq!(value["type"], "api");
        assert_eq!(value["status"], 403);
        assert_eq!(value["code"], "FORBIDDEN");
        assert_eq!(value["retryable"], false);
    }

    #[test]
    fn test_config_error_has_no_status() {
        let err = ApiError::config("no base URL configured");
        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(err.status, None);
        assert!(!err.is_client_error());
        assert!(!err.is_server_error());
    }
}
