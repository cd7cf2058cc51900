//! Error types for the TickTick client.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status code and body,
//! so callers can inspect whatever the service sent back. `EmptyResponse` is
//! kept apart because a 2xx with no body where a record was expected means
//! the service broke its contract, not that the request failed.

use thiserror::Error;

/// Failure to decode a timestamp token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// The token is neither `null`, `""`, a layout string, nor an integer.
    #[error("invalid timestamp `{raw}`")]
    Malformed { raw: String },

    /// The millisecond epoch value does not fit a calendar date.
    #[error("timestamp {millis}ms is out of range")]
    OutOfRange { millis: i64 },
}

/// Errors returned by the request builder, the parsers and the transports.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a status outside 200..=299.
    #[error("ticktick: HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered 2xx with no body where a record was expected.
    #[error("ticktick: HTTP {status}: empty response body")]
    EmptyResponse { status: u16 },

    /// The response body could not be decoded into the expected record.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The request never produced a response (connect, TLS, timeout, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// An id cannot be carried as a single URL path segment.
    #[error("invalid path segment: {0}")]
    InvalidPath(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } | ApiError::EmptyResponse { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_status_and_body() {
        let err = ApiError::Http {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "ticktick: HTTP 404: not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_response_reports_status() {
        let err = ApiError::EmptyResponse { status: 200 };
        assert_eq!(err.status(), Some(200));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "ticktick: HTTP 200: empty response body");
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn malformed_time_names_the_token() {
        let err = TimeError::Malformed {
            raw: "not-a-date".to_string(),
        };
        assert!(err.to_string().contains("not-a-date"));
    }
}
