//! Error types for the attendance API client.
//!
//! # Design
//! Failures fall into four families. Transport errors never carry a status
//! code. `Http` carries the status and whatever body could be parsed.
//! `Unsupported` is raised by capability stubs before any request is built.
//! The remaining variants cover payloads that could not be shaped, encoded,
//! or decoded. An unparseable response body is not an error: it degrades to
//! `None` in the request wrapper.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by the request wrapper and the API facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (connection refused, DNS, ...).
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a status outside the 2xx range.
    #[error("{message}")]
    Http {
        status: u16,
        body: Option<Value>,
        message: String,
    },

    /// The backend is known not to implement this operation.
    #[error("{operation} is not supported by backend")]
    Unsupported { operation: &'static str },

    /// A caller-supplied payload is missing something the backend requires.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A successful response did not contain the expected entity.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build an `Http` error, picking the message from the parsed body.
    ///
    /// Prefers a string `message` field, then `error`, then the generic
    /// `Request failed: <status>`.
    pub fn from_status(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| {
                ["message", "error"]
                    .iter()
                    .find_map(|key| b.get(key).and_then(Value::as_str).filter(|m| !m.is_empty()))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Request failed: {status}"));
        ApiError::Http {
            status,
            body,
            message,
        }
    }

    /// HTTP status of the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed response body attached to an HTTP failure.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, ApiError::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_field_wins() {
        let err = ApiError::from_status(400, Some(json!({"message": "bad name", "error": "x"})));
        assert_eq!(err.to_string(), "bad name");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn error_field_used_when_message_missing() {
        let err = ApiError::from_status(404, Some(json!({"error": "user not found"})));
        assert_eq!(err.to_string(), "user not found");
    }

    #[test]
    fn empty_message_falls_through_to_error() {
        let err = ApiError::from_status(404, Some(json!({"message": "", "error": "user not found"})));
        assert_eq!(err.to_string(), "user not found");

        let err = ApiError::from_status(400, Some(json!({"message": "", "error": ""})));
        assert_eq!(err.to_string(), "Request failed: 400");
    }

    #[test]
    fn generic_message_for_text_body() {
        let err = ApiError::from_status(502, Some(json!("Bad Gateway")));
        assert_eq!(err.to_string(), "Request failed: 502");
        assert_eq!(err.body(), Some(&json!("Bad Gateway")));
    }

    #[test]
    fn generic_message_without_body() {
        let err = ApiError::from_status(500, None);
        assert_eq!(err.to_string(), "Request failed: 500");
        assert!(err.body().is_none());
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn unsupported_message_names_operation() {
        let err = ApiError::Unsupported {
            operation: "deleteAttendance",
        };
        assert_eq!(err.to_string(), "deleteAttendance is not supported by backend");
        assert!(err.is_unsupported());
    }
}
