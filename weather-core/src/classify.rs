//! Mapping from a raw HTTP outcome to a success payload or a user-facing failure.
//!
//! The same table is used by every party that talks HTTP: the CLI talking to the
//! provider or to the gateway, and the gateway talking to the provider.

use serde_json::Value;
use thiserror::Error;

pub const BAD_REQUEST_MSG: &str = "Invalid request. Please check your input.";
pub const INVALID_KEY_MSG: &str = "Invalid API key. Please check your OpenWeatherMap API key.";
pub const FORBIDDEN_MSG: &str = "Authorization error. Please contact support.";
pub const NOT_FOUND_MSG: &str = "City not found. Please check the city name and try again.";
pub const RATE_LIMITED_MSG: &str = "Too many requests. Please wait a moment and try again.";
pub const UNAVAILABLE_MSG: &str =
    "Weather service is temporarily unavailable. Please try again later.";
pub const NETWORK_MSG: &str =
    "Unable to connect to the weather service. Please check your internet connection.";
pub const TIMEOUT_MSG: &str = "The weather service took too long to respond. Please try again.";
pub const PARSE_MSG: &str = "Failed to parse response from weather API";
pub const MALFORMED_MSG: &str = "Received an incomplete response from the weather service.";
pub const UNKNOWN_MSG: &str = "An error occurred while fetching weather data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    BadRequest,
    AuthError,
    NotFound,
    RateLimited,
    ProviderUnavailable,
    NetworkError,
    RequestTimeout,
    ParseError,
    MalformedPayload,
    UnknownError,
}

/// A classified, terminal failure of one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    /// HTTP status that produced the failure, if a response was received.
    pub status: Option<u16>,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self { kind, status, message: message.into() }
    }

    pub fn network() -> Self {
        Self::new(FailureKind::NetworkError, None, NETWORK_MSG)
    }

    pub fn timeout() -> Self {
        Self::new(FailureKind::RequestTimeout, None, TIMEOUT_MSG)
    }

    pub fn parse(status: u16) -> Self {
        Self::new(FailureKind::ParseError, Some(status), PARSE_MSG)
    }

    pub fn malformed() -> Self {
        Self::new(FailureKind::MalformedPayload, None, MALFORMED_MSG)
    }
}

/// Classify a received response.
///
/// Only 200 yields the parsed JSON payload; a 200 with a body that is not JSON is a
/// [`FailureKind::ParseError`]. Any other status, other 2xx included, is a failure.
/// Failure bodies are only consulted for their `message` field, and only for statuses
/// outside the known table.
pub fn classify(status: u16, body: &[u8]) -> Result<Value, Failure> {
    if status == 200 {
        return serde_json::from_slice(body).map_err(|_| Failure::parse(status));
    }

    let (kind, message) = match status {
        400 => (FailureKind::BadRequest, BAD_REQUEST_MSG.to_owned()),
        401 => (FailureKind::AuthError, INVALID_KEY_MSG.to_owned()),
        403 => (FailureKind::AuthError, FORBIDDEN_MSG.to_owned()),
        404 => (FailureKind::NotFound, NOT_FOUND_MSG.to_owned()),
        429 => (FailureKind::RateLimited, RATE_LIMITED_MSG.to_owned()),
        500 | 502 | 503 => (FailureKind::ProviderUnavailable, UNAVAILABLE_MSG.to_owned()),
        _ => (
            FailureKind::UnknownError,
            payload_message(body).unwrap_or_else(|| UNKNOWN_MSG.to_owned()),
        ),
    };

    Err(Failure::new(kind, Some(status), message))
}

fn payload_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_map_to_fixed_messages() {
        let table = [
            (400, FailureKind::BadRequest, BAD_REQUEST_MSG),
            (401, FailureKind::AuthError, INVALID_KEY_MSG),
            (403, FailureKind::AuthError, "Authorization error. Please contact support."),
            (404, FailureKind::NotFound, "City not found. Please check the city name and try again."),
            (429, FailureKind::RateLimited, "Too many requests. Please wait a moment and try again."),
            (500, FailureKind::ProviderUnavailable, UNAVAILABLE_MSG),
            (502, FailureKind::ProviderUnavailable, UNAVAILABLE_MSG),
            (503, FailureKind::ProviderUnavailable, UNAVAILABLE_MSG),
        ];

        for (status, kind, message) in table {
            // The body's own message must not override a known status.
            let body = br#"{"cod":"x","message":"provider says something else"}"#;
            let failure = classify(status, body).unwrap_err();
            assert_eq!(failure.kind, kind, "status {status}");
            assert_eq!(failure.message, message, "status {status}");
            assert_eq!(failure.status, Some(status));
        }
    }

    #[test]
    fn unknown_status_prefers_payload_message() {
        let failure = classify(418, br#"{"message":"short and stout"}"#).unwrap_err();
        assert_eq!(failure.kind, FailureKind::UnknownError);
        assert_eq!(failure.message, "short and stout");
    }

    #[test]
    fn unknown_status_without_message_uses_fallback() {
        for body in [&b""[..], b"<html>oops</html>", br#"{"message":""}"#, br#"{"message":7}"#] {
            let failure = classify(504, body).unwrap_err();
            assert_eq!(failure.kind, FailureKind::UnknownError);
            assert_eq!(failure.message, UNKNOWN_MSG);
        }
    }

    #[test]
    fn success_returns_payload() {
        let payload = classify(200, br#"{"name":"Paris"}"#).unwrap();
        assert_eq!(payload["name"], "Paris");
    }

    #[test]
    fn other_success_statuses_are_not_success() {
        for status in [201, 202, 204] {
            let failure = classify(status, br#"{"name":"Paris"}"#).unwrap_err();
            assert_eq!(failure.kind, FailureKind::UnknownError, "status {status}");
            assert_eq!(failure.message, UNKNOWN_MSG);
        }
    }

    #[test]
    fn success_with_garbage_body_is_parse_error() {
        let failure = classify(200, b"not json").unwrap_err();
        assert_eq!(failure.kind, FailureKind::ParseError);
        assert_eq!(failure.message, PARSE_MSG);
    }

    #[test]
    fn error_body_that_is_not_json_still_classifies_by_status() {
        let failure = classify(404, b"Not Found").unwrap_err();
        assert_eq!(failure.kind, FailureKind::NotFound);
    }
}
