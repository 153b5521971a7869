//! The gateway's own status codes and bodies.
//!
//! A provider outcome is first classified like any other HTTP outcome, then mapped a
//! second time to what the browser sees. A rejected key (provider 401) never reaches
//! the browser as such: it becomes a generic internal error.

use axum::http::StatusCode;
use serde_json::{Value, json};
use weather_core::{Failure, FailureKind, QueryError};

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    fn error(status: StatusCode, error: &str, message: &str) -> Self {
        Self { status, body: json!({ "error": error, "message": message }) }
    }
}

pub fn not_configured() -> Reply {
    Reply::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
        "Weather service is not configured properly",
    )
}

pub fn rejected(err: QueryError) -> Reply {
    let message = match err {
        QueryError::EmptyInput => "City parameter is required",
        QueryError::TooLong => "City name is too long",
    };
    Reply::error(StatusCode::BAD_REQUEST, "Bad request", message)
}

pub fn bad_query() -> Reply {
    Reply::error(StatusCode::BAD_REQUEST, "Bad request", "Invalid query string")
}

pub fn preflight() -> Reply {
    Reply { status: StatusCode::OK, body: json!({ "message": "OK" }) }
}

/// Map a classified provider outcome to the gateway's reply.
pub fn relay(outcome: Result<Value, Failure>) -> Reply {
    let failure = match outcome {
        Ok(payload) => return Reply { status: StatusCode::OK, body: payload },
        Err(failure) => failure,
    };

    match failure.kind {
        FailureKind::NotFound => Reply::error(
            StatusCode::NOT_FOUND,
            "Not found",
            "City not found. Please check the city name and try again.",
        ),
        FailureKind::AuthError if failure.status == Some(401) => {
            tracing::error!("provider rejected the configured API key");
            Reply::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "Weather service authentication failed",
            )
        }
        FailureKind::RateLimited => Reply::error(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests",
            "Weather service rate limit exceeded. Please try again later.",
        ),
        FailureKind::NetworkError | FailureKind::RequestTimeout | FailureKind::ParseError => {
            tracing::error!(kind = ?failure.kind, "error fetching weather data");
            Reply::error(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable",
                "Unable to fetch weather data. Please try again later.",
            )
        }
        FailureKind::AuthError
        | FailureKind::BadRequest
        | FailureKind::ProviderUnavailable
        | FailureKind::MalformedPayload
        | FailureKind::UnknownError => {
            tracing::error!(status = ?failure.status, kind = ?failure.kind, "unexpected response from weather API");
            Reply::error(
                StatusCode::BAD_GATEWAY,
                "Bad gateway",
                "Weather service returned an unexpected response",
            )
        }
    }
}
