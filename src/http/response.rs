//! Response bodies and the error → status mapping.
//!
//! Every JSON shape the relay emits is defined here so the wire contract
//! lives in one file.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::contact::relay::Quota;
use crate::contact::RelayError;

pub const RATE_LIMIT_MESSAGE: &str = "Too many emails sent from this IP, please try again later.";
pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Paths listed in 404 bodies.
pub const AVAILABLE_ENDPOINTS: [&str; 2] = ["/api/send-email", "/api/health"];

/// `2024-03-01T12:30:00.000Z`
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub message: &'static str,
    pub details: &'static str,
}

impl SuccessBody {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: "Email sent successfully!",
            details: "Thank you for your message. I will get back to you soon.",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorBody {
    fn new(error: &'static str) -> Self {
        Self {
            error,
            details: None,
            message: None,
            timestamp: None,
        }
    }

    fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub error: &'static str,
    pub available: [&'static str; 2],
}

impl NotFoundBody {
    pub fn new() -> Self {
        Self {
            error: "Endpoint not found",
            available: AVAILABLE_ENDPOINTS,
        }
    }
}

impl Default for NotFoundBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic 500 used for anything that escaped the pipeline, panics included.
pub fn internal_error() -> Response {
    let body = ErrorBody {
        message: Some("Something went wrong on our end"),
        ..ErrorBody::new("Internal server error")
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("All fields are required").details(format!(
                    "Please fill in all form fields ({field} is missing)"
                ))),
            )
                .into_response(),
            RelayError::InvalidEmailFormat => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Invalid email format").details("Please provide a valid email address")),
            )
                .into_response(),
            RelayError::InputTooLong { field, max } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Input too long").details(format!(
                    "Please keep your message within reasonable limits ({field}: at most {max} characters)"
                ))),
            )
                .into_response(),
            RelayError::MalformedBody(_) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Invalid request body").details(
                    "Send name, email, subject and message as a JSON object or form fields",
                )),
            )
                .into_response(),
            RelayError::RateLimited { limit, retry_after, .. } => {
                let mut response =
                    (StatusCode::TOO_MANY_REQUESTS, Json(ErrorBody::new(RATE_LIMIT_MESSAGE))).into_response();
                let headers = response.headers_mut();
                // Round up so clients never retry a moment too early.
                let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_secs));
                headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
                headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u32));
                response
            }
            RelayError::MailTransport(_) => {
                let body = ErrorBody {
                    timestamp: Some(iso_timestamp()),
                    ..ErrorBody::new("Failed to send email").details(
                        "Sorry, there was a problem sending your message. Please try again later or contact me directly.",
                    )
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            RelayError::Unhandled(_) => internal_error(),
        }
    }
}

/// Attach the caller's remaining allowance to a response.
pub fn with_quota(mut response: Response, quota: Option<Quota>) -> Response {
    if let Some(quota) = quota {
        let headers = response.headers_mut();
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(quota.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(quota.remaining));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::TransportError;
    use std::time::Duration;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_have_distinct_messages() {
        let missing = RelayError::MissingField("email").into_response();
        let format = RelayError::InvalidEmailFormat.into_response();
        let long = RelayError::InputTooLong { field: "message", max: 2000 }.into_response();

        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(format.status(), StatusCode::BAD_REQUEST);
        assert_eq!(long.status(), StatusCode::BAD_REQUEST);

        let missing = body_json(missing).await;
        let format = body_json(format).await;
        let long = body_json(long).await;
        assert_eq!(missing["error"], "All fields are required");
        assert_eq!(format["error"], "Invalid email format");
        assert_eq!(long["error"], "Input too long");
        assert!(long["details"].as_str().unwrap().contains("2000"));
    }

    #[tokio::test]
    async fn rate_limited_states_the_limit() {
        let response = RelayError::RateLimited {
            limit: 5,
            window: Duration::from_secs(900),
            retry_after: Duration::from_millis(1500),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
        assert_eq!(response.headers()[X_RATELIMIT_LIMIT], "5");
        assert_eq!(body_json(response).await["error"], RATE_LIMIT_MESSAGE);
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_detail() {
        let response =
            RelayError::MailTransport(TransportError::Smtp("535 bad credentials for owner".into())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to send email");
        assert!(body.get("success").is_none());
        assert!(!body.to_string().contains("535"));
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn unhandled_is_generic() {
        let body = body_json(RelayError::Unhandled("boom".into()).into_response()).await;
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], "Something went wrong on our end");
        assert!(body.get("details").is_none());
    }
}
