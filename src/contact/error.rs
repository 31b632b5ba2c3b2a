//! Failure taxonomy for a single submission.

use std::time::Duration;
use thiserror::Error;

use crate::mail::TransportError;

/// Why a submission did not end in two sent messages.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required field was absent or empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The email field is not shaped like `local@domain.tld`.
    #[error("invalid email format")]
    InvalidEmailFormat,

    /// A sanitized field exceeds its character bound.
    #[error("{field} exceeds {max} characters")]
    InputTooLong { field: &'static str, max: usize },

    /// The request body could not be decoded.
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// The source address used up its allowance for the current window.
    #[error("rate limited: {limit} submissions per {}s, retry in {}s", .window.as_secs(), .retry_after.as_secs())]
    RateLimited {
        limit: u32,
        window: Duration,
        retry_after: Duration,
    },

    /// One or both outbound messages failed.
    #[error("mail transport error: {0}")]
    MailTransport(#[from] TransportError),

    /// Anything else; detail is for logs only.
    #[error("unhandled error: {0}")]
    Unhandled(String),
}

impl RelayError {
    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingField(_) => "missing_field",
            RelayError::InvalidEmailFormat => "invalid_email_format",
            RelayError::InputTooLong { .. } => "input_too_long",
            RelayError::MalformedBody(_) => "malformed_body",
            RelayError::RateLimited { .. } => "rate_limited",
            RelayError::MailTransport(_) => "mail_transport_error",
            RelayError::Unhandled(_) => "unhandled_error",
        }
    }

    /// Whether the client can fix this by changing its input.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, RelayError::MailTransport(_) | RelayError::Unhandled(_))
    }
}
