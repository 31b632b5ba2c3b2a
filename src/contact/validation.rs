//! Presence, format and length checks for submissions.
//!
//! # Check order
//! 1. Presence of name, email, subject, message (in that order)
//! 2. Email shape
//! 3. Length bounds, applied later to the *sanitized* fields

use lettre::Address;
use regex::Regex;
use std::sync::LazyLock;

use crate::contact::error::RelayError;
use crate::contact::submission::{ContactForm, SanitizedSubmission, Submission};

/// Longest accepted name, in characters.
pub const MAX_NAME_CHARS: usize = 100;
/// Longest accepted subject, in characters.
pub const MAX_SUBJECT_CHARS: usize = 200;
/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"));

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Turn a raw form into a [`Submission`], failing on the first violation.
///
/// Presence is checked for all four fields before the email format, so a
/// missing email is `MissingField`, never `InvalidEmailFormat`.
pub fn validate(form: ContactForm) -> Result<Submission, RelayError> {
    let name = required("name", form.name)?;
    let email = required("email", form.email)?;
    let subject = required("subject", form.subject)?;
    let message = required("message", form.message)?;

    if !is_valid_email(&email) {
        return Err(RelayError::InvalidEmailFormat);
    }

    Ok(Submission {
        name,
        email,
        subject,
        message,
    })
}

fn required(field: &'static str, value: Option<String>) -> Result<String, RelayError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RelayError::MissingField(field)),
    }
}

/// Enforce length bounds on already-sanitized fields.
///
/// Also re-checks the email: markup that made a value look like an address
/// is gone after sanitization, and the address must be one the mailer can
/// put in a header.
pub fn check_sanitized(submission: &SanitizedSubmission) -> Result<(), RelayError> {
    let email = submission.email();
    if !is_valid_email(email) || email.parse::<Address>().is_err() {
        return Err(RelayError::InvalidEmailFormat);
    }

    let bounds = [
        ("name", submission.name(), MAX_NAME_CHARS),
        ("subject", submission.subject(), MAX_SUBJECT_CHARS),
        ("message", submission.message(), MAX_MESSAGE_CHARS),
    ];
    for (field, value, max) in bounds {
        if value.chars().count() > max {
            return Err(RelayError::InputTooLong { field, max });
        }
    }
    Ok(())
}
