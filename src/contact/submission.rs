//! Submission payload types.

use serde::Deserialize;

use crate::contact::sanitize::sanitize;

/// Raw form body as the browser sent it.
///
/// Every field is optional here so absence is reported as a validation
/// error instead of a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A form with all four fields present and a well-formed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A [`Submission`] with every field passed through [`sanitize`].
///
/// Only constructible from a `Submission`, so holders can rely on the
/// fields being free of `<`, `>` and script blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl SanitizedSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Submission> for SanitizedSubmission {
    fn from(submission: Submission) -> Self {
        Self {
            name: sanitize(&submission.name),
            email: sanitize(&submission.email),
            subject: sanitize(&submission.subject),
            message: sanitize(&submission.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_every_field() {
        let clean = SanitizedSubmission::from(Submission {
            name: " <b>Jane</b> ".into(),
            email: "jane@example.com<script>x</script>".into(),
            subject: "<i>Hi</i>".into(),
            message: "Hello<script>steal()</script>!".into(),
        });
        assert_eq!(clean.name(), "bJane/b");
        assert_eq!(clean.email(), "jane@example.com");
        assert_eq!(clean.subject(), "iHi/i");
        assert_eq!(clean.message(), "Hello!");
    }

    #[test]
    fn decodes_partial_json() {
        let form: ContactForm = serde_json::from_str(r#"{"name":"Jane","email":null}"#).unwrap();
        assert_eq!(form.name.as_deref(), Some("Jane"));
        assert!(form.email.is_none());
        assert!(form.message.is_none());
    }
}
