//! Composes and sends the notification/acknowledgement pair.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{MailConfig, SignatureConfig};
use crate::contact::SanitizedSubmission;
use crate::mail::templates::{acknowledgement_html, notification_html};
use crate::mail::transport::{MailKind, MailTransport, MessageId, OutboundMail, TransportError};
use crate::observability::metrics;

/// Outcome of one dispatch. Lives only for the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub notification_sent: bool,
    pub acknowledgement_sent: bool,
    /// First failure, notification before acknowledgement.
    pub error: Option<TransportError>,
    pub notification_id: Option<MessageId>,
    pub acknowledgement_id: Option<MessageId>,
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        self.notification_sent && self.acknowledgement_sent
    }
}

/// Static parts of both messages.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub operator_address: String,
    pub from_address: String,
    pub sender_name: String,
    pub subject_prefix: String,
    pub acknowledgement_subject: String,
    pub signature: SignatureConfig,
    pub timeout: Duration,
}

impl From<&MailConfig> for DispatchSettings {
    fn from(config: &MailConfig) -> Self {
        Self {
            operator_address: config.operator_address.clone(),
            from_address: config.username.clone(),
            sender_name: config.sender_name.clone(),
            subject_prefix: config.subject_prefix.clone(),
            acknowledgement_subject: config.acknowledgement_subject.clone(),
            signature: config.signature.clone(),
            timeout: config.timeout(),
        }
    }
}

/// Sends both messages for a submission through an injected transport.
#[derive(Clone)]
pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    settings: DispatchSettings,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, settings: DispatchSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Build the notification and acknowledgement for a submission.
    pub fn compose(
        &self,
        submission: &SanitizedSubmission,
        received_at: DateTime<Utc>,
    ) -> (OutboundMail, OutboundMail) {
        let s = &self.settings;
        let notification = OutboundMail {
            kind: MailKind::Notification,
            from_name: s.sender_name.clone(),
            from_address: s.from_address.clone(),
            to: s.operator_address.clone(),
            reply_to: Some(submission.email().to_string()),
            subject: format!("{}{}", s.subject_prefix, submission.subject()),
            html_body: notification_html(submission, received_at),
        };
        let acknowledgement = OutboundMail {
            kind: MailKind::Acknowledgement,
            from_name: s.signature.name.clone(),
            from_address: s.from_address.clone(),
            to: submission.email().to_string(),
            reply_to: None,
            subject: s.acknowledgement_subject.clone(),
            html_body: acknowledgement_html(submission, received_at, &s.signature),
        };
        (notification, acknowledgement)
    }

    /// Send both messages concurrently and wait for both.
    ///
    /// A failure on one side never cancels the other; there is no retry and
    /// no compensation for a half-sent pair.
    pub async fn dispatch(&self, submission: &SanitizedSubmission) -> DispatchResult {
        let (notification, acknowledgement) = self.compose(submission, Utc::now());
        let start = Instant::now();

        let (notification_outcome, acknowledgement_outcome) = tokio::join!(
            self.send_one(&notification),
            self.send_one(&acknowledgement),
        );

        metrics::record_dispatch_duration(start);

        let error = notification_outcome
            .as_ref()
            .err()
            .or(acknowledgement_outcome.as_ref().err())
            .cloned();

        DispatchResult {
            notification_sent: notification_outcome.is_ok(),
            acknowledgement_sent: acknowledgement_outcome.is_ok(),
            error,
            notification_id: notification_outcome.ok(),
            acknowledgement_id: acknowledgement_outcome.ok(),
        }
    }

    async fn send_one(&self, mail: &OutboundMail) -> Result<MessageId, TransportError> {
        let timeout = self.settings.timeout;
        let outcome = match tokio::time::timeout(timeout, self.transport.send(mail)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Timeout(timeout)),
        };

        match &outcome {
            Ok(id) => {
                tracing::info!(kind = %mail.kind, message_id = %id, transport = self.transport.name(), "Message sent");
            }
            Err(e) => {
                tracing::error!(kind = %mail.kind, to = %mail.to, transport = self.transport.name(), error = %e, "Message send failed");
            }
        }
        metrics::record_mail_sent(mail.kind.as_str(), outcome.is_ok());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::Submission;
    use crate::mail::MemoryTransport;

    fn settings() -> DispatchSettings {
        DispatchSettings {
            operator_address: "owner@example.com".into(),
            from_address: "relay@example.com".into(),
            sender_name: "Portfolio Contact Form".into(),
            subject_prefix: "Portfolio Contact: ".into(),
            acknowledgement_subject: "Thank you for contacting me!".into(),
            signature: SignatureConfig::default(),
            timeout: Duration::from_secs(5),
        }
    }

    fn submission() -> SanitizedSubmission {
        SanitizedSubmission::from(Submission {
            name: "Jane".into(),
            email: "jane@example.com".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        })
    }

    #[test]
    fn composes_both_messages() {
        let dispatcher = MailDispatcher::new(Arc::new(MemoryTransport::new()), settings());
        let (notification, acknowledgement) = dispatcher.compose(&submission(), Utc::now());

        assert_eq!(notification.to, "owner@example.com");
        assert_eq!(notification.reply_to.as_deref(), Some("jane@example.com"));
        assert_eq!(notification.subject, "Portfolio Contact: Hi");
        assert_eq!(notification.from_name, "Portfolio Contact Form");

        assert_eq!(acknowledgement.to, "jane@example.com");
        assert_eq!(acknowledgement.subject, "Thank you for contacting me!");
        assert!(acknowledgement.html_body.contains("Hi"));
        assert!(acknowledgement.reply_to.is_none());
    }

    #[tokio::test]
    async fn sends_both() {
        let transport = MemoryTransport::new();
        let dispatcher = MailDispatcher::new(Arc::new(transport.clone()), settings());

        let result = dispatcher.dispatch(&submission()).await;

        assert!(result.is_success());
        assert!(result.error.is_none());
        assert!(result.notification_id.is_some() && result.acknowledgement_id.is_some());
        let recipients: Vec<_> = transport.sent().into_iter().map(|m| m.to).collect();
        assert_eq!(recipients.len(), 2);
        assert!(recipients.contains(&"owner@example.com".to_string()));
        assert!(recipients.contains(&"jane@example.com".to_string()));
    }

    #[tokio::test]
    async fn one_failure_still_attempts_the_other() {
        let transport = MemoryTransport::new();
        transport.fail_on(MailKind::Notification);
        let dispatcher = MailDispatcher::new(Arc::new(transport.clone()), settings());

        let result = dispatcher.dispatch(&submission()).await;

        assert!(!result.is_success());
        assert!(!result.notification_sent);
        assert!(result.acknowledgement_sent);
        assert!(matches!(result.error, Some(TransportError::Rejected(_))));
        assert_eq!(transport.attempts(), 2);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_transport_times_out() {
        let transport = MemoryTransport::new();
        transport.set_delay(Duration::from_secs(60));
        let mut settings = settings();
        settings.timeout = Duration::from_secs(1);
        let dispatcher = MailDispatcher::new(Arc::new(transport), settings);

        let result = dispatcher.dispatch(&submission()).await;

        assert!(!result.notification_sent && !result.acknowledgement_sent);
        assert_eq!(result.error, Some(TransportError::Timeout(Duration::from_secs(1))));
    }
}
