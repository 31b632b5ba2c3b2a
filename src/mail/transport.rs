//! Transport capability: hand one message to something that delivers mail.

use futures_util::future::BoxFuture;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which half of a submission a message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailKind {
    /// Sent to the site operator.
    Notification,
    /// Sent back to the visitor.
    Acknowledgement,
}

impl MailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailKind::Notification => "notification",
            MailKind::Acknowledgement => "acknowledgement",
        }
    }
}

impl fmt::Display for MailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully composed message, independent of any mail library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub kind: MailKind,
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
}

/// Identifier the transport assigned to a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while handing a message to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// A header address could not be parsed.
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    /// The message could not be assembled.
    #[error("message build failed: {0}")]
    Build(String),

    /// Connection or SMTP-level failure.
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// No answer within the deadline.
    #[error("send timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The transport refused the message.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Something that can deliver an [`OutboundMail`].
///
/// Object-safe so the server can hold an `Arc<dyn MailTransport>` and tests
/// can swap in a recording double.
pub trait MailTransport: Send + Sync {
    /// Deliver one message.
    fn send<'a>(&'a self, mail: &'a OutboundMail) -> BoxFuture<'a, Result<MessageId, TransportError>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
