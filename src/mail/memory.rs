//! In-process transport that records messages instead of delivering them.
//!
//! Used for `mail.dry_run` and as the test double for the dispatcher and
//! the HTTP surface.

use futures_util::future::{BoxFuture, FutureExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

use crate::mail::transport::{MailKind, MailTransport, MessageId, OutboundMail, TransportError};

#[derive(Debug, Default)]
struct Inner {
    sent: Vec<OutboundMail>,
    attempts: usize,
    fail_kinds: Vec<MailKind>,
    delay: Option<Duration>,
}

/// Recording transport. Clones share the same mailbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Inner>>,
    log_messages: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that logs every accepted message at info level.
    pub fn logging() -> Self {
        Self {
            log_messages: true,
            ..Self::default()
        }
    }

    /// Inspection and setup keep working after a send panicked mid-update.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_for_send(&self) -> Result<MutexGuard<'_, Inner>, TransportError> {
        self.inner
            .lock()
            .map_err(|_| TransportError::Rejected("memory transport state poisoned".to_string()))
    }

    /// Make every message fail.
    pub fn fail_all(&self) {
        self.fail_on(MailKind::Notification);
        self.fail_on(MailKind::Acknowledgement);
    }

    /// Make messages of one kind fail.
    pub fn fail_on(&self, kind: MailKind) {
        let mut inner = self.lock();
        if !inner.fail_kinds.contains(&kind) {
            inner.fail_kinds.push(kind);
        }
    }

    /// Hold each send for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.lock().sent.clone()
    }

    /// Every call to `send`, successful or not.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.sent.clear();
        inner.attempts = 0;
    }
}

impl MailTransport for MemoryTransport {
    fn send<'a>(&'a self, mail: &'a OutboundMail) -> BoxFuture<'a, Result<MessageId, TransportError>> {
        async move {
            let delay = {
                let mut inner = self.lock_for_send()?;
                inner.attempts += 1;
                inner.delay
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let mut inner = self.lock_for_send()?;
            if inner.fail_kinds.contains(&mail.kind) {
                return Err(TransportError::Rejected(format!("simulated {} failure", mail.kind)));
            }

            let id = MessageId(format!("<{}@memory>", Uuid::new_v4()));
            if self.log_messages {
                tracing::info!(
                    message_id = %id,
                    kind = %mail.kind,
                    to = %mail.to,
                    subject = %mail.subject,
                    "Dry run: message not sent"
                );
            }
            inner.sent.push(mail.clone());
            Ok(id)
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
