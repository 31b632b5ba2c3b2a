//! Submission orchestration, independent of HTTP.

use std::net::IpAddr;
use std::sync::Arc;

use crate::contact::error::RelayError;
use crate::contact::submission::{ContactForm, SanitizedSubmission};
use crate::contact::validation::{check_sanitized, validate};
use crate::mail::{MailDispatcher, MessageId};
use crate::observability::metrics;
use crate::security::rate_limit::{Admission, RateLimiter};

/// Message ids of a fully delivered pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub notification_id: MessageId,
    pub acknowledgement_id: MessageId,
}

/// Limiter state as seen by this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u32,
    pub remaining: u32,
}

/// Everything the HTTP layer needs to answer one submission.
#[derive(Debug)]
pub struct SubmissionReport {
    /// `None` when rate limiting is disabled.
    pub quota: Option<Quota>,
    pub outcome: Result<SubmissionReceipt, RelayError>,
}

/// Runs the per-request pipeline. Holds no per-request state; the only
/// shared mutable state is the injected limiter.
#[derive(Clone)]
pub struct ContactRelay {
    limiter: Option<Arc<RateLimiter>>,
    dispatcher: MailDispatcher,
}

impl ContactRelay {
    pub fn new(dispatcher: MailDispatcher, limiter: Option<Arc<RateLimiter>>) -> Self {
        Self { limiter, dispatcher }
    }

    /// Process one submission from `source`.
    ///
    /// `payload` is the decoded body, or the decode failure; it is only
    /// looked at after the request has been counted by the limiter.
    pub async fn submit(
        &self,
        source: IpAddr,
        payload: Result<ContactForm, RelayError>,
    ) -> SubmissionReport {
        let quota = match self.gate(source) {
            Ok(quota) => quota,
            Err(e) => {
                return self.finish(
                    source,
                    SubmissionReport {
                        quota: self.limiter.as_ref().map(|l| Quota {
                            limit: l.limit(),
                            remaining: 0,
                        }),
                        outcome: Err(e),
                    },
                )
            }
        };

        let outcome = match payload {
            Ok(form) => self.process(form).await,
            Err(e) => Err(e),
        };
        self.finish(source, SubmissionReport { quota, outcome })
    }

    fn gate(&self, source: IpAddr) -> Result<Option<Quota>, RelayError> {
        let Some(limiter) = &self.limiter else {
            return Ok(None);
        };
        match limiter.check(source) {
            Admission::Admitted { remaining } => Ok(Some(Quota {
                limit: limiter.limit(),
                remaining,
            })),
            Admission::Rejected { retry_after } => {
                metrics::record_rate_limited();
                Err(RelayError::RateLimited {
                    limit: limiter.limit(),
                    window: limiter.window(),
                    retry_after,
                })
            }
        }
    }

    async fn process(&self, form: ContactForm) -> Result<SubmissionReceipt, RelayError> {
        let submission = validate(form)?;
        let sanitized = SanitizedSubmission::from(submission);
        check_sanitized(&sanitized)?;

        // Detached so a client hanging up mid-send cannot cancel half a pair.
        let dispatcher = self.dispatcher.clone();
        let result = tokio::spawn(async move { dispatcher.dispatch(&sanitized).await })
            .await
            .map_err(|e| RelayError::Unhandled(format!("dispatch task failed: {e}")))?;

        match (result.error, result.notification_id, result.acknowledgement_id) {
            (None, Some(notification_id), Some(acknowledgement_id)) => Ok(SubmissionReceipt {
                notification_id,
                acknowledgement_id,
            }),
            (Some(e), _, _) => Err(RelayError::MailTransport(e)),
            _ => Err(RelayError::Unhandled(
                "dispatch reported neither success nor an error".to_string(),
            )),
        }
    }

    fn finish(&self, source: IpAddr, report: SubmissionReport) -> SubmissionReport {
        match &report.outcome {
            Ok(receipt) => {
                tracing::info!(
                    source = %source,
                    notification_id = %receipt.notification_id,
                    acknowledgement_id = %receipt.acknowledgement_id,
                    "Submission relayed"
                );
                metrics::record_submission("succeeded");
            }
            Err(e) if e.is_client_error() => {
                tracing::warn!(source = %source, kind = e.kind(), error = %e, "Submission rejected");
                metrics::record_submission(e.kind());
            }
            Err(e) => {
                tracing::error!(source = %source, kind = e.kind(), error = %e, "Submission failed");
                metrics::record_submission(e.kind());
            }
        }
        report
    }
}
