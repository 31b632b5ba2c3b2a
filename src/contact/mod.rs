//! Contact-form submission pipeline.
//!
//! # Data Flow
//! ```text
//! ContactForm (raw body)
//!     → relay.rs      rate-limit gate
//!     → validation.rs presence, then email shape
//!     → sanitize.rs   strip scripts and angle brackets, trim
//!     → validation.rs length bounds on sanitized text
//!     → mail::MailDispatcher
//!     → SubmissionReceipt | RelayError
//! ```
//!
//! Per request: `Received → RateChecked → Validated → Sanitized →
//! LengthChecked → Dispatched → {Succeeded | Failed}`.

pub mod error;
pub mod relay;
pub mod sanitize;
pub mod submission;
pub mod validation;

pub use error::RelayError;
pub use relay::{ContactRelay, SubmissionReceipt};
pub use sanitize::sanitize;
pub use submission::{ContactForm, SanitizedSubmission, Submission};
pub use validation::is_valid_email;
