//! Outbound mail subsystem.
//!
//! # Data Flow
//! ```text
//! SanitizedSubmission
//!     → dispatcher.rs (compose notification + acknowledgement)
//!     → templates.rs (HTML bodies)
//!     → transport.rs (MailTransport capability, per-send timeout)
//!         → smtp.rs   (lettre, real delivery)
//!         → memory.rs (recording double, dry run)
//!     → DispatchResult
//! ```
//!
//! # Design Decisions
//! - Both messages are sent concurrently and both are always attempted
//! - No retries: a failed pair is final for that request
//! - The transport is injected, never constructed inside the dispatcher

pub mod dispatcher;
pub mod memory;
pub mod smtp;
pub mod templates;
pub mod transport;

pub use dispatcher::{DispatchResult, DispatchSettings, MailDispatcher};
pub use memory::MemoryTransport;
pub use smtp::SmtpTransport;
pub use transport::{MailKind, MailTransport, MessageId, OutboundMail, TransportError};
