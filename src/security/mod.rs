//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin allow-list, POST only)
//!     → body limit (tower-http, configured in http::server)
//!     → rate_limit.rs (per-address sliding window, mail endpoint only)
//!     → Pass to handler
//! Outgoing response:
//!     → headers.rs (hardening headers)
//! ```
//!
//! # Design Decisions
//! - Limiter state is an explicit object owned by the server, not a global
//! - Fail closed: reject on any security check failure
//! - No trust in client input

pub mod clock;
pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit::{Admission, RateLimiter};
