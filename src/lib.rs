//! Contact-form relay.
//!
//! Accepts a portfolio site's contact form, checks and cleans it, and mails
//! it to the site owner with an acknowledgement back to the visitor.
//!
//! # Architecture Overview
//!
//! ```text
//!   POST /api/send-email
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────────┐   ┌────────────┐   ┌──────────┐   ┌─────────────┐
//!   │ security │──▶│  contact     │──▶│  contact   │──▶│ contact  │──▶│    mail     │
//!   │ limiter  │   │  validation  │   │  sanitize  │   │ lengths  │   │ dispatcher  │──▶ SMTP
//!   └──────────┘   └──────────────┘   └────────────┘   └──────────┘   └─────────────┘
//!        │                 │                                 │               │
//!        └─────────────────┴──────────── http::response ◀────┴───────────────┘
//!
//!   Cross-cutting: config, observability, lifecycle
//! ```

pub mod config;
pub mod contact;
pub mod http;
pub mod lifecycle;
pub mod mail;
pub mod observability;
pub mod security;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
