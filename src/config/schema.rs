//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the contact relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-address submission limits.
    pub rate_limit: RateLimitConfig,

    /// Outbound mail settings.
    pub mail: MailConfig,

    /// Cross-origin policy for the browser form.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Length of the trailing window in seconds.
    pub window_secs: u64,

    /// Maximum admitted submissions per address per window.
    pub max_requests: u32,

    /// Key on the first `X-Forwarded-For` hop instead of the TCP peer.
    /// Only safe behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 15 * 60,
            max_requests: 5,
            trust_forwarded_for: false,
        }
    }
}

/// How the SMTP session is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// TLS from the first byte (port 465).
    Tls,
    /// Plaintext upgraded with STARTTLS (port 587).
    Starttls,
    /// No encryption. Local relays and test servers only.
    None,
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    /// SMTP server host name.
    pub smtp_host: String,

    /// SMTP server port.
    pub smtp_port: u16,

    /// Session security.
    pub security: SmtpSecurity,

    /// SMTP login; also used as the envelope sender address.
    pub username: String,

    /// SMTP password (for Gmail, an app password).
    pub password: String,

    /// Where notifications are delivered.
    pub operator_address: String,

    /// Display name on the notification's From header.
    pub sender_name: String,

    /// Prepended to the submitted subject on the notification.
    pub subject_prefix: String,

    /// Subject line of the acknowledgement sent back to the visitor.
    pub acknowledgement_subject: String,

    /// Per-message send deadline in seconds.
    pub timeout_secs: u64,

    /// Log messages instead of sending them.
    pub dry_run: bool,

    /// Closing block of the acknowledgement.
    pub signature: SignatureConfig,
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            security: SmtpSecurity::Tls,
            username: String::new(),
            password: String::new(),
            operator_address: String::new(),
            sender_name: "Portfolio Contact Form".to_string(),
            subject_prefix: "Portfolio Contact: ".to_string(),
            acknowledgement_subject: "Thank you for contacting me!".to_string(),
            timeout_secs: 30,
            dry_run: false,
            signature: SignatureConfig::default(),
        }
    }
}

/// Signature printed at the bottom of the acknowledgement.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            name: "Site Owner".to_string(),
            title: "Network Engineer & Web Developer".to_string(),
            email: String::new(),
            phone: String::new(),
        }
    }
}

/// CORS configuration for the mail endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to submit the form.
    pub allowed_origins: Vec<String>,

    /// Whether browsers may send credentials.
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "file://".to_string(),
            ],
            allow_credentials: true,
            max_age_secs: 60 * 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 100 * 1024, // 100KB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [rate_limit]
            max_requests = 3

            [mail]
            security = "starttls"
            smtp_port = 587
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.mail.security, SmtpSecurity::Starttls);
        assert_eq!(config.mail.smtp_port, 587);
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.cors.allowed_origins.len(), 3);
    }
}
