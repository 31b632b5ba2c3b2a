//! Configuration loading from disk and the environment.

use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// Reads the TOML file when a path is given (defaults otherwise), applies
/// environment overrides, then validates the result.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };

    apply_env(&mut config, |key| env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse TOML into a config without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay deployment variables on top of file values.
///
/// Variable names follow the conventional `EMAIL_USER` / `EMAIL_PASS` /
/// `RECIPIENT_EMAIL` / `PORT` set used by mail relays of this kind.
pub fn apply_env<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(user) = lookup("EMAIL_USER") {
        config.mail.username = user;
    }
    if let Some(pass) = lookup("EMAIL_PASS") {
        config.mail.password = pass;
    }
    if let Some(recipient) = lookup("RECIPIENT_EMAIL") {
        config.mail.operator_address = recipient;
    }
    if let Some(host) = lookup("SMTP_HOST") {
        config.mail.smtp_host = host;
    }
    if let Some(port) = lookup("SMTP_PORT") {
        config.mail.smtp_port = port
            .parse()
            .map_err(|_| ConfigError::Env { key: "SMTP_PORT", value: port })?;
    }
    if let Some(port) = lookup("PORT") {
        let port: u16 = port
            .parse()
            .map_err(|_| ConfigError::Env { key: "PORT", value: port.clone() })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:8080"

            [mail]
            username = "file@example.com"
            "#,
        )
        .unwrap();

        apply_env(
            &mut config,
            lookup(&[
                ("EMAIL_USER", "env@example.com"),
                ("EMAIL_PASS", "secret"),
                ("RECIPIENT_EMAIL", "owner@example.com"),
                ("PORT", "3001"),
            ]),
        )
        .unwrap();

        assert_eq!(config.mail.username, "env@example.com");
        assert_eq!(config.mail.password, "secret");
        assert_eq!(config.mail.operator_address, "owner@example.com");
        assert_eq!(config.listener.bind_address, "127.0.0.1:3001");
    }

    #[test]
    fn bad_port_is_reported() {
        let mut config = RelayConfig::default();
        let err = apply_env(&mut config, lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "PORT", .. }));
    }

    #[test]
    fn validation_message_lists_fields() {
        let err = ConfigError::Validation(vec![
            ValidationError { field: "a", reason: "x".into() },
            ValidationError { field: "b", reason: "y".into() },
        ]);
        assert_eq!(err.to_string(), "Validation failed: a: x, b: y");
    }
}
