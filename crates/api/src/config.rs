//! Service configuration from environment variables

use ::config::{Config, Environment};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Listen address used when `LISTEN_ADDR` is unset
pub const DEFAULT_LISTEN_ADDR: &str = ":8082";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("KAVENEGAR_API_KEY is required")]
    MissingApiKey,
    #[error("KAVENEGAR_SENDER is required")]
    MissingSender,
    #[error("KAVENEGAR_RECEIVERS must contain at least one number")]
    NoReceivers,
    #[error("unknown LOG_FORMAT {0:?}, expected \"text\" or \"json\"")]
    InvalidLogFormat(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Environment variables as read, before validation
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    kavenegar_api_key: Option<String>,
    kavenegar_sender: Option<String>,
    kavenegar_receivers: Option<String>,
    kavenegar_base_url: Option<String>,
    listen_addr: Option<String>,
    log_format: Option<String>,
}

/// Validated service configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Kavenegar API key
    pub api_key: String,
    /// Sender line number
    pub sender: String,
    /// Numbers that receive every SMS, never empty
    pub receivers: Vec<String>,
    /// Override for the Kavenegar API host
    pub base_url: Option<String>,
    /// Address the HTTP server binds to
    pub listen_addr: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::default())
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_source(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Environment::default().source(Some(vars.into_iter().collect())))
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, ConfigError> {
        let api_key = trimmed(raw.kavenegar_api_key).ok_or(ConfigError::MissingApiKey)?;
        let sender = trimmed(raw.kavenegar_sender).ok_or(ConfigError::MissingSender)?;

        let receivers: Vec<String> = raw
            .kavenegar_receivers
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
        if receivers.is_empty() {
            return Err(ConfigError::NoReceivers);
        }

        let listen_addr = normalize_listen_addr(
            trimmed(raw.listen_addr)
                .as_deref()
                .unwrap_or(DEFAULT_LISTEN_ADDR),
        );

        let log_format = match trimmed(raw.log_format).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        Ok(Self {
            api_key,
            sender,
            receivers,
            base_url: trimmed(raw.kavenegar_base_url),
            listen_addr,
            log_format,
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("sender", &self.sender)
            .field("receivers", &self.receivers)
            .field("base_url", &self.base_url)
            .field("listen_addr", &self.listen_addr)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `:8082` binds every interface
fn normalize_listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("KAVENEGAR_API_KEY", " key-123 "),
            ("KAVENEGAR_SENDER", "10004346"),
            ("KAVENEGAR_RECEIVERS", "09120000001, ,09350000002 ,"),
        ]
    }

    #[test]
    fn test_load_valid_config() {
        let config = AppConfig::from_source(vars(&base())).unwrap();
        assert_eq!(config.api_key, "key-123");
        assert_eq!(config.sender, "10004346");
        assert_eq!(config.receivers, vec!["09120000001", "09350000002"]);
        assert_eq!(config.listen_addr, "0.0.0.0:8082");
        assert_eq!(config.base_url, None);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_receivers_keep_leading_zero() {
        let mut pairs = base();
        pairs.push(("KAVENEGAR_RECEIVERS", "09121234567"));
        let config = AppConfig::from_source(vars(&pairs)).unwrap();
        assert_eq!(config.receivers, vec!["09121234567"]);
    }

    #[test]
    fn test_optional_settings() {
        let mut pairs = base();
        pairs.push(("LISTEN_ADDR", "127.0.0.1:9000"));
        pairs.push(("KAVENEGAR_BASE_URL", "http://localhost:1234"));
        pairs.push(("LOG_FORMAT", "json"));

        let config = AppConfig::from_source(vars(&pairs)).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:1234"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_api_key() {
        let pairs = vec![("KAVENEGAR_SENDER", "1000"), ("KAVENEGAR_RECEIVERS", "0912")];
        let err = AppConfig::from_source(vars(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert_eq!(err.to_string(), "KAVENEGAR_API_KEY is required");
    }

    #[test]
    fn test_blank_sender() {
        let pairs = vec![
            ("KAVENEGAR_API_KEY", "k"),
            ("KAVENEGAR_SENDER", "   "),
            ("KAVENEGAR_RECEIVERS", "0912"),
        ];
        let err = AppConfig::from_source(vars(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSender));
    }

    #[test]
    fn test_receivers_must_not_be_empty() {
        let pairs = vec![
            ("KAVENEGAR_API_KEY", "k"),
            ("KAVENEGAR_SENDER", "1000"),
            ("KAVENEGAR_RECEIVERS", " , ,"),
        ];
        let err = AppConfig::from_source(vars(&pairs)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "KAVENEGAR_RECEIVERS must contain at least one number"
        );
    }

    #[test]
    fn test_unknown_log_format() {
        let mut pairs = base();
        pairs.push(("LOG_FORMAT", "xml"));
        let err = AppConfig::from_source(vars(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AppConfig::from_source(vars(&base())).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("key-123"));
        assert!(debug.contains("09120000001"));
    }
}
