//! Configuration handling for the Web OCR client.
//!
//! Optional JSON file at `~/.config/web-ocr/config.json`:
//!
//! ```json
//! { "api_base_url": "http://ocr.example:5000", "log_level": "debug" }
//! ```
//!
//! Base URL precedence: config file, then `WEB_OCR_API_BASE_URL`, then empty
//! (same origin as the backend). The request timeout is fixed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const APP_CONFIG_DIR_NAME: &str = "web-ocr";
const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable consulted when the config file has no base URL.
pub const BASE_URL_ENV: &str = "WEB_OCR_API_BASE_URL";

/// OCR can take a while on large images; keep this well above a typical API timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Some(Self::Error),
            "WARN" | "WARNING" => Some(Self::Warn),
            "INFO" => Some(Self::Info),
            "DEBUG" => Some(Self::Debug),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    log_level: Option<String>,
}

/// Transport settings for `OcrClient`. Built once, then owned by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every request path. Empty means "same origin as the backend".
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let path = config_dir()?
        .join(APP_CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    Some(path)
}

fn load_raw_config_from(path: &Path) -> Result<RawConfig, ConfigError> {
    if !path.exists() {
        debug!(?path, "Config file does not exist, using defaults");
        return Ok(RawConfig::default());
    }

    let data = fs::read_to_string(path)?;
    let cfg = serde_json::from_str(&data)?;
    debug!(?path, "Config loaded");
    Ok(cfg)
}

fn load_or_default_config() -> RawConfig {
    let Some(path) = config_path() else {
        debug!("No config_dir available, using defaults only");
        return RawConfig::default();
    };

    match load_raw_config_from(&path) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(error = ?err, "Failed to load existing config, using defaults");
            RawConfig::default()
        }
    }
}

fn resolve_base_url(raw: &RawConfig, env_value: Option<String>) -> String {
    raw.api_base_url
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env_value.filter(|s| !s.trim().is_empty()))
        .unwrap_or_default()
}

/// Client settings from the config file and environment.
pub fn load_client_config() -> ClientConfig {
    let raw = load_or_default_config();
    let base_url = resolve_base_url(&raw, std::env::var(BASE_URL_ENV).ok());
    debug!(base_url = %base_url, "Resolved API base URL");
    ClientConfig::with_base_url(base_url)
}

pub fn load_log_level() -> LogLevel {
    let Some(path) = config_path() else {
        return LogLevel::Info;
    };
    // Runs before the subscriber exists, so problems go to stderr.
    match load_raw_config_from(&path) {
        Ok(cfg) => cfg
            .log_level
            .as_deref()
            .and_then(LogLevel::from_str)
            .unwrap_or(LogLevel::Info),
        Err(err) => {
            eprintln!("Config: failed to load config, using default log level: {err:?}");
            LogLevel::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_keeps_long_timeout_and_same_origin() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert!(cfg.base_url.is_empty());
    }

    #[test]
    fn base_url_prefers_file_then_env() {
        let raw = RawConfig {
            api_base_url: Some("http://file:5000".into()),
            log_level: None,
        };
        assert_eq!(
            resolve_base_url(&raw, Some("http://env:5000".into())),
            "http://file:5000"
        );

        let raw = RawConfig {
            api_base_url: Some("  ".into()),
            log_level: None,
        };
        assert_eq!(
            resolve_base_url(&raw, Some("http://env:5000".into())),
            "http://env:5000"
        );
        assert_eq!(resolve_base_url(&RawConfig::default(), None), "");
    }

    #[test]
    fn raw_config_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_base_url":"http://ocr:5000","log_level":"debug"}"#).unwrap();

        let raw = load_raw_config_from(&path).unwrap();
        assert_eq!(raw.api_base_url.as_deref(), Some("http://ocr:5000"));
        assert_eq!(
            raw.log_level.as_deref().and_then(LogLevel::from_str),
            Some(LogLevel::Debug)
        );
    }

    #[test]
    fn missing_file_yields_defaults_and_broken_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_raw_config_from(&dir.path().join("absent.json")).unwrap();
        assert!(missing.api_base_url.is_none());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            load_raw_config_from(&broken),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn log_level_parsing_accepts_aliases() {
        assert_eq!(LogLevel::from_str("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("TRACE"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str("loud"), None);
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
    }
}
