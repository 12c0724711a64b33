//! Server configuration
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file
//! (`triage.toml` or the path in `TRIAGE_CONFIG`), then `TRIAGE_*`
//! environment variables with `__` separating nested keys
//! (e.g. `TRIAGE_GEMINI__MODEL`). `GEMINI_API_KEY` is honoured when no key
//! was configured otherwise.

use crate::rate_limit::RateLimitConfig;
use case_queue::QueueConfig;
use config::{Config, Environment, File, FileFormat};
use genai_client::GeminiConfig;
use serde::{Deserialize, Serialize};
use severity_classifier::KeywordTable;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use triage_engine::EngineConfig;

const DEFAULT_CONFIG_FILE: &str = "triage.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Failed to encode defaults: {0}")]
    Defaults(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    /// Conversations kept in memory before the oldest is dropped
    pub max_sessions: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            max_sessions: 10_000,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub gemini: GeminiConfig,
    pub engine: EngineConfig,
    pub keywords: KeywordTable,
    pub queue: QueueConfig,
    pub rate_limit: RateLimitConfig,
    pub emergency: EmergencySettings,
}

/// Where critical-tier patients are directed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencySettings {
    pub number: String,
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            number: "112".to_string(),
        }
    }
}

impl Settings {
    /// Load from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os("TRIAGE_CONFIG") {
            Some(path) => Self::load_from(Some(Path::new(&path)), true),
            None => Self::load_from(Some(Path::new(DEFAULT_CONFIG_FILE)), false),
        }
    }

    /// Load with an explicit file; a missing file is an error only when `required`
    pub fn load_from(path: Option<&Path>, required: bool) -> Result<Self, ConfigError> {
        let defaults = serde_json::to_string(&Settings::default())?;
        let mut builder =
            Config::builder().add_source(File::from_str(&defaults, FileFormat::Json));

        if let Some(path) = path {
            if path.exists() {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            } else if required {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TRIAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        let non_blank = |key: &String| !key.trim().is_empty();
        settings.gemini.api_key = settings
            .gemini
            .api_key
            .take()
            .filter(non_blank)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(non_blank));

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.engine.max_message_chars == 0 {
            return Err(ConfigError::Invalid(
                "engine.max_message_chars must be positive".into(),
            ));
        }
        if self.server.max_sessions == 0 {
            return Err(ConfigError::Invalid(
                "server.max_sessions must be positive".into(),
            ));
        }
        if self.queue.max_cases == 0 {
            return Err(ConfigError::Invalid(
                "queue.max_cases must be positive".into(),
            ));
        }
        if self.rate_limit.per_second == 0 || self.rate_limit.burst_size == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit values must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_addr.parse().map_err(|e| {
            ConfigError::Invalid(format!("server.bind_addr {:?}: {}", self.server.bind_addr, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use severity_classifier::SeverityTier;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.emergency.number, "112");
        assert_eq!(settings.queue.escalation_threshold, SeverityTier::Medium);
        assert_eq!(settings.gemini.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("triage-test-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
bind_addr = "127.0.0.1:9090"

[queue]
escalation_threshold = "high"

[keywords]
critical = ["no way out"]
"#
        )
        .unwrap();

        let settings = Settings::load_from(Some(path.as_path()), true).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.bind_addr, "127.0.0.1:9090");
        assert_eq!(settings.queue.escalation_threshold, SeverityTier::High);
        assert_eq!(settings.queue.max_cases, 500);
        assert_eq!(
            settings.keywords.keywords_for(SeverityTier::Critical),
            &["no way out".to_string()]
        );
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_missing_required_file() {
        let path = Path::new("/nonexistent/triage.toml");
        assert!(matches!(
            Settings::load_from(Some(path), true),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let mut settings = Settings::default();
        settings.queue.max_cases = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_blank_api_key_treated_as_missing() {
        let path = std::env::temp_dir().join(format!("triage-test-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[gemini]\napi_key = \"   \"\n").unwrap();

        let settings = Settings::load_from(Some(path.as_path()), true).unwrap();
        std::fs::remove_file(&path).ok();

        // a blank configured key never survives, whatever GEMINI_API_KEY holds
        assert!(settings
            .gemini
            .api_key
            .as_deref()
            .map_or(true, |key| !key.trim().is_empty()));
    }

    #[test]
    fn test_invalid_bind_addr() {
        let mut settings = Settings::default();
        settings.server.bind_addr = "not an address".into();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }
}
