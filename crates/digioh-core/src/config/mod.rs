//! Configuration loading and validation.
//!
//! JSON5 file at `$DIGIOH_STATE_DIR/digioh.json` (default `~/.digioh`),
//! overridden by `DIGIOH_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::secrets::ApiKey;
use crate::validation::limits;

/// Environment variable overriding the backend URL.
pub const ENV_BACKEND_URL: &str = "DIGIOH_BACKEND_URL";
/// Environment variable overriding the backend public key.
pub const ENV_BACKEND_KEY: &str = "DIGIOH_BACKEND_KEY";
/// Environment variable overriding the gateway port.
pub const ENV_PORT: &str = "DIGIOH_PORT";
/// Environment variable overriding the bind mode.
pub const ENV_BIND: &str = "DIGIOH_BIND";
/// Environment variable relocating the state directory.
pub const ENV_STATE_DIR: &str = "DIGIOH_STATE_DIR";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON5 parsing error.
    #[error("Parse error: {0}")]
    Parse(#[from] json5::Error),

    /// Config validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Backend (auth provider + table API) settings.
    #[serde(default)]
    pub backend: BackendSettings,

    /// Gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Global settings.
    #[serde(default)]
    pub settings: GlobalSettings,
}

impl Config {
    /// Load from the default location, apply environment overrides and
    /// validate. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns error if config cannot be loaded, parsed or validated.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::read(&path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path (no environment overrides).
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let size = std::fs::metadata(path)?.len();
        if size > limits::MAX_CONFIG_FILE_SIZE as u64 {
            return Err(ConfigError::Validation(format!(
                "Config file is {size} bytes (max {})",
                limits::MAX_CONFIG_FILE_SIZE
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(json5::from_str(&content)?)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the port override is not a number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.is_empty()) {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup(ENV_BACKEND_KEY).filter(|v| !v.is_empty()) {
            self.backend.anon_key = Some(key);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("{ENV_PORT} is not a port number: {port}"))
            })?;
        }
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            self.gateway.mode = BindMode::parse(&bind);
        }
        Ok(())
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::state_dir().join("digioh.json")
    }

    /// Get the state directory.
    ///
    /// Uses `DIGIOH_STATE_DIR` env var if set, otherwise `~/.digioh`.
    #[must_use]
    pub fn state_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
            PathBuf::from(dir)
        } else if let Some(home) = dirs::home_dir() {
            home.join(".digioh")
        } else {
            PathBuf::from(".digioh")
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a zero port or a non-http(s) backend URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.port == 0 {
            return Err(ConfigError::Validation(
                "Gateway port cannot be 0".to_string(),
            ));
        }

        if let Some(url) = &self.backend.url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::Validation(format!(
                    "Backend URL must be http(s): {url}"
                )));
            }
        }

        Ok(())
    }

    /// Backend connection details. Both URL and key are required.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` naming the first absent setting.
    pub fn backend(&self) -> Result<BackendCredentials, ConfigError> {
        let url = self
            .backend
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConfigError::MissingField("backend.url".to_string()))?;
        let key = self
            .backend
            .anon_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingField("backend.anonKey".to_string()))?;

        Ok(BackendCredentials {
            url: url.trim_end_matches('/').to_string(),
            api_key: ApiKey::new(key),
        })
    }
}

/// Backend settings as stored in the file.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendSettings {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: Option<String>,

    /// Public (anon) API key.
    #[serde(default)]
    pub anon_key: Option<String>,
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Validated backend connection details.
#[derive(Debug, Clone)]
pub struct BackendCredentials {
    /// Project URL without trailing slash.
    pub url: String,
    /// Public API key.
    pub api_key: ApiKey,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address mode.
    #[serde(default)]
    pub mode: BindMode,

    /// Mark the session cookie `Secure`.
    #[serde(default)]
    pub secure_cookies: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            mode: BindMode::default(),
            secure_cookies: false,
            timeout_secs: default_timeout(),
        }
    }
}

const fn default_port() -> u16 {
    8080
}

const fn default_timeout() -> u64 {
    30
}

/// Gateway bind mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Bind to localhost only.
    #[default]
    Local,
    /// Bind to all interfaces.
    Public,
    /// Custom bind address.
    Custom(String),
}

impl BindMode {
    /// `local`, `public`, or a literal address.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "local" | "localhost" => Self::Local,
            "public" => Self::Public,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Address to bind.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::Local => "127.0.0.1",
            Self::Public => "0.0.0.0",
            Self::Custom(addr) => addr,
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Enable debug logging.
    #[serde(default)]
    pub debug: bool,

    /// Log format.
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// JSON format.
    Json,
}
