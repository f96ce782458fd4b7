//! Lectern Configuration System
//!
//! TOML-based configuration with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub session: SessionConfig,
    pub guard: GuardConfig,

    /// Enable development mode
    pub dev_mode: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Where session entries are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    #[default]
    File,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage key (and cookie name) holding the auth token
    pub token_key: String,
    /// Storage key (and cookie name) holding the JSON user
    pub user_key: String,
    pub storage: StorageKind,
    /// Directory for file-backed storage
    pub data_dir: String,
    /// Mark session cookies Secure
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
            user_key: "user".to_string(),
            storage: StorageKind::File,
            data_dir: "./data".to_string(),
            secure_cookies: false,
        }
    }
}

/// Redirect targets used by the route guard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub login_path: String,
    pub home_path: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check invariants the rest of the workspace relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.token_key.trim().is_empty() {
            return Err(ConfigError::ValidationError("session.token_key must not be empty".into()));
        }
        if self.session.user_key.trim().is_empty() {
            return Err(ConfigError::ValidationError("session.user_key must not be empty".into()));
        }
        if self.session.token_key == self.session.user_key {
            return Err(ConfigError::ValidationError(
                "session.token_key and session.user_key must differ".into(),
            ));
        }
        for (name, path) in [
            ("guard.login_path", &self.guard.login_path),
            ("guard.home_path", &self.guard.home_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be an absolute path, got '{}'",
                    name, path
                )));
            }
        }
        if self.guard.login_path == self.guard.home_path {
            return Err(ConfigError::ValidationError(
                "guard.login_path and guard.home_path must differ".into(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Lectern Configuration
# Environment variables (LECTERN_*) override these settings

dev_mode = false

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["http://localhost:3000"]

[session]
token_key = "token"
user_key = "user"
storage = "file"  # file or memory
data_dir = "./data"
secure_cookies = false

[guard]
login_path = "/login"
home_path = "/"
"#
        .to_string()
    }
}
