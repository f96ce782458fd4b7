//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError, StorageKind};
use lc_common::{env_flag, env_or, env_or_parse};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "lectern.toml",
    "./config/config.toml",
    "/etc/lectern/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found), apply environment overrides, validate
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured path does not exist, falling back to search paths");
        }

        if let Ok(path) = env::var("LECTERN_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // HTTP
        config.http.port = env_or_parse("LECTERN_HTTP_PORT", config.http.port);
        config.http.host = env_or("LECTERN_HTTP_HOST", &config.http.host);
        if let Ok(val) = env::var("LECTERN_CORS_ORIGINS") {
            config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Session
        if let Ok(val) = env::var("LECTERN_SESSION_TOKEN_KEY") {
            config.session.token_key = val;
        }
        if let Ok(val) = env::var("LECTERN_SESSION_USER_KEY") {
            config.session.user_key = val;
        }
        if let Ok(val) = env::var("LECTERN_SESSION_STORAGE") {
            match val.to_ascii_lowercase().as_str() {
                "memory" => config.session.storage = StorageKind::Memory,
                "file" => config.session.storage = StorageKind::File,
                other => warn!(value = other, "Ignoring unknown LECTERN_SESSION_STORAGE"),
            }
        }
        if let Ok(val) = env::var("LECTERN_DATA_DIR") {
            config.session.data_dir = val;
        }
        if env::var("LECTERN_SECURE_COOKIES").is_ok() {
            config.session.secure_cookies = env_flag("LECTERN_SECURE_COOKIES");
        }

        // Guard
        if let Ok(val) = env::var("LECTERN_LOGIN_PATH") {
            config.guard.login_path = val;
        }
        if let Ok(val) = env::var("LECTERN_HOME_PATH") {
            config.guard.home_path = val;
        }

        // General
        if env::var("LECTERN_DEV_MODE").is_ok() {
            config.dev_mode = env_flag("LECTERN_DEV_MODE");
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
