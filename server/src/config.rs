//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting YAML configuration files with sensible defaults and
//! environment overrides for backends and media credentials.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "VIDSHARE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    InvalidValue(String),
}

/// Document store backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    SQLite,
    Mock,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::SQLite),
            "mock" => Ok(StoreBackend::Mock),
            _ => Err(ConfigError::InvalidValue(format!("Unknown store backend: {}", s))),
        }
    }
}

/// Media relay backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    Cloudinary,
    #[default]
    Local,
    Mock,
}

impl std::str::FromStr for MediaBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloudinary" => Ok(MediaBackend::Cloudinary),
            "local" => Ok(MediaBackend::Local),
            "mock" => Ok(MediaBackend::Mock),
            _ => Err(ConfigError::InvalidValue(format!("Unknown media backend: {}", s))),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Document store configuration
    pub store: StoreConfig,
    /// Media relay configuration
    pub media: MediaConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum multipart payload size in bytes
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            workers: 4,
            max_payload_size: 1024 * 1024 * 1024, // 1GB
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database file path
    pub db_path: String,
    /// Enable WAL mode
    pub wal_mode: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::SQLite,
            db_path: "./data/vidshare.db".to_string(),
            wal_mode: true,
        }
    }
}

/// Media relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub backend: MediaBackend,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Directory the local backend copies media into
    pub base_path: String,
    /// URL prefix under which the local backend's files are served
    pub public_base_url: String,
    /// Directory uploads are staged in before relaying
    pub temp_path: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: MediaBackend::Local,
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            base_path: "./data/media".to_string(),
            public_base_url: "http://127.0.0.1:8000/media".to_string(),
            temp_path: "./data/temp".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to the log4rs configuration file
    pub config_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            config_file: "server_log.yaml".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Logging section of a config file, read before any logger exists
    ///
    /// Anything unreadable yields the defaults; [`AppConfig::load`] reports
    /// the problem once logging is up.
    pub fn peek(path: impl AsRef<Path>) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_yaml::from_str::<AppConfig>(&content).ok())
            .map(|config| config.logging)
            .unwrap_or_default()
    }
}

impl AppConfig {
    /// File named by `VIDSHARE_CONFIG`, or `config.yaml`
    pub fn config_path() -> String {
        env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load configuration from the file named by `VIDSHARE_CONFIG`
    /// (default `config.yaml`), then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Self::config_path())?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a file, use defaults if not found
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: AppConfig = serde_yaml::from_str(&content)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Backends and media credentials can be supplied through the environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(backend) = env::var("STORE_BACKEND") {
            self.store.backend = backend.parse()?;
            info!("Using store backend from environment: {:?}", self.store.backend);
        }
        if let Ok(backend) = env::var("MEDIA_BACKEND") {
            self.media.backend = backend.parse()?;
            info!("Using media backend from environment: {:?}", self.media.backend);
        }
        if let Ok(cloud_name) = env::var("CLOUDINARY_CLOUD_NAME") {
            self.media.cloud_name = cloud_name;
        }
        if let Ok(api_key) = env::var("CLOUDINARY_API_KEY") {
            self.media.api_key = api_key;
        }
        if let Ok(api_secret) = env::var("CLOUDINARY_API_SECRET") {
            self.media.api_secret = api_secret;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("sqlite".parse::<StoreBackend>().unwrap(), StoreBackend::SQLite);
        assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::SQLite);
        assert_eq!("MOCK".parse::<StoreBackend>().unwrap(), StoreBackend::Mock);
        assert!("postgres".parse::<StoreBackend>().is_err());

        assert_eq!("Cloudinary".parse::<MediaBackend>().unwrap(), MediaBackend::Cloudinary);
        assert_eq!("local".parse::<MediaBackend>().unwrap(), MediaBackend::Local);
        assert!("s3".parse::<MediaBackend>().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from("/definitely/not/here.yaml").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.backend, StoreBackend::SQLite);
        assert_eq!(config.media.backend, MediaBackend::Local);
        assert_eq!(config.logging.config_file, "server_log.yaml");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9000\nstore:\n  backend: mock\nmedia:\n  backend: cloudinary\n  cloud_name: demo").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.store.backend, StoreBackend::Mock);
        assert!(config.store.wal_mode);
        assert_eq!(config.media.backend, MediaBackend::Cloudinary);
        assert_eq!(config.media.cloud_name, "demo");
        assert_eq!(config.media.temp_path, "./data/temp");
    }

    #[test]
    fn test_peek_reads_only_logging() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9000\nlogging:\n  config_file: custom_log.yaml").unwrap();
        assert_eq!(LoggingConfig::peek(file.path()).config_file, "custom_log.yaml");

        assert_eq!(LoggingConfig::peek("/definitely/not/here.yaml").config_file, "server_log.yaml");

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        writeln!(broken, "server: [not, a, map]").unwrap();
        assert_eq!(LoggingConfig::peek(broken.path()).config_file, "server_log.yaml");
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        env::set_var(CONFIG_PATH_ENV, "/etc/vidshare/config.yaml");
        assert_eq!(AppConfig::config_path(), "/etc/vidshare/config.yaml");
        env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(AppConfig::config_path(), "config.yaml");
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map]").unwrap();
        assert!(matches!(AppConfig::load_from(file.path()), Err(ConfigError::Yaml(_))));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("MEDIA_BACKEND", "mock");
        env::set_var("CLOUDINARY_API_KEY", "key-from-env");
        let mut config = AppConfig::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.media.backend, MediaBackend::Mock);
        assert_eq!(config.media.api_key, "key-from-env");

        env::set_var("STORE_BACKEND", "invalid");
        assert!(config.apply_env_overrides().is_err());

        env::remove_var("MEDIA_BACKEND");
        env::remove_var("CLOUDINARY_API_KEY");
        env::remove_var("STORE_BACKEND");
    }
}
