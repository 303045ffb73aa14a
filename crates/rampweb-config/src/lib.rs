//! Configuration management for rampweb
//!
//! Loads and validates the YAML configuration: server address, which data
//! gateway to talk to, where approvals are persisted, and the log level.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Which remote data gateway backs the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// In-process seeded dataset
    #[default]
    Mock,
    /// Remote rampweb-compatible JSON endpoint
    Http,
}

impl std::str::FromStr for GatewayKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(GatewayKind::Mock),
            "http" => Ok(GatewayKind::Http),
            _ => Err(format!("Invalid gateway kind: {}", s)),
        }
    }
}

impl std::fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayKind::Mock => write!(f, "mock"),
            GatewayKind::Http => write!(f, "http"),
        }
    }
}

/// Data gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub kind: GatewayKind,
    /// Base URL of the remote API (http gateway only)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Transactions per page served by the mock gateway
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Artificial response delay for the mock gateway
    #[serde(default)]
    pub latency_ms: u64,
    /// JSON seed file replacing the embedded mock dataset
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::Mock,
            base_url: None,
            page_size: default_page_size(),
            latency_ms: 0,
            seed_file: None,
        }
    }
}

fn default_page_size() -> usize {
    5
}

/// Durable storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the key-value store
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Key under which the approval overlay is stored
    #[serde(default = "default_approvals_key")]
    pub approvals_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            approvals_key: default_approvals_key(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/storage.json")
}

fn default_approvals_key() -> String {
    "approvedTransactions".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.gateway.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gateway.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.gateway.kind == GatewayKind::Http {
            match self.gateway.base_url.as_deref() {
                None => {
                    return Err(ConfigError::MissingField {
                        field: "gateway.base_url".to_string(),
                    })
                }
                Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                    return Err(ConfigError::InvalidValue {
                        field: "gateway.base_url".to_string(),
                        reason: "Base URL must start with http:// or https://".to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        if self.storage.approvals_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.approvals_key".to_string(),
                reason: "Storage key must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

// ==================== Tests ====================
