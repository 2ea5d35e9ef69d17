//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: REQMGMT_)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/request-management/{service_name}/config.toml
//! 4. System directory: /etc/request-management/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::identity::SYSTEM_USERNAME;
use crate::paging::DEFAULT_PAGE_SIZE;

/// Environment variable prefix
const ENV_PREFIX: &str = "REQMGMT_";

/// Directory name under the XDG and system config roots
const CONFIG_DIR: &str = "request-management";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Paging defaults
    #[serde(default)]
    pub paging: PagingConfig,

    /// Acting-user resolution
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Data-service call policy
    #[serde(default)]
    pub data_service: DataServiceConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Paging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size used when a caller does not choose one
    #[serde(default = "default_page_size")]
    pub default_page_size: i32,
}

/// Identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Username recorded when no authenticated identity is present
    #[serde(default = "default_username")]
    pub default_username: String,
}

/// Data-service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataServiceConfig {
    /// Run data-service calls on the blocking thread pool
    #[serde(default = "default_true")]
    pub offload_blocking: bool,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default_username: default_username(),
        }
    }
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            offload_blocking: default_true(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_page_size() -> i32 {
    DEFAULT_PAGE_SIZE
}

fn default_username() -> String {
    SYSTEM_USERNAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found is used):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/request-management/{service_name}/config.toml
    /// 3. System directory: /etc/request-management/{service_name}/config.toml
    ///
    /// Environment variables (REQMGMT_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        // Try to infer service name from binary name or use default
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| CONFIG_DIR.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Self::env());

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses XDG directories and loads directly from the given path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    /// `REQMGMT_DATA_SERVICE__OFFLOAD_BLOCKING` sets `data_service.offload_blocking`
    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    /// Find all possible config file paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        paths.push(PathBuf::from("config.toml"));

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: CONFIG_DIR.to_string(),
                log_level: default_log_level(),
                environment: default_environment(),
            },
            paging: PagingConfig::default(),
            identity: IdentityConfig::default(),
            data_service: DataServiceConfig::default(),
        }
    }
}
