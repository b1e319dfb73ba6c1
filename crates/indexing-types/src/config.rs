//! Configuration loading for the indexing policies.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/policy-indexing/config.*`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PolicyError;

/// Settings for one policy instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Search cluster endpoints (e.g., "http://localhost:9200")
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Emit per-operation notices and response details
    #[serde(default)]
    pub log_errors: bool,

    /// Advisory read size in bytes. Chunk sizing is driven by
    /// `bulk_count` alone; this value is accepted for compatibility.
    #[serde(default = "default_read_size")]
    pub read_size: u64,

    /// Number of chunks per bulk request
    #[serde(default = "default_bulk_count")]
    pub bulk_count: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Root directory of the filesystem object store
    #[serde(default = "default_store_root")]
    pub store_root: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_read_size() -> u64 {
    4_194_304
}

fn default_bulk_count() -> u32 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_store_root() -> String {
    "./store".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            log_errors: false,
            read_size: default_read_size(),
            bulk_count: default_bulk_count(),
            request_timeout_secs: default_request_timeout_secs(),
            store_root: default_store_root(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Default config file
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (INDEXING_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, PolicyError> {
        let config_dir = ProjectDirs::from("", "", "policy-indexing")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_errors", false)
            .map_err(|e| PolicyError::Config(e.to_string()))?
            .set_default("read_size", default_read_size() as i64)
            .map_err(|e| PolicyError::Config(e.to_string()))?
            .set_default("bulk_count", default_bulk_count() as i64)
            .map_err(|e| PolicyError::Config(e.to_string()))?
            .set_default("request_timeout_secs", default_request_timeout_secs() as i64)
            .map_err(|e| PolicyError::Config(e.to_string()))?
            .set_default("store_root", default_store_root())
            .map_err(|e| PolicyError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| PolicyError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // INDEXING_HOSTS is a comma separated list
        builder = builder.add_source(
            Environment::with_prefix("INDEXING")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("hosts"),
        );

        let settings: Settings = builder
            .build()
            .map_err(|e| PolicyError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PolicyError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.bulk_count == 0 {
            return Err(PolicyError::Config("bulk_count must be > 0".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(PolicyError::Config(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
