//! Redirector configuration
//!
//! Loaded from an optional `config/redirector` file (any format the `config`
//! crate understands) overlaid with `REDIRECTOR_*` environment variables.

use crate::error::{Result, SdkError};
use redirector_repository::RepositoryConfig;
use redirector_runtime::DecisionSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name
    pub name: String,

    /// Hosts every rule's target stack needs for a model to be accepted
    pub min_hosts_per_rule: usize,

    /// Hosts a distribution target needs before a pick is honored
    pub min_hosts_for_distribution: usize,

    /// Stacks are configured statically rather than discovered
    pub static_discovery: bool,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_min_hosts_per_rule(mut self, min_hosts: usize) -> Self {
        self.min_hosts_per_rule = min_hosts;
        self
    }

    pub fn with_min_hosts_for_distribution(mut self, min_hosts: usize) -> Self {
        self.min_hosts_for_distribution = min_hosts;
        self
    }

    pub fn with_static_discovery(mut self, static_discovery: bool) -> Self {
        self.static_discovery = static_discovery;
        self
    }

    pub fn decision_settings(&self) -> DecisionSettings {
        DecisionSettings {
            min_hosts_for_distribution: self.min_hosts_for_distribution,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            min_hosts_per_rule: 1,
            min_hosts_for_distribution: 1,
            static_discovery: false,
        }
    }
}

/// Process-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectorConfig {
    /// Directory holding model backups
    pub backup_path: String,

    /// Fixed delay between version polls
    pub poll_interval_secs: u64,

    /// Upper bound on a manual stacks backup
    pub manual_backup_timeout_secs: u64,

    /// Log level
    pub log_level: String,

    /// Served applications
    pub apps: Vec<AppConfig>,
}

impl Default for RedirectorConfig {
    fn default() -> Self {
        Self {
            backup_path: "backup".to_string(),
            poll_interval_secs: 30,
            manual_backup_timeout_secs: 120,
            log_level: "info".to_string(),
            apps: Vec::new(),
        }
    }
}

impl RedirectorConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();
        Self::load_from("config/redirector")
    }

    /// Load configuration from `path` (extension optional) and the environment
    pub fn load_from(path: &str) -> Result<Self> {
        let config_result = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("REDIRECTOR"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| SdkError::ConfigError(format!("Failed to deserialize config: {}", e))),
            Err(e) => {
                tracing::info!("No usable config file ({}), using default configuration", e);
                Ok(Self::default())
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn manual_backup_timeout(&self) -> Duration {
        Duration::from_secs(self.manual_backup_timeout_secs)
    }

    /// Backup store location
    pub fn repository(&self) -> RepositoryConfig {
        RepositoryConfig::file_system(self.backup_path.clone())
    }

    pub fn app(&self, name: &str) -> Option<&AppConfig> {
        self.apps.iter().find(|app| app.name == name)
    }
}
