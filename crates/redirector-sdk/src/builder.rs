//! Builder pattern for ModelOrchestrator

use crate::config::{AppConfig, RedirectorConfig};
use crate::error::{Result, SdkError};
use crate::orchestrator::{ModelLoadObserver, ModelOrchestrator};
use crate::pipeline::{ModelServices, DEFAULT_MANUAL_BACKUP_TIMEOUT};
use redirector_repository::{BackupStore, RepositoryConfig, RuleSource, StacksSupplier};
use redirector_runtime::NamespacedListRepository;
use std::sync::Arc;
use std::time::Duration;

/// Builder for ModelOrchestrator
///
/// # Example
///
/// ```rust,ignore
/// use redirector_sdk::{AppConfig, OrchestratorBuilder};
/// use redirector_repository::{MemoryRuleSource, RepositoryConfig, StaticStacksSupplier};
/// use std::sync::Arc;
///
/// let orchestrator = OrchestratorBuilder::new(AppConfig::new("xre"))
///     .with_data_store(Arc::new(MemoryRuleSource::new()))
///     .with_live_stacks(Arc::new(StaticStacksSupplier::new()))
///     .with_repository(RepositoryConfig::file_system("backup"))
///     .build()?;
///
/// orchestrator.init_model().await;
/// ```
pub struct OrchestratorBuilder {
    app: AppConfig,
    data_store: Option<Arc<dyn RuleSource>>,
    live_stacks: Option<Arc<dyn StacksSupplier>>,
    backup_store: Option<Arc<dyn BackupStore>>,
    repository_config: Option<RepositoryConfig>,
    lists: Option<Arc<NamespacedListRepository>>,
    observer: Option<Arc<dyn ModelLoadObserver>>,
    manual_backup_timeout: Duration,
}

impl OrchestratorBuilder {
    /// Create a new builder
    pub fn new(app: AppConfig) -> Self {
        Self {
            app,
            data_store: None,
            live_stacks: None,
            backup_store: None,
            repository_config: None,
            lists: None,
            observer: None,
            manual_backup_timeout: DEFAULT_MANUAL_BACKUP_TIMEOUT,
        }
    }

    /// Builder for `app_name` with the settings and backup location from `config`
    ///
    /// Applications missing from the configuration get default settings.
    pub fn from_config(config: &RedirectorConfig, app_name: &str) -> Self {
        let app = config
            .app(app_name)
            .cloned()
            .unwrap_or_else(|| AppConfig::new(app_name));
        Self::new(app)
            .with_repository(config.repository())
            .with_manual_backup_timeout(config.manual_backup_timeout())
    }

    /// Set the remote control plane
    pub fn with_data_store(mut self, data_store: Arc<dyn RuleSource>) -> Self {
        self.data_store = Some(data_store);
        self
    }

    /// Set live service discovery
    pub fn with_live_stacks(mut self, stacks: Arc<dyn StacksSupplier>) -> Self {
        self.live_stacks = Some(stacks);
        self
    }

    /// Use an existing backup store (takes precedence over a repository config)
    pub fn with_backup_store(mut self, store: Arc<dyn BackupStore>) -> Self {
        self.backup_store = Some(store);
        self
    }

    /// Build the backup store from a repository configuration
    pub fn with_repository(mut self, config: RepositoryConfig) -> Self {
        self.repository_config = Some(config);
        self
    }

    /// Share a namespaced list repository with other applications
    pub fn with_namespaced_lists(mut self, lists: Arc<NamespacedListRepository>) -> Self {
        self.lists = Some(lists);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ModelLoadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_manual_backup_timeout(mut self, timeout: Duration) -> Self {
        self.manual_backup_timeout = timeout;
        self
    }

    /// Build the orchestrator
    pub fn build(self) -> Result<ModelOrchestrator> {
        if self.app.name.trim().is_empty() {
            return Err(SdkError::ConfigError("application name is empty".to_string()));
        }
        let data_store = self
            .data_store
            .ok_or_else(|| SdkError::ConfigError("data store is required".to_string()))?;
        let live_stacks = self
            .live_stacks
            .ok_or_else(|| SdkError::ConfigError("live stacks supplier is required".to_string()))?;
        let backup_store = match (self.backup_store, self.repository_config) {
            (Some(store), _) => store,
            (None, Some(config)) => config.build_backup_store()?,
            (None, None) => RepositoryConfig::memory().build_backup_store()?,
        };
        let lists = self.lists.unwrap_or_default();

        let services = ModelServices::new(data_store, live_stacks, backup_store, lists)
            .with_manual_backup_timeout(self.manual_backup_timeout);

        let orchestrator = ModelOrchestrator::new(self.app, services);
        Ok(match self.observer {
            Some(observer) => orchestrator.with_observer(observer),
            None => orchestrator,
        })
    }
}
