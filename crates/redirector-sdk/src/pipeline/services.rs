//! External collaborators shared by the tasks of one application

use super::context::ModelSource;
use redirector_repository::{
    BackupRuleSource, BackupStacksSupplier, BackupStore, RuleSource, StacksSupplier,
};
use redirector_runtime::NamespacedListRepository;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a manual stacks backup
pub const DEFAULT_MANUAL_BACKUP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct ModelServices {
    /// Remote control plane
    pub data_store: Arc<dyn RuleSource>,

    /// Rule documents read back from `backup_store`
    pub backup_source: Arc<dyn RuleSource>,

    pub backup_store: Arc<dyn BackupStore>,

    /// Live service discovery
    pub live_stacks: Arc<dyn StacksSupplier>,

    /// Stacks read back from `backup_store`
    pub backup_stacks: Arc<dyn StacksSupplier>,

    /// Namespaced lists shared by every engine of the process
    pub lists: Arc<NamespacedListRepository>,

    pub manual_backup_timeout: Duration,
}

impl ModelServices {
    /// Services whose backup-side readers sit over `backup_store`
    pub fn new(
        data_store: Arc<dyn RuleSource>,
        live_stacks: Arc<dyn StacksSupplier>,
        backup_store: Arc<dyn BackupStore>,
        lists: Arc<NamespacedListRepository>,
    ) -> Self {
        Self {
            data_store,
            backup_source: Arc::new(BackupRuleSource::new(backup_store.clone())),
            backup_stacks: Arc::new(BackupStacksSupplier::new(backup_store.clone())),
            backup_store,
            live_stacks,
            lists,
            manual_backup_timeout: DEFAULT_MANUAL_BACKUP_TIMEOUT,
        }
    }

    pub fn with_manual_backup_timeout(mut self, timeout: Duration) -> Self {
        self.manual_backup_timeout = timeout;
        self
    }

    pub fn rule_source(&self, source: ModelSource) -> &Arc<dyn RuleSource> {
        match source {
            ModelSource::Backup => &self.backup_source,
            ModelSource::DataStore => &self.data_store,
        }
    }

    pub fn stacks_supplier(&self, source: ModelSource) -> &Arc<dyn StacksSupplier> {
        match source {
            ModelSource::Backup => &self.backup_stacks,
            ModelSource::DataStore => &self.live_stacks,
        }
    }
}

impl std::fmt::Debug for ModelServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelServices")
            .field("lists_version", &self.lists.version())
            .field("manual_backup_timeout", &self.manual_backup_timeout)
            .finish_non_exhaustive()
    }
}
