//! Task chains assembled for each pipeline entry point

use super::services::ModelServices;
use super::task::TaskChain;
use super::tasks::*;

/// Serve from the local backup after a restart, without the data store
pub fn init_model_chain(services: &ModelServices) -> TaskChain {
    TaskChain::new("init_model")
        .with_task(GetNamespacedLists::new(services.clone()))
        .with_task(GetFlavorRules::new(services.clone()))
        .with_task(GetUrlRules::new(services.clone()))
        .with_task(GetWhitelistedStacks::new(services.clone()))
        .with_task(GetStacksWithHosts::new(services.clone()))
        .with_task(BackupStacksInMemory)
        .with_task(ValidateAbleToRedirect::new(services.lists.clone()))
        .with_task(ApplyNewModel::new(services.lists.clone()))
}

/// Load the whole model from the data store and back it up
///
/// Namespaced lists are refreshed before the rules are translated, since
/// translation resolves list references against the list repository.
pub fn refresh_model_chain(services: &ModelServices) -> TaskChain {
    TaskChain::new("refresh_model")
        .with_task(InitDataStore::new(services.data_store.clone()))
        .with_task(GetNamespacedLists::new(services.clone()))
        .with_task(GetFlavorRules::new(services.clone()))
        .with_task(GetUrlRules::new(services.clone()))
        .with_task(GetWhitelistedStacks::new(services.clone()))
        .with_task(GetStacksWithHosts::new(services.clone()))
        .with_task(BackupStacksInMemory)
        .with_task(ValidateAbleToRedirect::new(services.lists.clone()))
        .with_task(ApplyNewModel::new(services.lists.clone()))
        .with_task(TriggerManualBackup::new(
            services.backup_store.clone(),
            services.manual_backup_timeout,
        ))
        .with_task(BackupNewModel::new(
            services.backup_store.clone(),
            services.lists.clone(),
        ))
}

/// Rebuild the engine for new host topology, keeping rules and whitelist
pub fn service_discovery_reload_chain(services: &ModelServices) -> TaskChain {
    TaskChain::new("service_discovery_reload")
        .with_task(InitDataStore::new(services.data_store.clone()))
        .with_task(GetStacksWithHosts::new(services.clone()))
        .with_task(BackupStacksInMemory)
        .with_task(ValidateAbleToRedirect::new(services.lists.clone()))
        .with_task(ApplyNewModel::new(services.lists.clone()))
        .with_task(TriggerManualBackup::new(
            services.backup_store.clone(),
            services.manual_backup_timeout,
        ))
}

/// Version gate: fails with `AlreadyInSync` when no reload is needed
pub fn sync_model_chain(services: &ModelServices) -> TaskChain {
    TaskChain::new("sync_model")
        .with_task(InitDataStore::new(services.data_store.clone()))
        .with_task(SyncModels::new(
            services.data_store.clone(),
            services.backup_source.clone(),
        ))
}

/// Refresh the shared namespaced lists from the data store
///
/// Runs over the last known good rules so new lists cannot drop one they
/// reference.
pub fn namespaced_lists_chain(services: &ModelServices) -> TaskChain {
    TaskChain::new("namespaced_lists")
        .with_task(InitDataStore::new(services.data_store.clone()))
        .with_task(GetNamespacedLists::new(services.clone()))
        .with_task(ValidateNamespacedLists)
}
