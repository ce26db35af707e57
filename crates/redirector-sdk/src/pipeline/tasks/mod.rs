//! Pipeline tasks

mod data_store;
mod documents;
mod model;
mod stacks;

pub use data_store::{InitDataStore, SyncModels};
pub use documents::{
    GetFlavorRules, GetNamespacedLists, GetUrlRules, GetWhitelistedStacks, ValidateNamespacedLists,
};
pub use model::{ApplyNewModel, BackupNewModel, ValidateAbleToRedirect};
pub use stacks::{BackupStacksInMemory, GetStacksWithHosts, TriggerManualBackup};
