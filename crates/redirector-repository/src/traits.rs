//! Trait seams between the model pipeline and its external collaborators
//!
//! - [`RuleSource`]: versioned raw rule documents (control plane or backup)
//! - [`BackupStore`]: durable key/value persistence keyed by app and entity
//! - [`StacksSupplier`]: live or backed-up host topology

use async_trait::async_trait;
use redirector_core::StackData;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RepositoryResult;

/// Backup scope for documents shared by every application
pub const SHARED_SCOPE: &str = "_shared";

/// Kind of document kept in a [`BackupStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupEntity {
    FlavorRules,
    UrlRules,
    Whitelist,
    NamespacedLists,
    ModelMetadata,
    StacksSnapshot,
}

impl BackupEntity {
    pub const ALL: [BackupEntity; 6] = [
        BackupEntity::FlavorRules,
        BackupEntity::UrlRules,
        BackupEntity::Whitelist,
        BackupEntity::NamespacedLists,
        BackupEntity::ModelMetadata,
        BackupEntity::StacksSnapshot,
    ];

    /// Stable key used for storage
    pub fn key(&self) -> &'static str {
        match self {
            BackupEntity::FlavorRules => "flavor_rules",
            BackupEntity::UrlRules => "url_rules",
            BackupEntity::Whitelist => "whitelist",
            BackupEntity::NamespacedLists => "namespaced_lists",
            BackupEntity::ModelMetadata => "model_metadata",
            BackupEntity::StacksSnapshot => "stacks_snapshot",
        }
    }
}

impl fmt::Display for BackupEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Versioned source of raw model documents
///
/// Documents are returned as text (JSON or YAML); translation into the
/// rule model happens in the pipeline so every source is validated the
/// same way. Namespaced lists are shared by all applications.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Start the connection or cache behind the source
    ///
    /// Either succeeds or fails fast; it never waits indefinitely.
    async fn connect(&self) -> RepositoryResult<()> {
        Ok(())
    }

    async fn flavor_rules(&self, app: &str) -> RepositoryResult<String>;

    async fn url_rules(&self, app: &str) -> RepositoryResult<String>;

    async fn whitelist(&self, app: &str) -> RepositoryResult<String>;

    async fn namespaced_lists(&self) -> RepositoryResult<String>;

    /// Version of the rule model (flavor rules, URL rules, whitelist)
    async fn model_version(&self, app: &str) -> RepositoryResult<i64>;

    /// Version of the host topology
    async fn stacks_version(&self, app: &str) -> RepositoryResult<i64>;

    async fn namespaced_lists_version(&self) -> RepositoryResult<i64>;
}

/// Durable local persistence of model documents
///
/// Failures are reported as `false` / `None` and logged by the
/// implementation; a broken backup never aborts serving.
#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn save(&self, app: &str, entity: BackupEntity, content: &str) -> bool;

    async fn load(&self, app: &str, entity: BackupEntity) -> Option<String>;
}

/// Provider of stacks and their hosts for an application
#[async_trait]
pub trait StacksSupplier: Send + Sync {
    async fn stacks(&self, app: &str) -> RepositoryResult<Vec<StackData>>;
}
