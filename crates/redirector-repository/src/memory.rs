//! In-memory rule source, backup store and stacks supplier
//!
//! The rule source stands in for the remote control plane: documents and
//! version counters are set by the caller and served back verbatim.

use async_trait::async_trait;
use redirector_core::StackData;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::error::{RepositoryError, RepositoryResult};
use crate::traits::{BackupEntity, BackupStore, RuleSource, StacksSupplier};

#[derive(Debug, Clone, Default)]
struct AppDocuments {
    flavor_rules: Option<String>,
    url_rules: Option<String>,
    whitelist: Option<String>,
    model_version: i64,
    stacks_version: i64,
}

/// Control plane kept in process memory
#[derive(Debug, Default)]
pub struct MemoryRuleSource {
    apps: RwLock<HashMap<String, AppDocuments>>,
    namespaced_lists: RwLock<Option<(String, i64)>>,
    unavailable: AtomicBool,
}

impl MemoryRuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_flavor_rules(&self, app: &str, document: impl Into<String>) {
        self.apps.write().await.entry(app.to_string()).or_default().flavor_rules =
            Some(document.into());
    }

    pub async fn set_url_rules(&self, app: &str, document: impl Into<String>) {
        self.apps.write().await.entry(app.to_string()).or_default().url_rules =
            Some(document.into());
    }

    pub async fn set_whitelist(&self, app: &str, document: impl Into<String>) {
        self.apps.write().await.entry(app.to_string()).or_default().whitelist =
            Some(document.into());
    }

    pub async fn set_model_version(&self, app: &str, version: i64) {
        self.apps.write().await.entry(app.to_string()).or_default().model_version = version;
    }

    pub async fn set_stacks_version(&self, app: &str, version: i64) {
        self.apps.write().await.entry(app.to_string()).or_default().stacks_version = version;
    }

    pub async fn set_namespaced_lists(&self, document: impl Into<String>, version: i64) {
        *self.namespaced_lists.write().await = Some((document.into(), version));
    }

    /// Make every call fail as if the control plane were unreachable
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> RepositoryResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable(
                "in-memory rule source is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn document(
        &self,
        app: &str,
        entity: BackupEntity,
        select: fn(&AppDocuments) -> Option<&String>,
    ) -> RepositoryResult<String> {
        self.check_available()?;
        let apps = self.apps.read().await;
        apps.get(app)
            .and_then(select)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(app, entity))
    }

    async fn app_field(&self, app: &str, select: fn(&AppDocuments) -> i64) -> RepositoryResult<i64> {
        self.check_available()?;
        Ok(self.apps.read().await.get(app).map(select).unwrap_or_default())
    }
}

#[async_trait]
impl RuleSource for MemoryRuleSource {
    async fn connect(&self) -> RepositoryResult<()> {
        self.check_available()
    }

    async fn flavor_rules(&self, app: &str) -> RepositoryResult<String> {
        self.document(app, BackupEntity::FlavorRules, |d| d.flavor_rules.as_ref())
            .await
    }

    async fn url_rules(&self, app: &str) -> RepositoryResult<String> {
        self.document(app, BackupEntity::UrlRules, |d| d.url_rules.as_ref())
            .await
    }

    async fn whitelist(&self, app: &str) -> RepositoryResult<String> {
        self.document(app, BackupEntity::Whitelist, |d| d.whitelist.as_ref())
            .await
    }

    async fn namespaced_lists(&self) -> RepositoryResult<String> {
        self.check_available()?;
        self.namespaced_lists
            .read()
            .await
            .as_ref()
            .map(|(document, _)| document.clone())
            .ok_or_else(|| RepositoryError::not_found("*", BackupEntity::NamespacedLists))
    }

    async fn model_version(&self, app: &str) -> RepositoryResult<i64> {
        self.app_field(app, |d| d.model_version).await
    }

    async fn stacks_version(&self, app: &str) -> RepositoryResult<i64> {
        self.app_field(app, |d| d.stacks_version).await
    }

    async fn namespaced_lists_version(&self) -> RepositoryResult<i64> {
        self.check_available()?;
        Ok(self
            .namespaced_lists
            .read()
            .await
            .as_ref()
            .map(|(_, version)| *version)
            .unwrap_or_default())
    }
}

/// Backup store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryBackupStore {
    entries: RwLock<HashMap<(String, BackupEntity), String>>,
    read_only: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryBackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every save, as a full or read-only disk would
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, app: &str, entity: BackupEntity) -> bool {
        self.entries
            .read()
            .await
            .contains_key(&(app.to_string(), entity))
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn save(&self, app: &str, entity: BackupEntity, content: &str) -> bool {
        if self.read_only.load(Ordering::SeqCst) {
            tracing::warn!("Backup store is read-only, dropping {} for '{}'", entity, app);
            return false;
        }
        self.entries
            .write()
            .await
            .insert((app.to_string(), entity), content.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        true
    }

    async fn load(&self, app: &str, entity: BackupEntity) -> Option<String> {
        self.entries
            .read()
            .await
            .get(&(app.to_string(), entity))
            .cloned()
    }
}

/// Statically configured host topology
#[derive(Debug, Default)]
pub struct StaticStacksSupplier {
    stacks: RwLock<HashMap<String, Vec<StackData>>>,
}

impl StaticStacksSupplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_stacks(&self, app: &str, stacks: Vec<StackData>) {
        self.stacks.write().await.insert(app.to_string(), stacks);
    }
}

#[async_trait]
impl StacksSupplier for StaticStacksSupplier {
    async fn stacks(&self, app: &str) -> RepositoryResult<Vec<StackData>> {
        Ok(self
            .stacks
            .read()
            .await
            .get(app)
            .cloned()
            .unwrap_or_default())
    }
}
