//! Rule source and stacks supplier reading the local backup
//!
//! Lets a restarted process serve from the last persisted model without any
//! dependency on the control plane or live service discovery.

use async_trait::async_trait;
use redirector_core::{ModelMetadata, StackData, StacksSnapshot};
use std::sync::Arc;

use crate::error::{RepositoryError, RepositoryResult};
use crate::traits::{BackupEntity, BackupStore, RuleSource, StacksSupplier, SHARED_SCOPE};

/// [`RuleSource`] adapter over a [`BackupStore`]
#[derive(Clone)]
pub struct BackupRuleSource {
    store: Arc<dyn BackupStore>,
}

impl BackupRuleSource {
    pub fn new(store: Arc<dyn BackupStore>) -> Self {
        Self { store }
    }

    async fn document(&self, app: &str, entity: BackupEntity) -> RepositoryResult<String> {
        self.store
            .load(app, entity)
            .await
            .ok_or_else(|| RepositoryError::not_found(app, entity))
    }

    /// Persisted model metadata, if any
    pub async fn metadata(&self, app: &str) -> RepositoryResult<Option<ModelMetadata>> {
        match self.store.load(app, BackupEntity::ModelMetadata).await {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    /// Persisted stacks snapshot, if any
    pub async fn stacks_snapshot(&self, app: &str) -> RepositoryResult<Option<StacksSnapshot>> {
        match self.store.load(app, BackupEntity::StacksSnapshot).await {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RuleSource for BackupRuleSource {
    async fn flavor_rules(&self, app: &str) -> RepositoryResult<String> {
        self.document(app, BackupEntity::FlavorRules).await
    }

    async fn url_rules(&self, app: &str) -> RepositoryResult<String> {
        self.document(app, BackupEntity::UrlRules).await
    }

    async fn whitelist(&self, app: &str) -> RepositoryResult<String> {
        self.document(app, BackupEntity::Whitelist).await
    }

    async fn namespaced_lists(&self) -> RepositoryResult<String> {
        self.document(SHARED_SCOPE, BackupEntity::NamespacedLists).await
    }

    /// Version recorded with the last backup, 0 when there is none
    async fn model_version(&self, app: &str) -> RepositoryResult<i64> {
        Ok(self
            .metadata(app)
            .await?
            .map(|metadata| metadata.version)
            .unwrap_or_default())
    }

    async fn stacks_version(&self, app: &str) -> RepositoryResult<i64> {
        Ok(self
            .stacks_snapshot(app)
            .await?
            .map(|snapshot| snapshot.version)
            .unwrap_or_default())
    }

    async fn namespaced_lists_version(&self) -> RepositoryResult<i64> {
        let content = self
            .document(SHARED_SCOPE, BackupEntity::NamespacedLists)
            .await;
        match content {
            Ok(content) => Ok(redirector_parser::NamespacedListsParser::parse(&content)?.version),
            Err(RepositoryError::NotFound { .. }) => Ok(0),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for BackupRuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupRuleSource").finish_non_exhaustive()
    }
}

/// [`StacksSupplier`] returning the backed-up stacks snapshot
#[derive(Clone)]
pub struct BackupStacksSupplier {
    source: BackupRuleSource,
}

impl BackupStacksSupplier {
    pub fn new(store: Arc<dyn BackupStore>) -> Self {
        Self {
            source: BackupRuleSource::new(store),
        }
    }
}

#[async_trait]
impl StacksSupplier for BackupStacksSupplier {
    async fn stacks(&self, app: &str) -> RepositoryResult<Vec<StackData>> {
        Ok(self
            .source
            .stacks_snapshot(app)
            .await?
            .map(|snapshot| snapshot.stacks)
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for BackupStacksSupplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupStacksSupplier").finish_non_exhaustive()
    }
}
