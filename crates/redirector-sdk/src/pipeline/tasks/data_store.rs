//! Data store connection and version gate

use crate::pipeline::{ModelContext, ReportKind, Task, TaskResult, ValidationReport};
use async_trait::async_trait;
use redirector_repository::RuleSource;
use std::sync::Arc;

/// Make sure the control plane connection is up
pub struct InitDataStore {
    data_store: Arc<dyn RuleSource>,
}

impl InitDataStore {
    pub fn new(data_store: Arc<dyn RuleSource>) -> Self {
        Self { data_store }
    }
}

#[async_trait]
impl Task for InitDataStore {
    fn name(&self) -> &'static str {
        "init_data_store"
    }

    async fn run(&self, context: ModelContext) -> TaskResult {
        match self.data_store.connect().await {
            Ok(()) => TaskResult::succeeded(context, self.name(), "data store connected"),
            Err(e) => TaskResult::failed(
                context,
                ValidationReport::failure(self.name(), format!("cannot connect: {}", e)),
            ),
        }
    }
}

/// Compare the serving model version against the target version
///
/// The target is the context's requested version, or the control plane's
/// current version when none was requested. The serving version is the
/// newer of the backup and the published engine. Fails with `AlreadyInSync`
/// when it is not behind. Without a published engine nothing is in sync.
pub struct SyncModels {
    data_store: Arc<dyn RuleSource>,
    backup: Arc<dyn RuleSource>,
}

impl SyncModels {
    pub fn new(data_store: Arc<dyn RuleSource>, backup: Arc<dyn RuleSource>) -> Self {
        Self { data_store, backup }
    }
}

#[async_trait]
impl Task for SyncModels {
    fn name(&self) -> &'static str {
        "sync_models"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        let app = context.app_name().to_string();

        let target = match context.target_version {
            Some(version) => version,
            None => match self.data_store.model_version(&app).await {
                Ok(version) => version,
                Err(e) => {
                    return TaskResult::failed(
                        context,
                        ValidationReport::failure(
                            self.name(),
                            format!("cannot read data store version: {}", e),
                        ),
                    )
                }
            },
        };

        let backed_up = match self.backup.model_version(&app).await {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!("'{}': unreadable backup metadata, forcing sync: {}", app, e);
                0
            }
        };

        let detail = match context.published_version {
            Some(published) if backed_up.max(published) >= target => {
                return TaskResult::failed(
                    context,
                    ValidationReport::new(
                        ReportKind::AlreadyInSync,
                        self.name(),
                        format!(
                            "backup version {} and published version {} are not behind {}",
                            backed_up, published, target
                        ),
                    ),
                );
            }
            Some(published) => format!(
                "backup version {} and published version {} are behind {}",
                backed_up, published, target
            ),
            None => format!("no model published, backup version {}, target {}", backed_up, target),
        };

        context.target_version = Some(target);
        context.model_version = target;
        TaskResult::succeeded(context, self.name(), detail)
    }
}
