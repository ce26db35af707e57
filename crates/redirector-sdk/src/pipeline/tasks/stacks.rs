//! Host topology tasks

use crate::pipeline::{
    ModelContext, ModelServices, ReportKind, Task, TaskResult, ValidationReport,
};
use async_trait::async_trait;
use redirector_core::StacksSnapshot;
use redirector_repository::{BackupEntity, BackupStore};
use std::sync::Arc;
use std::time::Duration;

/// Pull stacks and hosts from live discovery or the backup
pub struct GetStacksWithHosts {
    services: ModelServices,
}

impl GetStacksWithHosts {
    pub fn new(services: ModelServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Task for GetStacksWithHosts {
    fn name(&self) -> &'static str {
        "get_stacks_with_hosts"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        let supplier = self.services.stacks_supplier(context.source);
        let loaded = supplier.stacks(context.app_name()).await;
        let stacks = match loaded {
            Ok(stacks) => stacks,
            Err(e) => {
                let report = ValidationReport::failure(
                    self.name(),
                    format!("cannot load stacks from {}: {}", context.source, e),
                );
                return TaskResult::failed(context, report);
            }
        };

        let hosts = stacks
            .iter()
            .flat_map(|stack| stack.hosts.iter())
            .filter(|host| host.has_address())
            .count();
        if hosts == 0 {
            let report = ValidationReport::failure(
                self.name(),
                format!("no hosts found in {} ({} stacks)", context.source, stacks.len()),
            );
            return TaskResult::failed(context, report);
        }

        let detail = format!("{} hosts in {} stacks", hosts, stacks.len());
        context.stacks = Some(stacks);
        TaskResult::succeeded(context, self.name(), detail)
    }
}

/// Freeze the loaded stacks into a normalised, versioned snapshot
pub struct BackupStacksInMemory;

#[async_trait]
impl Task for BackupStacksInMemory {
    fn name(&self) -> &'static str {
        "backup_stacks_in_memory"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        let Some(stacks) = context.stacks.clone() else {
            return TaskResult::failed(
                context,
                ValidationReport::new(ReportKind::NotApplicable, self.name(), "no stacks loaded"),
            );
        };

        let snapshot = StacksSnapshot::new(context.stacks_version, stacks);
        let detail = format!(
            "snapshot version {}: {} stacks, {} hosts",
            snapshot.version,
            snapshot.stacks.len(),
            snapshot.host_count()
        );
        context.stacks_snapshot = Some(Arc::new(snapshot));
        TaskResult::succeeded(context, self.name(), detail)
    }
}

/// Persist the stacks snapshot of a statically discovered application
///
/// Bounded by a timeout; running out of time fails the task.
pub struct TriggerManualBackup {
    store: Arc<dyn BackupStore>,
    timeout: Duration,
}

impl TriggerManualBackup {
    pub fn new(store: Arc<dyn BackupStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

#[async_trait]
impl Task for TriggerManualBackup {
    fn name(&self) -> &'static str {
        "trigger_manual_backup"
    }

    async fn run(&self, context: ModelContext) -> TaskResult {
        if !context.app.static_discovery {
            return TaskResult::skipped(context, self.name(), "stacks are discovered dynamically");
        }
        let Some(snapshot) = context.stacks_snapshot.clone() else {
            return TaskResult::failed(
                context,
                ValidationReport::new(ReportKind::NotApplicable, self.name(), "no stacks snapshot"),
            );
        };

        let content = match serde_json::to_string(snapshot.as_ref()) {
            Ok(content) => content,
            Err(e) => {
                return TaskResult::failed(
                    context,
                    ValidationReport::failure(self.name(), format!("cannot serialize stacks: {}", e)),
                )
            }
        };

        let save = self
            .store
            .save(context.app_name(), BackupEntity::StacksSnapshot, &content);
        let saved = tokio::time::timeout(self.timeout, save).await;
        match saved {
            Ok(true) => TaskResult::succeeded(
                context,
                self.name(),
                format!("stacks snapshot version {} saved", snapshot.version),
            ),
            Ok(false) => TaskResult::failed(
                context,
                ValidationReport::failure(self.name(), "backup store rejected the stacks snapshot"),
            ),
            Err(_) => {
                let report = ValidationReport::new(
                    ReportKind::Timeout,
                    self.name(),
                    format!("stacks backup did not finish within {:?}", self.timeout),
                );
                TaskResult::failed(context, report)
            }
        }
    }
}
