//! Model validation, publication and backup

use crate::engine::RedirectorEngine;
use crate::error::SdkError;
use crate::pipeline::{ModelContext, ReportKind, Task, TaskResult, ValidationReport};
use async_trait::async_trait;
use redirector_core::ModelMetadata;
use redirector_parser::{DocumentParser, NamespacedListsParser, WhitelistParser};
use redirector_repository::{BackupEntity, BackupStore, SHARED_SCOPE};
use redirector_runtime::{LookupMode, NamespacedListRepository};
use serde::Serialize;
use std::sync::Arc;

fn engine_report(task: &str, err: SdkError) -> ValidationReport {
    match err {
        SdkError::ModelIncomplete(_) => {
            ValidationReport::new(ReportKind::NotApplicable, task, err.to_string())
        }
        err => ValidationReport::failure(task, err.to_string()),
    }
}

/// Check that the candidate model can actually serve traffic
///
/// Builds a trial engine and requires a non-empty whitelist, a reachable
/// default server and enough hosts behind every rule's target.
pub struct ValidateAbleToRedirect {
    lists: Arc<NamespacedListRepository>,
}

impl ValidateAbleToRedirect {
    pub fn new(lists: Arc<NamespacedListRepository>) -> Self {
        Self { lists }
    }

    fn validate(&self, context: &ModelContext) -> Result<String, ValidationReport> {
        let engine = RedirectorEngine::from_context(context, self.lists.clone())
            .map_err(|e| engine_report(self.name(), e))?;

        if engine.whitelist().is_empty() {
            return Err(ValidationReport::failure(self.name(), "whitelist is empty"));
        }

        let redirector = engine.redirector();
        let pool = redirector.host_pool();
        let rules = redirector.flavor_rules();

        let default_server = &rules.default_server;
        if !default_server.is_advanced()
            && pool.count_eligible_hosts(&default_server.path, LookupMode::Default) == 0
        {
            return Err(ValidationReport::failure(
                self.name(),
                format!(
                    "default server '{}' has no whitelisted hosts for '{}'",
                    default_server.name, default_server.path
                ),
            ));
        }

        let min_hosts = context.app.min_hosts_per_rule;
        let mut checked = 0;
        for (rule, server) in rules.rule_servers().filter(|(_, s)| !s.is_advanced()) {
            let hosts = pool.count_hosts_for_path(&server.path);
            if hosts < min_hosts {
                return Err(ValidationReport::failure(
                    self.name(),
                    format!(
                        "rule '{}' targets '{}' with {} hosts, at least {} required",
                        rule.id, server.path, hosts, min_hosts
                    ),
                ));
            }
            checked += 1;
        }

        Ok(format!(
            "default server reachable, {} rule targets with at least {} hosts",
            checked, min_hosts
        ))
    }
}

#[async_trait]
impl Task for ValidateAbleToRedirect {
    fn name(&self) -> &'static str {
        "validate_able_to_redirect"
    }

    async fn run(&self, context: ModelContext) -> TaskResult {
        match self.validate(&context) {
            Ok(detail) => TaskResult::succeeded(context, self.name(), detail),
            Err(report) => TaskResult::failed(context, report),
        }
    }
}

/// Build the new engine and attach it to the context
pub struct ApplyNewModel {
    lists: Arc<NamespacedListRepository>,
}

impl ApplyNewModel {
    pub fn new(lists: Arc<NamespacedListRepository>) -> Self {
        Self { lists }
    }
}

#[async_trait]
impl Task for ApplyNewModel {
    fn name(&self) -> &'static str {
        "apply_new_model"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        match RedirectorEngine::from_context(&context, self.lists.clone()) {
            Ok(engine) => {
                let detail = format!(
                    "engine built at model version {}, stacks version {}",
                    engine.model_version(),
                    engine.stacks_version()
                );
                context.engine = Some(Arc::new(engine));
                TaskResult::succeeded(context, self.name(), detail)
            }
            Err(e) => {
                let report = engine_report(self.name(), e);
                TaskResult::failed(context, report)
            }
        }
    }
}

/// Persist the applied model so the next start can serve from backup
///
/// Metadata is written last and only when every document was saved, so the
/// backed-up version never runs ahead of its documents. Save failures are
/// logged and do not fail the chain.
pub struct BackupNewModel {
    store: Arc<dyn BackupStore>,
    lists: Arc<NamespacedListRepository>,
}

impl BackupNewModel {
    pub fn new(store: Arc<dyn BackupStore>, lists: Arc<NamespacedListRepository>) -> Self {
        Self { store, lists }
    }

    async fn save<T: Serialize>(&self, app: &str, entity: BackupEntity, document: &T) -> bool {
        match DocumentParser::to_json(document) {
            Ok(content) => self.store.save(app, entity, &content).await,
            Err(e) => {
                tracing::warn!("Cannot serialize {} for '{}': {}", entity, app, e);
                false
            }
        }
    }
}

#[async_trait]
impl Task for BackupNewModel {
    fn name(&self) -> &'static str {
        "backup_new_model"
    }

    async fn run(&self, context: ModelContext) -> TaskResult {
        let (Some(flavor_rules), Some(url_rules), Some(whitelist)) = (
            context.flavor_rules_document.as_ref(),
            context.url_rules_document.as_ref(),
            context.whitelist.as_ref(),
        ) else {
            return TaskResult::failed(
                context,
                ValidationReport::new(
                    ReportKind::NotApplicable,
                    self.name(),
                    "model documents are missing",
                ),
            );
        };

        let app = context.app_name();
        let mut failed = Vec::new();

        if !self.save(app, BackupEntity::FlavorRules, flavor_rules).await {
            failed.push(BackupEntity::FlavorRules);
        }
        if !self.save(app, BackupEntity::UrlRules, url_rules).await {
            failed.push(BackupEntity::UrlRules);
        }
        let whitelist = WhitelistParser::to_dto(whitelist);
        if !self.save(app, BackupEntity::Whitelist, &whitelist).await {
            failed.push(BackupEntity::Whitelist);
        }

        let lists = context.lists(&self.lists);
        if !lists.is_empty() {
            let dto = NamespacedListsParser::to_dto(&lists);
            if !self.save(SHARED_SCOPE, BackupEntity::NamespacedLists, &dto).await {
                failed.push(BackupEntity::NamespacedLists);
            }
        }

        // Statically discovered stacks are persisted by the manual backup
        if !context.app.static_discovery {
            if let Some(snapshot) = context.stacks_snapshot.as_deref() {
                if !self.save(app, BackupEntity::StacksSnapshot, snapshot).await {
                    failed.push(BackupEntity::StacksSnapshot);
                }
            }
        }

        if !failed.is_empty() {
            let detail = format!("backup incomplete, failed to save {:?}", failed);
            tracing::warn!("'{}': {}", app, detail);
            return TaskResult::warning(context, self.name(), detail);
        }

        let metadata = ModelMetadata::new(context.model_version);
        if !self.save(app, BackupEntity::ModelMetadata, &metadata).await {
            let detail = "documents saved but metadata was not".to_string();
            tracing::warn!("'{}': {}", app, detail);
            return TaskResult::warning(context, self.name(), detail);
        }

        let detail = format!("model version {} backed up", context.model_version);
        TaskResult::succeeded(context, self.name(), detail)
    }
}
