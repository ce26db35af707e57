//! Model context threaded through a task chain
//!
//! A single-owner accumulator: each task takes the context by value, adds
//! what it loaded or built, and hands it back inside its `TaskResult`.

use crate::config::AppConfig;
use crate::engine::RedirectorEngine;
use chrono::{DateTime, Utc};
use redirector_core::{
    FlavorRuleSet, NamespacedLists, StackData, StacksSnapshot, UrlRuleSet, WhiteList,
};
use redirector_runtime::NamespacedListRepository;
use redirector_parser::{SelectServerDto, UrlRulesDto};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where model documents are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Local durable backup
    Backup,
    /// Remote control plane and live service discovery
    DataStore,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Backup => f.write_str("backup"),
            ModelSource::DataStore => f.write_str("data store"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    /// Nothing to do
    Skipped,
    /// Completed with a non-fatal problem
    Warning,
    Failed,
}

/// One entry of the execution log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub task: String,
    pub outcome: StepOutcome,
    pub detail: String,
    pub at: DateTime<Utc>,
}

/// Typed accumulator for one pipeline run
#[derive(Debug, Clone)]
pub struct ModelContext {
    pub app: AppConfig,
    pub source: ModelSource,

    /// Version requested by the caller, if any
    pub target_version: Option<i64>,

    /// Model version of the engine serving when the run started, if any
    pub published_version: Option<i64>,

    /// Version of the model being built
    pub model_version: i64,

    /// Version of the host topology being built
    pub stacks_version: i64,

    /// Lists loaded by this run, published only when the run succeeds
    pub namespaced_lists: Option<Arc<NamespacedLists>>,

    pub flavor_rules_document: Option<SelectServerDto>,
    pub flavor_rules: Option<Arc<FlavorRuleSet>>,
    pub url_rules_document: Option<UrlRulesDto>,
    pub url_rules: Option<Arc<UrlRuleSet>>,
    pub whitelist: Option<Arc<WhiteList>>,
    pub stacks: Option<Vec<StackData>>,
    pub stacks_snapshot: Option<Arc<StacksSnapshot>>,
    pub engine: Option<Arc<RedirectorEngine>>,

    pub execution_log: Vec<ExecutionStep>,
}

impl ModelContext {
    pub fn new(app: AppConfig, source: ModelSource) -> Self {
        Self {
            app,
            source,
            target_version: None,
            published_version: None,
            model_version: 0,
            stacks_version: 0,
            namespaced_lists: None,
            flavor_rules_document: None,
            flavor_rules: None,
            url_rules_document: None,
            url_rules: None,
            whitelist: None,
            stacks: None,
            stacks_snapshot: None,
            engine: None,
            execution_log: Vec::new(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app.name
    }

    pub fn with_target_version(mut self, version: i64) -> Self {
        self.target_version = Some(version);
        self
    }

    pub fn with_published_version(mut self, version: Option<i64>) -> Self {
        self.published_version = version;
        self
    }

    pub fn with_model_version(mut self, version: i64) -> Self {
        self.model_version = version;
        self
    }

    pub fn with_stacks_version(mut self, version: i64) -> Self {
        self.stacks_version = version;
        self
    }

    /// Start a new run from this context's model
    ///
    /// Keeps the loaded rules and whitelist; drops staged lists, the
    /// engine, the stacks and the execution log.
    pub fn reseed(&self, source: ModelSource) -> Self {
        Self {
            source,
            target_version: None,
            namespaced_lists: None,
            stacks: None,
            stacks_snapshot: None,
            engine: None,
            execution_log: Vec::new(),
            ..self.clone()
        }
    }

    /// Lists to resolve references against: staged by this run, else the
    /// published ones
    pub fn lists(&self, repository: &NamespacedListRepository) -> Arc<NamespacedLists> {
        self.namespaced_lists
            .clone()
            .unwrap_or_else(|| repository.snapshot())
    }

    /// Append a step to the execution log
    pub fn record(&mut self, task: &str, outcome: StepOutcome, detail: impl Into<String>) {
        self.execution_log.push(ExecutionStep {
            task: task.to_string(),
            outcome,
            detail: detail.into(),
            at: Utc::now(),
        });
    }

    pub fn last_step(&self) -> Option<&ExecutionStep> {
        self.execution_log.last()
    }

    /// Names of the tasks that ran, in order
    pub fn executed_tasks(&self) -> Vec<&str> {
        self.execution_log.iter().map(|s| s.task.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_steps() {
        let mut context = ModelContext::new(AppConfig::new("xre"), ModelSource::Backup);
        context.record("get_flavor_rules", StepOutcome::Succeeded, "3 rules");
        context.record("get_url_rules", StepOutcome::Failed, "missing default");

        assert_eq!(context.executed_tasks(), vec!["get_flavor_rules", "get_url_rules"]);
        assert_eq!(context.last_step().unwrap().outcome, StepOutcome::Failed);
    }

    #[test]
    fn test_staged_lists_take_precedence() {
        let repository = NamespacedListRepository::with_lists(NamespacedLists::new(1, []));
        let mut context = ModelContext::new(AppConfig::new("xre"), ModelSource::DataStore);
        assert_eq!(context.lists(&repository).version, 1);

        context.namespaced_lists = Some(Arc::new(NamespacedLists::new(2, [])));
        assert_eq!(context.lists(&repository).version, 2);
        assert_eq!(repository.version(), 1);
    }

    #[test]
    fn test_reseed_keeps_model_drops_run_state() {
        let mut context = ModelContext::new(AppConfig::new("xre"), ModelSource::Backup)
            .with_model_version(4)
            .with_target_version(4);
        context.whitelist = Some(Arc::new(WhiteList::new(["/dc1/zone1"])));
        context.namespaced_lists = Some(Arc::new(NamespacedLists::default()));
        context.stacks = Some(Vec::new());
        context.record("apply_new_model", StepOutcome::Succeeded, "");

        let next = context.reseed(ModelSource::DataStore);
        assert_eq!(next.source, ModelSource::DataStore);
        assert_eq!(next.model_version, 4);
        assert!(next.target_version.is_none());
        assert!(next.whitelist.is_some());
        assert!(next.namespaced_lists.is_none());
        assert!(next.stacks.is_none());
        assert!(next.execution_log.is_empty());
    }
}
