//! Tasks, their results and task chains

use super::context::{ModelContext, StepOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a task stopped its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    /// The model could not be loaded, translated or validated
    Failure,
    /// The local model is already at or past the requested version
    AlreadyInSync,
    /// Preconditions for the task are not met
    NotApplicable,
    /// A bounded external call did not complete in time
    Timeout,
}

impl ReportKind {
    /// True for skip codes that are not errors
    pub fn is_benign(&self) -> bool {
        matches!(self, ReportKind::AlreadyInSync)
    }
}

/// Typed reason attached to a failed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub kind: ReportKind,
    pub task: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new(kind: ReportKind, task: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            task: task.into(),
            message: message.into(),
        }
    }

    pub fn failure(task: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ReportKind::Failure, task, message)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in {}: {}", self.kind, self.task, self.message)
    }
}

/// Outcome of running a task
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub success: bool,
    pub context: ModelContext,
    pub report: Option<ValidationReport>,
}

impl TaskResult {
    /// Successful result; records a `Succeeded` step
    pub fn succeeded(mut context: ModelContext, task: &str, detail: impl Into<String>) -> Self {
        context.record(task, StepOutcome::Succeeded, detail);
        Self::ok(context)
    }

    /// Successful result for a task with nothing to do
    pub fn skipped(mut context: ModelContext, task: &str, detail: impl Into<String>) -> Self {
        context.record(task, StepOutcome::Skipped, detail);
        Self::ok(context)
    }

    /// Successful result with a non-fatal problem
    pub fn warning(mut context: ModelContext, task: &str, detail: impl Into<String>) -> Self {
        context.record(task, StepOutcome::Warning, detail);
        Self::ok(context)
    }

    /// Failed result; records a `Failed` step
    pub fn failed(mut context: ModelContext, report: ValidationReport) -> Self {
        context.record(&report.task, StepOutcome::Failed, report.to_string());
        Self {
            success: false,
            context,
            report: Some(report),
        }
    }

    fn ok(context: ModelContext) -> Self {
        Self {
            success: true,
            context,
            report: None,
        }
    }

    /// True when the chain stopped on a benign skip code
    pub fn is_benign(&self) -> bool {
        self.report.as_ref().is_some_and(|r| r.kind.is_benign())
    }
}

/// A pipeline step: a transformation of the context plus at most one
/// external call
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, context: ModelContext) -> TaskResult;
}

/// Ordered list of tasks that stops at the first failure
pub struct TaskChain {
    name: &'static str,
    tasks: Vec<Box<dyn Task>>,
}

impl TaskChain {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            tasks: Vec::new(),
        }
    }

    pub fn with_task(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(Box::new(task));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Run every task in order, returning the first failure or the last success
    pub async fn execute(&self, mut context: ModelContext) -> TaskResult {
        tracing::debug!(
            "Running chain '{}' for '{}' from {}",
            self.name,
            context.app_name(),
            context.source
        );

        for task in &self.tasks {
            let result = task.run(context).await;
            if let Some(step) = result.context.last_step() {
                tracing::debug!(
                    chain = self.name,
                    task = %step.task,
                    outcome = ?step.outcome,
                    "{}",
                    step.detail
                );
            }

            if !result.success {
                match &result.report {
                    Some(report) if report.kind.is_benign() => {
                        tracing::info!("Chain '{}' stopped: {}", self.name, report)
                    }
                    Some(report) => tracing::warn!("Chain '{}' failed: {}", self.name, report),
                    None => tracing::warn!(
                        "Chain '{}' failed at '{}' without a report",
                        self.name,
                        task.name()
                    ),
                }
                return result;
            }
            context = result.context;
        }

        TaskResult::ok(context)
    }
}

impl fmt::Debug for TaskChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskChain")
            .field("name", &self.name)
            .field("tasks", &self.task_names())
            .finish()
    }
}
