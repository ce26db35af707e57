//! Hot model-reload pipeline
//!
//! A [`ModelContext`] is threaded by value through a [`TaskChain`]; each
//! [`Task`] loads, translates or validates one piece of the model. The
//! chain stops at the first failure and returns that task's
//! [`ValidationReport`].

pub mod chains;
mod context;
mod services;
mod task;
pub mod tasks;

pub use context::{ExecutionStep, ModelContext, ModelSource, StepOutcome};
pub use services::{ModelServices, DEFAULT_MANUAL_BACKUP_TIMEOUT};
pub use task::{ReportKind, Task, TaskChain, TaskResult, ValidationReport};
