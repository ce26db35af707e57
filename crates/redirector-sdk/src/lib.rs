//! Redirector SDK
//!
//! Hot model reload and the redirect entry point. A [`ModelOrchestrator`]
//! per application runs the reload pipeline and publishes immutable
//! [`RedirectorEngine`]s; a [`ModelPoller`] drives it from version changes.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod orchestrator;
pub mod pipeline;
pub mod poller;

// Re-export main types
pub use builder::OrchestratorBuilder;
pub use config::{AppConfig, RedirectorConfig};
pub use engine::RedirectorEngine;
pub use error::{Result, SdkError};
pub use orchestrator::{ModelLoadObserver, ModelOrchestrator};
pub use pipeline::{
    ExecutionStep, ModelContext, ModelServices, ModelSource, ReportKind, StepOutcome, Task,
    TaskChain, TaskResult, ValidationReport,
};
pub use poller::{ModelPoller, PolledEntity};

// Re-export commonly used types from dependencies
pub use redirector_core::{InstanceInfo, StackData};
pub use redirector_runtime::CONNECT_URL_PARAM;
