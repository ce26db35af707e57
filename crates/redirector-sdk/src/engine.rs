//! Immutable per-application redirect engine
//!
//! An engine is built once from a complete model and never mutated; a new
//! model means a new engine, published by swapping a single pointer.

use crate::error::{Result, SdkError};
use crate::pipeline::ModelContext;
use chrono::{DateTime, Utc};
use redirector_core::{InstanceInfo, StacksSnapshot, WhiteList};
use redirector_runtime::{HostPool, NamespacedListRepository, Redirector, RoundRobinHostPool};
use std::collections::HashMap;
use std::sync::Arc;

pub struct RedirectorEngine {
    app_name: String,
    model_version: i64,
    stacks_version: i64,
    redirector: Redirector,
    whitelist: Arc<WhiteList>,
    stacks: Arc<StacksSnapshot>,
    created_at: DateTime<Utc>,
}

impl RedirectorEngine {
    /// Build an engine from the model accumulated in `context`
    ///
    /// Requires flavor rules, URL rules, whitelist and a stacks snapshot.
    pub fn from_context(
        context: &ModelContext,
        lists: Arc<NamespacedListRepository>,
    ) -> Result<Self> {
        let flavor_rules = context
            .flavor_rules
            .clone()
            .ok_or(SdkError::ModelIncomplete("flavor rules"))?;
        let url_rules = context
            .url_rules
            .clone()
            .ok_or(SdkError::ModelIncomplete("URL rules"))?;
        let whitelist = context
            .whitelist
            .clone()
            .ok_or(SdkError::ModelIncomplete("whitelist"))?;
        let stacks = context
            .stacks_snapshot
            .clone()
            .ok_or(SdkError::ModelIncomplete("stacks snapshot"))?;

        let host_pool: Arc<dyn HostPool> = Arc::new(RoundRobinHostPool::new(&stacks, &whitelist));
        let redirector = Redirector::new(
            flavor_rules,
            url_rules,
            host_pool,
            lists,
            context.app.decision_settings(),
        )?;

        Ok(Self {
            app_name: context.app.name.clone(),
            model_version: context.model_version,
            stacks_version: stacks.version,
            redirector,
            whitelist,
            stacks,
            created_at: Utc::now(),
        })
    }

    /// Resolve a request to an instance, or `None` when it cannot be redirected
    pub fn redirect(&self, params: &HashMap<String, String>) -> Option<InstanceInfo> {
        let instance = self.redirector.redirect(params);
        if instance.is_none() {
            tracing::debug!("'{}': request could not be redirected", self.app_name);
        }
        instance
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn model_version(&self) -> i64 {
        self.model_version
    }

    pub fn stacks_version(&self) -> i64 {
        self.stacks_version
    }

    pub fn redirector(&self) -> &Redirector {
        &self.redirector
    }

    pub fn whitelist(&self) -> &WhiteList {
        &self.whitelist
    }

    pub fn stacks(&self) -> &StacksSnapshot {
        &self.stacks
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl std::fmt::Debug for RedirectorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectorEngine")
            .field("app_name", &self.app_name)
            .field("model_version", &self.model_version)
            .field("stacks_version", &self.stacks_version)
            .field("redirector", &self.redirector)
            .field("created_at", &self.created_at)
            .finish()
    }
}
