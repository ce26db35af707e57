//! Fixed-delay version pollers
//!
//! One worker per polled entity per application. A worker sleeps a fixed
//! delay after each tick completes, so ticks of one worker never overlap,
//! and it runs any reload on its own task. Polling of an application can
//! be suspended and resumed at any time.

use crate::error::Result;
use crate::orchestrator::ModelOrchestrator;
use dashmap::{DashMap, DashSet};
use redirector_repository::RuleSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Versioned entity watched by a poller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolledEntity {
    ModelVersion,
    StacksVersion,
    NamespacedListsVersion,
}

impl PolledEntity {
    pub const ALL: [PolledEntity; 3] = [
        PolledEntity::ModelVersion,
        PolledEntity::StacksVersion,
        PolledEntity::NamespacedListsVersion,
    ];
}

/// Handle owning the poll workers of any number of applications
pub struct ModelPoller {
    interval: Duration,
    data_store: Arc<dyn RuleSource>,
    suspended: Arc<DashSet<String>>,
    workers: DashMap<(String, PolledEntity), JoinHandle<()>>,
}

impl ModelPoller {
    pub fn new(data_store: Arc<dyn RuleSource>, interval: Duration) -> Self {
        Self {
            interval,
            data_store,
            suspended: Arc::new(DashSet::new()),
            workers: DashMap::new(),
        }
    }

    /// Spawn one worker per polled entity for the orchestrator's application
    ///
    /// Workers already running for the application are replaced.
    pub fn start(&self, orchestrator: Arc<ModelOrchestrator>) {
        let app = orchestrator.app_name().to_string();
        for entity in PolledEntity::ALL {
            let handle = self.spawn_worker(orchestrator.clone(), entity);
            if let Some(previous) = self.workers.insert((app.clone(), entity), handle) {
                previous.abort();
            }
        }
        tracing::info!("Polling '{}' every {:?}", app, self.interval);
    }

    fn spawn_worker(&self, orchestrator: Arc<ModelOrchestrator>, entity: PolledEntity) -> JoinHandle<()> {
        let data_store = self.data_store.clone();
        let suspended = self.suspended.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            let app = orchestrator.app_name().to_string();
            loop {
                if suspended.contains(&app) {
                    tracing::trace!("'{}': polling suspended, skipping {:?}", app, entity);
                } else if let Err(e) = Self::poll_once(&orchestrator, data_store.as_ref(), entity).await {
                    tracing::warn!("'{}': {:?} poll failed: {}", app, entity, e);
                }
                tokio::time::sleep(interval).await;
            }
        })
    }

    /// One tick: read the entity's version and reload when it moved ahead
    ///
    /// Returns true when a reload ran and succeeded.
    pub async fn poll_once(
        orchestrator: &ModelOrchestrator,
        data_store: &dyn RuleSource,
        entity: PolledEntity,
    ) -> Result<bool> {
        let app = orchestrator.app_name();
        match entity {
            PolledEntity::ModelVersion => {
                let version = data_store.model_version(app).await?;
                if version <= orchestrator.model_version() {
                    return Ok(false);
                }
                tracing::info!("'{}': model version {} available", app, version);
                orchestrator.refresh_model(version).await?;
                Ok(true)
            }
            PolledEntity::StacksVersion => {
                let version = data_store.stacks_version(app).await?;
                if orchestrator.current_engine().is_none() || version <= orchestrator.stacks_version() {
                    return Ok(false);
                }
                tracing::info!("'{}': stacks version {} available", app, version);
                orchestrator.reload_stacks(version).await?;
                Ok(true)
            }
            PolledEntity::NamespacedListsVersion => {
                let version = data_store.namespaced_lists_version().await?;
                if !orchestrator.services().lists.is_stale(version) {
                    return Ok(false);
                }
                orchestrator.refresh_namespaced_lists(version).await
            }
        }
    }

    /// Stop polling `app` until resumed; returns false if already suspended
    pub fn suspend(&self, app: &str) -> bool {
        self.suspended.insert(app.to_string())
    }

    /// Resume polling `app`; returns false if it was not suspended
    pub fn resume(&self, app: &str) -> bool {
        self.suspended.remove(app).is_some()
    }

    pub fn is_suspended(&self, app: &str) -> bool {
        self.suspended.contains(app)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Abort every worker and wait for them to finish
    pub async fn shutdown(&self) {
        let keys: Vec<_> = self.workers.iter().map(|entry| entry.key().clone()).collect();
        let handles: Vec<_> = keys
            .into_iter()
            .filter_map(|key| self.workers.remove(&key).map(|(_, handle)| handle))
            .collect();

        for handle in &handles {
            handle.abort();
        }
        let stopped = futures::future::join_all(handles).await;
        tracing::info!("Stopped {} poll workers", stopped.len());
    }
}

impl std::fmt::Debug for ModelPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelPoller")
            .field("interval", &self.interval)
            .field("workers", &self.workers.len())
            .field("suspended", &self.suspended.len())
            .finish()
    }
}

impl Drop for ModelPoller {
    fn drop(&mut self) {
        for entry in self.workers.iter() {
            entry.value().abort();
        }
    }
}
