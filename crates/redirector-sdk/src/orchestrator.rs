//! Per-application model orchestrator
//!
//! Owns the published engine and the last known good model context, and
//! runs the pipeline chains that replace them. Chain runs for one
//! application are serialised; `redirect` never waits on them.

use crate::config::AppConfig;
use crate::engine::RedirectorEngine;
use crate::error::{Result, SdkError};
use crate::pipeline::chains;
use crate::pipeline::{
    ModelContext, ModelServices, ModelSource, TaskChain, TaskResult, ValidationReport,
};
use arc_swap::ArcSwapOption;
use redirector_core::InstanceInfo;
use redirector_parser::{DocumentParser, NamespacedListsParser};
use redirector_repository::{BackupEntity, SHARED_SCOPE};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Notified when the model cannot be restored from the local backup
pub trait ModelLoadObserver: Send + Sync {
    fn on_backup_load_failed(&self, app: &str, error: &SdkError);
}

pub struct ModelOrchestrator {
    app: AppConfig,
    services: ModelServices,
    engine: ArcSwapOption<RedirectorEngine>,

    /// Last known good context; held for the whole of a chain run
    pipeline: Mutex<Option<ModelContext>>,

    observer: Option<Arc<dyn ModelLoadObserver>>,
    init_chain: TaskChain,
    refresh_chain: TaskChain,
    stacks_reload_chain: TaskChain,
    sync_chain: TaskChain,
    lists_chain: TaskChain,
}

impl ModelOrchestrator {
    pub fn new(app: AppConfig, services: ModelServices) -> Self {
        Self {
            init_chain: chains::init_model_chain(&services),
            refresh_chain: chains::refresh_model_chain(&services),
            stacks_reload_chain: chains::service_discovery_reload_chain(&services),
            sync_chain: chains::sync_model_chain(&services),
            lists_chain: chains::namespaced_lists_chain(&services),
            app,
            services,
            engine: ArcSwapOption::empty(),
            pipeline: Mutex::new(None),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ModelLoadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app.name
    }

    pub fn services(&self) -> &ModelServices {
        &self.services
    }

    /// Currently published engine
    pub fn current_engine(&self) -> Option<Arc<RedirectorEngine>> {
        self.engine.load_full()
    }

    /// Model version of the published engine, 0 when none
    pub fn model_version(&self) -> i64 {
        self.engine
            .load_full()
            .map_or(0, |engine| engine.model_version())
    }

    fn published_version(&self) -> Option<i64> {
        self.engine.load().as_ref().map(|engine| engine.model_version())
    }

    /// Stacks version of the published engine, 0 when none
    pub fn stacks_version(&self) -> i64 {
        self.engine
            .load_full()
            .map_or(0, |engine| engine.stacks_version())
    }

    pub async fn last_known_good(&self) -> Option<ModelContext> {
        self.pipeline.lock().await.clone()
    }

    /// Resolve a request against the published engine
    ///
    /// Returns `None` when no engine is published or the request cannot be
    /// redirected.
    pub fn redirect(&self, params: &HashMap<String, String>) -> Option<InstanceInfo> {
        let engine = self.engine.load();
        match &*engine {
            Some(engine) => engine.redirect(params),
            None => {
                tracing::debug!("'{}': no model published", self.app.name);
                None
            }
        }
    }

    /// Bring up the first model
    ///
    /// Tries the local backup first and falls back to the data store,
    /// notifying the observer. Then converges with the data store if the
    /// backup is behind. Returns the engine published at the end, if any.
    pub async fn init_model(&self) -> Option<Arc<RedirectorEngine>> {
        let mut last_known_good = self.pipeline.lock().await;

        let context = self.fresh_context(ModelSource::Backup).await;
        let result = self.init_chain.execute(context).await;
        if let Err(e) = self.publish(&mut last_known_good, &self.init_chain, result) {
            tracing::warn!("'{}': cannot init model from backup: {}", self.app.name, e);
            if let Some(observer) = &self.observer {
                observer.on_backup_load_failed(&self.app.name, &e);
            }

            let context = self.fresh_context(ModelSource::DataStore).await;
            let result = self.refresh_chain.execute(context).await;
            if let Err(e) = self.publish(&mut last_known_good, &self.refresh_chain, result) {
                tracing::error!("'{}': cannot init model from data store: {}", self.app.name, e);
            }
        }

        let context = self
            .fresh_context(ModelSource::DataStore)
            .await
            .with_published_version(self.published_version());
        let sync = self.sync_chain.execute(context).await;
        if sync.success {
            let result = self.refresh_chain.execute(sync.context).await;
            if let Err(e) = self.publish(&mut last_known_good, &self.refresh_chain, result) {
                tracing::warn!("'{}': cannot converge with data store: {}", self.app.name, e);
            }
        } else if !sync.is_benign() {
            tracing::warn!(
                "'{}': sync check failed: {}",
                self.app.name,
                chain_error(&self.sync_chain, sync)
            );
        }

        self.current_engine()
    }

    /// Load model `version` from the data store unless it is already served
    ///
    /// When no engine is published the model is always reloaded, so an
    /// application that failed to start recovers once the data store does.
    /// On failure the published engine is left untouched.
    pub async fn refresh_model(&self, version: i64) -> Result<Arc<RedirectorEngine>> {
        let mut last_known_good = self.pipeline.lock().await;

        let context = self
            .fresh_context(ModelSource::DataStore)
            .await
            .with_target_version(version)
            .with_published_version(self.published_version());
        let sync = self.sync_chain.execute(context).await;
        if !sync.success {
            if sync.is_benign() {
                tracing::debug!("'{}': model version {} already in sync", self.app.name, version);
                return self.current_engine().ok_or(SdkError::NotInitialized);
            }
            return Err(chain_error(&self.sync_chain, sync));
        }

        let result = self.refresh_chain.execute(sync.context).await;
        self.publish(&mut last_known_good, &self.refresh_chain, result)
    }

    /// Rebuild the engine for new host topology at stacks `version`
    ///
    /// Rules and whitelist come from the last known good model. On failure
    /// the published engine is left untouched.
    pub async fn reload_stacks(&self, version: i64) -> Result<Arc<RedirectorEngine>> {
        let mut last_known_good = self.pipeline.lock().await;

        let context = match &*last_known_good {
            Some(good) => good.reseed(ModelSource::DataStore),
            None => self.fresh_context(ModelSource::DataStore).await,
        }
        .with_stacks_version(version);

        let result = self.stacks_reload_chain.execute(context).await;
        self.publish(&mut last_known_good, &self.stacks_reload_chain, result)
    }

    /// Refresh the shared namespaced lists from the data store
    ///
    /// Returns true when new lists were published. Published engines see
    /// them on their next evaluation. Lists missing one the published rules
    /// reference are rejected and the current lists stay in place.
    pub async fn refresh_namespaced_lists(&self, version: i64) -> Result<bool> {
        let last_known_good = self.pipeline.lock().await;

        let context = match &*last_known_good {
            Some(good) => good.reseed(ModelSource::DataStore),
            None => ModelContext::new(self.app.clone(), ModelSource::DataStore),
        }
        .with_target_version(version);
        let result = self.lists_chain.execute(context).await;
        if !result.success {
            return Err(chain_error(&self.lists_chain, result));
        }

        let Some(lists) = result.context.namespaced_lists else {
            return Ok(false);
        };
        self.services.lists.replace(lists.clone());
        tracing::info!(
            "'{}': published namespaced lists version {}",
            self.app.name,
            lists.version
        );

        let dto = NamespacedListsParser::to_dto(&lists);
        match DocumentParser::to_json(&dto) {
            Ok(content) => {
                let store = &self.services.backup_store;
                if !store.save(SHARED_SCOPE, BackupEntity::NamespacedLists, &content).await {
                    tracing::warn!("'{}': namespaced lists were not backed up", self.app.name);
                }
            }
            Err(e) => tracing::warn!("Cannot serialize namespaced lists: {}", e),
        }
        Ok(true)
    }

    /// Context for a run that starts from nothing, versioned by `source`
    async fn fresh_context(&self, source: ModelSource) -> ModelContext {
        let rule_source = self.services.rule_source(source);
        let app = &self.app.name;

        let model_version = rule_source.model_version(app).await.unwrap_or_else(|e| {
            tracing::warn!("'{}': cannot read model version from {}: {}", app, source, e);
            0
        });
        let stacks_version = rule_source.stacks_version(app).await.unwrap_or_else(|e| {
            tracing::warn!("'{}': cannot read stacks version from {}: {}", app, source, e);
            0
        });

        ModelContext::new(self.app.clone(), source)
            .with_model_version(model_version)
            .with_stacks_version(stacks_version)
    }

    /// Publish the engine of a successful run and remember its context
    fn publish(
        &self,
        last_known_good: &mut Option<ModelContext>,
        chain: &TaskChain,
        result: TaskResult,
    ) -> Result<Arc<RedirectorEngine>> {
        if !result.success {
            return Err(chain_error(chain, result));
        }

        let mut context = result.context;
        let engine = context
            .engine
            .clone()
            .ok_or(SdkError::ModelIncomplete("engine"))?;

        if let Some(lists) = context.namespaced_lists.take() {
            self.services.lists.replace(lists);
        }
        self.engine.store(Some(engine.clone()));
        tracing::info!(
            "'{}': published model version {} (stacks version {}) from {} via '{}'",
            self.app.name,
            engine.model_version(),
            engine.stacks_version(),
            context.source,
            chain.name()
        );

        *last_known_good = Some(context);
        Ok(engine)
    }
}

fn chain_error(chain: &TaskChain, result: TaskResult) -> SdkError {
    SdkError::ChainFailed {
        chain: chain.name(),
        report: result
            .report
            .unwrap_or_else(|| ValidationReport::failure(chain.name(), "failed without a report")),
    }
}

impl std::fmt::Debug for ModelOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelOrchestrator")
            .field("app", &self.app)
            .field("engine", &self.current_engine())
            .finish_non_exhaustive()
    }
}
