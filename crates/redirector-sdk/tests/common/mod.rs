//! Shared fixtures for redirector-sdk integration tests

#![allow(dead_code)]

use redirector_core::{HostAddress, StackData};
use redirector_repository::{
    BackupEntity, BackupStore, MemoryBackupStore, MemoryRuleSource, StaticStacksSupplier,
};
use redirector_runtime::NamespacedListRepository;
use redirector_sdk::{AppConfig, ModelOrchestrator, OrchestratorBuilder};
use std::collections::HashMap;
use std::sync::Arc;

pub const APP: &str = "xreGuide";

pub const FLAVOR_RULES: &str = r#"{
  "if": [
    {
      "id": "testers",
      "items": [ { "contains": { "param": "mac", "namespacedList": ["testers"] } } ],
      "return": { "server": { "name": "testers", "path": "1.41" } }
    },
    {
      "id": "ruleA",
      "items": [ { "equals": { "param": "param", "value": "X" } } ],
      "return": { "server": { "name": "ruleA", "path": "1.41" } }
    },
    {
      "id": "broadway",
      "items": [ { "equals": { "param": "param", "value": "B" } } ],
      "return": { "server": { "name": "broadway", "path": "1.42" } }
    }
  ],
  "server": { "name": "default", "url": "{protocol}://{host}:{port}/{urn}", "path": "1.40" }
}"#;

/// Same rules with a target nothing is deployed to
pub const BROKEN_FLAVOR_RULES: &str = r#"{
  "if": [
    {
      "id": "missing",
      "items": [ { "equals": { "param": "param", "value": "X" } } ],
      "return": { "server": { "name": "missing", "path": "9.99" } }
    }
  ],
  "server": { "name": "default", "path": "1.40" }
}"#;

/// Rules routing `param=X` to 1.40 instead of 1.41
pub const UPDATED_FLAVOR_RULES: &str = r#"{
  "if": [
    {
      "id": "ruleA",
      "items": [ { "equals": { "param": "param", "value": "X" } } ],
      "return": { "server": { "name": "ruleA", "path": "/PO/POC1/1.40" } }
    }
  ],
  "server": { "name": "default", "path": "1.40" }
}"#;

pub const URL_RULES: &str = r#"
if:
  - id: v6
    items:
      - equals: { param: ipv6, value: "true" }
    return:
      urlRule: { ipProtocolVersion: "6" }
default:
  urlRule: { protocol: xre, port: 10001, urn: shell, ipProtocolVersion: "4" }
"#;

pub const WHITELIST: &str = r#"{"paths": ["/PO/POC1"], "version": 1}"#;

pub fn lists_document(version: i64, testers: &[&str]) -> String {
    let values: Vec<String> = testers.iter().map(|v| format!("\"{}\"", v)).collect();
    format!(
        r#"{{"version": {}, "namespace": [{{"name": "testers", "value": [{}]}}]}}"#,
        version,
        values.join(", ")
    )
}

pub fn stacks() -> Vec<StackData> {
    vec![
        StackData::new("/PO/POC1/1.40/xreGuide", vec![HostAddress::v4("10.10.10.10")]),
        StackData::new(
            "/PO/POC1/1.41/xreGuide",
            vec![HostAddress::dual("10.10.10.11", "2001:db8::11")],
        ),
        StackData::new("/BR/BRC1/1.42/xreGuide", vec![HostAddress::v4("10.20.0.1")]),
    ]
}

pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// In-memory data store, discovery and backup behind one application
pub struct Fixture {
    pub data_store: Arc<MemoryRuleSource>,
    pub live_stacks: Arc<StaticStacksSupplier>,
    pub backup: Arc<MemoryBackupStore>,
    pub lists: Arc<NamespacedListRepository>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            data_store: Arc::new(MemoryRuleSource::new()),
            live_stacks: Arc::new(StaticStacksSupplier::new()),
            backup: Arc::new(MemoryBackupStore::new()),
            lists: Arc::new(NamespacedListRepository::new()),
        }
    }

    /// Data store holding the fixture model at `version` and live stacks
    pub async fn seeded(version: i64) -> Self {
        let fixture = Self::new();
        fixture.publish_rules(version, FLAVOR_RULES).await;
        fixture
            .data_store
            .set_namespaced_lists(lists_document(1, &["AA:BB:CC:DD:EE:FF"]), 1)
            .await;
        fixture.data_store.set_stacks_version(APP, 1).await;
        fixture.live_stacks.set_stacks(APP, stacks()).await;
        fixture
    }

    pub async fn publish_rules(&self, version: i64, flavor_rules: &str) {
        self.data_store.set_flavor_rules(APP, flavor_rules).await;
        self.data_store.set_url_rules(APP, URL_RULES).await;
        self.data_store.set_whitelist(APP, WHITELIST).await;
        self.data_store.set_model_version(APP, version).await;
    }

    pub fn orchestrator(&self) -> ModelOrchestrator {
        self.orchestrator_for(AppConfig::new(APP))
    }

    pub fn orchestrator_for(&self, app: AppConfig) -> ModelOrchestrator {
        self.builder(app)
            .build()
            .expect("fixture orchestrator should build")
    }

    pub fn builder(&self, app: AppConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(app)
            .with_data_store(self.data_store.clone())
            .with_live_stacks(self.live_stacks.clone())
            .with_backup_store(self.backup.clone())
            .with_namespaced_lists(self.lists.clone())
    }

    pub async fn backed_up_version(&self) -> Option<String> {
        self.backup.load(APP, BackupEntity::ModelMetadata).await
    }
}
