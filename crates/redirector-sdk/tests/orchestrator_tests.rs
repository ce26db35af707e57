//! Integration tests for the model orchestrator
//!
//! Drives init, refresh, stacks reload and namespaced list refresh over
//! in-memory data store, discovery and backup.

mod common;

use common::*;
use redirector_core::{HostAddress, ModelMetadata, StackData};
use redirector_repository::{BackupEntity, BackupStore, SHARED_SCOPE};
use redirector_runtime::NamespacedListRepository;
use redirector_sdk::{AppConfig, ModelLoadObserver, ModelSource, ReportKind, SdkError, StepOutcome};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingObserver {
    failures: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl ModelLoadObserver for RecordingObserver {
    fn on_backup_load_failed(&self, app: &str, _error: &SdkError) {
        self.failures.lock().unwrap().push(app.to_string());
    }
}

async fn backed_up_model_version(fixture: &Fixture) -> Option<i64> {
    fixture
        .backed_up_version()
        .await
        .map(|content| serde_json::from_str::<ModelMetadata>(&content).unwrap().version)
}

// ========== Init Tests ==========

#[tokio::test]
async fn test_init_falls_back_to_data_store_and_notifies_observer() {
    let fixture = Fixture::seeded(5).await;
    let observer = Arc::new(RecordingObserver::default());
    let orchestrator = fixture
        .builder(AppConfig::new(APP))
        .with_observer(observer.clone())
        .build()
        .unwrap();

    let engine = orchestrator.init_model().await.expect("model from data store");

    assert_eq!(engine.model_version(), 5);
    assert_eq!(engine.stacks_version(), 1);
    assert_eq!(observer.failures(), vec![APP.to_string()]);

    let instance = orchestrator.redirect(&params(&[])).unwrap();
    assert_eq!(instance.resolved_url, "xre://10.10.10.10:10001/shell?ruleName=default");

    let good = orchestrator.last_known_good().await.unwrap();
    assert_eq!(good.source, ModelSource::DataStore);
    assert_eq!(good.executed_tasks().last(), Some(&"backup_new_model"));
    assert_eq!(backed_up_model_version(&fixture).await, Some(5));
}

#[tokio::test]
async fn test_init_serves_from_backup_without_data_store() {
    let fixture = Fixture::seeded(5).await;
    fixture.orchestrator().init_model().await.unwrap();

    // Restarted process: empty list repository, control plane down
    fixture.data_store.set_available(false);
    let observer = Arc::new(RecordingObserver::default());
    let restarted = fixture
        .builder(AppConfig::new(APP))
        .with_namespaced_lists(Arc::new(NamespacedListRepository::new()))
        .with_observer(observer.clone())
        .build()
        .unwrap();

    let engine = restarted.init_model().await.expect("model from backup");

    assert_eq!(engine.model_version(), 5);
    assert!(observer.failures().is_empty());
    assert_eq!(
        restarted.last_known_good().await.unwrap().source,
        ModelSource::Backup
    );

    // Namespaced lists were restored from the shared backup as well
    let tester = restarted.redirect(&params(&[("mac", "aa:bb:cc:dd:ee:ff")])).unwrap();
    assert_eq!(tester.resolved_url, "xre://10.10.10.11:10001/shell?ruleName=testers");
}

#[tokio::test]
async fn test_init_converges_when_backup_is_behind() {
    let fixture = Fixture::seeded(5).await;
    fixture.orchestrator().init_model().await.unwrap();

    fixture.publish_rules(6, UPDATED_FLAVOR_RULES).await;
    let restarted = fixture.orchestrator();
    let engine = restarted.init_model().await.unwrap();

    assert_eq!(engine.model_version(), 6);
    assert_eq!(backed_up_model_version(&fixture).await, Some(6));
}

#[tokio::test]
async fn test_no_model_anywhere() {
    let fixture = Fixture::new();
    let observer = Arc::new(RecordingObserver::default());
    let orchestrator = fixture
        .builder(AppConfig::new(APP))
        .with_observer(observer.clone())
        .build()
        .unwrap();

    assert!(orchestrator.init_model().await.is_none());
    assert!(orchestrator.redirect(&params(&[])).is_none());
    assert_eq!(orchestrator.model_version(), 0);
    assert_eq!(observer.failures().len(), 1);
    assert!(orchestrator.last_known_good().await.is_none());
}

// ========== Redirect Tests ==========

#[tokio::test]
async fn test_rule_precedence_and_url_building() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();

    // First matching rule wins even when a later rule would also match
    let both = orchestrator
        .redirect(&params(&[("mac", "AA:BB:CC:DD:EE:FF"), ("param", "X")]))
        .unwrap();
    assert_eq!(both.server.name, "testers");

    let rule_a = orchestrator.redirect(&params(&[("param", "X")])).unwrap();
    assert_eq!(rule_a.resolved_url, "xre://10.10.10.11:10001/shell?ruleName=ruleA");

    let v6 = orchestrator
        .redirect(&params(&[("param", "X"), ("ipv6", "true")]))
        .unwrap();
    assert_eq!(v6.resolved_url, "xre://[2001:db8::11]:10001/shell?ruleName=ruleA");

    let carried = orchestrator
        .redirect(&params(&[("connectUrl", "xre://old:10001/shell?token=abc")]))
        .unwrap();
    assert_eq!(
        carried.resolved_url,
        "xre://10.10.10.10:10001/shell?token=abc&ruleName=default"
    );
}

#[tokio::test]
async fn test_rule_target_outside_whitelist_falls_back_to_default() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();

    let instance = orchestrator.redirect(&params(&[("param", "B")])).unwrap();

    assert_eq!(instance.server.name, "default");
    assert_eq!(instance.flavor, "1.40");
    assert_eq!(instance.resolved_url, "xre://10.10.10.10:10001/shell?ruleName=default");
}

// ========== Refresh Tests ==========

#[tokio::test]
async fn test_refresh_in_sync_keeps_engine() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    let engine = orchestrator.init_model().await.unwrap();
    let saves = fixture.backup.save_count();

    let refreshed = orchestrator.refresh_model(5).await.unwrap();

    assert!(Arc::ptr_eq(&engine, &refreshed));
    assert_eq!(fixture.backup.save_count(), saves);
}

#[tokio::test]
async fn test_refresh_recovers_when_nothing_is_published() {
    let fixture = Fixture::seeded(5).await;
    fixture.orchestrator().init_model().await.unwrap();

    // Backup holds version 5 but cannot serve it, and the data store is down
    fixture
        .backup
        .save(APP, BackupEntity::StacksSnapshot, r#"{"version":1,"stacks":[]}"#)
        .await;
    fixture.data_store.set_available(false);
    let restarted = fixture.orchestrator();
    assert!(restarted.init_model().await.is_none());

    fixture.data_store.set_available(true);
    let engine = restarted.refresh_model(5).await.unwrap();

    assert_eq!(engine.model_version(), 5);
    let instance = restarted.redirect(&params(&[])).unwrap();
    assert_eq!(instance.resolved_url, "xre://10.10.10.10:10001/shell?ruleName=default");

    // Once served, the same version is in sync again
    let again = restarted.refresh_model(5).await.unwrap();
    assert!(Arc::ptr_eq(&engine, &again));
}

#[tokio::test]
async fn test_refresh_publishes_new_model() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();

    fixture.publish_rules(6, UPDATED_FLAVOR_RULES).await;
    let engine = orchestrator.refresh_model(6).await.unwrap();

    assert_eq!(engine.model_version(), 6);
    assert_eq!(orchestrator.model_version(), 6);
    let instance = orchestrator.redirect(&params(&[("param", "X")])).unwrap();
    assert_eq!(instance.resolved_url, "xre://10.10.10.10:10001/shell?ruleName=ruleA");
    assert_eq!(orchestrator.last_known_good().await.unwrap().model_version, 6);
}

#[tokio::test]
async fn test_failed_refresh_rolls_back() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    let engine = orchestrator.init_model().await.unwrap();
    let before = orchestrator.redirect(&params(&[("param", "X")])).unwrap();

    fixture.publish_rules(6, BROKEN_FLAVOR_RULES).await;
    let err = orchestrator.refresh_model(6).await.unwrap_err();

    match &err {
        SdkError::ChainFailed { chain, report } => {
            assert_eq!(*chain, "refresh_model");
            assert_eq!(report.task, "validate_able_to_redirect");
            assert!(report.message.contains("9.99"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(Arc::ptr_eq(&engine, &orchestrator.current_engine().unwrap()));
    let after = orchestrator.redirect(&params(&[("param", "X")])).unwrap();
    assert_eq!(after.resolved_url, before.resolved_url);
    assert_eq!(orchestrator.last_known_good().await.unwrap().model_version, 5);
    assert_eq!(backed_up_model_version(&fixture).await, Some(5));
}

#[tokio::test]
async fn test_refresh_with_unreachable_data_store_fails() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();

    fixture.data_store.set_available(false);
    let err = orchestrator.refresh_model(6).await.unwrap_err();

    assert_eq!(err.report().unwrap().task, "init_data_store");
    assert_eq!(orchestrator.model_version(), 5);
}

// ========== Stacks Reload Tests ==========

#[tokio::test]
async fn test_reload_stacks_keeps_rules() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();

    let mut stacks = stacks();
    stacks.push(StackData::new(
        "/PO/POC1/1.40/xreGuide",
        vec![HostAddress::v4("10.10.10.20")],
    ));
    fixture.live_stacks.set_stacks(APP, stacks).await;

    let engine = orchestrator.reload_stacks(2).await.unwrap();

    assert_eq!(engine.stacks_version(), 2);
    assert_eq!(engine.model_version(), 5);

    let urls: std::collections::BTreeSet<String> = (0..4)
        .filter_map(|_| orchestrator.redirect(&params(&[])))
        .map(|instance| instance.resolved_url)
        .collect();
    assert_eq!(
        urls.into_iter().collect::<Vec<_>>(),
        vec![
            "xre://10.10.10.10:10001/shell?ruleName=default".to_string(),
            "xre://10.10.10.20:10001/shell?ruleName=default".to_string(),
        ]
    );

    let rule_a = orchestrator.redirect(&params(&[("param", "X")])).unwrap();
    assert_eq!(rule_a.server.name, "ruleA");
}

#[tokio::test]
async fn test_reload_stacks_without_hosts_keeps_engine() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    let engine = orchestrator.init_model().await.unwrap();

    fixture.live_stacks.set_stacks(APP, Vec::new()).await;
    let err = orchestrator.reload_stacks(2).await.unwrap_err();

    assert_eq!(err.report().unwrap().task, "get_stacks_with_hosts");
    assert!(Arc::ptr_eq(&engine, &orchestrator.current_engine().unwrap()));
    assert_eq!(orchestrator.stacks_version(), 1);
}

#[tokio::test]
async fn test_reload_stacks_before_any_model() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();

    let err = orchestrator.reload_stacks(2).await.unwrap_err();

    let report = err.report().unwrap();
    assert_eq!(report.kind, ReportKind::NotApplicable);
    assert_eq!(report.task, "validate_able_to_redirect");
    assert!(orchestrator.current_engine().is_none());
}

#[tokio::test]
async fn test_static_discovery_backs_up_stacks() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator_for(AppConfig::new(APP).with_static_discovery(true));
    orchestrator.init_model().await.unwrap();

    let good = orchestrator.last_known_good().await.unwrap();
    let manual = good
        .execution_log
        .iter()
        .find(|step| step.task == "trigger_manual_backup")
        .unwrap();
    assert_eq!(manual.outcome, StepOutcome::Succeeded);
    assert!(fixture.backup.contains(APP, BackupEntity::StacksSnapshot).await);
}

// ========== Namespaced Lists Tests ==========

#[tokio::test]
async fn test_refresh_namespaced_lists_updates_published_engine() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    let engine = orchestrator.init_model().await.unwrap();

    let newcomer = params(&[("mac", "11:22:33:44:55:66")]);
    assert_eq!(orchestrator.redirect(&newcomer).unwrap().server.name, "default");

    fixture
        .data_store
        .set_namespaced_lists(lists_document(2, &["11:22:33:44:55:66"]), 2)
        .await;
    assert!(orchestrator.refresh_namespaced_lists(2).await.unwrap());

    assert_eq!(fixture.lists.version(), 2);
    assert_eq!(orchestrator.redirect(&newcomer).unwrap().server.name, "testers");
    assert!(Arc::ptr_eq(&engine, &orchestrator.current_engine().unwrap()));

    let backup = fixture
        .backup
        .load(SHARED_SCOPE, BackupEntity::NamespacedLists)
        .await
        .unwrap();
    assert!(backup.contains("11:22:33:44:55:66"));

    // Nothing newer: no change
    assert!(!orchestrator.refresh_namespaced_lists(2).await.unwrap());
}

#[tokio::test]
async fn test_refresh_namespaced_lists_rejects_dropped_reference() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();
    let tester = params(&[("mac", "AA:BB:CC:DD:EE:FF")]);
    assert_eq!(orchestrator.redirect(&tester).unwrap().server.name, "testers");

    fixture
        .data_store
        .set_namespaced_lists(
            r#"{"version": 2, "namespace": [{"name": "other", "value": ["AA:BB:CC:DD:EE:FF"]}]}"#,
            2,
        )
        .await;
    let result = orchestrator.refresh_namespaced_lists(2).await;

    match result {
        Err(SdkError::ChainFailed { chain, report }) => {
            assert_eq!(chain, "namespaced_lists");
            assert_eq!(report.task, "validate_namespaced_lists");
            assert!(report.message.contains("testers"));
        }
        other => panic!("expected a failed lists chain, got {:?}", other),
    }
    assert_eq!(fixture.lists.version(), 1);
    assert_eq!(orchestrator.redirect(&tester).unwrap().server.name, "testers");
}
