//! Integration tests for version polling

mod common;

use common::*;
use redirector_repository::{BackupEntity, BackupStore};
use redirector_sdk::{ModelPoller, PolledEntity};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_poll_once_refreshes_on_new_model_version() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();
    let data_store = fixture.data_store.as_ref();

    let idle = ModelPoller::poll_once(&orchestrator, data_store, PolledEntity::ModelVersion)
        .await
        .unwrap();
    assert!(!idle);

    fixture.publish_rules(6, UPDATED_FLAVOR_RULES).await;
    let reloaded = ModelPoller::poll_once(&orchestrator, data_store, PolledEntity::ModelVersion)
        .await
        .unwrap();
    assert!(reloaded);
    assert_eq!(orchestrator.model_version(), 6);
}

#[tokio::test]
async fn test_poll_once_recovers_failed_start() {
    let fixture = Fixture::seeded(5).await;
    fixture.orchestrator().init_model().await.unwrap();
    fixture
        .backup
        .save(APP, BackupEntity::StacksSnapshot, r#"{"version":1,"stacks":[]}"#)
        .await;
    fixture.data_store.set_available(false);
    let orchestrator = fixture.orchestrator();
    assert!(orchestrator.init_model().await.is_none());

    fixture.data_store.set_available(true);
    let data_store = fixture.data_store.as_ref();
    assert!(ModelPoller::poll_once(&orchestrator, data_store, PolledEntity::ModelVersion)
        .await
        .unwrap());
    assert_eq!(orchestrator.model_version(), 5);
    assert!(orchestrator.redirect(&params(&[])).is_some());
}

#[tokio::test]
async fn test_poll_once_reloads_stacks() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    let data_store = fixture.data_store.as_ref();

    // No engine yet: nothing to rebuild
    fixture.data_store.set_stacks_version(APP, 2).await;
    assert!(!ModelPoller::poll_once(&orchestrator, data_store, PolledEntity::StacksVersion)
        .await
        .unwrap());

    orchestrator.init_model().await.unwrap();
    fixture.data_store.set_stacks_version(APP, 3).await;
    assert!(ModelPoller::poll_once(&orchestrator, data_store, PolledEntity::StacksVersion)
        .await
        .unwrap());
    assert_eq!(orchestrator.stacks_version(), 3);
}

#[tokio::test]
async fn test_poll_once_refreshes_namespaced_lists() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    orchestrator.init_model().await.unwrap();
    let data_store = fixture.data_store.as_ref();

    assert!(!ModelPoller::poll_once(&orchestrator, data_store, PolledEntity::NamespacedListsVersion)
        .await
        .unwrap());

    fixture
        .data_store
        .set_namespaced_lists(lists_document(4, &["11:22:33:44:55:66"]), 4)
        .await;
    assert!(ModelPoller::poll_once(&orchestrator, data_store, PolledEntity::NamespacedListsVersion)
        .await
        .unwrap());
    assert_eq!(fixture.lists.version(), 4);
}

#[tokio::test]
async fn test_poll_once_propagates_data_store_errors() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = fixture.orchestrator();
    fixture.data_store.set_available(false);

    let result = ModelPoller::poll_once(
        &orchestrator,
        fixture.data_store.as_ref(),
        PolledEntity::ModelVersion,
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_suspend_and_resume() {
    let fixture = Fixture::new();
    let poller = ModelPoller::new(fixture.data_store.clone(), Duration::from_secs(30));

    assert!(!poller.is_suspended(APP));
    assert!(poller.suspend(APP));
    assert!(!poller.suspend(APP));
    assert!(poller.is_suspended(APP));
    assert!(poller.resume(APP));
    assert!(!poller.resume(APP));
    assert!(!poller.is_suspended(APP));
}

#[tokio::test(start_paused = true)]
async fn test_started_poller_picks_up_new_version() {
    let fixture = Fixture::seeded(5).await;
    let orchestrator = Arc::new(fixture.orchestrator());
    orchestrator.init_model().await.unwrap();

    let poller = ModelPoller::new(fixture.data_store.clone(), Duration::from_secs(30));
    poller.start(orchestrator.clone());
    assert_eq!(poller.worker_count(), PolledEntity::ALL.len());

    poller.suspend(APP);
    fixture.publish_rules(6, UPDATED_FLAVOR_RULES).await;
    tokio::time::sleep(Duration::from_secs(95)).await;
    assert_eq!(orchestrator.model_version(), 5);

    poller.resume(APP);
    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(orchestrator.model_version(), 6);

    poller.shutdown().await;
    assert_eq!(poller.worker_count(), 0);
}
