//! Hot reload example
//!
//! This example demonstrates:
//! - Loading process configuration with `RedirectorConfig::load`
//! - Backing models up to the file system
//! - Picking up a new model version with a running poller
//! - Keeping the old model when a broken version is published

use redirector_core::{HostAddress, StackData};
use redirector_repository::{MemoryRuleSource, StaticStacksSupplier};
use redirector_sdk::observability::init_tracing;
use redirector_sdk::{ModelPoller, OrchestratorBuilder, RedirectorConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const APP: &str = "xreGuide";

const URL_RULES: &str = r#"{"default": {"urlRule": {"protocol": "xre", "port": 10001, "urn": "shell", "ipProtocolVersion": "4"}}}"#;

fn flavor_rules(default_flavor: &str) -> String {
    format!(
        r#"{{"server": {{"name": "default", "path": "{}"}}}}"#,
        default_flavor
    )
}

async fn publish(data_store: &MemoryRuleSource, version: i64, default_flavor: &str) {
    data_store.set_flavor_rules(APP, flavor_rules(default_flavor)).await;
    data_store.set_url_rules(APP, URL_RULES).await;
    data_store
        .set_whitelist(APP, r#"{"paths": ["/PO/POC1"], "version": 1}"#)
        .await;
    data_store.set_model_version(APP, version).await;
}

fn show(label: &str, url: Option<String>) {
    match url {
        Some(url) => println!("{}: {}", label, url),
        None => println!("{}: cannot redirect", label),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = RedirectorConfig::load()?;
    init_tracing(&config.log_level)?;

    println!("=== Hot Reload Example ===\n");

    // Start from an empty backup so every run loads from the data store
    let backup_dir = std::env::temp_dir().join("redirector-hot-reload");
    std::fs::remove_dir_all(&backup_dir).ok();
    config.backup_path = backup_dir.display().to_string();
    config.poll_interval_secs = 1;

    let data_store = Arc::new(MemoryRuleSource::new());
    publish(&data_store, 1, "1.40").await;

    let live_stacks = Arc::new(StaticStacksSupplier::new());
    live_stacks
        .set_stacks(
            APP,
            vec![
                StackData::new("/PO/POC1/1.40/xreGuide", vec![HostAddress::v4("10.10.10.10")]),
                StackData::new("/PO/POC1/1.41/xreGuide", vec![HostAddress::v4("10.10.10.11")]),
            ],
        )
        .await;

    let orchestrator = Arc::new(
        OrchestratorBuilder::from_config(&config, APP)
            .with_data_store(data_store.clone())
            .with_live_stacks(live_stacks)
            .build()?,
    );
    orchestrator.init_model().await;

    let request = HashMap::new();
    let redirect = || orchestrator.redirect(&request).map(|i| i.resolved_url);
    show("Initial model", redirect());

    let poller = ModelPoller::new(data_store.clone(), config.poll_interval());
    poller.start(orchestrator.clone());

    // New default flavor: the poller refreshes the model
    publish(&data_store, 2, "1.41").await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    show("After version 2", redirect());

    // Nothing is deployed for 9.99: validation fails, version 2 keeps serving
    publish(&data_store, 3, "9.99").await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    show("After broken version 3", redirect());
    println!("Serving model version {}", orchestrator.model_version());

    poller.shutdown().await;
    Ok(())
}
