//! Simple redirect example
//!
//! This example demonstrates:
//! - Publishing flavor rules, URL rules and a whitelist to an in-memory data store
//! - Bringing up a model with `init_model`
//! - Resolving a few requests to redirect URLs

use redirector_core::StackData;
use redirector_parser::{DocumentParser, SelectServerDto};
use redirector_repository::{MemoryRuleSource, StaticStacksSupplier};
use redirector_sdk::observability::{init_tracing, DEFAULT_FILTER};
use redirector_sdk::{AppConfig, OrchestratorBuilder};
use std::collections::HashMap;
use std::sync::Arc;

const APP: &str = "xreGuide";

const FLAVOR_RULES: &str = r#"
if:
  - id: beta
    items:
      - contains: { param: mac, valueSet: ["AA:BB:CC:DD:EE:FF"] }
    return:
      server: { name: beta, path: "1.41" }
server:
  name: default
  path: "1.40"
"#;

const URL_RULES: &str = r#"
default:
  urlRule: { protocol: xre, port: 10001, urn: shell, ipProtocolVersion: "4" }
"#;

const STACKS: &str = r#"
- path: /PO/POC1/1.40/xreGuide
  hosts: [{ ipv4: 10.10.10.10 }]
- path: /PO/POC1/1.41/xreGuide
  hosts: [{ ipv4: 10.10.10.11, ipv6: "2001:db8::11" }]
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_FILTER)?;

    println!("=== Simple Redirect Example ===\n");

    // The control plane serves JSON; convert the YAML rules first
    let flavor_rules: SelectServerDto = DocumentParser::parse(FLAVOR_RULES)?;
    let data_store = Arc::new(MemoryRuleSource::new());
    data_store
        .set_flavor_rules(APP, DocumentParser::to_json(&flavor_rules)?)
        .await;
    data_store.set_url_rules(APP, URL_RULES).await;
    data_store
        .set_whitelist(APP, r#"{"paths": ["/PO/POC1"], "version": 1}"#)
        .await;
    data_store.set_model_version(APP, 1).await;

    let live_stacks = Arc::new(StaticStacksSupplier::new());
    let stacks: Vec<StackData> = serde_yaml::from_str(STACKS)?;
    live_stacks.set_stacks(APP, stacks).await;

    let orchestrator = OrchestratorBuilder::new(AppConfig::new(APP))
        .with_data_store(data_store)
        .with_live_stacks(live_stacks)
        .build()?;

    let engine = orchestrator
        .init_model()
        .await
        .ok_or_else(|| anyhow::anyhow!("no model could be loaded"))?;
    println!("Model version {} published\n", engine.model_version());

    let requests = [
        vec![],
        vec![("mac", "AA:BB:CC:DD:EE:FF")],
        vec![("connectUrl", "xre://old:10001/shell?lang=en")],
    ];

    for pairs in requests {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        println!("Request: {:?}", params);
        match orchestrator.redirect(&params) {
            Some(instance) => {
                println!("  Flavor: {}", instance.flavor);
                println!("  URL: {}", instance.resolved_url);
                println!("  Decision: {}\n", serde_json::to_string(&instance)?);
            }
            None => println!("  Cannot redirect\n"),
        }
    }

    Ok(())
}
