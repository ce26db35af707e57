//! Unit tests for redirector-runtime
//!
//! Exercises the decision procedure end to end over parsed rule documents,
//! a round-robin host pool and namespaced lists.

use redirector_core::*;
use redirector_parser::{FlavorRulesParser, UrlRulesParser};
use redirector_runtime::*;
use std::collections::HashMap;
use std::sync::Arc;

const FLAVOR_RULES: &str = r#"
if:
  - id: ruleA
    items:
      - equals: { param: param, value: X }
    return:
      server: { name: ruleA, path: "1.41" }
  - id: guarded
    items:
      - equals: { param: param, value: G }
    return:
      server: { name: guarded, path: "/BR/BRC1/1.42", isNonWhitelisted: true }
  - id: pinned
    items:
      - equals: { param: param, value: P }
    return:
      server: { name: pinned, path: "/BR/BRC1/1.42" }
  - id: portal
    items:
      - equals: { param: param, value: A }
    return:
      server: { name: portal, url: "http://portal.example.com/start" }
server:
  name: default
  url: "{protocol}://{host}:{port}/{urn}"
  path: "1.40"
"#;

const URL_RULES: &str = r#"
if:
  - id: v6
    items:
      - equals: { param: ipv6, value: "true" }
    return:
      urlRule: { ipProtocolVersion: "6" }
default:
  urlRule: { protocol: xre, port: 10001, urn: shell, ipProtocolVersion: "4" }
"#;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn snapshot() -> StacksSnapshot {
    StacksSnapshot::new(
        1,
        vec![
            StackData::new("/PO/POC1/1.40/xreGuide", vec![HostAddress::v4("10.10.10.10")]),
            StackData::new(
                "/PO/POC1/1.41/xreGuide",
                vec![HostAddress::dual("10.10.10.11", "2001:db8::11")],
            ),
            StackData::new("/BR/BRC1/1.42/xreGuide", vec![HostAddress::v4("10.20.0.1")]),
        ],
    )
}

fn redirector_with(rules: &str, whitelist: WhiteList, settings: DecisionSettings) -> Redirector {
    let lists = NamespacedLists::default();
    let flavor_rules = FlavorRulesParser::parse(rules, &lists).unwrap();
    let url_rules = UrlRulesParser::parse(URL_RULES, &lists).unwrap();
    let pool = RoundRobinHostPool::new(&snapshot(), &whitelist);

    Redirector::new(
        Arc::new(flavor_rules),
        Arc::new(url_rules),
        Arc::new(pool),
        Arc::new(NamespacedListRepository::with_lists(lists)),
        settings,
    )
    .unwrap()
}

fn redirector() -> Redirector {
    redirector_with(FLAVOR_RULES, WhiteList::new(["/PO/POC1"]), DecisionSettings::default())
}

// ========== Decision Tests ==========

#[test]
fn test_default_server_url() {
    let instance = redirector().redirect(&params(&[])).unwrap();

    assert_eq!(instance.resolved_url, "xre://10.10.10.10:10001/shell?ruleName=default");
    assert_eq!(instance.flavor, "1.40");
    assert_eq!(instance.stack_path.as_deref(), Some("/PO/POC1/1.40/xreGuide"));
    assert!(!instance.is_advanced_rule);
}

#[test]
fn test_rule_precedence() {
    let redirector = redirector();

    let matched = redirector.redirect(&params(&[("param", "X")])).unwrap();
    assert_eq!(matched.flavor, "1.41");
    assert_eq!(matched.server.name, "ruleA");

    let other = redirector.redirect(&params(&[("param", "Z")])).unwrap();
    assert_eq!(other.flavor, "1.40");
}

#[test]
fn test_non_whitelisted_only_rule_falls_back_to_default() {
    let not_whitelisted = redirector().redirect(&params(&[("param", "G")])).unwrap();
    assert_eq!(not_whitelisted.flavor, "1.40");
    assert_eq!(not_whitelisted.server.name, "default");

    let whitelisted = redirector_with(
        FLAVOR_RULES,
        WhiteList::new(["/PO/POC1", "/BR/BRC1"]),
        DecisionSettings::default(),
    )
    .redirect(&params(&[("param", "G")]))
    .unwrap();
    assert_eq!(whitelisted.flavor, "1.42");
    assert_eq!(whitelisted.server.name, "guarded");
}

#[test]
fn test_stack_path_rule_ignores_whitelist() {
    let instance = redirector().redirect(&params(&[("param", "P")])).unwrap();
    assert_eq!(instance.stack_path.as_deref(), Some("/BR/BRC1/1.42/xreGuide"));
}

#[test]
fn test_advanced_rule() {
    let instance = redirector().redirect(&params(&[("param", "A")])).unwrap();
    assert!(instance.is_advanced_rule);
    assert_eq!(instance.resolved_url, "http://portal.example.com/start?ruleName=portal");
}

#[test]
fn test_ipv6_url_rule() {
    let instance = redirector()
        .redirect(&params(&[("param", "X"), ("ipv6", "true")]))
        .unwrap();
    assert_eq!(instance.ip_protocol_version, IpProtocolVersion::V6);
    assert_eq!(instance.resolved_url, "xre://[2001:db8::11]:10001/shell?ruleName=ruleA");

    // default stack has no IPv6 address
    assert!(redirector().redirect(&params(&[("ipv6", "true")])).is_none());
}

#[test]
fn test_connect_url_query_carried_over() {
    let instance = redirector()
        .redirect(&params(&[(CONNECT_URL_PARAM, "xre://host:10001/shell?lang=en")]))
        .unwrap();
    assert_eq!(
        instance.resolved_url,
        "xre://10.10.10.10:10001/shell?lang=en&ruleName=default"
    );
}

#[test]
fn test_cannot_redirect_without_hosts() {
    let redirector = redirector_with(FLAVOR_RULES, WhiteList::new(["/XX/YY"]), DecisionSettings::default());
    assert!(redirector.redirect(&params(&[])).is_none());
    assert!(redirector.redirect(&params(&[("param", "X")])).is_none());
}

// ========== Distribution Tests ==========

const DISTRIBUTED_RULES: &str = r#"
distribution:
  rule:
    - { id: 0, percent: 100, server: { name: dist, path: "1.41" } }
server: { name: default, path: "1.40" }
"#;

#[test]
fn test_distribution_pick_honored_with_hosts() {
    let redirector = redirector_with(
        DISTRIBUTED_RULES,
        WhiteList::new(["/PO/POC1"]),
        DecisionSettings::default(),
    );
    let instance = redirector.redirect(&params(&[("mac", "AA:BB:CC:00:11:22")])).unwrap();
    assert_eq!(instance.server.name, "dist");
    assert_eq!(instance.flavor, "1.41");
}

#[test]
fn test_starved_distribution_target_falls_back() {
    let redirector = redirector_with(
        DISTRIBUTED_RULES,
        WhiteList::new(["/PO/POC1"]),
        DecisionSettings {
            min_hosts_for_distribution: 2,
        },
    );
    let instance = redirector.redirect(&params(&[("mac", "AA:BB:CC:00:11:22")])).unwrap();
    assert_eq!(instance.server.name, "default");
}

#[test]
fn test_select_mode() {
    let flagged = Server::new("r", "1.41", ReturnKind::PathRule).with_non_whitelisted_only(true);
    let stack = Server::new("r", "/PO/POC1/1.41", ReturnKind::PathRule);
    let flavor = Server::new("r", "1.41", ReturnKind::PathRule);

    assert_eq!(select_mode(&flagged), LookupMode::DefaultNonWhitelisted);
    assert_eq!(select_mode(&stack), LookupMode::NonFiltered);
    assert_eq!(select_mode(&flavor), LookupMode::Default);
}
