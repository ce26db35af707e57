//! Rule set resolution tests

use crate::engine::{
    evaluate_flavor_rules, evaluate_url_rules, percent_matches, pick_distribution, rule_matches,
    FlavorSource, MAC_PARAM,
};
use redirector_core::ast::*;
use redirector_core::NamespacedLists;
use std::collections::HashMap;

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn server_rule(id: &str, condition: Expression, path: &str) -> Rule {
    Rule::new(id, condition).with_return(ReturnValue::Server(Server::new(
        id,
        path,
        ReturnKind::PathRule,
    )))
}

fn rule_set() -> FlavorRuleSet {
    FlavorRuleSet::new(Server::new("default", "1.40", ReturnKind::DefaultServer))
        .add_rule(server_rule("ruleA", Expression::equals("param", "X"), "1.41"))
        .add_rule(server_rule("ruleB", Expression::equals("param", "X"), "1.42"))
}

#[test]
fn test_first_matching_rule_wins() {
    let lists = NamespacedLists::default();
    let rules = rule_set();
    let decision = evaluate_flavor_rules(&rules, &params(&[("param", "X")]), &lists);
    assert_eq!(decision.server.path, "1.41");
    assert_eq!(decision.source, FlavorSource::Rule);
    assert_eq!(decision.rule_id, Some("ruleA"));

    let rules = rule_set();
    let decision = evaluate_flavor_rules(&rules, &params(&[("param", "Y")]), &lists);
    assert_eq!(decision.server.path, "1.40");
    assert_eq!(decision.source, FlavorSource::Default);
}

#[test]
fn test_nested_rule_must_also_match() {
    let rule = Rule::new("outer", Expression::equals("a", "1")).with_nested(server_rule(
        "inner",
        Expression::equals("b", "2"),
        "1.43",
    ));
    let lists = NamespacedLists::default();

    assert!(rule_matches(&rule, &params(&[("a", "1"), ("b", "2")]), &lists));
    assert!(!rule_matches(&rule, &params(&[("a", "1"), ("b", "3")]), &lists));
    assert!(!rule_matches(&rule, &params(&[("a", "0"), ("b", "2")]), &lists));

    let rule_set = FlavorRuleSet::new(Server::new("default", "1.40", ReturnKind::DefaultServer))
        .add_rule(rule);
    let decision =
        evaluate_flavor_rules(&rule_set, &params(&[("a", "1"), ("b", "2")]), &lists);
    assert_eq!(decision.server.name, "inner");
}

fn distribution() -> Distribution {
    Distribution::new(vec![
        DistributionEntry {
            id: 0,
            percent: 30.0,
            server: Server::new("d0", "1.50", ReturnKind::DistributionRule),
        },
        DistributionEntry {
            id: 1,
            percent: 30.0,
            server: Server::new("d1", "1.51", ReturnKind::DistributionRule),
        },
    ])
}

#[test]
fn test_distribution_buckets_are_cumulative() {
    let distribution = distribution();
    for i in 0..500 {
        let mac = format!("mac-{}", i);
        let picked = pick_distribution(&distribution, &params(&[(MAC_PARAM, mac.as_str())]))
            .map(|s| s.name.as_str());

        let expected = if percent_matches(&mac, 30.0) {
            Some("d0")
        } else if percent_matches(&mac, 60.0) {
            Some("d1")
        } else {
            None
        };
        assert_eq!(picked, expected, "mac {}", mac);
    }
}

#[test]
fn test_distribution_without_key_goes_to_default() {
    let rule_set = FlavorRuleSet::new(Server::new("default", "1.40", ReturnKind::DefaultServer))
        .with_distribution(distribution());
    let decision = evaluate_flavor_rules(&rule_set, &params(&[]), &NamespacedLists::default());
    assert_eq!(decision.server.name, "default");
    assert_eq!(decision.source, FlavorSource::Default);
}

#[test]
fn test_uncovered_share_goes_to_distribution_default() {
    let rule_set = FlavorRuleSet::new(Server::new("default", "1.40", ReturnKind::DefaultServer))
        .with_distribution(
            distribution().with_default_server(Server::new("dd", "1.39", ReturnKind::DefaultServer)),
        );
    let lists = NamespacedLists::default();

    let uncovered = (0..1000)
        .map(|i| format!("mac-{}", i))
        .find(|mac| !percent_matches(mac, 60.0))
        .expect("some key lands outside 60%");
    let decision = evaluate_flavor_rules(&rule_set, &params(&[(MAC_PARAM, uncovered.as_str())]), &lists);
    assert_eq!(decision.server.name, "dd");
}

#[test]
fn test_url_rules_merge_with_default() {
    let rule_set = UrlRuleSet::new(UrlParams::new("xre", 10001, "shell", IpProtocolVersion::V4))
        .add_rule(
            Rule::new("v6", Expression::equals("ipv6", "true")).with_return(
                ReturnValue::UrlParams(UrlParams {
                    ip_protocol_version: Some(IpProtocolVersion::V6),
                    ..Default::default()
                }),
            ),
        );
    let lists = NamespacedLists::default();

    let matched = evaluate_url_rules(&rule_set, &params(&[("ipv6", "true")]), &lists);
    assert_eq!(matched, UrlParams::new("xre", 10001, "shell", IpProtocolVersion::V6));

    let fallback = evaluate_url_rules(&rule_set, &params(&[]), &lists);
    assert_eq!(fallback, rule_set.default_url_params);
}
