//! Rule set resolution
//!
//! Rules are tried in declared order and the first match wins. Flavor rule
//! sets then fall through to the weighted distribution and finally to the
//! default server; URL rule sets fall back to their default parameters.

use super::evaluator::evaluate;
use super::operators::{client_key, percent_matches};
use redirector_core::ast::{Distribution, FlavorRuleSet, Rule, Server, UrlParams, UrlRuleSet};
use redirector_core::NamespacedLists;
use std::collections::HashMap;

/// Where the chosen server came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlavorSource {
    Rule,
    Distribution,
    Default,
}

/// Outcome of evaluating a flavor rule set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlavorDecision<'a> {
    pub server: &'a Server,
    pub source: FlavorSource,

    /// Matching rule, when `source` is `Rule`
    pub rule_id: Option<&'a str>,
}

/// True when the rule's condition and every nested rule hold
///
/// Nested rules are evaluated even when the outer condition is false.
pub fn rule_matches(rule: &Rule, params: &HashMap<String, String>, lists: &NamespacedLists) -> bool {
    let own = evaluate(&rule.condition, params, lists);
    let nested = rule
        .nested
        .as_ref()
        .map_or(true, |nested| rule_matches(nested, params, lists));
    own && nested
}

/// Pick the server for a request
pub fn evaluate_flavor_rules<'a>(
    rule_set: &'a FlavorRuleSet,
    params: &HashMap<String, String>,
    lists: &NamespacedLists,
) -> FlavorDecision<'a> {
    for rule in &rule_set.rules {
        if !rule_matches(rule, params, lists) {
            continue;
        }
        match rule.server() {
            Some(server) => {
                return FlavorDecision {
                    server,
                    source: FlavorSource::Rule,
                    rule_id: Some(rule.id.as_str()),
                }
            }
            None => tracing::warn!("Rule '{}' matched but returns no server", rule.id),
        }
    }

    if let Some(distribution) = &rule_set.distribution {
        if let Some(server) = pick_distribution(distribution, params) {
            return FlavorDecision {
                server,
                source: FlavorSource::Distribution,
                rule_id: None,
            };
        }
        return FlavorDecision {
            server: rule_set.distribution_default(),
            source: FlavorSource::Default,
            rule_id: None,
        };
    }

    FlavorDecision {
        server: &rule_set.default_server,
        source: FlavorSource::Default,
        rule_id: None,
    }
}

/// Cumulative bucket lookup keyed on the client identifier
///
/// Returns `None` when the request carries no identifier or falls outside
/// every declared bucket.
pub fn pick_distribution<'a>(
    distribution: &'a Distribution,
    params: &HashMap<String, String>,
) -> Option<&'a Server> {
    let key = client_key(params)?;
    let mut cumulative = 0.0;
    for entry in &distribution.entries {
        cumulative += entry.percent;
        if percent_matches(key, cumulative) {
            return Some(&entry.server);
        }
    }
    None
}

/// Resolve URL parameters, filled from the rule set's defaults
pub fn evaluate_url_rules(
    rule_set: &UrlRuleSet,
    params: &HashMap<String, String>,
    lists: &NamespacedLists,
) -> UrlParams {
    rule_set
        .rules
        .iter()
        .filter(|rule| rule_matches(rule, params, lists))
        .find_map(Rule::url_params)
        .map(|matched| matched.merged_with(&rule_set.default_url_params))
        .unwrap_or_else(|| rule_set.default_url_params.clone())
}
