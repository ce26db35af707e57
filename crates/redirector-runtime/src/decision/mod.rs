//! Redirect decision procedure
//!
//! Evaluate -> (distribution check) -> mode select -> host lookup ->
//! (fallback to default) -> address resolve -> URL build. Host lookup is
//! the only call leaving the redirector; every other step is a pure
//! transformation of the model snapshot and the request parameters.

mod url;

pub use url::{build_url, RULE_NAME_PARAM};

use crate::engine::{evaluate_flavor_rules, evaluate_url_rules, FlavorSource};
use crate::error::{Result, RuntimeError};
use crate::hosts::{HostPool, LookupMode};
use crate::lists::NamespacedListRepository;
use redirector_core::{FlavorRuleSet, InstanceInfo, ReturnKind, Server, UrlRuleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Request parameter carrying the inbound connect URL
pub const CONNECT_URL_PARAM: &str = "connectUrl";

/// Per-application decision settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSettings {
    /// Hosts a distribution target needs before a pick is honored
    pub min_hosts_for_distribution: usize,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            min_hosts_for_distribution: 1,
        }
    }
}

/// Lookup mode for a candidate server
pub fn select_mode(server: &Server) -> LookupMode {
    if server.non_whitelisted_only {
        LookupMode::DefaultNonWhitelisted
    } else if server.return_kind == ReturnKind::PathRule && server.targets_stack() {
        LookupMode::NonFiltered
    } else {
        LookupMode::Default
    }
}

/// Immutable decision engine over one model snapshot
pub struct Redirector {
    flavor_rules: Arc<FlavorRuleSet>,
    url_rules: Arc<UrlRuleSet>,
    host_pool: Arc<dyn HostPool>,
    lists: Arc<NamespacedListRepository>,
    settings: DecisionSettings,
}

impl Redirector {
    pub fn new(
        flavor_rules: Arc<FlavorRuleSet>,
        url_rules: Arc<UrlRuleSet>,
        host_pool: Arc<dyn HostPool>,
        lists: Arc<NamespacedListRepository>,
        settings: DecisionSettings,
    ) -> Result<Self> {
        if !url_rules.default_url_params.is_complete() {
            return Err(RuntimeError::InvalidConfiguration(
                "default URL parameters must set protocol, port, urn and IP version".to_string(),
            ));
        }
        Ok(Self {
            flavor_rules,
            url_rules,
            host_pool,
            lists,
            settings,
        })
    }

    pub fn flavor_rules(&self) -> &FlavorRuleSet {
        &self.flavor_rules
    }

    pub fn url_rules(&self) -> &UrlRuleSet {
        &self.url_rules
    }

    pub fn host_pool(&self) -> &Arc<dyn HostPool> {
        &self.host_pool
    }

    pub fn settings(&self) -> DecisionSettings {
        self.settings
    }

    /// Resolve a request to an instance, or `None` when it cannot be redirected
    pub fn redirect(&self, params: &HashMap<String, String>) -> Option<InstanceInfo> {
        let lists = self.lists.snapshot();
        let default_server = &self.flavor_rules.default_server;

        let decision = evaluate_flavor_rules(&self.flavor_rules, params, &lists);
        let mut candidate = decision.server;

        if decision.source == FlavorSource::Distribution {
            let hosts = self.host_pool.count_hosts_for_path(&candidate.path);
            if hosts < self.settings.min_hosts_for_distribution {
                tracing::debug!(
                    "Distribution pick '{}' has {} hosts (< {}), using default server",
                    candidate.name,
                    hosts,
                    self.settings.min_hosts_for_distribution
                );
                candidate = self.flavor_rules.distribution_default();
            }
        }

        let connect_url = params.get(CONNECT_URL_PARAM).map(String::as_str);
        let url_params = evaluate_url_rules(&self.url_rules, params, &lists);

        if candidate.is_advanced() {
            let mut instance = InstanceInfo::advanced(candidate.clone());
            instance.resolved_url = build_url(candidate, None, &url_params, connect_url);
            return Some(instance);
        }

        let mode = select_mode(candidate);
        let instance = self.host_pool.pick_instance(candidate, mode).or_else(|| {
            if candidate != default_server {
                tracing::debug!(
                    "No host for '{}' ({:?}), falling back to default server",
                    candidate.name,
                    mode
                );
                self.host_pool.pick_instance(default_server, LookupMode::Default)
            } else {
                None
            }
        });

        let mut instance = match instance {
            Some(instance) if instance.has_address() => instance,
            _ => {
                tracing::debug!("Cannot redirect: no usable host for '{}'", candidate.name);
                return None;
            }
        };

        let version = url_params.ip_protocol_version.unwrap_or_default();
        let address = match instance.address(version) {
            Some(address) => address.to_string(),
            None => {
                tracing::debug!(
                    "Cannot redirect: host in {:?} has no IPv{} address",
                    instance.stack_path,
                    version.as_number()
                );
                return None;
            }
        };

        instance.ip_protocol_version = version;
        instance.resolved_url = build_url(&instance.server, Some(&address), &url_params, connect_url);
        Some(instance)
    }
}

impl std::fmt::Debug for Redirector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redirector")
            .field("rules", &self.flavor_rules.rules.len())
            .field("default_server", &self.flavor_rules.default_server.name)
            .field("hosts", &self.host_pool.host_count())
            .field("settings", &self.settings)
            .finish()
    }
}
