//! Rule set AST definitions
//!
//! A flavor rule set picks the [`Server`] a request is redirected to: an
//! ordered list of rules, an optional weighted distribution and a mandatory
//! default server. A URL rule set picks the [`UrlParams`] used to build the
//! final URL.

use super::rule::Rule;
use super::server::{Server, UrlParams};
use serde::{Deserialize, Serialize};

/// One weighted slice of a distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub id: i64,

    /// Share of traffic in percent, `0 < percent <= 100`
    pub percent: f64,

    pub server: Server,
}

/// Weighted traffic split across flavors
///
/// Entries are cumulative buckets in declared order. Traffic not covered by
/// the declared percentages goes to `default_server`, or to the owning rule
/// set's default when the distribution has none.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub entries: Vec<DistributionEntry>,
    pub default_server: Option<Server>,
}

impl Distribution {
    pub fn new(entries: Vec<DistributionEntry>) -> Self {
        Self {
            entries,
            default_server: None,
        }
    }

    pub fn with_default_server(mut self, server: Server) -> Self {
        self.default_server = Some(server);
        self
    }

    /// Sum of all declared percentages
    pub fn total_percent(&self) -> f64 {
        self.entries.iter().map(|e| e.percent).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered flavor rules with a default server and an optional distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorRuleSet {
    /// Rules in evaluation order; the first match wins
    pub rules: Vec<Rule>,

    pub default_server: Server,

    pub distribution: Option<Distribution>,
}

impl FlavorRuleSet {
    pub fn new(default_server: Server) -> Self {
        Self {
            rules: Vec::new(),
            default_server,
            distribution: None,
        }
    }

    pub fn add_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = Some(distribution);
        self
    }

    /// Default server for traffic the distribution does not cover
    pub fn distribution_default(&self) -> &Server {
        self.distribution
            .as_ref()
            .and_then(|d| d.default_server.as_ref())
            .unwrap_or(&self.default_server)
    }

    /// Servers returned by named rules, in rule order
    pub fn rule_servers(&self) -> impl Iterator<Item = (&Rule, &Server)> {
        self.rules
            .iter()
            .filter_map(|rule| rule.server().map(|server| (rule, server)))
    }
}

/// Ordered URL rules with mandatory default parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRuleSet {
    pub rules: Vec<Rule>,

    /// Fully populated defaults
    pub default_url_params: UrlParams,
}

impl UrlRuleSet {
    pub fn new(default_url_params: UrlParams) -> Self {
        Self {
            rules: Vec::new(),
            default_url_params,
        }
    }

    pub fn add_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }
}
