//! Rule set parsers
//!
//! Parses flavor rules (`selectServer` documents) and URL rules documents
//! into `FlavorRuleSet` and `UrlRuleSet`.

use crate::document::DocumentParser;
use crate::dto::{DistributionDto, SelectServerDto, UrlRulesDto};
use crate::error::{ParseError, Result};
use crate::rule_parser::{ReturnContext, RuleParser};
use redirector_core::ast::{
    Distribution, DistributionEntry, FlavorRuleSet, ReturnKind, UrlRuleSet,
};
use redirector_core::NamespacedLists;
use std::collections::HashSet;

/// Flavor rules parser
pub struct FlavorRulesParser;

impl FlavorRulesParser {
    /// Parse a flavor rules document
    pub fn parse(content: &str, lists: &NamespacedLists) -> Result<FlavorRuleSet> {
        let dto: SelectServerDto = DocumentParser::parse(content)?;
        Self::translate(&dto, lists)
    }

    /// Translate a parsed flavor rules document
    pub fn translate(dto: &SelectServerDto, lists: &NamespacedLists) -> Result<FlavorRuleSet> {
        let default_server = RuleParser::server(&dto.server, ReturnKind::DefaultServer)?;

        let mut seen = HashSet::new();
        let rules = dto
            .rules
            .iter()
            .map(|rule| {
                if !seen.insert(rule.id.as_str()) {
                    return Err(ParseError::InvalidValue {
                        field: "if.id".to_string(),
                        message: format!("duplicate rule id '{}'", rule.id),
                    });
                }
                RuleParser::translate(rule, lists, ReturnContext::Server)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rule_set = FlavorRuleSet::new(default_server).with_rules(rules);
        if let Some(distribution) = &dto.distribution {
            if !distribution.rule.is_empty() || distribution.default_server.is_some() {
                rule_set = rule_set.with_distribution(Self::distribution(distribution)?);
            }
        }

        log::debug!(
            "Parsed flavor rules: {} rules, distribution: {}",
            rule_set.rules.len(),
            rule_set.distribution.is_some()
        );
        Ok(rule_set)
    }

    fn distribution(dto: &DistributionDto) -> Result<Distribution> {
        let entries = dto
            .rule
            .iter()
            .map(|entry| {
                if !(entry.percent > 0.0 && entry.percent <= 100.0) {
                    return Err(ParseError::InvalidDistribution(format!(
                        "rule {} has percent {} outside (0, 100]",
                        entry.id, entry.percent
                    )));
                }
                Ok(DistributionEntry {
                    id: entry.id,
                    percent: entry.percent,
                    server: RuleParser::server(&entry.server, ReturnKind::DistributionRule)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut distribution = Distribution::new(entries);
        let total = distribution.total_percent();
        if total > 100.0 {
            return Err(ParseError::InvalidDistribution(format!(
                "percentages add up to {}",
                total
            )));
        }

        if let Some(server) = &dto.default_server {
            distribution = distribution
                .with_default_server(RuleParser::server(server, ReturnKind::DefaultServer)?);
        }
        Ok(distribution)
    }
}

/// URL rules parser
pub struct UrlRulesParser;

impl UrlRulesParser {
    /// Parse a URL rules document
    pub fn parse(content: &str, lists: &NamespacedLists) -> Result<UrlRuleSet> {
        let dto: UrlRulesDto = DocumentParser::parse(content)?;
        Self::translate(&dto, lists)
    }

    /// Translate a parsed URL rules document
    pub fn translate(dto: &UrlRulesDto, lists: &NamespacedLists) -> Result<UrlRuleSet> {
        let default_url_params = RuleParser::url_params(&dto.default.url_rule)?;
        if !default_url_params.is_complete() {
            return Err(ParseError::InvalidValue {
                field: "default.urlRule".to_string(),
                message: "protocol, port, urn and ipProtocolVersion are all required".to_string(),
            });
        }

        let rules = dto
            .rules
            .iter()
            .map(|rule| RuleParser::translate(rule, lists, ReturnContext::UrlParams))
            .collect::<Result<Vec<_>>>()?;

        Ok(UrlRuleSet::new(default_url_params).with_rules(rules))
    }
}
