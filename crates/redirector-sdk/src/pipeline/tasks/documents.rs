//! Rule document loading and translation
//!
//! Each task reads one raw document from the context's source, parses it
//! into its wire DTO and translates it into the rule model. Namespaced list
//! references are checked against the lists staged in the context, or the
//! published ones when this run loaded none.

use crate::pipeline::{ModelContext, ModelServices, Task, TaskResult, ValidationReport};
use async_trait::async_trait;
use redirector_parser::{
    DocumentParser, FlavorRulesParser, NamespacedListsParser, SelectServerDto,
    UrlRulesDto, UrlRulesParser, WhitelistDto, WhitelistParser,
};
use redirector_repository::RepositoryError;
use std::sync::Arc;

fn load_failure(
    task: &str,
    what: &str,
    context: &ModelContext,
    err: impl std::fmt::Display,
) -> ValidationReport {
    ValidationReport::failure(
        task,
        format!("cannot load {} from {}: {}", what, context.source, err),
    )
}

fn invalid(task: &str, what: &str, err: impl std::fmt::Display) -> ValidationReport {
    ValidationReport::failure(task, format!("invalid {}: {}", what, err))
}

/// Stage fresh namespaced lists when the published ones are empty or stale
///
/// The lists are attached to the context; the orchestrator publishes them
/// with the rest of the model.
pub struct GetNamespacedLists {
    services: ModelServices,
}

impl GetNamespacedLists {
    pub fn new(services: ModelServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Task for GetNamespacedLists {
    fn name(&self) -> &'static str {
        "get_namespaced_lists"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        let source = self.services.rule_source(context.source);
        let lists = &self.services.lists;

        let version = match source.namespaced_lists_version().await {
            Ok(version) => version,
            Err(e) => {
                let report = load_failure(self.name(), "namespaced lists version", &context, e);
                return TaskResult::failed(context, report);
            }
        };

        if !lists.is_stale(version) {
            return TaskResult::skipped(
                context,
                self.name(),
                format!("namespaced lists at version {} are current", lists.version()),
            );
        }

        let document = match source.namespaced_lists().await {
            Ok(document) => document,
            Err(RepositoryError::NotFound { .. }) => {
                return TaskResult::warning(
                    context,
                    self.name(),
                    "no namespaced lists available, keeping current lists",
                )
            }
            Err(e) => {
                let report = load_failure(self.name(), "namespaced lists", &context, e);
                return TaskResult::failed(context, report);
            }
        };

        match NamespacedListsParser::parse(&document) {
            Ok(parsed) => {
                let detail = format!("staged {} lists at version {}", parsed.len(), parsed.version);
                context.namespaced_lists = Some(Arc::new(parsed));
                TaskResult::succeeded(context, self.name(), detail)
            }
            Err(e) => TaskResult::failed(context, invalid(self.name(), "namespaced lists", e)),
        }
    }
}

/// Check that staged namespaced lists still resolve every list the model's
/// rules reference
///
/// Runs against the rules carried in the context. Nothing to check when no
/// lists were staged or no rules are loaded yet.
pub struct ValidateNamespacedLists;

impl ValidateNamespacedLists {
    fn missing_reference(context: &ModelContext) -> Option<(String, String)> {
        let lists = context.namespaced_lists.as_ref()?;
        let flavor_rules = context.flavor_rules.iter().flat_map(|r| r.rules.iter());
        let url_rules = context.url_rules.iter().flat_map(|r| r.rules.iter());

        flavor_rules.chain(url_rules).find_map(|rule| {
            rule.referenced_lists()
                .into_iter()
                .find(|name| lists.get(name).is_none())
                .map(|name| (rule.id.clone(), name.to_string()))
        })
    }
}

#[async_trait]
impl Task for ValidateNamespacedLists {
    fn name(&self) -> &'static str {
        "validate_namespaced_lists"
    }

    async fn run(&self, context: ModelContext) -> TaskResult {
        let Some(staged) = context.namespaced_lists.as_ref().map(|l| l.version) else {
            return TaskResult::skipped(context, self.name(), "no namespaced lists staged");
        };

        match Self::missing_reference(&context) {
            Some((rule, list)) => {
                let report = ValidationReport::failure(
                    self.name(),
                    format!(
                        "rule '{}' references list '{}' missing from lists version {}",
                        rule, list, staged
                    ),
                );
                TaskResult::failed(context, report)
            }
            None => TaskResult::succeeded(
                context,
                self.name(),
                format!("lists version {} resolve every rule reference", staged),
            ),
        }
    }
}

/// Load and translate the flavor rules
pub struct GetFlavorRules {
    services: ModelServices,
}

impl GetFlavorRules {
    pub fn new(services: ModelServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Task for GetFlavorRules {
    fn name(&self) -> &'static str {
        "get_flavor_rules"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        let source = self.services.rule_source(context.source);
        let loaded = source.flavor_rules(context.app_name()).await;
        let document = match loaded {
            Ok(document) => document,
            Err(e) => {
                let report = load_failure(self.name(), "flavor rules", &context, e);
                return TaskResult::failed(context, report);
            }
        };

        let lists = context.lists(&self.services.lists);
        let translated = DocumentParser::parse::<SelectServerDto>(&document)
            .and_then(|dto| FlavorRulesParser::translate(&dto, &lists).map(|rules| (dto, rules)));

        match translated {
            Ok((dto, rules)) => {
                let detail = format!(
                    "{} rules, default server '{}'",
                    rules.rules.len(),
                    rules.default_server.name
                );
                context.flavor_rules_document = Some(dto);
                context.flavor_rules = Some(Arc::new(rules));
                TaskResult::succeeded(context, self.name(), detail)
            }
            Err(e) => TaskResult::failed(context, invalid(self.name(), "flavor rules", e)),
        }
    }
}

/// Load and translate the URL rules
pub struct GetUrlRules {
    services: ModelServices,
}

impl GetUrlRules {
    pub fn new(services: ModelServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Task for GetUrlRules {
    fn name(&self) -> &'static str {
        "get_url_rules"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        let source = self.services.rule_source(context.source);
        let loaded = source.url_rules(context.app_name()).await;
        let document = match loaded {
            Ok(document) => document,
            Err(e) => {
                let report = load_failure(self.name(), "URL rules", &context, e);
                return TaskResult::failed(context, report);
            }
        };

        let lists = context.lists(&self.services.lists);
        let translated = DocumentParser::parse::<UrlRulesDto>(&document)
            .and_then(|dto| UrlRulesParser::translate(&dto, &lists).map(|rules| (dto, rules)));

        match translated {
            Ok((dto, rules)) => {
                let detail = format!("{} URL rules", rules.rules.len());
                context.url_rules_document = Some(dto);
                context.url_rules = Some(Arc::new(rules));
                TaskResult::succeeded(context, self.name(), detail)
            }
            Err(e) => TaskResult::failed(context, invalid(self.name(), "URL rules", e)),
        }
    }
}

/// Load the whitelisted stack prefixes
pub struct GetWhitelistedStacks {
    services: ModelServices,
}

impl GetWhitelistedStacks {
    pub fn new(services: ModelServices) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Task for GetWhitelistedStacks {
    fn name(&self) -> &'static str {
        "get_whitelisted_stacks"
    }

    async fn run(&self, mut context: ModelContext) -> TaskResult {
        let source = self.services.rule_source(context.source);
        let loaded = source.whitelist(context.app_name()).await;
        let document = match loaded {
            Ok(document) => document,
            Err(e) => {
                let report = load_failure(self.name(), "whitelist", &context, e);
                return TaskResult::failed(context, report);
            }
        };

        match DocumentParser::parse::<WhitelistDto>(&document) {
            Ok(dto) => {
                let whitelist = WhitelistParser::translate(&dto);
                let detail = format!("{} whitelisted paths", whitelist.len());
                context.whitelist = Some(Arc::new(whitelist));
                TaskResult::succeeded(context, self.name(), detail)
            }
            Err(e) => TaskResult::failed(context, invalid(self.name(), "whitelist", e)),
        }
    }
}
