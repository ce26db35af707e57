//! Redirector Parser - wire documents to AST for the Redirector decision engine
//!
//! This crate provides:
//! - Serde DTOs for flavor rules, URL rules, whitelists and namespaced lists
//! - JSON/YAML document loading
//! - Translation of DTOs into the AST with structural validation

pub mod document;
pub mod dto;
pub mod error;
pub mod expression_parser;
pub mod list_parser;
pub mod rule_parser;
pub mod ruleset_parser;

// Re-export main parser types
pub use document::DocumentParser;
pub use dto::{
    DistributionDto, DistributionRuleDto, ExpressionDto, IfDto, NamespacedListDto,
    NamespacedListsDto, ReturnDto, SelectServerDto, ServerDto, UrlRuleDto, UrlRulesDto,
    WhitelistDto,
};
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
pub use list_parser::{NamespacedListsParser, WhitelistParser};
pub use rule_parser::{ReturnContext, RuleParser};
pub use ruleset_parser::{FlavorRulesParser, UrlRulesParser};
