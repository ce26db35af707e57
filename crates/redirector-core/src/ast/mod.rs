//! Abstract Syntax Tree (AST) definitions for the Redirector rule language
//!
//! This module contains the AST node definitions for:
//! - Expressions and their operands
//! - Rules (including nested rule nodes)
//! - Flavor and URL rule sets with weighted distributions
//! - Servers and URL parameters returned by rules

pub mod expression;
pub mod operator;
pub mod rule;
pub mod ruleset;
pub mod server;

pub use expression::{Expression, Operand, Pattern};
pub use operator::{CompareMode, LogicalOperator, RelationalOperator};
pub use rule::{ReturnValue, Rule};
pub use ruleset::{Distribution, DistributionEntry, FlavorRuleSet, UrlRuleSet};
pub use server::{IpProtocolVersion, ReturnKind, Server, UrlParams};
