//! Redirector Core - Core types and definitions for the Redirector decision engine
//!
//! This crate provides the fundamental types used across the Redirector workspace:
//! - AST (Abstract Syntax Tree) definitions for expressions, rules and rule sets
//! - Model types for whitelists, namespaced lists, stacks and decision results
//! - Error types

pub mod ast;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use ast::{
    CompareMode, Distribution, DistributionEntry, Expression, FlavorRuleSet, IpProtocolVersion,
    LogicalOperator, Operand, Pattern, RelationalOperator, ReturnKind, ReturnValue, Rule, Server,
    UrlParams, UrlRuleSet,
};
pub use error::{CoreError, Result};
pub use model::{
    HostAddress, InstanceInfo, ModelMetadata, NamespacedList, NamespacedLists, StackData,
    StackPath, StacksSnapshot, WhiteList,
};
