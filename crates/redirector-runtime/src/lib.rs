//! Redirector Runtime - evaluation and decision engine
//!
//! This crate provides:
//! - The expression evaluator and rule set resolution
//! - Weighted distribution bucketing
//! - Host pools with whitelist-aware lookup modes
//! - The redirect decision procedure and URL building

pub mod decision;
pub mod engine;
pub mod error;
pub mod hosts;
pub mod lists;

// Re-export main types
pub use decision::{build_url, select_mode, DecisionSettings, Redirector, CONNECT_URL_PARAM, RULE_NAME_PARAM};
pub use engine::{
    evaluate, evaluate_flavor_rules, evaluate_url_rules, rule_matches, FlavorDecision,
    FlavorSource,
};
pub use error::{Result, RuntimeError};
pub use hosts::{HostPool, LookupMode, RoundRobinHostPool};
pub use lists::NamespacedListRepository;
