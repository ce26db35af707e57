//! Evaluation engine module
//!
//! Provides the expression evaluator and rule set resolution.

mod evaluator;
mod operators;
mod rules;

// Re-export for convenience
pub use evaluator::evaluate;
pub use operators::{client_key, percent_matches, random_matches, MAC_PARAM, SERVICE_ACCOUNT_ID_PARAM};
pub use rules::{
    evaluate_flavor_rules, evaluate_url_rules, pick_distribution, rule_matches, FlavorDecision,
    FlavorSource,
};

#[cfg(test)]
mod tests;
