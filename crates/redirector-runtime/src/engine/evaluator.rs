//! Expression evaluator
//!
//! One evaluation arm per expression variant. Evaluation never fails: an
//! operand that cannot be resolved or parsed makes the expression `false`
//! whatever its negation flag.

use super::operators::{
    client_key, evaluate_contains, evaluate_in_ip_range, evaluate_relational, percent_matches,
    random_matches, resolve,
};
use redirector_core::ast::Expression;
use redirector_core::NamespacedLists;
use std::collections::HashMap;

/// Evaluate an expression against request parameters and namespaced lists
pub fn evaluate(
    expr: &Expression,
    params: &HashMap<String, String>,
    lists: &NamespacedLists,
) -> bool {
    let (outcome, negate) = match expr {
        Expression::Relational {
            op,
            left,
            right,
            compare_mode,
            negate,
            case_sensitive,
        } => (
            evaluate_relational(*op, left, right, *compare_mode, *case_sensitive, params, lists),
            *negate,
        ),

        Expression::Contains {
            operand,
            values,
            namespaced_lists,
            negate,
            case_sensitive,
        } => (
            evaluate_contains(operand, values, namespaced_lists, *case_sensitive, params, lists),
            *negate,
        ),

        Expression::Matches {
            operand,
            pattern,
            negate,
        } => (
            resolve(operand, params).map(|value| pattern.is_match(value)),
            *negate,
        ),

        Expression::InIpRange {
            operand,
            ranges,
            namespaced_lists,
            negate,
        } => (
            evaluate_in_ip_range(operand, ranges, namespaced_lists, params, lists),
            *negate,
        ),

        Expression::IsEmpty { operand, negate } => (
            Some(resolve(operand, params).map_or(true, |value| value.trim().is_empty())),
            *negate,
        ),

        Expression::Percent { percent, negate } => (
            client_key(params).map(|key| percent_matches(key, *percent)),
            *negate,
        ),

        Expression::Random { percent, negate } => (Some(random_matches(*percent)), *negate),

        Expression::Logical {
            op,
            left,
            right,
            negate,
        } => {
            // Both children are always evaluated
            let left = evaluate(left, params, lists);
            let right = evaluate(right, params, lists);
            (Some(op.combine(left, right)), *negate)
        }
    };

    match outcome {
        Some(value) => value != negate,
        None => {
            tracing::trace!("Expression '{}' could not be resolved, evaluating to false", expr.tag());
            false
        }
    }
}
