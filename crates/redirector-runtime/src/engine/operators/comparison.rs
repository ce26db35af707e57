//! Relational operator evaluation
//!
//! Both operands are resolved to strings and compared according to the
//! expression's compare mode. `None` means an operand could not be
//! resolved or parsed; the caller turns that into `false`.

use redirector_core::ast::{CompareMode, Operand, RelationalOperator};
use redirector_core::NamespacedLists;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::net::Ipv6Addr;

/// Resolve a scalar operand against the request parameters
pub(crate) fn resolve<'a>(operand: &'a Operand, params: &'a HashMap<String, String>) -> Option<&'a str> {
    match operand {
        Operand::Value(value) => Some(value.as_str()),
        Operand::Parameter(name) => params.get(name).map(String::as_str),
        Operand::NamespacedList(_) => None,
    }
}

/// Evaluate a relational expression, before negation
pub(crate) fn evaluate_relational(
    op: RelationalOperator,
    left: &Operand,
    right: &Operand,
    mode: CompareMode,
    case_sensitive: bool,
    params: &HashMap<String, String>,
    lists: &NamespacedLists,
) -> Option<bool> {
    let left_value = resolve(left, params)?;

    // A list on the right turns equality into membership
    if let Operand::NamespacedList(name) = right {
        let member = lists.get(name)?.contains(left_value, case_sensitive);
        return match op {
            RelationalOperator::Equals => Some(member),
            RelationalOperator::NotEqual => Some(!member),
            _ => None,
        };
    }

    let right_value = resolve(right, params)?;
    let ordering = compare_values(left_value, right_value, mode, case_sensitive)?;
    Some(op.test(ordering))
}

/// Compare two resolved values under a compare mode
pub(crate) fn compare_values(
    left: &str,
    right: &str,
    mode: CompareMode,
    case_sensitive: bool,
) -> Option<Ordering> {
    match mode {
        CompareMode::Numeric => {
            let (l, r) = (parse_number(left)?, parse_number(right)?);
            l.partial_cmp(&r)
        }
        CompareMode::None => match (parse_number(left), parse_number(right)) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => Some(compare_strings(left, right, case_sensitive)),
        },
        CompareMode::String => Some(compare_strings(left, right, case_sensitive)),
        CompareMode::Version => Some(compare_versions(left, right)),
        CompareMode::Ipv6 => Some(ipv6_bytes(left).cmp(&ipv6_bytes(right))),
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn compare_strings(left: &str, right: &str, case_sensitive: bool) -> Ordering {
    if case_sensitive {
        left.cmp(right)
    } else {
        left.to_lowercase().cmp(&right.to_lowercase())
    }
}

/// Dot-separated integer tokens; non-numeric and IPv6 literals yield none
fn version_tokens(value: &str) -> Vec<i64> {
    let value = value.trim();
    if value.parse::<Ipv6Addr>().is_ok() {
        return Vec::new();
    }
    value
        .split('.')
        .map(|token| token.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_default()
}

fn compare_versions(left: &str, right: &str) -> Ordering {
    let (l, r) = (version_tokens(left), version_tokens(right));
    let len = l.len().max(r.len());
    (0..len)
        .map(|i| {
            let a = l.get(i).copied().unwrap_or(0);
            let b = r.get(i).copied().unwrap_or(0);
            a.cmp(&b)
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn ipv6_bytes(value: &str) -> Vec<u8> {
    value
        .trim()
        .parse::<Ipv6Addr>()
        .map(|address| address.octets().to_vec())
        .unwrap_or_default()
}
