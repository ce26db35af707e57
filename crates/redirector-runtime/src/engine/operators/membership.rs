//! Set membership: `contains` and `inIpRange`

use super::comparison::resolve;
use ipnet::IpNet;
use redirector_core::ast::Operand;
use redirector_core::NamespacedLists;
use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;

/// Membership in the inline values or any referenced list, before negation
pub(crate) fn evaluate_contains(
    operand: &Operand,
    values: &BTreeSet<String>,
    namespaced_lists: &[String],
    case_sensitive: bool,
    params: &HashMap<String, String>,
    lists: &NamespacedLists,
) -> Option<bool> {
    let value = resolve(operand, params)?;

    let inline = if case_sensitive {
        values.contains(value)
    } else {
        let folded = value.to_lowercase();
        values.iter().any(|v| v.to_lowercase() == folded)
    };

    Some(inline || lists.contains_in_any(namespaced_lists, value, case_sensitive))
}

/// Address inside the inline ranges or any referenced list, before negation
pub(crate) fn evaluate_in_ip_range(
    operand: &Operand,
    ranges: &[IpNet],
    namespaced_lists: &[String],
    params: &HashMap<String, String>,
    lists: &NamespacedLists,
) -> Option<bool> {
    let value = resolve(operand, params)?;
    let address = match value.trim().parse::<IpAddr>() {
        Ok(address) => address,
        Err(_) => {
            tracing::debug!("inIpRange: '{}' is not an IP address", value);
            return None;
        }
    };

    Some(
        ranges.iter().any(|range| range.contains(&address))
            || lists.contains_ip_in_any(namespaced_lists, address),
    )
}
