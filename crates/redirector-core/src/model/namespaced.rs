//! Namespaced lists
//!
//! Externally managed named value sets referenced by rules. Each list keeps
//! its raw values and lazily derives a lower-cased view for case-insensitive
//! membership and an IP range view from the values that parse as an IP
//! address or a CIDR block.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::OnceLock;

/// One named value set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespacedList {
    pub name: String,
    pub values: BTreeSet<String>,

    #[serde(skip)]
    lowercase: OnceLock<HashSet<String>>,

    #[serde(skip)]
    ip_ranges: OnceLock<Vec<IpNet>>,
}

impl NamespacedList {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            lowercase: OnceLock::new(),
            ip_ranges: OnceLock::new(),
        }
    }

    pub fn contains(&self, value: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.values.contains(value)
        } else {
            self.lowercase
                .get_or_init(|| self.values.iter().map(|v| v.to_lowercase()).collect())
                .contains(&value.to_lowercase())
        }
    }

    /// IP ranges derived from the values; other values are skipped
    pub fn ip_ranges(&self) -> &[IpNet] {
        self.ip_ranges.get_or_init(|| {
            self.values
                .iter()
                .filter_map(|value| {
                    let parsed = parse_ip_range(value);
                    if parsed.is_none() {
                        log::debug!(
                            "Namespaced list '{}': '{}' is not an IP or CIDR literal",
                            self.name,
                            value
                        );
                    }
                    parsed
                })
                .collect()
        })
    }

    pub fn contains_ip(&self, address: IpAddr) -> bool {
        self.ip_ranges().iter().any(|range| range.contains(&address))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for NamespacedList {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.values == other.values
    }
}

impl Eq for NamespacedList {}

/// Parse an IP address or CIDR literal
pub fn parse_ip_range(value: &str) -> Option<IpNet> {
    let value = value.trim();
    if value.contains('/') {
        value.parse::<IpNet>().ok()
    } else {
        value.parse::<IpAddr>().ok().map(IpNet::from)
    }
}

/// Versioned collection of namespaced lists
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamespacedLists {
    pub version: i64,
    pub lists: HashMap<String, NamespacedList>,
}

impl NamespacedLists {
    pub fn new(version: i64, lists: impl IntoIterator<Item = NamespacedList>) -> Self {
        Self {
            version,
            lists: lists.into_iter().map(|l| (l.name.clone(), l)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&NamespacedList> {
        self.lists.get(name)
    }

    pub fn has_list(&self, name: &str) -> bool {
        self.lists.contains_key(name)
    }

    pub fn insert(&mut self, list: NamespacedList) {
        self.lists.insert(list.name.clone(), list);
    }

    /// True when any of the named lists contains `value`
    pub fn contains_in_any(&self, names: &[String], value: &str, case_sensitive: bool) -> bool {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .any(|list| list.contains(value, case_sensitive))
    }

    /// True when any of the named lists covers `address`
    pub fn contains_ip_in_any(&self, names: &[String], address: IpAddr) -> bool {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .any(|list| list.contains_ip(address))
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_membership() {
        let list = NamespacedList::new("macs", ["AA:BB:CC", "dd:ee:ff"]);
        assert!(list.contains("aa:bb:cc", false));
        assert!(list.contains("DD:EE:FF", false));
        assert!(!list.contains("aa:bb:cc", true));
        assert!(list.contains("AA:BB:CC", true));
    }

    #[test]
    fn test_ip_view_skips_non_ip_values() {
        let list = NamespacedList::new("office", ["10.0.0.0/8", "192.168.1.7", "not-an-ip", "::1"]);
        assert_eq!(list.ip_ranges().len(), 3);
        assert!(list.contains_ip("10.20.30.40".parse().unwrap()));
        assert!(list.contains_ip("192.168.1.7".parse().unwrap()));
        assert!(list.contains_ip("::1".parse().unwrap()));
        assert!(!list.contains_ip("192.168.1.8".parse().unwrap()));
    }

    #[test]
    fn test_lists_union() {
        let lists = NamespacedLists::new(
            1,
            vec![
                NamespacedList::new("a", ["x"]),
                NamespacedList::new("b", ["y", "10.1.0.0/16"]),
            ],
        );
        let names = vec!["a".to_string(), "b".to_string(), "missing".to_string()];

        assert!(lists.contains_in_any(&names, "Y", false));
        assert!(!lists.contains_in_any(&names, "z", false));
        assert!(lists.contains_ip_in_any(&names, "10.1.2.3".parse().unwrap()));
        assert!(lists.has_list("a"));
        assert!(!lists.has_list("missing"));
    }

    #[test]
    fn test_equality_ignores_derived_views() {
        let a = NamespacedList::new("l", ["1.1.1.1"]);
        let b = NamespacedList::new("l", ["1.1.1.1"]);
        let _ = a.ip_ranges();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_ip_range() {
        assert!(parse_ip_range("10.0.0.0/24").is_some());
        assert!(parse_ip_range(" 2001:db8::1 ").is_some());
        assert!(parse_ip_range("10.0.0.0/99").is_none());
        assert!(parse_ip_range("host").is_none());
    }
}
