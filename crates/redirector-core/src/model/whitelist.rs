//! Whitelist of stack prefixes eligible for live traffic

use super::stack::StackPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of `/dataCenter/availabilityZone` prefixes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WhiteList {
    pub paths: BTreeSet<String>,
    #[serde(default)]
    pub version: i64,
}

impl WhiteList {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|p| normalize(&p.into()))
                .filter(|p| !p.is_empty())
                .collect(),
            version: 0,
        }
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// True when the stack's `/dc/zone` prefix is a member
    ///
    /// Unparseable stack paths are never whitelisted.
    pub fn is_whitelisted(&self, stack_path: &str) -> bool {
        match StackPath::parse(stack_path) {
            Ok(path) => self.contains_prefix(&path.prefix()),
            Err(_) => false,
        }
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.paths.contains(&normalize(prefix))
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelisted_by_prefix() {
        let whitelist = WhiteList::new(["/DC1/Zone1", "DC2/Zone2/"]);
        assert!(whitelist.is_whitelisted("/DC1/Zone1/1.40/xreGuide"));
        assert!(whitelist.is_whitelisted("/DC2/Zone2/1.41"));
        assert!(!whitelist.is_whitelisted("/DC1/Zone2/1.40/xreGuide"));
        assert!(!whitelist.is_whitelisted("garbage"));
        assert_eq!(whitelist.len(), 2);
    }

    #[test]
    fn test_empty_entries_dropped() {
        let whitelist = WhiteList::new(["", "  "]).with_version(4);
        assert!(whitelist.is_empty());
        assert_eq!(whitelist.version, 4);
    }
}
