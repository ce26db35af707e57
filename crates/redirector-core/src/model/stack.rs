//! Stacks and the hosts registered under them

use crate::ast::server::IpProtocolVersion;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parsed stack path `/dataCenter/availabilityZone/flavor[/app]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackPath {
    data_center: String,
    availability_zone: String,
    flavor: String,
    app_name: Option<String>,
}

impl StackPath {
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [dc, zone, flavor] => Ok(Self {
                data_center: dc.to_string(),
                availability_zone: zone.to_string(),
                flavor: flavor.to_string(),
                app_name: None,
            }),
            [dc, zone, flavor, app] => Ok(Self {
                data_center: dc.to_string(),
                availability_zone: zone.to_string(),
                flavor: flavor.to_string(),
                app_name: Some(app.to_string()),
            }),
            _ => Err(CoreError::InvalidStackPath(path.to_string())),
        }
    }

    pub fn data_center(&self) -> &str {
        &self.data_center
    }

    pub fn availability_zone(&self) -> &str {
        &self.availability_zone
    }

    pub fn flavor(&self) -> &str {
        &self.flavor
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    /// Whitelist key: `/dataCenter/availabilityZone`
    pub fn prefix(&self) -> String {
        format!("/{}/{}", self.data_center, self.availability_zone)
    }

    /// Stack without the app: `/dataCenter/availabilityZone/flavor`
    pub fn stack_prefix(&self) -> String {
        format!("{}/{}", self.prefix(), self.flavor)
    }

    /// True when `path` (a bare flavor or a stack prefix) selects this stack
    ///
    /// Both forms compare exactly, like whitelist prefixes.
    pub fn matches_server_path(&self, path: &str) -> bool {
        if path.starts_with('/') {
            self.stack_prefix() == path.trim_end_matches('/')
        } else {
            self.flavor == path
        }
    }
}

impl fmt::Display for StackPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.app_name {
            Some(app) => write!(f, "{}/{}", self.stack_prefix(), app),
            None => write!(f, "{}", self.stack_prefix()),
        }
    }
}

impl FromStr for StackPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        StackPath::parse(s)
    }
}

/// Addresses of one registered host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HostAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
}

impl HostAddress {
    pub fn v4(address: impl Into<String>) -> Self {
        Self {
            ipv4: Some(address.into()),
            ipv6: None,
        }
    }

    pub fn dual(ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        Self {
            ipv4: Some(ipv4.into()),
            ipv6: Some(ipv6.into()),
        }
    }

    pub fn has_address(&self) -> bool {
        non_blank(&self.ipv4).is_some() || non_blank(&self.ipv6).is_some()
    }

    /// Address for the requested protocol version, if present and non-blank
    pub fn address(&self, version: IpProtocolVersion) -> Option<&str> {
        match version {
            IpProtocolVersion::V4 => non_blank(&self.ipv4),
            IpProtocolVersion::V6 => non_blank(&self.ipv6),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// One stack and its hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackData {
    pub path: String,
    #[serde(default)]
    pub hosts: Vec<HostAddress>,
}

impl StackData {
    pub fn new(path: impl Into<String>, hosts: Vec<HostAddress>) -> Self {
        Self {
            path: path.into(),
            hosts,
        }
    }

    pub fn stack_path(&self) -> Result<StackPath> {
        StackPath::parse(&self.path)
    }
}

/// Versioned, normalised set of stacks
///
/// Stacks with the same path are merged, hosts without any address are
/// dropped and the result is ordered by path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StacksSnapshot {
    pub version: i64,
    pub stacks: Vec<StackData>,
}

impl StacksSnapshot {
    pub fn new(version: i64, stacks: Vec<StackData>) -> Self {
        let mut merged: BTreeMap<String, Vec<HostAddress>> = BTreeMap::new();
        for stack in stacks {
            let hosts = merged.entry(stack.path).or_default();
            for host in stack.hosts.into_iter().filter(HostAddress::has_address) {
                if !hosts.contains(&host) {
                    hosts.push(host);
                }
            }
        }

        Self {
            version,
            stacks: merged
                .into_iter()
                .map(|(path, hosts)| StackData { path, hosts })
                .collect(),
        }
    }

    pub fn host_count(&self) -> usize {
        self.stacks.iter().map(|s| s.hosts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.host_count() == 0
    }
}
