//! Per-request decision result

use super::stack::HostAddress;
use crate::ast::server::{IpProtocolVersion, Server};
use serde::{Deserialize, Serialize};

/// Concrete instance a request is redirected to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub server: Server,
    pub stack_path: Option<String>,
    pub address_v4: Option<String>,
    pub address_v6: Option<String>,

    /// Final URL, empty until the URL is built
    pub resolved_url: String,

    pub flavor: String,
    pub ip_protocol_version: IpProtocolVersion,
    pub is_advanced_rule: bool,
}

impl InstanceInfo {
    /// Instance backed by a registered host
    pub fn from_host(server: Server, stack_path: impl Into<String>, host: &HostAddress) -> Self {
        let flavor = server.flavor().to_string();
        Self {
            server,
            stack_path: Some(stack_path.into()),
            address_v4: host.ipv4.clone(),
            address_v6: host.ipv6.clone(),
            resolved_url: String::new(),
            flavor,
            ip_protocol_version: IpProtocolVersion::V4,
            is_advanced_rule: false,
        }
    }

    /// Instance for an advanced server, no host involved
    pub fn advanced(server: Server) -> Self {
        let resolved_url = server.url_template.clone();
        Self {
            flavor: String::new(),
            server,
            stack_path: None,
            address_v4: None,
            address_v6: None,
            resolved_url,
            ip_protocol_version: IpProtocolVersion::V4,
            is_advanced_rule: true,
        }
    }

    pub fn address(&self, version: IpProtocolVersion) -> Option<&str> {
        let address = match version {
            IpProtocolVersion::V4 => &self.address_v4,
            IpProtocolVersion::V6 => &self.address_v6,
        };
        address.as_deref().filter(|a| !a.trim().is_empty())
    }

    pub fn has_address(&self) -> bool {
        self.address(IpProtocolVersion::V4).is_some() || self.address(IpProtocolVersion::V6).is_some()
    }
}
