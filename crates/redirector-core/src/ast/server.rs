//! Servers and URL parameters returned by rules

use serde::{Deserialize, Serialize};

/// URL template used when a server does not declare one
pub const DEFAULT_URL_TEMPLATE: &str = "{protocol}://{host}:{port}/{urn}";

/// Where a server came from in the rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnKind {
    /// Returned by a named rule, path is a flavor or a stack
    PathRule,
    /// The rule set's default server
    DefaultServer,
    /// Picked by the weighted distribution
    DistributionRule,
    /// Absolute URL, not a template
    Advanced,
}

/// Redirect target returned by a flavor rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Name reported back as `ruleName`
    pub name: String,

    /// URL template, or an absolute URL for advanced rules
    pub url_template: String,

    /// Bare flavor (`1.40`) or stack prefix (`/DC/Zone/1.40`)
    pub path: String,

    pub description: Option<String>,

    /// Honor this server only while its target stack is whitelisted
    pub non_whitelisted_only: bool,

    pub return_kind: ReturnKind,
}

impl Server {
    /// Create a server with the default URL template
    pub fn new(name: impl Into<String>, path: impl Into<String>, return_kind: ReturnKind) -> Self {
        Self {
            name: name.into(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            path: path.into(),
            description: None,
            non_whitelisted_only: false,
            return_kind,
        }
    }

    /// Create an advanced server redirecting to an absolute URL
    pub fn advanced(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url.into(),
            path: String::new(),
            description: None,
            non_whitelisted_only: false,
            return_kind: ReturnKind::Advanced,
        }
    }

    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_non_whitelisted_only(mut self, value: bool) -> Self {
        self.non_whitelisted_only = value;
        self
    }

    pub fn is_advanced(&self) -> bool {
        self.return_kind == ReturnKind::Advanced
    }

    /// True when `path` names a concrete stack rather than a bare flavor
    pub fn targets_stack(&self) -> bool {
        self.path.starts_with('/')
    }

    /// Flavor segment of `path`
    pub fn flavor(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// IP protocol version used to pick the host address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IpProtocolVersion {
    #[default]
    V4,
    V6,
}

impl IpProtocolVersion {
    /// Parse the wire form (`4` / `6`, `ipv4` / `ipv6`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "4" | "ipv4" | "v4" => Some(IpProtocolVersion::V4),
            "6" | "ipv6" | "v6" => Some(IpProtocolVersion::V6),
            _ => None,
        }
    }

    pub fn as_number(&self) -> u8 {
        match self {
            IpProtocolVersion::V4 => 4,
            IpProtocolVersion::V6 => 6,
        }
    }
}

/// URL parameters returned by URL rules
///
/// Rules may leave fields unset; the URL rule set's default fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UrlParams {
    pub protocol: Option<String>,
    pub port: Option<u16>,
    pub urn: Option<String>,
    pub ip_protocol_version: Option<IpProtocolVersion>,
}

impl UrlParams {
    pub fn new(
        protocol: impl Into<String>,
        port: u16,
        urn: impl Into<String>,
        ip_protocol_version: IpProtocolVersion,
    ) -> Self {
        Self {
            protocol: Some(protocol.into()),
            port: Some(port),
            urn: Some(urn.into()),
            ip_protocol_version: Some(ip_protocol_version),
        }
    }

    /// Fill unset fields from `defaults`
    pub fn merged_with(&self, defaults: &UrlParams) -> UrlParams {
        UrlParams {
            protocol: self.protocol.clone().or_else(|| defaults.protocol.clone()),
            port: self.port.or(defaults.port),
            urn: self.urn.clone().or_else(|| defaults.urn.clone()),
            ip_protocol_version: self.ip_protocol_version.or(defaults.ip_protocol_version),
        }
    }

    /// True when every field is set
    pub fn is_complete(&self) -> bool {
        self.protocol.is_some()
            && self.port.is_some()
            && self.urn.is_some()
            && self.ip_protocol_version.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let server = Server::new("default", "1.40", ReturnKind::DefaultServer);
        assert_eq!(server.url_template, DEFAULT_URL_TEMPLATE);
        assert!(!server.non_whitelisted_only);
        assert!(!server.is_advanced());
        assert!(!server.targets_stack());
        assert_eq!(server.flavor(), "1.40");
    }

    #[test]
    fn test_server_stack_path() {
        let server = Server::new("rule1", "/DC1/Zone1/1.41", ReturnKind::PathRule);
        assert!(server.targets_stack());
        assert_eq!(server.flavor(), "1.41");
    }

    #[test]
    fn test_advanced_server() {
        let server = Server::advanced("adv", "http://example.com/app");
        assert!(server.is_advanced());
        assert!(server.path.is_empty());
    }

    #[test]
    fn test_ip_protocol_version_parse() {
        assert_eq!(IpProtocolVersion::parse("4"), Some(IpProtocolVersion::V4));
        assert_eq!(IpProtocolVersion::parse(" IPv6 "), Some(IpProtocolVersion::V6));
        assert_eq!(IpProtocolVersion::parse("5"), None);
        assert_eq!(IpProtocolVersion::V6.as_number(), 6);
    }

    #[test]
    fn test_url_params_merge() {
        let defaults = UrlParams::new("xre", 10001, "shell", IpProtocolVersion::V4);
        let partial = UrlParams {
            port: Some(8080),
            ip_protocol_version: Some(IpProtocolVersion::V6),
            ..Default::default()
        };

        let merged = partial.merged_with(&defaults);
        assert_eq!(merged.protocol.as_deref(), Some("xre"));
        assert_eq!(merged.port, Some(8080));
        assert_eq!(merged.urn.as_deref(), Some("shell"));
        assert_eq!(merged.ip_protocol_version, Some(IpProtocolVersion::V6));
        assert!(merged.is_complete());
        assert!(!partial.is_complete());
    }
}
