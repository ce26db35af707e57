//! Wire documents
//!
//! Serde shapes of the documents produced by the control plane and kept in
//! backups. Field names follow the wire vocabulary (`if`, `items`, `return`,
//! `server`, `urlRule`, `distribution`, `negation`, `caseSensitive`, `type`,
//! ...). Expressions are externally tagged: `{"equals": {...}}`.

use redirector_core::CompareMode;
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Expression node as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpressionDto {
    Equals(RelationalDto),
    NotEqual(RelationalDto),
    GreaterThan(RelationalDto),
    GreaterOrEqual(RelationalDto),
    LessThan(RelationalDto),
    LessOrEqual(RelationalDto),
    Contains(ContainsDto),
    Matches(MatchesDto),
    InIpRange(InIpRangeDto),
    IsEmpty(IsEmptyDto),
    Percent(PercentDto),
    Random(PercentDto),
    And(LogicalDto),
    Or(LogicalDto),
    Xor(LogicalDto),
    If(IfDto),
}

impl ExpressionDto {
    /// Wire tag of this node
    pub fn tag(&self) -> &'static str {
        match self {
            ExpressionDto::Equals(_) => "equals",
            ExpressionDto::NotEqual(_) => "notEqual",
            ExpressionDto::GreaterThan(_) => "greaterThan",
            ExpressionDto::GreaterOrEqual(_) => "greaterOrEqual",
            ExpressionDto::LessThan(_) => "lessThan",
            ExpressionDto::LessOrEqual(_) => "lessOrEqual",
            ExpressionDto::Contains(_) => "contains",
            ExpressionDto::Matches(_) => "matches",
            ExpressionDto::InIpRange(_) => "inIpRange",
            ExpressionDto::IsEmpty(_) => "isEmpty",
            ExpressionDto::Percent(_) => "percent",
            ExpressionDto::Random(_) => "random",
            ExpressionDto::And(_) => "and",
            ExpressionDto::Or(_) => "or",
            ExpressionDto::Xor(_) => "xor",
            ExpressionDto::If(_) => "if",
        }
    }
}

/// `param <op> value`, or `param <op> namespacedList`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationalDto {
    pub param: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaced_list: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub compare_type: Option<CompareMode>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub negation: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainsDto {
    pub param: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_set: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaced_list: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub negation: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchesDto {
    pub param: String,
    pub pattern: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub negation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InIpRangeDto {
    pub param: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_set: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaced_list: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub negation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsEmptyDto {
    pub param: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub negation: bool,
}

/// Body of `percent` and `random`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentDto {
    pub percent: f64,

    #[serde(default, skip_serializing_if = "is_false")]
    pub negation: bool,
}

/// Body of `and`, `or` and `xor`; exactly two items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalDto {
    #[serde(default)]
    pub items: Vec<ExpressionDto>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub negation: bool,
}

/// Rule node
///
/// `items` holds exactly one condition, optionally followed by a nested
/// `if` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfDto {
    pub id: String,

    #[serde(default)]
    pub items: Vec<ExpressionDto>,

    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<ReturnDto>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_rule: Option<UrlRuleDto>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDto {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_non_whitelisted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRuleDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_protocol_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRuleDto {
    pub id: i64,
    pub percent: f64,
    pub server: ServerDto,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDto {
    #[serde(default)]
    pub rule: Vec<DistributionRuleDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_server: Option<ServerDto>,
}

/// Flavor rules document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectServerDto {
    #[serde(rename = "if", default)]
    pub rules: Vec<IfDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionDto>,

    /// Default server
    pub server: ServerDto,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultUrlRuleDto {
    pub url_rule: UrlRuleDto,
}

/// URL rules document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRulesDto {
    #[serde(rename = "if", default)]
    pub rules: Vec<IfDto>,

    pub default: DefaultUrlRuleDto,
}

/// Whitelist document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistDto {
    #[serde(default)]
    pub paths: Vec<String>,

    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespacedListDto {
    pub name: String,

    #[serde(default)]
    pub value: Vec<String>,
}

/// Namespaced lists document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespacedListsDto {
    #[serde(default)]
    pub version: i64,

    #[serde(default)]
    pub namespace: Vec<NamespacedListDto>,
}
