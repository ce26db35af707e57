//! Rule parser
//!
//! Translates wire `if` nodes into `Rule` AST nodes, including nested rule
//! nodes, and checks that every rule resolves to a return value of the
//! kind its rule set expects.

use crate::dto::{ExpressionDto, IfDto, ReturnDto, ServerDto, UrlRuleDto};
use crate::error::{ParseError, Result};
use crate::expression_parser::ExpressionParser;
use redirector_core::ast::{
    IpProtocolVersion, ReturnKind, ReturnValue, Rule, Server, UrlParams,
};
use redirector_core::NamespacedLists;

/// Which return value a rule set expects from its rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnContext {
    /// Flavor rules return servers
    Server,
    /// URL rules return URL parameters
    UrlParams,
}

/// Rule parser
pub struct RuleParser;

impl RuleParser {
    /// Translate a rule and validate its resolved return value
    pub fn translate(dto: &IfDto, lists: &NamespacedLists, context: ReturnContext) -> Result<Rule> {
        let rule = Self::translate_node(dto, lists, context)?;

        match (context, rule.resolve_return()) {
            (_, None) => Err(ParseError::MissingReturn(rule.id.clone())),
            (ReturnContext::Server, Some(ReturnValue::Server(_)))
            | (ReturnContext::UrlParams, Some(ReturnValue::UrlParams(_))) => Ok(rule),
            (ReturnContext::Server, Some(_)) => Err(ParseError::UnexpectedReturn {
                rule: rule.id.clone(),
                expected: "a server".to_string(),
            }),
            (ReturnContext::UrlParams, Some(_)) => Err(ParseError::UnexpectedReturn {
                rule: rule.id.clone(),
                expected: "a urlRule".to_string(),
            }),
        }
    }

    fn translate_node(dto: &IfDto, lists: &NamespacedLists, context: ReturnContext) -> Result<Rule> {
        let (condition, nested) = match dto.items.as_slice() {
            [condition] => (condition, None),
            [condition, ExpressionDto::If(nested)] => (condition, Some(nested)),
            items => {
                return Err(ParseError::InvalidExpression {
                    tag: "if".to_string(),
                    message: format!(
                        "rule '{}' needs one condition and an optional nested rule, got {} items",
                        dto.id,
                        items.len()
                    ),
                })
            }
        };

        let mut rule = Rule::new(dto.id.clone(), ExpressionParser::translate(condition, lists)?);

        if let Some(nested) = nested {
            rule = rule.with_nested(Self::translate_node(nested, lists, context)?);
        }

        if let Some(return_dto) = &dto.return_value {
            rule = rule.with_return(Self::translate_return(&dto.id, return_dto)?);
        }

        Ok(rule)
    }

    fn translate_return(rule_id: &str, dto: &ReturnDto) -> Result<ReturnValue> {
        match (&dto.server, &dto.url_rule) {
            (Some(server), None) => Ok(ReturnValue::Server(Self::rule_server(server)?)),
            (None, Some(url_rule)) => Ok(ReturnValue::UrlParams(Self::url_params(url_rule)?)),
            _ => Err(ParseError::InvalidValue {
                field: format!("{}.return", rule_id),
                message: "exactly one of 'server' or 'urlRule' is required".to_string(),
            }),
        }
    }

    /// Server returned by a named rule: a path rule, or advanced when it
    /// has no path but an absolute URL
    pub fn rule_server(dto: &ServerDto) -> Result<Server> {
        let kind = if dto.path.trim().is_empty() {
            match &dto.url {
                Some(url) if !url.trim().is_empty() => ReturnKind::Advanced,
                _ => {
                    return Err(ParseError::MissingField {
                        field: format!("server '{}' path", dto.name),
                    })
                }
            }
        } else {
            ReturnKind::PathRule
        };
        Self::server(dto, kind)
    }

    /// Build a server of the given kind
    pub fn server(dto: &ServerDto, kind: ReturnKind) -> Result<Server> {
        if dto.name.trim().is_empty() {
            return Err(ParseError::MissingField {
                field: "server.name".to_string(),
            });
        }
        if kind != ReturnKind::Advanced && dto.path.trim().is_empty() {
            return Err(ParseError::MissingField {
                field: format!("server '{}' path", dto.name),
            });
        }

        let mut server = match kind {
            ReturnKind::Advanced => {
                Server::advanced(dto.name.clone(), dto.url.clone().unwrap_or_default())
            }
            _ => {
                let server = Server::new(dto.name.clone(), dto.path.trim(), kind);
                match &dto.url {
                    Some(url) if !url.trim().is_empty() => server.with_url_template(url.clone()),
                    _ => server,
                }
            }
        };

        if let Some(description) = &dto.description {
            server = server.with_description(description.clone());
        }
        Ok(server.with_non_whitelisted_only(dto.is_non_whitelisted))
    }

    /// Translate URL parameters; every field may be absent
    pub fn url_params(dto: &UrlRuleDto) -> Result<UrlParams> {
        let ip_protocol_version = dto
            .ip_protocol_version
            .as_deref()
            .map(|value| {
                IpProtocolVersion::parse(value).ok_or_else(|| ParseError::InvalidValue {
                    field: "urlRule.ipProtocolVersion".to_string(),
                    message: format!("'{}' is neither 4 nor 6", value),
                })
            })
            .transpose()?;

        Ok(UrlParams {
            protocol: dto.protocol.clone(),
            port: dto.port,
            urn: dto.urn.clone(),
            ip_protocol_version,
        })
    }
}
