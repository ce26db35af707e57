//! Rule AST definitions

use super::expression::Expression;
use super::server::{Server, UrlParams};
use serde::{Deserialize, Serialize};

/// Value produced by a matching rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnValue {
    Server(Server),
    UrlParams(UrlParams),
}

impl ReturnValue {
    pub fn as_server(&self) -> Option<&Server> {
        match self {
            ReturnValue::Server(server) => Some(server),
            ReturnValue::UrlParams(_) => None,
        }
    }

    pub fn as_url_params(&self) -> Option<&UrlParams> {
        match self {
            ReturnValue::UrlParams(params) => Some(params),
            ReturnValue::Server(_) => None,
        }
    }
}

/// Rule definition
///
/// `nested` is a rule-shaped last child. It both narrows the match (the
/// rule matches only if the nested rule matches too) and may carry the
/// return value when the rule itself declares none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule ID
    pub id: String,

    /// Condition that must hold
    pub condition: Expression,

    /// Rule-shaped last child, if any
    pub nested: Option<Box<Rule>>,

    /// Return value declared directly on this node
    pub return_value: Option<ReturnValue>,
}

impl Rule {
    /// Create a new rule without a return value
    pub fn new(id: impl Into<String>, condition: Expression) -> Self {
        Rule {
            id: id.into(),
            condition,
            nested: None,
            return_value: None,
        }
    }

    /// Set the return value
    pub fn with_return(mut self, return_value: ReturnValue) -> Self {
        self.return_value = Some(return_value);
        self
    }

    /// Set the nested rule
    pub fn with_nested(mut self, nested: Rule) -> Self {
        self.nested = Some(Box::new(nested));
        self
    }

    /// Resolve the externally visible return value.
    ///
    /// Starting at this node, while the current node has no return value,
    /// descend into its nested rule. Stops at the first node without one.
    pub fn resolve_return(&self) -> Option<&ReturnValue> {
        let mut node = self;
        loop {
            if let Some(return_value) = &node.return_value {
                return Some(return_value);
            }
            match &node.nested {
                Some(child) => node = child.as_ref(),
                None => return None,
            }
        }
    }

    /// Resolved server, if the rule returns one
    pub fn server(&self) -> Option<&Server> {
        self.resolve_return().and_then(ReturnValue::as_server)
    }

    /// Resolved URL params, if the rule returns them
    pub fn url_params(&self) -> Option<&UrlParams> {
        self.resolve_return().and_then(ReturnValue::as_url_params)
    }

    /// Conditions of this node and every nested node, outermost first
    pub fn conditions(&self) -> Vec<&Expression> {
        let mut conditions = vec![&self.condition];
        let mut node = self;
        while let Some(child) = &node.nested {
            conditions.push(&child.condition);
            node = child.as_ref();
        }
        conditions
    }

    /// Namespaced lists referenced anywhere in this rule
    pub fn referenced_lists(&self) -> Vec<&str> {
        self.conditions()
            .into_iter()
            .flat_map(Expression::referenced_lists)
            .collect()
    }
}
