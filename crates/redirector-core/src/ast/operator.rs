//! Operators for Redirector expressions

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationalOperator {
    /// Equal
    Equals,
    /// Not equal
    NotEqual,
    /// Greater than
    GreaterThan,
    /// Greater than or equal
    GreaterOrEqual,
    /// Less than
    LessThan,
    /// Less than or equal
    LessOrEqual,
}

impl RelationalOperator {
    /// Returns true if this operator depends on ordering rather than equality
    pub fn is_ordering(&self) -> bool {
        !matches!(self, RelationalOperator::Equals | RelationalOperator::NotEqual)
    }

    /// Apply the operator to the ordering of left against right
    pub fn test(&self, ordering: Ordering) -> bool {
        match self {
            RelationalOperator::Equals => ordering == Ordering::Equal,
            RelationalOperator::NotEqual => ordering != Ordering::Equal,
            RelationalOperator::GreaterThan => ordering == Ordering::Greater,
            RelationalOperator::GreaterOrEqual => ordering != Ordering::Less,
            RelationalOperator::LessThan => ordering == Ordering::Less,
            RelationalOperator::LessOrEqual => ordering != Ordering::Greater,
        }
    }

    /// Wire tag of this operator
    pub fn tag(&self) -> &'static str {
        match self {
            RelationalOperator::Equals => "equals",
            RelationalOperator::NotEqual => "notEqual",
            RelationalOperator::GreaterThan => "greaterThan",
            RelationalOperator::GreaterOrEqual => "greaterOrEqual",
            RelationalOperator::LessThan => "lessThan",
            RelationalOperator::LessOrEqual => "lessOrEqual",
        }
    }
}

/// Logical operators. Each combines exactly two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
    Xor,
}

impl LogicalOperator {
    /// Combine two already-evaluated children
    pub fn combine(&self, left: bool, right: bool) -> bool {
        match self {
            LogicalOperator::And => left && right,
            LogicalOperator::Or => left || right,
            LogicalOperator::Xor => left ^ right,
        }
    }

    /// Wire tag of this operator
    pub fn tag(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
            LogicalOperator::Xor => "xor",
        }
    }
}

/// How the operands of a relational expression are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompareMode {
    /// Numeric when both sides parse as numbers, string otherwise
    #[default]
    None,
    String,
    Numeric,
    Version,
    Ipv6,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relational_is_ordering() {
        assert!(!RelationalOperator::Equals.is_ordering());
        assert!(!RelationalOperator::NotEqual.is_ordering());
        assert!(RelationalOperator::GreaterThan.is_ordering());
        assert!(RelationalOperator::LessOrEqual.is_ordering());
    }

    #[test]
    fn test_relational_test_ordering() {
        assert!(RelationalOperator::Equals.test(Ordering::Equal));
        assert!(RelationalOperator::NotEqual.test(Ordering::Less));
        assert!(RelationalOperator::GreaterOrEqual.test(Ordering::Equal));
        assert!(!RelationalOperator::GreaterThan.test(Ordering::Equal));
        assert!(RelationalOperator::LessThan.test(Ordering::Less));
        assert!(!RelationalOperator::LessOrEqual.test(Ordering::Greater));
    }

    #[test]
    fn test_logical_combine() {
        assert!(LogicalOperator::And.combine(true, true));
        assert!(!LogicalOperator::And.combine(true, false));
        assert!(LogicalOperator::Or.combine(false, true));
        assert!(!LogicalOperator::Or.combine(false, false));
        assert!(LogicalOperator::Xor.combine(true, false));
        assert!(!LogicalOperator::Xor.combine(true, true));
    }

    #[test]
    fn test_compare_mode_wire_names() {
        let mode: CompareMode = serde_json::from_str("\"VERSION\"").unwrap();
        assert_eq!(mode, CompareMode::Version);
        assert_eq!(serde_json::to_string(&CompareMode::Ipv6).unwrap(), "\"IPV6\"");
        assert_eq!(CompareMode::default(), CompareMode::None);
    }
}
