//! Expression AST nodes

use super::operator::{CompareMode, LogicalOperator, RelationalOperator};
use crate::error::CoreError;
use ipnet::IpNet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Leaf operand of an expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// Literal value
    Value(String),

    /// Named lookup in the request parameters
    Parameter(String),

    /// Reference to a named namespaced list
    NamespacedList(String),
}

impl Operand {
    pub fn value(value: impl Into<String>) -> Self {
        Operand::Value(value.into())
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Operand::Parameter(name.into())
    }

    pub fn namespaced_list(name: impl Into<String>) -> Self {
        Operand::NamespacedList(name.into())
    }
}

/// Regular expression compiled once when the expression is built
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Result<Self, CoreError> {
        let source = source.into();
        let regex = Regex::new(&source).map_err(|e| CoreError::InvalidPattern {
            pattern: source.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl TryFrom<String> for Pattern {
    type Error = CoreError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// Expression AST node
///
/// A closed set of boolean expressions. Logical nodes always have exactly
/// two children; longer chains are expressed by nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Relational comparison (equals, notEqual, greaterThan, ...)
    Relational {
        op: RelationalOperator,
        left: Operand,
        right: Operand,
        compare_mode: CompareMode,
        negate: bool,
        case_sensitive: bool,
    },

    /// Membership in an inline value set or in referenced namespaced lists
    Contains {
        operand: Operand,
        values: BTreeSet<String>,
        namespaced_lists: Vec<String>,
        negate: bool,
        case_sensitive: bool,
    },

    /// Regular expression match
    Matches {
        operand: Operand,
        pattern: Pattern,
        negate: bool,
    },

    /// Address inside inline IP/CIDR literals or referenced namespaced lists
    InIpRange {
        operand: Operand,
        ranges: Vec<IpNet>,
        namespaced_lists: Vec<String>,
        negate: bool,
    },

    /// Absent or blank value
    IsEmpty { operand: Operand, negate: bool },

    /// Sticky percentage bucket keyed on the client identifier
    Percent { percent: f64, negate: bool },

    /// Independent random draw per evaluation
    Random { percent: f64, negate: bool },

    /// Binary logical combination
    Logical {
        op: LogicalOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        negate: bool,
    },
}

impl Expression {
    /// Create a relational expression
    pub fn relational(op: RelationalOperator, left: Operand, right: Operand) -> Self {
        Expression::Relational {
            op,
            left,
            right,
            compare_mode: CompareMode::None,
            negate: false,
            case_sensitive: false,
        }
    }

    /// `param == value`
    pub fn equals(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self::relational(
            RelationalOperator::Equals,
            Operand::parameter(param),
            Operand::value(value),
        )
    }

    /// `param != value`
    pub fn not_equal(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self::relational(
            RelationalOperator::NotEqual,
            Operand::parameter(param),
            Operand::value(value),
        )
    }

    /// Create a contains expression over an inline value set
    pub fn contains<I, S>(param: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expression::Contains {
            operand: Operand::parameter(param),
            values: values.into_iter().map(Into::into).collect(),
            namespaced_lists: Vec::new(),
            negate: false,
            case_sensitive: false,
        }
    }

    /// Create a contains expression over namespaced lists
    pub fn contains_in_lists<I, S>(param: impl Into<String>, lists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expression::Contains {
            operand: Operand::parameter(param),
            values: BTreeSet::new(),
            namespaced_lists: lists.into_iter().map(Into::into).collect(),
            negate: false,
            case_sensitive: false,
        }
    }

    /// Create a regex match expression
    pub fn matches(param: impl Into<String>, pattern: Pattern) -> Self {
        Expression::Matches {
            operand: Operand::parameter(param),
            pattern,
            negate: false,
        }
    }

    /// Create an IP range expression
    pub fn in_ip_range(
        param: impl Into<String>,
        ranges: Vec<IpNet>,
        namespaced_lists: Vec<String>,
    ) -> Self {
        Expression::InIpRange {
            operand: Operand::parameter(param),
            ranges,
            namespaced_lists,
            negate: false,
        }
    }

    /// Create an isEmpty expression
    pub fn empty(param: impl Into<String>) -> Self {
        Expression::IsEmpty {
            operand: Operand::parameter(param),
            negate: false,
        }
    }

    pub fn percent(percent: f64) -> Self {
        Expression::Percent {
            percent,
            negate: false,
        }
    }

    pub fn random(percent: f64) -> Self {
        Expression::Random {
            percent,
            negate: false,
        }
    }

    /// Create a logical expression
    pub fn logical(op: LogicalOperator, left: Expression, right: Expression) -> Self {
        Expression::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
            negate: false,
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::logical(LogicalOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::logical(LogicalOperator::Or, left, right)
    }

    pub fn xor(left: Expression, right: Expression) -> Self {
        Self::logical(LogicalOperator::Xor, left, right)
    }

    /// Set the negation flag
    pub fn with_negation(mut self, value: bool) -> Self {
        match &mut self {
            Expression::Relational { negate, .. }
            | Expression::Contains { negate, .. }
            | Expression::Matches { negate, .. }
            | Expression::InIpRange { negate, .. }
            | Expression::IsEmpty { negate, .. }
            | Expression::Percent { negate, .. }
            | Expression::Random { negate, .. }
            | Expression::Logical { negate, .. } => *negate = value,
        }
        self
    }

    /// Set case sensitivity (no-op for variants without the attribute)
    pub fn with_case_sensitive(mut self, value: bool) -> Self {
        if let Expression::Relational { case_sensitive, .. }
        | Expression::Contains { case_sensitive, .. } = &mut self
        {
            *case_sensitive = value;
        }
        self
    }

    /// Set the compare mode (no-op for non-relational variants)
    pub fn with_compare_mode(mut self, mode: CompareMode) -> Self {
        if let Expression::Relational { compare_mode, .. } = &mut self {
            *compare_mode = mode;
        }
        self
    }

    /// Wire tag of this expression
    pub fn tag(&self) -> &'static str {
        match self {
            Expression::Relational { op, .. } => op.tag(),
            Expression::Contains { .. } => "contains",
            Expression::Matches { .. } => "matches",
            Expression::InIpRange { .. } => "inIpRange",
            Expression::IsEmpty { .. } => "isEmpty",
            Expression::Percent { .. } => "percent",
            Expression::Random { .. } => "random",
            Expression::Logical { op, .. } => op.tag(),
        }
    }

    /// Names of every namespaced list referenced anywhere in the tree
    pub fn referenced_lists(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_lists(&mut names);
        names
    }

    fn collect_lists<'a>(&'a self, names: &mut Vec<&'a str>) {
        fn operand_list<'a>(operand: &'a Operand, names: &mut Vec<&'a str>) {
            if let Operand::NamespacedList(name) = operand {
                names.push(name);
            }
        }

        match self {
            Expression::Relational { left, right, .. } => {
                operand_list(left, names);
                operand_list(right, names);
            }
            Expression::Contains {
                operand,
                namespaced_lists,
                ..
            }
            | Expression::InIpRange {
                operand,
                namespaced_lists,
                ..
            } => {
                operand_list(operand, names);
                names.extend(namespaced_lists.iter().map(String::as_str));
            }
            Expression::Matches { operand, .. } | Expression::IsEmpty { operand, .. } => {
                operand_list(operand, names)
            }
            Expression::Percent { .. } | Expression::Random { .. } => {}
            Expression::Logical { left, right, .. } => {
                left.collect_lists(names);
                right.collect_lists(names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_expression() {
        let expr = Expression::equals("mac", "AA:BB");
        match expr {
            Expression::Relational {
                op,
                left,
                right,
                compare_mode,
                negate,
                case_sensitive,
            } => {
                assert_eq!(op, RelationalOperator::Equals);
                assert_eq!(left, Operand::Parameter("mac".to_string()));
                assert_eq!(right, Operand::Value("AA:BB".to_string()));
                assert_eq!(compare_mode, CompareMode::None);
                assert!(!negate);
                assert!(!case_sensitive);
            }
            _ => panic!("Expected Relational expression"),
        }
    }

    #[test]
    fn test_builder_flags() {
        let expr = Expression::equals("version", "1.10")
            .with_compare_mode(CompareMode::Version)
            .with_negation(true)
            .with_case_sensitive(true);

        match expr {
            Expression::Relational {
                compare_mode,
                negate,
                case_sensitive,
                ..
            } => {
                assert_eq!(compare_mode, CompareMode::Version);
                assert!(negate);
                assert!(case_sensitive);
            }
            _ => panic!("Expected Relational expression"),
        }
    }

    #[test]
    fn test_logical_has_two_children() {
        let expr = Expression::and(
            Expression::equals("a", "1"),
            Expression::or(Expression::equals("b", "2"), Expression::percent(10.0)),
        );

        assert_eq!(expr.tag(), "and");
        match expr {
            Expression::Logical { left, right, .. } => {
                assert_eq!(left.tag(), "equals");
                assert_eq!(right.tag(), "or");
            }
            _ => panic!("Expected Logical expression"),
        }
    }

    #[test]
    fn test_referenced_lists() {
        let expr = Expression::and(
            Expression::contains_in_lists("mac", ["macs", "testers"]),
            Expression::in_ip_range("clientAddress", vec![], vec!["office".to_string()]),
        );

        assert_eq!(expr.referenced_lists(), vec!["macs", "testers", "office"]);
        assert!(Expression::percent(5.0).referenced_lists().is_empty());
    }

    #[test]
    fn test_pattern_compiles_once() {
        let pattern = Pattern::new("^xre-[0-9]+$").unwrap();
        assert!(pattern.is_match("xre-42"));
        assert!(!pattern.is_match("xre-abc"));
        assert_eq!(pattern.as_str(), "^xre-[0-9]+$");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Pattern::new("(unclosed").unwrap_err();
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_pattern_serde() {
        let pattern = Pattern::new("a+b").unwrap();
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(json, "\"a+b\"");

        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pattern);
        assert!(serde_json::from_str::<Pattern>("\"[\"").is_err());
    }
}
