//! Expression parser
//!
//! Translates wire expression nodes into `Expression` AST nodes. Structural
//! errors (wrong child count, misplaced `if`, bad literals, unknown lists)
//! are rejected here so they never reach evaluation.

use crate::dto::{ContainsDto, ExpressionDto, InIpRangeDto, LogicalDto, PercentDto, RelationalDto};
use crate::error::{ParseError, Result};
use ipnet::IpNet;
use redirector_core::ast::{
    CompareMode, Expression, LogicalOperator, Operand, Pattern, RelationalOperator,
};
use redirector_core::model::namespaced::parse_ip_range;
use redirector_core::NamespacedLists;

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Translate a wire expression, checking list references against `lists`
    pub fn translate(dto: &ExpressionDto, lists: &NamespacedLists) -> Result<Expression> {
        match dto {
            ExpressionDto::Equals(body) => Self::relational(RelationalOperator::Equals, body, lists),
            ExpressionDto::NotEqual(body) => {
                Self::relational(RelationalOperator::NotEqual, body, lists)
            }
            ExpressionDto::GreaterThan(body) => {
                Self::relational(RelationalOperator::GreaterThan, body, lists)
            }
            ExpressionDto::GreaterOrEqual(body) => {
                Self::relational(RelationalOperator::GreaterOrEqual, body, lists)
            }
            ExpressionDto::LessThan(body) => {
                Self::relational(RelationalOperator::LessThan, body, lists)
            }
            ExpressionDto::LessOrEqual(body) => {
                Self::relational(RelationalOperator::LessOrEqual, body, lists)
            }
            ExpressionDto::Contains(body) => Self::contains(body, lists),
            ExpressionDto::Matches(body) => {
                let pattern = Pattern::new(body.pattern.clone())?;
                Ok(Expression::matches(body.param.clone(), pattern).with_negation(body.negation))
            }
            ExpressionDto::InIpRange(body) => Self::in_ip_range(body, lists),
            ExpressionDto::IsEmpty(body) => {
                Ok(Expression::empty(body.param.clone()).with_negation(body.negation))
            }
            ExpressionDto::Percent(body) => {
                Ok(Expression::percent(Self::percent("percent", body)?).with_negation(body.negation))
            }
            ExpressionDto::Random(body) => {
                Ok(Expression::random(Self::percent("random", body)?).with_negation(body.negation))
            }
            ExpressionDto::And(body) => Self::logical(LogicalOperator::And, body, lists),
            ExpressionDto::Or(body) => Self::logical(LogicalOperator::Or, body, lists),
            ExpressionDto::Xor(body) => Self::logical(LogicalOperator::Xor, body, lists),
            ExpressionDto::If(rule) => Err(ParseError::InvalidExpression {
                tag: "if".to_string(),
                message: format!(
                    "rule '{}' may only appear as the last item of another rule",
                    rule.id
                ),
            }),
        }
    }

    fn relational(
        op: RelationalOperator,
        body: &RelationalDto,
        lists: &NamespacedLists,
    ) -> Result<Expression> {
        let right = match (&body.value, &body.namespaced_list) {
            (Some(value), None) => Operand::value(value.clone()),
            (None, Some(list)) => {
                Self::check_list(list, lists)?;
                Operand::namespaced_list(list.clone())
            }
            _ => {
                return Err(ParseError::InvalidExpression {
                    tag: op.tag().to_string(),
                    message: "exactly one of 'value' or 'namespacedList' is required".to_string(),
                })
            }
        };

        Ok(
            Expression::relational(op, Operand::parameter(body.param.clone()), right)
                .with_compare_mode(body.compare_type.unwrap_or(CompareMode::None))
                .with_negation(body.negation)
                .with_case_sensitive(body.case_sensitive),
        )
    }

    fn contains(body: &ContainsDto, lists: &NamespacedLists) -> Result<Expression> {
        if body.value_set.is_empty() && body.namespaced_list.is_empty() {
            return Err(ParseError::InvalidExpression {
                tag: "contains".to_string(),
                message: "either 'valueSet' or 'namespacedList' is required".to_string(),
            });
        }
        for list in &body.namespaced_list {
            Self::check_list(list, lists)?;
        }

        Ok(Expression::Contains {
            operand: Operand::parameter(body.param.clone()),
            values: body.value_set.iter().cloned().collect(),
            namespaced_lists: body.namespaced_list.clone(),
            negate: body.negation,
            case_sensitive: body.case_sensitive,
        })
    }

    fn in_ip_range(body: &InIpRangeDto, lists: &NamespacedLists) -> Result<Expression> {
        if body.value_set.is_empty() && body.namespaced_list.is_empty() {
            return Err(ParseError::InvalidExpression {
                tag: "inIpRange".to_string(),
                message: "either 'valueSet' or 'namespacedList' is required".to_string(),
            });
        }
        for list in &body.namespaced_list {
            Self::check_list(list, lists)?;
        }

        let ranges = body
            .value_set
            .iter()
            .map(|value| {
                parse_ip_range(value).ok_or_else(|| ParseError::InvalidValue {
                    field: "inIpRange.valueSet".to_string(),
                    message: format!("'{}' is not an IP or CIDR literal", value),
                })
            })
            .collect::<Result<Vec<IpNet>>>()?;

        Ok(
            Expression::in_ip_range(body.param.clone(), ranges, body.namespaced_list.clone())
                .with_negation(body.negation),
        )
    }

    fn logical(op: LogicalOperator, body: &LogicalDto, lists: &NamespacedLists) -> Result<Expression> {
        match body.items.as_slice() {
            [left, right] => Ok(Expression::logical(
                op,
                Self::translate(left, lists)?,
                Self::translate(right, lists)?,
            )
            .with_negation(body.negation)),
            items => Err(ParseError::InvalidExpression {
                tag: op.tag().to_string(),
                message: format!("expected exactly 2 items, got {}", items.len()),
            }),
        }
    }

    fn percent(tag: &str, body: &PercentDto) -> Result<f64> {
        if body.percent.is_finite() && (0.0..=100.0).contains(&body.percent) {
            Ok(body.percent)
        } else {
            Err(ParseError::InvalidValue {
                field: format!("{}.percent", tag),
                message: format!("{} is outside 0..=100", body.percent),
            })
        }
    }

    fn check_list(name: &str, lists: &NamespacedLists) -> Result<()> {
        if lists.has_list(name) {
            Ok(())
        } else {
            log::warn!("Rule references unknown namespaced list '{}'", name);
            Err(ParseError::UnknownNamespacedList(name.to_string()))
        }
    }
}
