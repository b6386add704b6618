//! Filter expression trees and their evaluation.
//!
//! Filter expressions evaluate to one of the three RFC 9535 filter
//! types, encoded as [`FilterResult`]: a logical true/false, a single
//! JSON value or the special result `Nothing`, or a list of nodes.
//! `Nothing` only exists during filter evaluation; it never reaches an
//! output node list.

use std::fmt;

use serde_json::Value;

use crate::{
    env::Environment, function::ExpressionType, iter::QueryIter, node::NodeList, query::Query,
};

#[derive(Debug, Clone)]
pub enum FilterExpression {
    True,
    False,
    Null,
    String {
        value: String,
    },
    Int {
        value: i64,
    },
    Float {
        value: f64,
    },
    Not {
        expression: Box<FilterExpression>,
    },
    Logical {
        left: Box<FilterExpression>,
        operator: LogicalOperator,
        right: Box<FilterExpression>,
    },
    Comparison {
        left: Box<FilterExpression>,
        operator: ComparisonOperator,
        right: Box<FilterExpression>,
    },
    RelativeQuery {
        query: Box<Query>,
    },
    RootQuery {
        query: Box<Query>,
    },
    Function {
        name: String,
        args: Vec<FilterExpression>,
    },
}

impl FilterExpression {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            FilterExpression::True
                | FilterExpression::False
                | FilterExpression::Null
                | FilterExpression::String { .. }
                | FilterExpression::Int { .. }
                | FilterExpression::Float { .. }
        )
    }

    pub fn evaluate<'v>(
        &self,
        env: &'static Environment,
        root: &'v Value,
        current: &'v Value,
    ) -> FilterResult<'v> {
        match self {
            FilterExpression::True => FilterResult::Value(FilterValue::Bool(true)),
            FilterExpression::False => FilterResult::Value(FilterValue::Bool(false)),
            FilterExpression::Null => FilterResult::Value(FilterValue::Null),
            FilterExpression::String { value } => {
                FilterResult::Value(FilterValue::Str(value.clone()))
            }
            FilterExpression::Int { value } => FilterResult::Value(FilterValue::Int(*value)),
            FilterExpression::Float { value } => FilterResult::Value(FilterValue::Float(*value)),
            FilterExpression::Not { expression } => {
                FilterResult::Logical(!expression.evaluate(env, root, current).is_truthy())
            }
            FilterExpression::Logical {
                left,
                operator,
                right,
            } => {
                let left = left.evaluate(env, root, current).is_truthy();
                let right = right.evaluate(env, root, current).is_truthy();
                FilterResult::Logical(match operator {
                    LogicalOperator::And => left && right,
                    LogicalOperator::Or => left || right,
                })
            }
            FilterExpression::Comparison {
                left,
                operator,
                right,
            } => FilterResult::Logical(compare(
                left.evaluate(env, root, current),
                operator,
                right.evaluate(env, root, current),
            )),
            FilterExpression::RelativeQuery { query } => {
                FilterResult::Nodes(QueryIter::new(env, current, query).collect())
            }
            FilterExpression::RootQuery { query } => {
                FilterResult::Nodes(QueryIter::new(env, root, query).collect())
            }
            FilterExpression::Function { name, args } => match env.function_register.get(name) {
                Some(func) => {
                    let param_types = func.signature().param_types;
                    let args = args
                        .iter()
                        .map(|expr| expr.evaluate(env, root, current))
                        .enumerate()
                        .map(|(i, rv)| coerce_argument(rv, param_types.get(i)))
                        .collect();
                    func.call(args)
                }
                // The parser rejects queries naming unregistered functions.
                None => FilterResult::Value(FilterValue::Nothing),
            },
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::True => f.write_str("true"),
            FilterExpression::False => f.write_str("false"),
            FilterExpression::Null => f.write_str("null"),
            FilterExpression::String { value } => write!(f, "\"{value}\""),
            FilterExpression::Int { value } => write!(f, "{value}"),
            FilterExpression::Float { value } => write!(f, "{value}"),
            FilterExpression::Not { expression } => write!(f, "!{expression}"),
            FilterExpression::Logical {
                left,
                operator,
                right,
            } => write!(f, "({left} {operator} {right})"),
            FilterExpression::Comparison {
                left,
                operator,
                right,
            } => write!(f, "{left} {operator} {right}"),
            FilterExpression::RelativeQuery { query } => {
                write!(f, "@{}", query.segments_string())
            }
            FilterExpression::RootQuery { query } => {
                write!(f, "${}", query.segments_string())
            }
            FilterExpression::Function { name, args } => {
                write!(
                    f,
                    "{}({})",
                    name,
                    args.iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("&&"),
            LogicalOperator::Or => f.write_str("||"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Eq => f.write_str("=="),
            ComparisonOperator::Ne => f.write_str("!="),
            ComparisonOperator::Lt => f.write_str("<"),
            ComparisonOperator::Le => f.write_str("<="),
            ComparisonOperator::Gt => f.write_str(">"),
            ComparisonOperator::Ge => f.write_str(">="),
        }
    }
}

/// A value of RFC 9535 `ValueType`: a single JSON value or the special
/// result `Nothing`. String values from the query argument are copied;
/// arrays and objects are kept as references for structural comparison.
#[derive(Debug, Clone)]
pub enum FilterValue<'v> {
    Nothing,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ref(&'v Value),
}

impl<'v> FilterValue<'v> {
    pub fn from_value(value: &'v Value) -> Self {
        match value {
            Value::Null => FilterValue::Null,
            Value::Bool(b) => FilterValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FilterValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    FilterValue::Float(f)
                } else {
                    // Out of range for both i64 and f64.
                    FilterValue::Nothing
                }
            }
            Value::String(s) => FilterValue::Str(s.clone()),
            Value::Array(_) | Value::Object(_) => FilterValue::Ref(value),
        }
    }
}

/// The result of evaluating a filter expression.
#[derive(Debug, Clone)]
pub enum FilterResult<'v> {
    Logical(bool),
    Value(FilterValue<'v>),
    Nodes(NodeList<'v>),
}

impl<'v> FilterResult<'v> {
    /// Existence-test truthiness: a node list is true when non-empty,
    /// `Nothing` and logical/boolean false are false, anything else is
    /// true.
    pub fn is_truthy(&self) -> bool {
        match self {
            FilterResult::Logical(b) => *b,
            FilterResult::Nodes(nodes) => !nodes.is_empty(),
            FilterResult::Value(FilterValue::Nothing) => false,
            FilterResult::Value(FilterValue::Bool(b)) => *b,
            FilterResult::Value(_) => true,
        }
    }

    /// Convert to `ValueType` at a comparison boundary. A singular
    /// query's node list becomes its node's value, or `Nothing` when
    /// empty. Non-singular node lists cannot reach a comparison; the
    /// parser rejects them.
    fn into_value(self) -> FilterValue<'v> {
        match self {
            FilterResult::Value(value) => value,
            FilterResult::Logical(b) => FilterValue::Bool(b),
            FilterResult::Nodes(nodes) => {
                let mut nodes = nodes.into_iter();
                match (nodes.next(), nodes.next()) {
                    (Some(node), None) => FilterValue::from_value(node.value),
                    _ => FilterValue::Nothing,
                }
            }
        }
    }
}

/// Coerce a function argument to the declared parameter type. A node
/// list supplied for a non-`NodesType` parameter collapses to its single
/// node's value, or to `Nothing` when empty.
fn coerce_argument<'v>(
    rv: FilterResult<'v>,
    param_type: Option<&ExpressionType>,
) -> FilterResult<'v> {
    if matches!(param_type, Some(ExpressionType::Nodes)) {
        return rv;
    }

    match rv {
        FilterResult::Nodes(nodes) => match nodes.len() {
            0 => FilterResult::Value(FilterValue::Nothing),
            1 => match nodes.into_iter().next() {
                Some(node) => FilterResult::Value(FilterValue::from_value(node.value)),
                None => FilterResult::Value(FilterValue::Nothing),
            },
            _ => FilterResult::Nodes(nodes),
        },
        _ => rv,
    }
}

fn compare(left: FilterResult, operator: &ComparisonOperator, right: FilterResult) -> bool {
    use ComparisonOperator::*;
    let left = left.into_value();
    let right = right.into_value();
    match operator {
        Eq => eq(&left, &right),
        Ne => !eq(&left, &right),
        Lt => lt(&left, &right),
        Gt => lt(&right, &left),
        Le => lt(&left, &right) || eq(&left, &right),
        Ge => lt(&right, &left) || eq(&left, &right),
    }
}

fn eq(left: &FilterValue, right: &FilterValue) -> bool {
    use FilterValue::*;
    match (left, right) {
        (Nothing, Nothing) => true,
        (Nothing, _) | (_, Nothing) => false,
        (Null, Null) => true,
        (Bool(l), Bool(r)) => l == r,
        (Int(l), Int(r)) => l == r,
        (Float(l), Float(r)) => l == r,
        (Int(l), Float(r)) => *l as f64 == *r,
        (Float(l), Int(r)) => *l == *r as f64,
        (Str(l), Str(r)) => l == r,
        (Ref(l), Ref(r)) => l == r,
        _ => false,
    }
}

fn lt(left: &FilterValue, right: &FilterValue) -> bool {
    use FilterValue::*;
    match (left, right) {
        (Str(l), Str(r)) => l < r,
        (Int(l), Int(r)) => l < r,
        (Float(l), Float(r)) => l < r,
        (Int(l), Float(r)) => (*l as f64) < *r,
        (Float(l), Int(r)) => *l < *r as f64,
        _ => false,
    }
}
