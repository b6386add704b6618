//! Convenience functions bound to the standard environment.

use serde_json::Value;

use crate::{
    env::ENV,
    errors::JSONPathError,
    iter::QueryIter,
    node::{Node, NodeList},
    query::Query,
};

/// Compile `expr` for repeated application to JSON values.
pub fn compile(expr: &str) -> Result<Query, JSONPathError> {
    ENV.compile(expr)
}

/// Find all nodes in `value` matching the JSONPath expression `expr`.
pub fn find<'v>(expr: &str, value: &'v Value) -> Result<NodeList<'v>, JSONPathError> {
    ENV.find(expr, value)
}

/// Find the first node in `value` matching `expr`, if any.
pub fn find_one<'v>(expr: &str, value: &'v Value) -> Result<Option<Node<'v>>, JSONPathError> {
    ENV.find_one(expr, value)
}

/// Iterate nodes in `value` matching `expr` lazily, in `find` order.
pub fn finditer<'v>(expr: &str, value: &'v Value) -> Result<QueryIter<'v>, JSONPathError> {
    ENV.finditer(expr, value)
}
