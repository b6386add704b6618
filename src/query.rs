//! A compiled JSONPath query.

use std::fmt;

use serde_json::Value;

use crate::{
    env::ENV,
    errors::JSONPathError,
    iter::QueryIter,
    node::{Node, NodeList},
    segment::Segment,
    selector::Selector,
};

/// A parsed and validated JSONPath query, ready to be applied to JSON
/// values any number of times. Compiled queries are immutable and can
/// be shared between threads.
///
/// A `Query` displays in its canonical bracketed form:
///
/// ```
/// use jsonpath_query::Query;
///
/// let q = Query::standard("$.users[?@.score > 85].name").unwrap();
/// assert_eq!(q.to_string(), "$['users'][?@['score'] > 85]['name']");
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    pub segments: Vec<Segment>,
}

impl Query {
    pub fn new(segments: Vec<Segment>) -> Self {
        Query { segments }
    }

    /// Compile `expr` against the standard environment.
    pub fn standard(expr: &str) -> Result<Self, JSONPathError> {
        ENV.compile(expr)
    }

    /// Apply this query to `value`, materializing the node list.
    pub fn find<'v>(&self, value: &'v Value) -> NodeList<'v> {
        QueryIter::new(&ENV, value, self).collect()
    }

    /// Apply this query to `value` and return the first node, if any.
    pub fn find_one<'v>(&self, value: &'v Value) -> Option<Node<'v>> {
        QueryIter::new(&ENV, value, self).next()
    }

    /// Apply this query to `value` lazily. Nodes are produced in the
    /// same order `find` would produce them.
    pub fn finditer<'v>(&self, value: &'v Value) -> QueryIter<'v> {
        QueryIter::new(&ENV, value, self)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A singular query selects at most one node: every segment is a
    /// child segment with a single name or index selector.
    pub fn is_singular(&self) -> bool {
        self.segments.iter().all(|segment| match segment {
            Segment::Child { selectors } => {
                selectors.len() == 1
                    && matches!(
                        selectors.first(),
                        Some(Selector::Name { .. } | Selector::Index { .. })
                    )
            }
            Segment::Recursive { .. } => false,
        })
    }

    pub(crate) fn segments_string(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<String>>()
            .join("")
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.segments_string())
    }
}
