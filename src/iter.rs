//! Lazy query application.
//!
//! [`QueryIter`] is the single evaluation engine: eager application
//! collects it into a [`NodeList`](crate::node::NodeList). Segments are
//! chained into a pipeline of iterators, each pulling one node at a
//! time from the previous stage, so the first match of a query over a
//! large document does not require materializing every intermediate
//! node list.

use std::iter;

use serde_json::Value;

use crate::{
    env::Environment,
    filter::FilterExpression,
    node::Node,
    query::Query,
    segment::Segment,
    selector::{norm_index, slice, Selector},
};

pub(crate) type NodeIter<'v> = Box<dyn Iterator<Item = Node<'v>> + 'v>;

/// A lazy sequence of nodes matching a query, in the order the eager
/// form would produce them.
pub struct QueryIter<'v> {
    it: NodeIter<'v>,
}

impl<'v> QueryIter<'v> {
    pub(crate) fn new(env: &'static Environment, root: &'v Value, query: &Query) -> Self {
        let init: NodeIter<'v> = Box::new(iter::once(Node::new_root(root)));

        let it = query.segments.iter().fold(init, |nodes, segment| {
            Box::new(SegmentIter::new(env, root, segment.clone(), nodes)) as NodeIter<'v>
        });

        Self { it }
    }
}

impl<'v> Iterator for QueryIter<'v> {
    type Item = Node<'v>;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }
}

/// Applies one segment to the nodes produced by the previous stage.
struct SegmentIter<'v> {
    env: &'static Environment,
    root: &'v Value,
    segment: Segment,
    input: NodeIter<'v>,
    output: NodeIter<'v>,
}

impl<'v> SegmentIter<'v> {
    fn new(env: &'static Environment, root: &'v Value, segment: Segment, input: NodeIter<'v>) -> Self {
        Self {
            env,
            root,
            segment,
            input,
            output: Box::new(iter::empty()),
        }
    }

    /// The nodes this segment produces for a single input node.
    fn nodes_for(&self, node: Node<'v>) -> NodeIter<'v> {
        let env = self.env;
        let root = self.root;

        match &self.segment {
            Segment::Child { selectors } => {
                let selectors = selectors.clone();
                Box::new(
                    selectors
                        .into_iter()
                        .flat_map(move |selector| SelectorIter::new(env, root, selector, node.clone())),
                )
            }
            Segment::Recursive { selectors } => {
                let selectors = selectors.clone();
                Box::new(visit(node).into_iter().flat_map(move |descendant| {
                    selectors.clone().into_iter().flat_map(move |selector| {
                        SelectorIter::new(env, root, selector, descendant.clone())
                    })
                }))
            }
        }
    }
}

impl<'v> Iterator for SegmentIter<'v> {
    type Item = Node<'v>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.output.next() {
                return Some(node);
            }

            let node = self.input.next()?;
            self.output = self.nodes_for(node);
        }
    }
}

/// A node and all of its descendants in document order: the node
/// itself first, then object members in member order or array elements
/// by index, recursing pre-order.
fn visit(node: Node) -> Vec<Node> {
    let mut nodes = vec![node.clone()];

    match node.value {
        Value::Object(obj) => {
            for (name, value) in obj {
                nodes.extend(visit(node.child_member(value, name)));
            }
        }
        Value::Array(arr) => {
            for (index, value) in arr.iter().enumerate() {
                nodes.extend(visit(node.child_element(value, index)));
            }
        }
        _ => (),
    }

    nodes
}

/// Applies one selector to one node.
struct SelectorIter<'v> {
    it: NodeIter<'v>,
}

impl<'v> SelectorIter<'v> {
    fn new(env: &'static Environment, root: &'v Value, selector: Selector, node: Node<'v>) -> Self {
        let it: NodeIter<'v> = match selector {
            Selector::Name { name } => {
                match node.value.as_object().and_then(|obj| obj.get_key_value(&name)) {
                    Some((name, value)) => Box::new(iter::once(node.child_member(value, name))),
                    None => Box::new(iter::empty()),
                }
            }
            Selector::Index { index } => match node.value.as_array() {
                Some(array) => match norm_index(index, array.len()) {
                    Some(norm) => Box::new(iter::once(node.child_element(&array[norm], norm))),
                    None => Box::new(iter::empty()),
                },
                None => Box::new(iter::empty()),
            },
            Selector::Slice { start, stop, step } => match node.value.as_array() {
                Some(array) => Box::new(
                    slice(array, start, stop, step)
                        .into_iter()
                        .map(move |(index, value)| node.child_element(value, index)),
                ),
                None => Box::new(iter::empty()),
            },
            Selector::Wild => match node.value {
                Value::Object(obj) => {
                    Box::new(obj.iter().map(move |(name, value)| node.child_member(value, name)))
                }
                Value::Array(arr) => Box::new(
                    arr.iter()
                        .enumerate()
                        .map(move |(index, value)| node.child_element(value, index)),
                ),
                _ => Box::new(iter::empty()),
            },
            Selector::Filter { expression } => match node.value {
                Value::Array(arr) => Box::new(ArrayFilterIter {
                    env,
                    root,
                    expression: *expression,
                    it: arr.iter().enumerate(),
                    parent: node,
                }),
                Value::Object(obj) => Box::new(ObjectFilterIter {
                    env,
                    root,
                    expression: *expression,
                    it: obj.iter(),
                    parent: node,
                }),
                _ => Box::new(iter::empty()),
            },
        };

        Self { it }
    }
}

impl<'v> Iterator for SelectorIter<'v> {
    type Item = Node<'v>;

    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }
}

struct ArrayFilterIter<'v> {
    env: &'static Environment,
    root: &'v Value,
    expression: FilterExpression,
    it: iter::Enumerate<std::slice::Iter<'v, Value>>,
    parent: Node<'v>,
}

impl<'v> Iterator for ArrayFilterIter<'v> {
    type Item = Node<'v>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, value) = self.it.next()?;
            if self
                .expression
                .evaluate(self.env, self.root, value)
                .is_truthy()
            {
                return Some(self.parent.child_element(value, index));
            }
        }
    }
}

struct ObjectFilterIter<'v> {
    env: &'static Environment,
    root: &'v Value,
    expression: FilterExpression,
    it: serde_json::map::Iter<'v>,
    parent: Node<'v>,
}

impl<'v> Iterator for ObjectFilterIter<'v> {
    type Item = Node<'v>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (name, value) = self.it.next()?;
            if self
                .expression
                .evaluate(self.env, self.root, value)
                .is_truthy()
            {
                return Some(self.parent.child_member(value, name));
            }
        }
    }
}
