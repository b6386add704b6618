use std::fmt;

use crate::selector::Selector;

/// A segment of a query. A child segment applies its selectors to each
/// input node; a recursive segment applies them to each input node and
/// every descendant of it, visited in document order.
#[derive(Debug, Clone)]
pub enum Segment {
    Child { selectors: Vec<Selector> },
    Recursive { selectors: Vec<Selector> },
}

impl Segment {
    pub fn selectors(&self) -> &[Selector] {
        match self {
            Segment::Child { selectors } => selectors,
            Segment::Recursive { selectors } => selectors,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selectors = self
            .selectors()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        match self {
            Segment::Child { .. } => write!(f, "[{}]", selectors),
            Segment::Recursive { .. } => write!(f, "..[{}]", selectors),
        }
    }
}
