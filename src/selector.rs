//! Selectors and their array index arithmetic.

use std::fmt::{self, Write};

use serde_json::Value;

use crate::filter::FilterExpression;

/// A single selector within a segment.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Select a named object member, `['name']` or `.name`.
    Name { name: String },
    /// Select an array element by (possibly negative) index.
    Index { index: i64 },
    /// Select a range of array elements, `[start:stop:step]`.
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    /// Select all members or elements, `[*]` or `.*`.
    Wild,
    /// Select members or elements for which the expression is true.
    Filter { expression: Box<FilterExpression> },
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name { name } => write!(f, "'{name}'"),
            Selector::Index { index } => write!(f, "{index}"),
            Selector::Slice { start, stop, step } => {
                write!(
                    f,
                    "{}:{}:{}",
                    start.map(|i| i.to_string()).unwrap_or_default(),
                    stop.map(|i| i.to_string()).unwrap_or_default(),
                    step.map(|i| i.to_string())
                        .unwrap_or_else(|| String::from("1")),
                )
            }
            Selector::Wild => f.write_char('*'),
            Selector::Filter { expression } => write!(f, "?{expression}"),
        }
    }
}

/// Normalize a possibly negative array index. Returns `None` when the
/// index cannot fall within an array of `length` elements.
pub(crate) fn norm_index(index: i64, length: usize) -> Option<usize> {
    if index < 0 {
        index
            .checked_abs()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| length.checked_sub(i))
    } else {
        usize::try_from(index).ok().filter(|&i| i < length)
    }
}

/// Resolve a slice against `array` per RFC 9535 section 2.3.4,
/// returning `(index, element)` pairs in slice order.
pub(crate) fn slice<'v>(
    array: &'v [Value],
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Vec<(usize, &'v Value)> {
    let length = array.len() as i128;
    if length == 0 {
        return Vec::new();
    }

    let step = step.unwrap_or(1) as i128;
    if step == 0 {
        return Vec::new();
    }

    let norm = |i: i64| {
        let i = i as i128;
        if i < 0 {
            length + i
        } else {
            i
        }
    };

    let (start, stop) = if step > 0 {
        (
            start.map(norm).map_or(0, |i| i.clamp(0, length)),
            stop.map(norm).map_or(length, |i| i.clamp(0, length)),
        )
    } else {
        (
            start.map(norm).map_or(length - 1, |i| i.clamp(-1, length - 1)),
            stop.map(norm).map_or(-1, |i| i.clamp(-1, length - 1)),
        )
    };

    let mut selected = Vec::new();
    let mut i = start;

    if step > 0 {
        while i < stop {
            let index = i as usize;
            selected.push((index, &array[index]));
            i += step;
        }
    } else {
        while i > stop {
            let index = i as usize;
            selected.push((index, &array[index]));
            i += step;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn indices(
        array: &[Value],
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    ) -> Vec<usize> {
        slice(array, start, stop, step)
            .into_iter()
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn slice_defaults() {
        let array = json!([0, 1, 2, 3, 4]);
        let array = array.as_array().unwrap();
        assert_eq!(indices(array, None, None, None), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn slice_start_stop() {
        let array = json!([0, 1, 2, 3, 4]);
        let array = array.as_array().unwrap();
        assert_eq!(indices(array, Some(1), Some(3), None), vec![1, 2]);
    }

    #[test]
    fn slice_negative_start() {
        let array = json!([0, 1, 2, 3, 4]);
        let array = array.as_array().unwrap();
        assert_eq!(indices(array, Some(-2), None, None), vec![3, 4]);
    }

    #[test]
    fn slice_negative_step() {
        let array = json!([0, 1, 2, 3, 4]);
        let array = array.as_array().unwrap();
        assert_eq!(indices(array, Some(3), Some(0), Some(-1)), vec![3, 2, 1]);
    }

    #[test]
    fn slice_reverse_all() {
        let array = json!([0, 1, 2, 3, 4]);
        let array = array.as_array().unwrap();
        assert_eq!(indices(array, None, None, Some(-1)), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn slice_step_larger_than_array() {
        let array = json!([0, 1, 2]);
        let array = array.as_array().unwrap();
        assert_eq!(indices(array, None, None, Some(5)), vec![0]);
    }

    #[test]
    fn slice_zero_step_is_empty() {
        let array = json!([0, 1, 2]);
        let array = array.as_array().unwrap();
        assert!(indices(array, None, None, Some(0)).is_empty());
    }

    #[test]
    fn slice_out_of_bounds_clamped() {
        let array = json!([0, 1, 2]);
        let array = array.as_array().unwrap();
        assert_eq!(indices(array, Some(-17), Some(17), None), vec![0, 1, 2]);
    }

    #[test]
    fn norm_index_in_bounds() {
        assert_eq!(norm_index(0, 3), Some(0));
        assert_eq!(norm_index(2, 3), Some(2));
        assert_eq!(norm_index(-1, 3), Some(2));
        assert_eq!(norm_index(-3, 3), Some(0));
    }

    #[test]
    fn norm_index_out_of_bounds() {
        assert_eq!(norm_index(3, 3), None);
        assert_eq!(norm_index(-4, 3), None);
        assert_eq!(norm_index(0, 0), None);
    }
}
