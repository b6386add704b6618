//! The five standard filter functions from RFC 9535 section 2.4.
//!
//! `match` and `search` validate patterns against the I-Regexp profile
//! (RFC 9485) before handing them to the regex engine, and cache
//! compiled patterns. An invalid pattern or a non-string operand gives
//! logical false; nothing here can fail a query application.

use std::{num::NonZeroUsize, sync::Mutex};

use lru::LruCache;
use regex::Regex;

use crate::{
    filter::{FilterResult, FilterValue},
    function::{ExpressionType, FunctionExtension, FunctionSignature},
};

const REGEX_CACHE_SIZE: usize = 100;

/// `length(v)`: Unicode scalar count for strings, element count for
/// arrays, member count for objects, `Nothing` for anything else.
pub struct Length;

impl FunctionExtension for Length {
    fn call<'v>(&self, args: Vec<FilterResult<'v>>) -> FilterResult<'v> {
        let length = match args.first() {
            Some(FilterResult::Value(FilterValue::Str(s))) => Some(s.chars().count()),
            Some(FilterResult::Value(FilterValue::Ref(value))) => {
                if let Some(array) = value.as_array() {
                    Some(array.len())
                } else {
                    value.as_object().map(|obj| obj.len())
                }
            }
            _ => None,
        };

        match length {
            Some(n) => FilterResult::Value(FilterValue::Int(n as i64)),
            None => FilterResult::Value(FilterValue::Nothing),
        }
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value],
            return_type: ExpressionType::Value,
        }
    }
}

/// `count(nodes)`: the number of nodes produced by the argument query.
pub struct Count;

impl FunctionExtension for Count {
    fn call<'v>(&self, args: Vec<FilterResult<'v>>) -> FilterResult<'v> {
        match args.first() {
            Some(FilterResult::Nodes(nodes)) => {
                FilterResult::Value(FilterValue::Int(nodes.len() as i64))
            }
            _ => FilterResult::Value(FilterValue::Nothing),
        }
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        }
    }
}

/// `value(nodes)`: the single node's value, or `Nothing` unless the
/// nodelist has exactly one node.
pub struct Value;

impl FunctionExtension for Value {
    fn call<'v>(&self, args: Vec<FilterResult<'v>>) -> FilterResult<'v> {
        match args.into_iter().next() {
            Some(FilterResult::Nodes(nodes)) if nodes.len() == 1 => {
                match nodes.into_iter().next() {
                    Some(node) => FilterResult::Value(FilterValue::from_value(node.value)),
                    None => FilterResult::Value(FilterValue::Nothing),
                }
            }
            _ => FilterResult::Value(FilterValue::Nothing),
        }
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        }
    }
}

/// `match(v, pattern)`: true when `v` is a string and the whole string
/// matches the I-Regexp `pattern`.
pub struct Match {
    cache: Mutex<LruCache<String, Regex>>,
}

impl Match {
    pub fn new() -> Self {
        Self {
            cache: new_regex_cache(),
        }
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Match {
    fn call<'v>(&self, args: Vec<FilterResult<'v>>) -> FilterResult<'v> {
        FilterResult::Logical(regex_test(&self.cache, &args, full_match))
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        }
    }
}

/// `search(v, pattern)`: true when `v` is a string and any substring
/// matches the I-Regexp `pattern`.
pub struct Search {
    cache: Mutex<LruCache<String, Regex>>,
}

impl Search {
    pub fn new() -> Self {
        Self {
            cache: new_regex_cache(),
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionExtension for Search {
    fn call<'v>(&self, args: Vec<FilterResult<'v>>) -> FilterResult<'v> {
        FilterResult::Logical(regex_test(&self.cache, &args, str::to_owned))
    }

    fn signature(&self) -> FunctionSignature {
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        }
    }
}

fn new_regex_cache() -> Mutex<LruCache<String, Regex>> {
    Mutex::new(LruCache::new(
        NonZeroUsize::new(REGEX_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
    ))
}

/// Shared implementation of `match` and `search`. `map_pattern`
/// rewrites the raw pattern before compilation; `match` anchors it to
/// the whole string.
fn regex_test(
    cache: &Mutex<LruCache<String, Regex>>,
    args: &[FilterResult],
    map_pattern: fn(&str) -> String,
) -> bool {
    let (subject, pattern) = match (args.first(), args.get(1)) {
        (
            Some(FilterResult::Value(FilterValue::Str(subject))),
            Some(FilterResult::Value(FilterValue::Str(pattern))),
        ) => (subject, pattern),
        _ => return false,
    };

    let mut cache = match cache.lock() {
        Ok(cache) => cache,
        Err(_) => return false,
    };

    if let Some(re) = cache.get(pattern) {
        return re.is_match(subject);
    }

    if !iregexp::check(pattern) {
        return false;
    }

    match Regex::new(&map_pattern(pattern)) {
        Ok(re) => {
            let matched = re.is_match(subject);
            cache.push(pattern.clone(), re);
            matched
        }
        Err(_) => false,
    }
}

/// Anchor a pattern so it must match the entire subject.
fn full_match(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterResult, FilterValue};

    fn str_arg(s: &str) -> FilterResult<'static> {
        FilterResult::Value(FilterValue::Str(s.to_owned()))
    }

    #[test]
    fn match_is_anchored() {
        let func = Match::new();
        assert!(matches!(
            func.call(vec![str_arg("ab"), str_arg("a.*")]),
            FilterResult::Logical(true)
        ));
        assert!(matches!(
            func.call(vec![str_arg("xab"), str_arg("a.*")]),
            FilterResult::Logical(false)
        ));
    }

    #[test]
    fn search_is_not_anchored() {
        let func = Search::new();
        assert!(matches!(
            func.call(vec![str_arg("xaby"), str_arg("a")]),
            FilterResult::Logical(true)
        ));
    }

    #[test]
    fn invalid_pattern_is_false() {
        let func = Match::new();
        assert!(matches!(
            func.call(vec![str_arg("ab"), str_arg("a(")]),
            FilterResult::Logical(false)
        ));
        let func = Search::new();
        assert!(matches!(
            func.call(vec![str_arg("ab"), str_arg("(?=a)")]),
            FilterResult::Logical(false)
        ));
    }

    #[test]
    fn non_string_operand_is_false() {
        let func = Match::new();
        assert!(matches!(
            func.call(vec![
                FilterResult::Value(FilterValue::Int(1)),
                str_arg("a.*")
            ]),
            FilterResult::Logical(false)
        ));
    }

    #[test]
    fn length_counts_scalar_values() {
        let func = Length;
        assert!(matches!(
            func.call(vec![str_arg("héllo")]),
            FilterResult::Value(FilterValue::Int(5))
        ));
    }
}
