//! The standard query environment.
//!
//! An [`Environment`] owns a [`Parser`] and the register of filter
//! function implementations. RFC 9535 fixes the function set, so one
//! standard environment, [`struct@ENV`], serves the whole process; the
//! convenience functions in [`crate::jsonpath`] and the methods on
//! [`Query`] all go through it.

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;
use serde_json::Value;

use crate::{
    errors::JSONPathError,
    function::FunctionRegister,
    iter::QueryIter,
    node::{Node, NodeList},
    parser::Parser,
    query::Query,
    standard_functions::{Count, Length, Match, Search, Value as ValueFn},
};

lazy_static! {
    pub static ref ENV: Environment = Environment::new();
}

#[derive(Debug)]
pub struct Environment {
    pub parser: Parser,
    pub function_register: FunctionRegister,
}

impl Environment {
    pub fn new() -> Self {
        let mut function_register: FunctionRegister = HashMap::new();
        function_register.insert("length".to_string(), Box::new(Length));
        function_register.insert("count".to_string(), Box::new(Count));
        function_register.insert("match".to_string(), Box::new(Match::new()));
        function_register.insert("search".to_string(), Box::new(Search::new()));
        function_register.insert("value".to_string(), Box::new(ValueFn));

        Self {
            parser: Parser::new(),
            function_register,
        }
    }

    /// Compile `expr` for repeated application to JSON values.
    pub fn compile(&self, expr: &str) -> Result<Query, JSONPathError> {
        debug!("compiling JSONPath expression {:?}", expr);
        self.parser.parse(expr)
    }

    /// Compile `expr` and apply it to `value` eagerly.
    pub fn find<'v>(
        &'static self,
        expr: &str,
        value: &'v Value,
    ) -> Result<NodeList<'v>, JSONPathError> {
        let query = self.compile(expr)?;
        Ok(QueryIter::new(self, value, &query).collect())
    }

    /// Compile `expr` and return the first node it matches in `value`.
    pub fn find_one<'v>(
        &'static self,
        expr: &str,
        value: &'v Value,
    ) -> Result<Option<Node<'v>>, JSONPathError> {
        let query = self.compile(expr)?;
        Ok(QueryIter::new(self, value, &query).next())
    }

    /// Compile `expr` and apply it to `value` lazily.
    pub fn finditer<'v>(
        &'static self,
        expr: &str,
        value: &'v Value,
    ) -> Result<QueryIter<'v>, JSONPathError> {
        let query = self.compile(expr)?;
        Ok(QueryIter::new(self, value, &query))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
