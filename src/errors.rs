use std::fmt;

use thiserror::Error;

/// The category of a [`JSONPathError`].
///
/// `SyntaxError` covers lexical and grammatical violations, `TypeError`
/// covers filter well-typedness violations found after the structural
/// parse, and `NameError` is reserved for unknown filter functions.
/// `InternalError` should be unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JSONPathErrorType {
    SyntaxError,
    TypeError,
    NameError,
    InternalError,
}

impl fmt::Display for JSONPathErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JSONPathErrorType::SyntaxError => f.write_str("syntax error:"),
            JSONPathErrorType::TypeError => f.write_str("type error:"),
            JSONPathErrorType::NameError => f.write_str("name error:"),
            JSONPathErrorType::InternalError => f.write_str("internal error:"),
        }
    }
}

/// An error raised when compiling a JSONPath expression.
///
/// `span` is the byte offset range of the offending token in the query
/// string. Compilation errors are never raised when applying a compiled
/// query to a value.
#[derive(Debug, Clone, Error)]
#[error("{kind} {msg} ({}..{})", .span.0, .span.1)]
pub struct JSONPathError {
    pub kind: JSONPathErrorType,
    pub msg: String,
    pub span: (usize, usize),
}

impl JSONPathError {
    pub fn new(kind: JSONPathErrorType, msg: String, span: (usize, usize)) -> Self {
        Self { kind, msg, span }
    }

    pub fn syntax(msg: String, span: (usize, usize)) -> Self {
        Self::new(JSONPathErrorType::SyntaxError, msg, span)
    }

    pub fn typ(msg: String, span: (usize, usize)) -> Self {
        Self::new(JSONPathErrorType::TypeError, msg, span)
    }

    pub fn name(msg: String, span: (usize, usize)) -> Self {
        Self::new(JSONPathErrorType::NameError, msg, span)
    }
}
