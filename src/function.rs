//! Filter function machinery.
//!
//! RFC 9535 fixes the set of filter functions and types each one with
//! the three filter expression types: `ValueType`, `LogicalType` and
//! `NodesType`. Signatures are checked at compile time; implementations
//! are looked up at evaluation time through a [`FunctionRegister`].

use std::collections::HashMap;
use std::fmt::Debug;

use crate::filter::FilterResult;

/// One of the three filter expression types defined by RFC 9535.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    Value,
    Logical,
    Nodes,
}

#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub param_types: Vec<ExpressionType>,
    pub return_type: ExpressionType,
}

/// The declared signatures of the standard functions, used by the
/// parser for well-typedness checks.
pub fn standard_signatures() -> HashMap<String, FunctionSignature> {
    let mut functions = HashMap::new();

    functions.insert(
        "length".to_owned(),
        FunctionSignature {
            param_types: vec![ExpressionType::Value],
            return_type: ExpressionType::Value,
        },
    );

    functions.insert(
        "count".to_owned(),
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        },
    );

    functions.insert(
        "match".to_owned(),
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        },
    );

    functions.insert(
        "search".to_owned(),
        FunctionSignature {
            param_types: vec![ExpressionType::Value, ExpressionType::Value],
            return_type: ExpressionType::Logical,
        },
    );

    functions.insert(
        "value".to_owned(),
        FunctionSignature {
            param_types: vec![ExpressionType::Nodes],
            return_type: ExpressionType::Value,
        },
    );

    functions
}

/// A filter function implementation.
///
/// Arguments arrive already coerced to the parameter types declared by
/// [`FunctionExtension::signature`], so implementations never raise;
/// unexpected input degrades to `Nothing` or logical false.
pub trait FunctionExtension: Send + Sync {
    fn call<'v>(&self, args: Vec<FilterResult<'v>>) -> FilterResult<'v>;
    fn signature(&self) -> FunctionSignature;
}

impl Debug for dyn FunctionExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sig = self.signature();
        write!(f, "({:?}) -> {:?}", sig.param_types, sig.return_type)
    }
}

pub type FunctionRegister = HashMap<String, Box<dyn FunctionExtension>>;
