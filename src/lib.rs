//! An RFC 9535 JSONPath engine for [`serde_json::Value`] trees.
//!
//! A query is compiled once into a [`Query`] and applied any number of
//! times, producing a [`NodeList`]: the matched values in document
//! order, each paired with its location and normalized path.
//!
//! ```
//! use jsonpath_query::jsonpath;
//! use serde_json::json;
//!
//! fn main() -> Result<(), jsonpath_query::JSONPathError> {
//!     let doc = json!({
//!         "users": [
//!             {"name": "Sue", "score": 100},
//!             {"name": "John", "score": 86}
//!         ]
//!     });
//!
//!     let nodes = jsonpath::find("$.users[?@.score > 90].name", &doc)?;
//!     assert_eq!(nodes.values(), vec![&json!("Sue")]);
//!     assert_eq!(nodes.first().unwrap().path(), "$['users'][0]['name']");
//!     Ok(())
//! }
//! ```
//!
//! Compiled queries display in their canonical form and can be shared
//! freely between threads:
//!
//! ```
//! use jsonpath_query::Query;
//!
//! let q = Query::standard("$..foo[0]").unwrap();
//! assert_eq!(q.to_string(), "$..['foo'][0]");
//! ```
//!
//! Only the standard filter functions of RFC 9535 are available:
//! `length`, `count`, `match`, `search` and `value`. Their signatures
//! are checked at compile time; a query that compiles will not fail
//! when applied.

pub mod env;
pub mod errors;
pub mod filter;
pub mod function;
pub mod iter;
pub mod jsonpath;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod query;
pub mod segment;
pub mod selector;
pub mod standard_functions;
mod token;

pub use env::Environment;
pub use env::ENV;
pub use errors::JSONPathError;
pub use errors::JSONPathErrorType;
pub use function::ExpressionType;
pub use function::FunctionSignature;
pub use iter::QueryIter;
pub use jsonpath::{compile, find, find_one, finditer};
pub use node::{Location, Node, NodeList, PathStep};
pub use parser::Parser;
pub use query::Query;
