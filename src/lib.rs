//! A jq-style path query engine for JSON documents.
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({"users": [{"roles": ["admin", "dev"]}, {"roles": ["qa"]}]});
//! let roles = tq_lang::evaluate_json(".users[].roles[]", &doc).unwrap();
//! assert_eq!(roles, vec![json!("admin"), json!("dev"), json!("qa")]);
//! ```
pub mod ast;
pub mod compare;
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod value;

pub use ast::{CmpOp, Expr, Query, Spanned, Token};
pub use error::{Error, EvalError, Expected, Position, SyntaxError, SyntaxErrorKind};
pub use evaluator::{Evaluator, Outputs};
pub use lexer::{Lexer, tokenize};
pub use options::Options;
pub use parser::{Parser, parse};
pub use value::{Kind, Map, Value};

/// Evaluates `query` against `document`, returning every result in order.
pub fn evaluate(query: &str, document: &Value) -> Result<Vec<Value>, Error> {
    evaluate_with(query, document, &Options::default())
}

pub fn evaluate_with(query: &str, document: &Value, options: &Options) -> Result<Vec<Value>, Error> {
    let query = Query::compile_with(query, options)?;
    Ok(query.evaluate(document)?)
}

/// [`evaluate`] for callers holding `serde_json` data.
pub fn evaluate_json(
    query: &str,
    document: &serde_json::Value,
) -> Result<Vec<serde_json::Value>, Error> {
    let results = evaluate(query, &Value::from(document))?;
    Ok(results.into_iter().map(serde_json::Value::from).collect())
}
