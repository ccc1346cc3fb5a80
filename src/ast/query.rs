use std::{fmt, str::FromStr};

use tracing::debug;

use crate::{
    ast::Expr,
    error::{EvalError, SyntaxError},
    evaluator::{Evaluator, Outputs},
    options::Options,
    parser,
    value::Value,
};

/// A compiled query.
///
/// Immutable once built and `Send + Sync`, so one compiled query can be
/// cached and run against many documents, from many threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Parsed expression tree
    pub root: Expr,

    evaluator: Evaluator,
}

impl Query {
    pub fn compile(text: &str) -> Result<Self, SyntaxError> {
        Self::compile_with(text, &Options::default())
    }

    pub fn compile_with(text: &str, options: &Options) -> Result<Self, SyntaxError> {
        let root = parser::parse_with(text, options).inspect_err(|e| {
            debug!(query = text, error = %e, "query rejected");
        })?;
        debug!(query = text, "query compiled");

        Ok(Query {
            root,
            evaluator: Evaluator::with_options(options),
        })
    }

    /// All results of this query on `document`, or the first error.
    pub fn evaluate(&self, document: &Value) -> Result<Vec<Value>, EvalError> {
        self.evaluator.evaluate(&self.root, document)
    }

    /// Lazily yields results; takes no notice of [`Options::limit`].
    pub fn stream<'a>(&'a self, document: &'a Value) -> Outputs<'a> {
        self.evaluator.stream(&self.root, document)
    }
}

impl FromStr for Query {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Query::compile(s)
    }
}

/// Canonical query text
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
