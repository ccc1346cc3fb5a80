//! # tq Query Language - Abstract Syntax Tree
//!
//! This module defines the tree a query is parsed into before evaluation.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (path steps, composition, filters)
//! - **[operators]** - Comparison operators
//! - **[query]** - A compiled, reusable query
//!
//! ## Quick Start
//!
//! ```text
//! .users[].email
//! ```
//!
//! Takes the `users` array, fans out over its elements and projects each
//! element's `email`.
//!
//! ## Core Concepts
//!
//! ### Streams, not values
//!
//! Every expression maps one input value to zero or more output values.
//! A path step downstream of `[]` runs once per element and the results are
//! flattened, in document order, into a single output sequence.
//!
//! ### Paths are pipes
//!
//! A dotted path is sugar for a left-nested pipeline of single steps:
//!
//! ```text
//! .users[].roles[]   ==   .users | .[] | .roles | .[]
//! ```
//!
//! ### Tolerance
//!
//! - **Missing keys** yield `null`
//! - **Out-of-range indices** yield `null` (negative indices count from the end)
//! - **Wrong shapes** are errors, unless the term is marked optional with `?`
//!
//! ## Examples
//!
//! ### Nested Fanout
//!
//! ```text
//! .users[].roles[]
//! ```
//!
//! ### Filtering
//!
//! ```text
//! .users[] | select(.age >= 18 and .active) | .name
//! ```
//!
//! ### Slices and Negative Indices
//!
//! ```text
//! .items[-1]
//! .items[1:3]
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;
pub mod query;

pub use tokens::{Spanned, Token};
pub use expressions::Expr;
pub use operators::CmpOp;
pub use query::Query;
