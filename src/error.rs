use std::fmt;

use thiserror::Error;

use crate::value::Kind;

/// Zero-based character offset into the query text.
pub type Position = usize;

/// What went wrong while tokenizing or parsing a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    UnexpectedCharacter(char),
    UnexpectedToken {
        found: String,
        expected: &'static str,
    },
    UnexpectedEof {
        expected: &'static str,
    },
    UnterminatedString,
    InvalidEscape(char),
    InvalidNumber(String),
    NestingTooDeep(usize),
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character '{}'", c),
            SyntaxErrorKind::UnexpectedToken { found, expected } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            SyntaxErrorKind::UnexpectedEof { expected } => {
                write!(f, "expected {}, found end of input", expected)
            }
            SyntaxErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            SyntaxErrorKind::InvalidEscape(c) => write!(f, "invalid escape sequence '\\{}'", c),
            SyntaxErrorKind::InvalidNumber(text) => write!(f, "invalid number '{}'", text),
            SyntaxErrorKind::NestingTooDeep(limit) => {
                write!(f, "query nesting exceeds the limit of {}", limit)
            }
        }
    }
}

/// A rejected query. Never carries a partial AST.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("syntax error at position {position}: {kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: Position) -> Self {
        SyntaxError { kind, position }
    }
}

/// The shape an operation required of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Object,
    Array,
    ArrayOrObject,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Object => f.write_str("object"),
            Expected::Array => f.write_str("array"),
            Expected::ArrayOrObject => f.write_str("array or object"),
        }
    }
}

/// Errors that can occur during query evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// An operation met a value of the wrong shape
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: Expected, got: Kind },
}

impl EvalError {
    pub fn type_mismatch(expected: Expected, got: Kind) -> Self {
        EvalError::TypeMismatch { expected, got }
    }
}

/// Any failure surfaced by [`evaluate`](crate::evaluate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
