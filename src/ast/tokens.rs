use std::fmt;

use crate::error::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Float(f64),

    /// Integer, used for indices, slice bounds and literals
    ///
    /// # Examples
    /// ```text
    /// 0
    /// 42
    /// ```
    Integer(i64),

    /// String literal enclosed in double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "first name"
    /// ```
    String(String),

    /// Boolean values
    Boolean(bool),

    /// Null value
    Null,

    // Identifiers
    /// Field name or builtin name
    ///
    /// Must start with letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// users
    /// item_count
    /// _internal
    /// ```
    Identifier(String),

    // Path
    /// Field access or identity
    ///
    /// # Examples
    /// ```text
    /// .
    /// .users
    /// ```
    Dot,

    /// Recursive descent
    DotDot,

    /// Left bracket for iteration, indices and slices
    LBracket,

    /// Right bracket
    RBracket,

    /// Optional marker, suppresses errors of the term it follows
    ///
    /// # Examples
    /// ```text
    /// .items[]?
    /// ```
    Question,

    // Composition
    /// Pipeline operator
    ///
    /// # Examples
    /// ```text
    /// .users[] | .email
    /// ```
    Pipe,

    /// Output concatenation
    ///
    /// # Examples
    /// ```text
    /// .name, .email
    /// ```
    Comma,

    /// Slice separator
    Colon,

    /// Sign of a negative index or number
    Minus,

    /// Left parenthesis for grouping or builtin arguments
    LParen,

    /// Right parenthesis
    RParen,

    // Comparison
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Logical
    /// Logical AND (word, not symbol)
    And,

    /// Logical OR (word, not symbol)
    Or,

    /// End of input
    Eof,
}

impl Token {
    /// The field name this token spells when it follows a `.`
    ///
    /// Keywords are valid field names: `.and`, `.null`.
    pub fn field_name(&self) -> Option<String> {
        match self {
            Token::Identifier(name) | Token::String(name) => Some(name.clone()),
            Token::Boolean(b) => Some(b.to_string()),
            Token::Null => Some("null".to_string()),
            Token::And => Some("and".to_string()),
            Token::Or => Some("or".to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Float(n) => write!(f, "number {:?}", n),
            Token::Integer(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::Boolean(b) => write!(f, "'{}'", b),
            Token::Null => f.write_str("'null'"),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::Dot => f.write_str("'.'"),
            Token::DotDot => f.write_str("'..'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::Question => f.write_str("'?'"),
            Token::Pipe => f.write_str("'|'"),
            Token::Comma => f.write_str("','"),
            Token::Colon => f.write_str("':'"),
            Token::Minus => f.write_str("'-'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::EqEq => f.write_str("'=='"),
            Token::NotEq => f.write_str("'!='"),
            Token::Lt => f.write_str("'<'"),
            Token::Gt => f.write_str("'>'"),
            Token::LtEq => f.write_str("'<='"),
            Token::GtEq => f.write_str("'>='"),
            Token::And => f.write_str("'and'"),
            Token::Or => f.write_str("'or'"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// A token together with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: Position,
}
