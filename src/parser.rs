use std::mem;

use crate::{
    ast::{CmpOp, Expr, Spanned, Token},
    error::{Position, SyntaxError, SyntaxErrorKind},
    lexer::Lexer,
    options::Options,
    value::Value,
};

pub struct Parser {
    lexer: Lexer,
    current: Spanned,
    depth: usize,
    max_nesting: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, SyntaxError> {
        Self::with_options(lexer, &Options::default())
    }

    pub fn with_options(mut lexer: Lexer, options: &Options) -> Result<Self, SyntaxError> {
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            depth: 0,
            max_nesting: options.max_nesting,
        })
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Takes the current token and moves past it.
    fn bump(&mut self) -> Result<Token, SyntaxError> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current, next).token)
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current.token) == mem::discriminant(token)
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        let kind = match &self.current.token {
            Token::Eof => SyntaxErrorKind::UnexpectedEof { expected },
            found => SyntaxErrorKind::UnexpectedToken {
                found: found.to_string(),
                expected,
            },
        };
        SyntaxError::new(kind, self.current.position)
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), SyntaxError> {
        if !self.check(&token) {
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    fn enter(&mut self, position: Position) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > self.max_nesting {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep(self.max_nesting),
                position,
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn leave_n(&mut self, levels: usize) {
        self.depth -= levels;
    }

    /// Parse a complete query. An empty query is the identity.
    pub fn parse(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(&Token::Eof) {
            return Ok(Expr::Identity);
        }
        let expr = self.parse_pipeline()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    fn parse_pipeline(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_comma()?;

        while self.check(&Token::Pipe) {
            self.advance()?;
            let right = self.parse_comma()?;
            left = Expr::pipe(left, right);
        }
        Ok(left)
    }

    fn parse_comma(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_or()?;

        while self.check(&Token::Comma) {
            self.advance()?;
            let right = self.parse_or()?;
            left = Expr::comma(left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        let mut operators = 0;

        // Each operator nests its left side one level deeper
        while self.check(&Token::Or) {
            self.enter(self.current.position)?;
            operators += 1;
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.leave_n(operators);
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_comparison()?;
        let mut operators = 0;

        // Each operator nests its left side one level deeper
        while self.check(&Token::And) {
            self.enter(self.current.position)?;
            operators += 1;
            self.advance()?;
            let right = self.parse_comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.leave_n(operators);
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_postfix()?;

        let op = match &self.current.token {
            Token::EqEq => CmpOp::Equal,
            Token::NotEq => CmpOp::NotEqual,
            Token::Lt => CmpOp::LessThan,
            Token::Gt => CmpOp::GreaterThan,
            Token::LtEq => CmpOp::LessEqual,
            Token::GtEq => CmpOp::GreaterEqual,
            _ => return Ok(left),
        };
        self.advance()?;
        let right = self.parse_postfix()?;

        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// A term followed by any number of path suffixes and `?` markers.
    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        // None while the term is a bare `.`, so `.[]` parses to Iterate alone
        let mut expr = self.parse_term()?;
        let mut optionals = 0;

        loop {
            let step = match &self.current.token {
                Token::Dot => {
                    let dot = self.current.position;
                    self.advance()?;
                    self.parse_field_name(dot)?
                }
                Token::LBracket => {
                    self.advance()?;
                    self.parse_bracket()?
                }
                Token::Question => {
                    self.enter(self.current.position)?;
                    optionals += 1;
                    self.advance()?;
                    expr = Some(Expr::Optional(Box::new(expr.unwrap_or(Expr::Identity))));
                    continue;
                }
                _ => break,
            };
            expr = Some(match expr {
                Some(base) => Expr::pipe(base, step),
                None => step,
            });
        }

        self.leave_n(optionals);
        Ok(expr.unwrap_or(Expr::Identity))
    }

    /// Parse a term. Returns `None` for a bare `.` so suffixes can attach
    /// to it directly.
    fn parse_term(&mut self) -> Result<Option<Expr>, SyntaxError> {
        let position = self.current.position;
        match &self.current.token {
            Token::Dot => {
                self.advance()?;
                // `. and .x` is a conjunction, `.and` a field
                let adjacent = self.current.position == position + 1;
                match self.current.token.field_name() {
                    Some(name) if adjacent => {
                        self.advance()?;
                        Ok(Some(Expr::Field(name)))
                    }
                    _ => Ok(None),
                }
            }
            Token::DotDot => {
                self.advance()?;
                Ok(Some(Expr::RecursiveDescent))
            }
            Token::LParen => {
                self.advance()?;
                self.enter(position)?;
                let inner = self.parse_pipeline()?;
                self.expect(Token::RParen, "')'")?;
                self.leave();
                Ok(Some(inner))
            }
            Token::Identifier(name) => match name.as_str() {
                "not" => {
                    self.advance()?;
                    Ok(Some(Expr::Not))
                }
                "select" => {
                    self.advance()?;
                    self.expect(Token::LParen, "'(' after select")?;
                    self.enter(position)?;
                    let condition = self.parse_pipeline()?;
                    self.expect(Token::RParen, "')'")?;
                    self.leave();
                    Ok(Some(Expr::Select(Box::new(condition))))
                }
                _ => Err(self.unexpected("'.', a literal or a builtin")),
            },
            Token::Minus => {
                self.advance()?;
                let literal = match &self.current.token {
                    Token::Integer(n) => Value::Integer(-*n),
                    Token::Float(n) => Value::Float(-*n),
                    _ => return Err(self.unexpected("a number after '-'")),
                };
                self.advance()?;
                Ok(Some(Expr::Literal(literal)))
            }
            Token::Integer(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::Boolean(_)
            | Token::Null => {
                let literal = match self.bump()? {
                    Token::Integer(n) => Value::Integer(n),
                    Token::Float(n) => Value::Float(n),
                    Token::String(s) => Value::String(s),
                    Token::Boolean(b) => Value::Boolean(b),
                    _ => Value::Null,
                };
                Ok(Some(Expr::Literal(literal)))
            }
            _ => Err(self.unexpected("a query term")),
        }
    }

    fn parse_field_name(&mut self, dot: Position) -> Result<Expr, SyntaxError> {
        match self.current.token.field_name() {
            Some(name) if self.current.position == dot + 1 => {
                self.advance()?;
                Ok(Expr::Field(name))
            }
            _ => Err(self.unexpected("a field name after '.'")),
        }
    }

    /// Parse the inside of `[...]`; the `[` is already consumed.
    fn parse_bracket(&mut self) -> Result<Expr, SyntaxError> {
        let step = match &self.current.token {
            Token::RBracket => Expr::Iterate,
            Token::String(name) => {
                let name = name.clone();
                self.advance()?;
                Expr::Field(name)
            }
            Token::Colon => {
                self.advance()?;
                let end = self.parse_bound()?;
                Expr::Slice { start: None, end }
            }
            Token::Integer(_) | Token::Minus => {
                let first = self.parse_signed_integer()?;
                if self.check(&Token::Colon) {
                    self.advance()?;
                    let end = self.parse_bound()?;
                    Expr::Slice {
                        start: Some(first),
                        end,
                    }
                } else {
                    Expr::Index(first)
                }
            }
            _ => return Err(self.unexpected("']', an index, a slice or a quoted key")),
        };

        self.expect(Token::RBracket, "']' to close '['")?;
        Ok(step)
    }

    fn parse_bound(&mut self) -> Result<Option<i64>, SyntaxError> {
        if self.check(&Token::RBracket) {
            Ok(None)
        } else {
            self.parse_signed_integer().map(Some)
        }
    }

    fn parse_signed_integer(&mut self) -> Result<i64, SyntaxError> {
        let negative = self.check(&Token::Minus);
        if negative {
            self.advance()?;
        }
        match &self.current.token {
            Token::Integer(n) => {
                let n = if negative { -*n } else { *n };
                self.advance()?;
                Ok(n)
            }
            _ => Err(self.unexpected("an integer")),
        }
    }
}

/// Parse a query with default [`Options`].
pub fn parse(query: &str) -> Result<Expr, SyntaxError> {
    parse_with(query, &Options::default())
}

pub fn parse_with(query: &str, options: &Options) -> Result<Expr, SyntaxError> {
    Parser::with_options(Lexer::new(query), options)?.parse()
}
