use crate::{
    ast::{Spanned, Token},
    error::{Position, SyntaxError, SyntaxErrorKind},
};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, kind: SyntaxErrorKind, position: Position) -> SyntaxError {
        SyntaxError::new(kind, position)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self) -> Result<String, SyntaxError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.position;
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('u') => {
                            result.push(self.read_unicode_escape(escape_at)?);
                            continue;
                        }
                        Some(ch) => {
                            return Err(self.error(SyntaxErrorKind::InvalidEscape(ch), escape_at));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error(SyntaxErrorKind::UnterminatedString, start))
    }

    /// Reads the `XXXX` of a `\uXXXX` escape; the cursor sits on the `u`.
    fn read_unicode_escape(&mut self, escape_at: Position) -> Result<char, SyntaxError> {
        self.advance(); // Consume 'u'
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(SyntaxErrorKind::InvalidEscape('u'), escape_at))?;
            code = code * 16 + digit;
            self.advance();
        }
        char::from_u32(code).ok_or_else(|| self.error(SyntaxErrorKind::InvalidEscape('u'), escape_at))
    }

    fn read_number(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Exponent, only when digits follow
        if matches!(self.current_char(), Some('e' | 'E')) {
            let digits_at = match self.peek_char(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digits_at {
                    number.push(self.current_char().unwrap_or('e'));
                    self.advance();
                }
                while let Some(ch) = self.current_char().filter(|c| c.is_ascii_digit()) {
                    number.push(ch);
                    self.advance();
                }
            }
        }

        let invalid = |number: String| SyntaxError::new(SyntaxErrorKind::InvalidNumber(number), start);
        if is_float {
            number
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Token::Float)
                .ok_or_else(|| invalid(number))
        } else {
            number.parse::<i64>().map(Token::Integer).map_err(|_| invalid(number))
        }
    }

    /// Produces the next token. Once the input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Spanned, SyntaxError> {
        self.skip_whitespace();

        let position = self.position;
        let token = match self.current_char() {
            None => Token::Eof,
            Some('.') => {
                if self.peek_char(1) == Some('.') {
                    self.advance();
                    self.advance();
                    Token::DotDot
                } else {
                    self.advance();
                    Token::Dot
                }
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some('|') => {
                self.advance();
                Token::Pipe
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some('?') => {
                self.advance();
                Token::Question
            }
            Some('-') => {
                self.advance();
                Token::Minus
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::EqEq
                } else {
                    return Err(self.error(SyntaxErrorKind::UnexpectedCharacter('='), position));
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::NotEq
                } else {
                    return Err(self.error(SyntaxErrorKind::UnexpectedCharacter('!'), position));
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::LtEq
                } else {
                    self.advance();
                    Token::Lt
                }
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::GtEq
                } else {
                    self.advance();
                    Token::Gt
                }
            }
            Some('"') => Token::String(self.read_string()?),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => return Err(self.error(SyntaxErrorKind::UnexpectedCharacter(ch), position)),
        };

        Ok(Spanned { token, position })
    }
}

/// Splits a query into tokens, ending with exactly one `Eof`.
pub fn tokenize(query: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut lexer = Lexer::new(query);
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let done = spanned.token == Token::Eof;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
fn kinds(query: &str) -> Vec<Token> {
    tokenize(query)
        .unwrap()
        .into_iter()
        .map(|spanned| spanned.token)
        .collect()
}

#[test]
fn test_keywords() {
    assert_eq!(
        kinds("and or true false null"),
        vec![
            Token::And,
            Token::Or,
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Null,
            Token::Eof,
        ]
    );
}

#[test]
fn test_path() {
    assert_eq!(
        kinds(".users[].email"),
        vec![
            Token::Dot,
            Token::Identifier("users".to_string()),
            Token::LBracket,
            Token::RBracket,
            Token::Dot,
            Token::Identifier("email".to_string()),
            Token::Eof,
        ]
    );
}

#[test]
fn test_positions_are_char_offsets() {
    let err = tokenize(" .ü[0]").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnexpectedCharacter('ü'));
    assert_eq!(err.position, 2);

    let tokens = tokenize(".a [ 12 ]").unwrap();
    let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![0, 1, 3, 5, 8, 9]);
}
