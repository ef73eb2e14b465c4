use crate::ast::Token;

/// Lexical error: the scanner could not produce a token at some position.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    /// The offending piece of input text
    pub fragment: String,
}

impl LexError {
    pub fn new(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        LexError {
            message: message.into(),
            fragment: fragment.into(),
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at '{}')", self.message, self.fragment)
    }
}

impl std::error::Error for LexError {}

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
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                // Dashes join identifiers only between alphanumerics, so
                // `due-date` is one name but `x -1` is not.
                if ch == '-' && !self.peek_char(1).is_some_and(|c| c.is_alphanumeric()) {
                    break;
                }
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let mut result = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(LexError::new(
                                "invalid escape sequence",
                                format!("\\{}", ch),
                            ));
                        }
                        None => {
                            return Err(LexError::new(
                                "unterminated string: unexpected end of input after backslash",
                                result,
                            ));
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new(
            "unterminated string: missing closing quote",
            result,
        ))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
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

        if is_float {
            number
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| LexError::new("invalid number", number))
        } else {
            number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| LexError::new("invalid number", number))
        }
    }

    /// Capture everything up to the matching close paren, quote-aware.
    ///
    /// Used for `date(...)` and `dur(...)` bodies, whose contents do not
    /// follow normal token rules (`2024-01-01` is a date, not arithmetic).
    /// The caller has already seen the opening paren.
    fn read_raw_span(&mut self, keyword: &str) -> Result<String, LexError> {
        self.advance(); // consume '('
        let mut result = String::new();
        let mut depth = 1usize;
        let mut quote: Option<char> = None;

        while let Some(ch) = self.current_char() {
            match quote {
                Some(q) => {
                    if ch == '\\' {
                        result.push(ch);
                        self.advance();
                        if let Some(next) = self.current_char() {
                            result.push(next);
                            self.advance();
                        }
                        continue;
                    }
                    if ch == q {
                        quote = None;
                    }
                }
                None => match ch {
                    '"' | '\'' => quote = Some(ch),
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            self.advance();
                            return Ok(result);
                        }
                    }
                    _ => {}
                },
            }
            result.push(ch);
            self.advance();
        }

        Err(LexError::new(
            format!("unbalanced parentheses in {}() literal", keyword),
            result,
        ))
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('&') => {
                self.advance();
                Ok(Token::And)
            }
            Some('|') => {
                self.advance();
                Ok(Token::Or)
            }
            Some('.') => {
                self.advance();
                Ok(Token::Dot)
            }
            Some(',') => {
                self.advance();
                Ok(Token::Comma)
            }
            Some('+') => {
                self.advance();
                Ok(Token::Plus)
            }
            Some('-') => {
                self.advance();
                Ok(Token::Minus)
            }
            Some('*') => {
                self.advance();
                Ok(Token::Star)
            }
            Some('/') => {
                self.advance();
                Ok(Token::Slash)
            }
            Some('%') => {
                self.advance();
                Ok(Token::Percent)
            }
            Some('=') => {
                self.advance();
                // Tolerate the `==` spelling alongside the canonical `=`
                if self.current_char() == Some('=') {
                    self.advance();
                }
                Ok(Token::Eq)
            }
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::GtEq)
                } else {
                    self.advance();
                    Ok(Token::Gt)
                }
            }
            Some('<') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::LtEq)
                } else {
                    self.advance();
                    Ok(Token::Lt)
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::NotEq)
                } else {
                    self.advance();
                    Ok(Token::Bang)
                }
            }
            Some('"') => self.read_string('"').map(Token::String),
            Some('\'') => self.read_string('\'').map(Token::String),
            Some('(') => {
                self.advance();
                Ok(Token::LParen)
            }
            Some(')') => {
                self.advance();
                Ok(Token::RParen)
            }
            Some('[') => {
                self.advance();
                Ok(Token::LBracket)
            }
            Some(']') => {
                self.advance();
                Ok(Token::RBracket)
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.to_ascii_lowercase().as_str() {
                    "and" => Ok(Token::And),
                    "or" => Ok(Token::Or),
                    "true" => Ok(Token::Boolean(true)),
                    "false" => Ok(Token::Boolean(false)),
                    "null" => Ok(Token::Null),
                    "date" if self.current_char() == Some('(') => {
                        self.read_raw_span("date").map(Token::DateSpan)
                    }
                    "dur" if self.current_char() == Some('(') => {
                        self.read_raw_span("dur").map(Token::DurSpan)
                    }
                    _ => Ok(Token::Identifier(ident)),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) => Err(LexError::new(
                format!("unexpected character at position {}", self.position),
                ch.to_string(),
            )),
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and OR true false null");
    assert_eq!(lexer.next_token().unwrap(), Token::And);
    assert_eq!(lexer.next_token().unwrap(), Token::Or);
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Null);
}

#[test]
fn test_comparison_tokens() {
    let mut lexer = Lexer::new("status != \"done\"");
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::Identifier("status".to_string())
    );
    assert_eq!(lexer.next_token().unwrap(), Token::NotEq);
    assert_eq!(lexer.next_token().unwrap(), Token::String("done".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}
