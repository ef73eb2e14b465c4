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

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 2024
    /// ```
    Integer(i64),

    /// String literal enclosed in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// "done"
    /// 'in progress'
    /// ```
    String(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    /// Null value
    Null,

    /// Raw body of a `date(...)` literal, captured without tokenizing
    ///
    /// The parser interprets the body (`today`, `tomorrow`, `yesterday`,
    /// or a `YYYY-M-D` date). Captured raw because `2024-01-01` would
    /// otherwise lex as a subtraction chain.
    ///
    /// # Examples
    /// ```text
    /// date(today)       -> DateSpan("today")
    /// date(2024-01-01)  -> DateSpan("2024-01-01")
    /// ```
    DateSpan(String),

    /// Raw body of a `dur(...)` literal, captured without tokenizing
    ///
    /// # Examples
    /// ```text
    /// dur(7 days)   -> DurSpan("7 days")
    /// dur(1 week)   -> DurSpan("1 week")
    /// ```
    DurSpan(String),

    // Identifiers
    /// Property or function name
    ///
    /// Must start with a letter or underscore, followed by letters,
    /// digits, underscores, or dashes.
    ///
    /// # Examples
    /// ```text
    /// status
    /// file
    /// due-date
    /// ```
    Identifier(String),

    // Comparison
    /// Equality operator (`=`)
    Eq,

    /// Inequality operator (`!=`)
    NotEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Arithmetic
    /// Addition or string concatenation
    Plus,

    /// Subtraction
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    /// Modulo
    Percent,

    // Logical
    /// Logical AND (`&` or the word `and`)
    And,

    /// Logical OR (`|` or the word `or`)
    Or,

    /// Logical negation prefix (`!`)
    Bang,

    // Delimiters
    /// Dot for property access
    Dot,

    /// Comma separating arguments or list elements
    Comma,

    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket for list literals and computed access
    LBracket,

    /// Right bracket
    RBracket,

    /// End of input
    Eof,
}

impl Token {
    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Float(n) => n.to_string(),
            Token::Integer(n) => n.to_string(),
            Token::String(s) => format!("\"{}\"", s),
            Token::Boolean(b) => b.to_string(),
            Token::Null => "null".to_string(),
            Token::DateSpan(s) => format!("date({})", s),
            Token::DurSpan(s) => format!("dur({})", s),
            Token::Identifier(s) => s.clone(),
            Token::Eq => "=".to_string(),
            Token::NotEq => "!=".to_string(),
            Token::Lt => "<".to_string(),
            Token::Gt => ">".to_string(),
            Token::LtEq => "<=".to_string(),
            Token::GtEq => ">=".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Percent => "%".to_string(),
            Token::And => "&".to_string(),
            Token::Or => "|".to_string(),
            Token::Bang => "!".to_string(),
            Token::Dot => ".".to_string(),
            Token::Comma => ",".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::LBracket => "[".to_string(),
            Token::RBracket => "]".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}
