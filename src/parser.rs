use std::mem;
use std::sync::LazyLock;

use regex::Regex;

use crate::{
    ast::{
        BinOp, DateValue, DurationUnit, DurationValue, Field, Header, Literal, NamedField,
        Operation, Query, SortDirection, SortField, Source, SourceOp, Token,
    },
    lexer::{LexError, Lexer},
};

/// Nesting bound for recursive descent. Exceeding it is a reported
/// failure, not a stack overflow.
const MAX_DEPTH: usize = 64;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static DUR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\s*([A-Za-z]+)$").unwrap());

/// Syntax error: the grammar could not match at some input position.
///
/// Returned through `Result`; parsing never panics and never produces a
/// partial AST.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// The offending piece of input text
    pub fragment: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            fragment: fragment.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.fragment.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (at '{}')", self.message, self.fragment)
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            fragment: e.fragment,
        }
    }
}

// ============================================================================
// Expression grammar
// ============================================================================

/// Recursive-descent parser for clause bodies.
///
/// Precedence, low to high: `or` < `and` < comparison < additive <
/// multiplicative. Function calls and property access bind tighter than
/// all operators.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            depth: 0,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if mem::discriminant(&self.current_token) != mem::discriminant(&expected) {
            return Err(ParseError::new(
                format!("expected '{}'", expected.describe()),
                self.current_token.describe(),
            ));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(
                format!("expression nesting exceeds {} levels", MAX_DEPTH),
                self.current_token.describe(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse a full expression and require that it consumes all input.
    pub fn parse(&mut self) -> Result<Field, ParseError> {
        let field = self.parse_expression()?;
        if !self.check(&Token::Eof) {
            return Err(ParseError::new(
                "unexpected trailing input",
                self.current_token.describe(),
            ));
        }
        Ok(field)
    }

    pub fn parse_expression(&mut self) -> Result<Field, ParseError> {
        self.enter()?;
        let result = self.parse_or();
        self.leave();
        result
    }

    fn parse_or(&mut self) -> Result<Field, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_and()?;

            left = Field::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Field, ParseError> {
        let mut left = self.parse_comparison()?;

        while self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_comparison()?;

            left = Field::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Field, ParseError> {
        let mut left = self.parse_additive()?;

        if let Some(op) = match &self.current_token {
            Token::Eq => Some(BinOp::Equal),
            Token::NotEq => Some(BinOp::NotEqual),
            Token::Lt => Some(BinOp::LessThan),
            Token::Gt => Some(BinOp::GreaterThan),
            Token::LtEq => Some(BinOp::LessEqual),
            Token::GtEq => Some(BinOp::GreaterEqual),
            _ => None,
        } {
            self.advance()?;
            let right = self.parse_additive()?;

            left = Field::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Field, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;

            left = Field::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Field, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;

            left = Field::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Field, ParseError> {
        if self.check(&Token::Bang) {
            self.advance()?;
            self.enter()?;
            let operand = self.parse_unary();
            self.leave();
            return Ok(Field::Negated(Box::new(operand?)));
        }

        if self.check(&Token::Minus) {
            self.advance()?;

            // Fold the sign into numeric literals; anything else becomes
            // a subtraction from zero.
            match &self.current_token {
                Token::Integer(n) => {
                    let n = *n;
                    self.advance()?;
                    return Ok(Field::Literal(Literal::Integer(-n)));
                }
                Token::Float(n) => {
                    let n = *n;
                    self.advance()?;
                    return Ok(Field::Literal(Literal::Float(-n)));
                }
                _ => {
                    self.enter()?;
                    let operand = self.parse_unary();
                    self.leave();
                    return Ok(Field::BinaryOp {
                        op: BinOp::Subtract,
                        left: Box::new(Field::integer(0)),
                        right: Box::new(operand?),
                    });
                }
            }
        }

        self.parse_access()
    }

    /// Parse property/index access chains: `a.b`, `a["b"]`, `f(x).y`.
    fn parse_access(&mut self) -> Result<Field, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.check(&Token::Dot) {
                self.advance()?;

                let name = match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::Identifier(n) => n,
                    token => {
                        return Err(ParseError::new(
                            "expected property name after '.'",
                            token.describe(),
                        ));
                    }
                };
                self.advance()?;

                expr = Field::Index {
                    object: Box::new(expr),
                    key: Box::new(Field::string(name)),
                };
            } else if self.check(&Token::LBracket) {
                self.advance()?;
                let key = self.parse_expression()?;
                self.expect(Token::RBracket)?;

                expr = Field::Index {
                    object: Box::new(expr),
                    key: Box::new(key),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Parse primary expressions: literals, variables, function calls,
    /// parenthesized groups, and list literals.
    fn parse_primary(&mut self) -> Result<Field, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Float(n) => {
                self.advance()?;
                Ok(Field::Literal(Literal::Float(n)))
            }
            Token::Integer(n) => {
                self.advance()?;
                Ok(Field::Literal(Literal::Integer(n)))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Field::Literal(Literal::String(s)))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Field::Literal(Literal::Boolean(b)))
            }
            Token::Null => {
                self.advance()?;
                Ok(Field::Literal(Literal::Null))
            }
            Token::DateSpan(body) => {
                self.advance()?;
                date_field(&body)
            }
            Token::DurSpan(body) => {
                self.advance()?;
                duration_field(&body)
            }

            // Variables and function calls
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    Ok(Field::Function { name, args })
                } else {
                    Ok(Field::Variable(name))
                }
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            // List literals
            Token::LBracket => {
                self.advance()?;
                let mut elements = vec![];
                while !self.check(&Token::RBracket) {
                    elements.push(self.parse_expression()?);
                    if !self.check(&Token::RBracket) {
                        self.expect(Token::Comma)?;
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(Field::List(elements))
            }

            token => Err(ParseError::new(
                "unexpected token in expression",
                token.describe(),
            )),
        }
    }

    /// Comma-separated argument list; the opening paren is consumed.
    fn parse_arguments(&mut self) -> Result<Vec<Field>, ParseError> {
        let mut args = vec![];
        while !self.check(&Token::RParen) {
            args.push(self.parse_expression()?);
            if !self.check(&Token::RParen) {
                self.expect(Token::Comma)?;
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }
}

/// Interpret a raw `date(...)` body.
///
/// Recognizes the relative keywords and `YYYY-M-D` calendar dates; any
/// other body is re-parsed as an ordinary expression and kept as a `date`
/// function call (e.g. `date(file.ctime)`).
fn date_field(body: &str) -> Result<Field, ParseError> {
    let trimmed = strip_quotes(body.trim());

    match trimmed.to_ascii_lowercase().as_str() {
        "today" => return Ok(Field::Literal(Literal::Date(DateValue::Today))),
        "tomorrow" => return Ok(Field::Literal(Literal::Date(DateValue::Tomorrow))),
        "yesterday" => return Ok(Field::Literal(Literal::Date(DateValue::Yesterday))),
        _ => {}
    }

    if let Some(caps) = DATE_RE.captures(trimmed) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(ParseError::new("invalid calendar date", trimmed));
        }
        return Ok(Field::Literal(Literal::Date(DateValue::Ymd {
            year,
            month,
            day,
        })));
    }

    let arg = parse_field_text(body)?;
    Ok(Field::Function {
        name: "date".to_string(),
        args: vec![arg],
    })
}

/// Interpret a raw `dur(...)` body (`N unit`).
fn duration_field(body: &str) -> Result<Field, ParseError> {
    let trimmed = strip_quotes(body.trim());

    if let Some(caps) = DUR_RE.captures(trimmed) {
        let amount: i64 = caps[1]
            .parse()
            .map_err(|_| ParseError::new("duration amount out of range", trimmed))?;
        if let Some(unit) = duration_unit(&caps[2]) {
            // Week amounts later convert to days, so bound them where the
            // times-seven conversion would overflow.
            if unit == DurationUnit::Weeks && amount > i64::MAX / 7 {
                return Err(ParseError::new("duration amount out of range", trimmed));
            }
            return Ok(Field::Literal(Literal::Duration(DurationValue::new(
                amount, unit,
            ))));
        }
        return Err(ParseError::new("unrecognized duration unit", &caps[2]));
    }

    let arg = parse_field_text(body)?;
    Ok(Field::Function {
        name: "dur".to_string(),
        args: vec![arg],
    })
}

fn duration_unit(word: &str) -> Option<DurationUnit> {
    match word.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(DurationUnit::Seconds),
        "min" | "mins" | "minute" | "minutes" => Some(DurationUnit::Minutes),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(DurationUnit::Hours),
        "d" | "day" | "days" => Some(DurationUnit::Days),
        "w" | "wk" | "wks" | "week" | "weeks" => Some(DurationUnit::Weeks),
        "mo" | "month" | "months" => Some(DurationUnit::Months),
        "yr" | "yrs" | "year" | "years" => Some(DurationUnit::Years),
        _ => None,
    }
}

fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if s.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[s.len() - 1] == first {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parse one clause body into a field tree.
pub fn parse_field_text(text: &str) -> Result<Field, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new("empty expression", text));
    }
    Parser::new(Lexer::new(trimmed))?.parse()
}

// ============================================================================
// Source grammar
// ============================================================================

/// Parser for FROM-clause bodies.
///
/// Sources use their own token shapes (`#tag`, `[[link]]`, quoted folders)
/// so they get a dedicated scanner rather than the expression lexer.
struct SourceParser {
    input: Vec<char>,
    position: usize,
    depth: usize,
}

impl SourceParser {
    fn new(input: &str) -> Self {
        SourceParser {
            input: input.chars().collect(),
            position: 0,
            depth: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn rest(&self) -> String {
        self.input[self.position..].iter().collect()
    }

    /// Peek the next bare word without consuming it.
    fn peek_word(&mut self) -> String {
        self.skip_whitespace();
        let mut word = String::new();
        let mut pos = self.position;
        while let Some(&ch) = self.input.get(pos) {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                pos += 1;
            } else {
                break;
            }
        }
        word
    }

    fn eat_word(&mut self, word: &str) {
        self.skip_whitespace();
        self.position += word.len();
    }

    fn parse(&mut self) -> Result<Source, ParseError> {
        self.skip_whitespace();
        if self.current_char().is_none() {
            return Ok(Source::Empty);
        }
        let source = self.parse_or()?;
        self.skip_whitespace();
        if self.current_char().is_some() {
            return Err(ParseError::new(
                "unexpected trailing input in source",
                self.rest(),
            ));
        }
        Ok(source)
    }

    fn parse_or(&mut self) -> Result<Source, ParseError> {
        let mut left = self.parse_and()?;

        while self.peek_word().eq_ignore_ascii_case("or") {
            self.eat_word("or");
            let right = self.parse_and()?;
            left = Source::BinaryOp {
                op: SourceOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Source, ParseError> {
        let mut left = self.parse_unary()?;

        while self.peek_word().eq_ignore_ascii_case("and") {
            self.eat_word("and");
            let right = self.parse_unary()?;
            left = Source::BinaryOp {
                op: SourceOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Source, ParseError> {
        self.skip_whitespace();
        if matches!(self.current_char(), Some('!') | Some('-')) {
            self.advance();
            self.depth += 1;
            if self.depth > MAX_DEPTH {
                return Err(ParseError::new(
                    format!("source nesting exceeds {} levels", MAX_DEPTH),
                    self.rest(),
                ));
            }
            let inner = self.parse_unary();
            self.depth -= 1;
            return Ok(Source::Negated(Box::new(inner?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Source, ParseError> {
        self.skip_whitespace();
        match self.current_char() {
            Some('(') => {
                self.advance();
                self.depth += 1;
                if self.depth > MAX_DEPTH {
                    return Err(ParseError::new(
                        format!("source nesting exceeds {} levels", MAX_DEPTH),
                        self.rest(),
                    ));
                }
                let inner = self.parse_or();
                self.depth -= 1;
                let inner = inner?;
                self.skip_whitespace();
                if self.current_char() != Some(')') {
                    return Err(ParseError::new(
                        "unbalanced parentheses in source",
                        self.rest(),
                    ));
                }
                self.advance();
                Ok(inner)
            }
            Some(q @ ('"' | '\'')) => {
                let path = self.read_quoted(q)?;
                if path.is_empty() {
                    Ok(Source::Empty)
                } else {
                    Ok(Source::Folder(path))
                }
            }
            Some('#') => {
                self.advance();
                let mut tag = String::new();
                while let Some(ch) = self.current_char() {
                    if ch.is_whitespace() || "()\"'".contains(ch) {
                        break;
                    }
                    tag.push(ch);
                    self.advance();
                }
                if tag.is_empty() {
                    return Err(ParseError::new("expected tag name after '#'", self.rest()));
                }
                Ok(Source::Tag(tag))
            }
            Some('[') => self.read_link(),
            Some(_) => Err(ParseError::new("unrecognized source", self.rest())),
            None => Err(ParseError::new("expected a source", String::new())),
        }
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, ParseError> {
        self.advance(); // consume opening quote
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\\' {
                self.advance();
                if let Some(next) = self.current_char() {
                    result.push(next);
                    self.advance();
                }
                continue;
            }
            if ch == quote {
                self.advance();
                return Ok(result);
            }
            result.push(ch);
            self.advance();
        }
        Err(ParseError::new("unterminated folder path", result))
    }

    fn read_link(&mut self) -> Result<Source, ParseError> {
        self.advance();
        if self.current_char() != Some('[') {
            return Err(ParseError::new("expected '[[' link source", self.rest()));
        }
        self.advance();

        let mut target = String::new();
        while let Some(ch) = self.current_char() {
            if ch == ']' && self.input.get(self.position + 1) == Some(&']') {
                self.advance();
                self.advance();
                // Drop a display alias: [[Note|alias]] links to "Note".
                let target = match target.split_once('|') {
                    Some((t, _)) => t.trim().to_string(),
                    None => target.trim().to_string(),
                };
                return Ok(Source::Link(target));
            }
            target.push(ch);
            self.advance();
        }
        Err(ParseError::new("unterminated link source", target))
    }
}

/// Parse a FROM-clause body into a source tree.
pub fn parse_source_text(text: &str) -> Result<Source, ParseError> {
    SourceParser::new(text).parse()
}

// ============================================================================
// Query grammar
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClauseKind {
    From,
    Where,
    Sort,
    Limit,
    GroupBy,
    Flatten,
    Extract,
}

/// Per-character mask: true where the character sits outside quotes and
/// outside any paren/bracket nesting. Also validates balance.
fn top_level_mask(chars: &[char]) -> Result<Vec<bool>, ParseError> {
    let mut mask = vec![false; chars.len()];
    let mut quote: Option<char> = None;
    let mut depth: i64 = 0;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match quote {
            Some(q) => {
                if ch == '\\' {
                    i += 2;
                    continue;
                }
                if ch == q {
                    quote = None;
                }
            }
            None => {
                mask[i] = depth == 0;
                match ch {
                    '"' | '\'' => quote = Some(ch),
                    '(' | '[' => depth += 1,
                    ')' | ']' => {
                        depth -= 1;
                        if depth < 0 {
                            return Err(ParseError::new(
                                "unbalanced closing delimiter",
                                chars[i..].iter().collect::<String>(),
                            ));
                        }
                        mask[i] = depth == 0;
                    }
                    _ => {}
                }
            }
        }
        i += 1;
    }

    if let Some(q) = quote {
        return Err(ParseError::new(
            "unterminated string in query",
            q.to_string(),
        ));
    }
    if depth != 0 {
        return Err(ParseError::new(
            "unbalanced parentheses or brackets in query",
            chars.iter().collect::<String>(),
        ));
    }
    Ok(mask)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

/// Read the bare word starting at `start`, if the position opens one.
fn word_at(chars: &[char], start: usize) -> Option<String> {
    if !chars.get(start).is_some_and(|c| c.is_alphabetic()) {
        return None;
    }
    if start > 0 && !chars[start - 1].is_whitespace() {
        return None;
    }
    let mut word = String::new();
    let mut i = start;
    while i < chars.len() && is_word_char(chars[i]) {
        word.push(chars[i]);
        i += 1;
    }
    Some(word)
}

/// Find top-level operation keywords via lookahead. Keywords inside
/// strings, parentheses, or brackets never match.
fn find_clause_keywords(
    chars: &[char],
    mask: &[bool],
    start: usize,
) -> Vec<(usize, usize, ClauseKind)> {
    let mut found = vec![];
    let mut i = start;

    while i < chars.len() {
        if !mask[i] {
            i += 1;
            continue;
        }
        let Some(word) = word_at(chars, i) else {
            i += 1;
            continue;
        };
        // `chars` is indexed by chars, so byte lengths do not apply here.
        let end = i + word.chars().count();
        let kind = match word.to_ascii_lowercase().as_str() {
            "from" => Some((ClauseKind::From, end)),
            "where" => Some((ClauseKind::Where, end)),
            "sort" => Some((ClauseKind::Sort, end)),
            "limit" => Some((ClauseKind::Limit, end)),
            "flatten" => Some((ClauseKind::Flatten, end)),
            "extract" => Some((ClauseKind::Extract, end)),
            "group" => {
                // GROUP only opens a clause when BY follows.
                let mut j = end;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                match word_at(chars, j) {
                    Some(by) if by.eq_ignore_ascii_case("by") => {
                        Some((ClauseKind::GroupBy, j + by.chars().count()))
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        match kind {
            Some((kind, body_start)) => {
                found.push((i, body_start, kind));
                i = body_start;
            }
            None => i = end,
        }
    }
    found
}

/// Split a clause body on top-level commas.
fn split_top_level(text: &str) -> Result<Vec<String>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mask = top_level_mask(&chars)?;
    let mut parts = vec![];
    let mut start = 0;

    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' && mask[i] {
            parts.push(chars[start..i].iter().collect::<String>());
            start = i + 1;
        }
    }
    parts.push(chars[start..].iter().collect::<String>());
    Ok(parts)
}

/// Split `field AS alias` at the first top-level `AS` word.
fn parse_named_field(text: &str) -> Result<NamedField, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mask = top_level_mask(&chars)?;

    let mut i = 0;
    while i < chars.len() {
        if mask[i] {
            if let Some(word) = word_at(&chars, i) {
                let word_chars = word.chars().count();
                if word.eq_ignore_ascii_case("as") {
                    let field_text: String = chars[..i].iter().collect();
                    let alias_text: String = chars[i + word_chars..].iter().collect();
                    let alias = strip_quotes(alias_text.trim()).to_string();
                    if alias.is_empty() {
                        return Err(ParseError::new("expected alias after AS", text));
                    }
                    return Ok(NamedField {
                        name: alias,
                        field: parse_field_text(&field_text)?,
                    });
                }
                i += word_chars;
                continue;
            }
        }
        i += 1;
    }

    Ok(NamedField {
        name: text.trim().to_string(),
        field: parse_field_text(text)?,
    })
}

/// Parse one SORT entry: a field with an optional trailing direction word.
fn parse_sort_field(text: &str) -> Result<SortField, ParseError> {
    let trimmed = text.trim_end();
    let (field_text, direction) = match trimmed.rfind(char::is_whitespace) {
        Some(pos) => {
            let last = trimmed[pos..].trim();
            match last.to_ascii_lowercase().as_str() {
                "asc" | "ascending" => (&trimmed[..pos], SortDirection::Ascending),
                "desc" | "descending" => (&trimmed[..pos], SortDirection::Descending),
                _ => (trimmed, SortDirection::Ascending),
            }
        }
        None => (trimmed, SortDirection::Ascending),
    };

    Ok(SortField {
        field: parse_field_text(field_text)?,
        direction,
    })
}

/// Strip a leading `WITHOUT ID` modifier from a TABLE body.
fn strip_without_id(body: &str) -> (bool, &str) {
    let t = body.trim_start();
    let Some(rest) = strip_word_ci(t, "without") else {
        return (true, body);
    };
    let Some(rest) = strip_word_ci(rest.trim_start(), "id") else {
        return (true, body);
    };
    (false, rest)
}

/// Strip `word` case-insensitively when it opens `text` as a whole word.
fn strip_word_ci<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    // The boundary check also rejects any text opening with a multi-byte
    // char, which an ASCII `word` can never match anyway.
    if text.len() < word.len() || !text.is_char_boundary(word.len()) {
        return None;
    }
    let (head, rest) = text.split_at(word.len());
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }
    if rest.chars().next().is_some_and(is_word_char) {
        return None;
    }
    Some(rest)
}

fn parse_table_header(body: &str) -> Result<Header, ParseError> {
    let (show_id, rest) = strip_without_id(body);
    let rest = rest.trim();

    let fields = if rest.is_empty() {
        vec![]
    } else {
        split_top_level(rest)?
            .iter()
            .map(|part| parse_named_field(part))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(Header::Table { fields, show_id })
}

/// Parse a complete query text into a [`Query`].
///
/// The text is split into header, source, and operation segments on
/// case-insensitive top-level keywords; clause bodies may span multiple
/// lines. All failures come back as [`ParseError`] values; this function
/// never panics and never yields a partial AST.
///
/// # Example
///
/// ```
/// use vantage::parser::parse;
///
/// let query = parse(r#"
///     TABLE file.name, status
///     FROM "tasks"
///     WHERE status != "done"
///     LIMIT 5
/// "#).unwrap();
/// assert_eq!(query.operations.len(), 2);
/// ```
pub fn parse(text: &str) -> Result<Query, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mask = top_level_mask(&chars)?;

    // Header keyword
    let mut i = 0;
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    let header_word = word_at(&chars, i).unwrap_or_default();
    let header_kw = header_word.to_ascii_lowercase();
    if !matches!(header_kw.as_str(), "table" | "list" | "task" | "calendar") {
        return Err(ParseError::new(
            "query must begin with TABLE, LIST, TASK or CALENDAR",
            if header_word.is_empty() {
                text.trim().chars().take(24).collect::<String>()
            } else {
                header_word
            },
        ));
    }
    let header_end = i + header_word.chars().count();

    let keywords = find_clause_keywords(&chars, &mask, header_end);

    let segment = |from: usize, to: usize| chars[from..to].iter().collect::<String>();
    let header_body_end = keywords.first().map(|&(s, _, _)| s).unwrap_or(chars.len());
    let header_body = segment(header_end, header_body_end);

    let header = match header_kw.as_str() {
        "table" => parse_table_header(&header_body)?,
        // Recognized shapes without a table conversion; their bodies are
        // not interpreted here.
        "list" => Header::List,
        "task" => Header::Task,
        _ => Header::Calendar,
    };

    let mut source = Source::Empty;
    let mut operations = vec![];

    for (idx, &(_, body_start, kind)) in keywords.iter().enumerate() {
        let body_end = keywords
            .get(idx + 1)
            .map(|&(s, _, _)| s)
            .unwrap_or(chars.len());
        let body = segment(body_start, body_end);

        match kind {
            ClauseKind::From => source = parse_source_text(&body)?,
            ClauseKind::Where => operations.push(Operation::Where(parse_field_text(&body)?)),
            ClauseKind::Sort => {
                let fields = split_top_level(&body)?
                    .iter()
                    .map(|part| parse_sort_field(part))
                    .collect::<Result<Vec<_>, _>>()?;
                operations.push(Operation::SortBy(fields));
            }
            ClauseKind::Limit => operations.push(Operation::Limit(parse_field_text(&body)?)),
            ClauseKind::GroupBy => {
                operations.push(Operation::GroupBy(parse_named_field(&body)?));
            }
            ClauseKind::Flatten => {
                operations.push(Operation::Flatten(parse_named_field(&body)?));
            }
            ClauseKind::Extract => {
                let fields = split_top_level(&body)?
                    .iter()
                    .map(|part| parse_named_field(part))
                    .collect::<Result<Vec<_>, _>>()?;
                operations.push(Operation::Extract(fields));
            }
        }
    }

    Ok(Query {
        header,
        source,
        operations,
    })
}
