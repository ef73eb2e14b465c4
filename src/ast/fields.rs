use crate::ast::BinOp;

/// A date literal as written in the query text.
///
/// The relative forms are resolved against "now" by the consuming
/// application, not by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    /// `date(today)`
    Today,
    /// `date(tomorrow)`
    Tomorrow,
    /// `date(yesterday)`
    Yesterday,
    /// `date(2024-01-31)` - an explicit calendar date
    Ymd { year: i32, month: u32, day: u32 },
}

/// Time units accepted inside `dur(...)` literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    /// Singular unit name as spelled in the target configuration language.
    pub fn singular(&self) -> &'static str {
        match self {
            DurationUnit::Seconds => "second",
            DurationUnit::Minutes => "minute",
            DurationUnit::Hours => "hour",
            DurationUnit::Days => "day",
            DurationUnit::Weeks => "week",
            DurationUnit::Months => "month",
            DurationUnit::Years => "year",
        }
    }
}

/// A duration literal: a quantity plus a unit.
///
/// # Examples
/// ```text
/// dur(7 days)   -> DurationValue { amount: 7, unit: Days }
/// dur(1 week)   -> DurationValue { amount: 1, unit: Weeks }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationValue {
    pub amount: i64,
    pub unit: DurationUnit,
}

impl DurationValue {
    pub fn new(amount: i64, unit: DurationUnit) -> Self {
        DurationValue { amount, unit }
    }

    /// Normalize week durations to day durations (the target language has
    /// no week unit). `2 weeks` becomes `14 days`; other units pass through.
    /// Amounts past the `i64` range saturate rather than wrapping; the
    /// parser rejects such amounts before they get here.
    pub fn normalized(&self) -> DurationValue {
        match self.unit {
            DurationUnit::Weeks => DurationValue {
                amount: self.amount.saturating_mul(7),
                unit: DurationUnit::Days,
            },
            _ => *self,
        }
    }
}

/// Literal values that can appear in expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String literal
    String(String),
    /// Integer literal
    Integer(i64),
    /// Floating-point literal
    Float(f64),
    /// Boolean literal
    Boolean(bool),
    /// Date literal (`date(...)`)
    Date(DateValue),
    /// Duration literal (`dur(...)`)
    Duration(DurationValue),
    /// Null literal
    Null,
}

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Fields appear as table columns, WHERE clauses, sort keys, limit amounts,
/// and grouping keys. The tree is acyclic and bounded by the nesting depth
/// of the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Bare variable or property name
    ///
    /// # Examples
    /// ```text
    /// status
    /// file
    /// ```
    Variable(String),

    /// Literal value
    Literal(Literal),

    /// Property or index access
    ///
    /// Dotted access stores the key as a string literal; bracketed access
    /// may carry any expression as the key.
    ///
    /// # Examples
    /// ```text
    /// file.name
    /// row["due date"]
    /// ```
    Index {
        object: Box<Field>,
        key: Box<Field>,
    },

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Field>,
        right: Box<Field>,
    },

    /// Function call
    ///
    /// # Examples
    /// ```text
    /// contains(tags, "project")
    /// length(file.outlinks)
    /// ```
    Function {
        name: String,
        args: Vec<Field>,
    },

    /// Logical negation (`!expr`)
    Negated(Box<Field>),

    /// List literal
    ///
    /// # Example
    /// ```text
    /// ["a", "b", "c"]
    /// ```
    List(Vec<Field>),
}

impl Field {
    /// Shorthand for a string literal field.
    pub fn string(s: impl Into<String>) -> Field {
        Field::Literal(Literal::String(s.into()))
    }

    /// Shorthand for an integer literal field.
    pub fn integer(n: i64) -> Field {
        Field::Literal(Literal::Integer(n))
    }

    /// Build a property access chain from dotted segments.
    ///
    /// `Field::path(["file", "name"])` is the tree for `file.name`.
    pub fn path<I, S>(segments: I) -> Field
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = segments.into_iter();
        let first = iter
            .next()
            .map(|s| Field::Variable(s.into()))
            .unwrap_or(Field::Literal(Literal::Null));
        iter.fold(first, |object, key| Field::Index {
            object: Box::new(object),
            key: Box::new(Field::string(key)),
        })
    }

    /// True if this field is a duration literal.
    pub fn is_duration(&self) -> bool {
        matches!(self, Field::Literal(Literal::Duration(_)))
    }
}
