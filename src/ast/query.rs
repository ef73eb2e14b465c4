use crate::ast::{Field, Source};

/// A field paired with its display label.
///
/// The label comes from an `AS` alias when written, otherwise from the
/// field's own source text.
///
/// # Examples
/// ```text
/// TABLE due AS "Due Date"   -> NamedField { name: "Due Date", field: due }
/// TABLE status              -> NamedField { name: "status", field: status }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NamedField {
    /// Display label
    pub name: String,
    /// The underlying expression
    pub field: Field,
}

/// The result-shape clause opening every query.
///
/// Only `Table` converts; the other shapes parse but the transformer
/// rejects them explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    /// `TABLE [WITHOUT ID] col, col, ...`
    Table {
        fields: Vec<NamedField>,
        /// False when `WITHOUT ID` suppresses the implicit identity column
        show_id: bool,
    },
    /// `LIST ...` - recognized, not converted
    List,
    /// `TASK ...` - recognized, not converted
    Task,
    /// `CALENDAR ...` - recognized, not converted
    Calendar,
}

impl Header {
    /// The keyword that introduced this header, for error messages.
    pub fn keyword(&self) -> &'static str {
        match self {
            Header::Table { .. } => "TABLE",
            Header::List => "LIST",
            Header::Task => "TASK",
            Header::Calendar => "CALENDAR",
        }
    }
}

/// Sort direction for one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One sort key with its direction.
///
/// # Example
/// ```text
/// SORT file.name ASC, priority DESC
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub field: Field,
    pub direction: SortDirection,
}

/// One operation clause applied to the query result.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `WHERE condition`
    Where(Field),

    /// `SORT key [ASC|DESC], ...`
    SortBy(Vec<SortField>),

    /// `LIMIT amount`
    Limit(Field),

    /// `GROUP BY field [AS alias]`
    GroupBy(NamedField),

    /// `FLATTEN field [AS alias]` - parsed but not converted
    Flatten(NamedField),

    /// `EXTRACT field, ...` - parsed but not converted
    Extract(Vec<NamedField>),
}

/// Parsed representation of one textual query.
///
/// Immutable once parsed; the sole unit of work handed to the transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Result-shape clause
    pub header: Header,
    /// Selection predicate (Source::Empty when FROM is absent)
    pub source: Source,
    /// Operation clauses in source-text order
    pub operations: Vec<Operation>,
}
