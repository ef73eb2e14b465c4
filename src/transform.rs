//! Lowers a parsed [`Query`] into a [`BaseConfig`].
//!
//! The source and target languages disagree on function names, logical
//! grouping shape, and date arithmetic, so this is a semantic rewrite
//! rather than a pretty-printer:
//!
//! - property and function names pass through static rename tables
//! - nested same-operator logical groups are flattened
//! - durations normalize to quoted `"N unit"` strings (weeks become days)
//! - date ± duration becomes `date + "signed duration"` - the target's
//!   only spelling for moving a date backward
//! - computed columns become named formulas; bare property chains stay
//!   plain references
//!
//! A [`Transformer`] holds only call-scoped state (the formula-name
//! counter) and is reset at the start of every [`Transformer::transform`]
//! call, so concurrent conversions on separate instances are independent.

use std::collections::BTreeMap;

use crate::{
    ast::{
        BinOp, DateValue, DurationValue, Field, Header, Literal, NamedField, Operation, Query,
        SortDirection, Source, SourceOp,
    },
    config::{BaseConfig, Direction, Filter, SortSpec, ViewConfig},
};

/// Nesting bound for the lowering walks, matching the parser's bound.
const MAX_DEPTH: usize = 64;

/// Path of the implicit identity column prefixed when `WITHOUT ID` is absent.
const IDENTITY_COLUMN: &str = "file.name";

/// Display label of the identity column.
const IDENTITY_LABEL: &str = "File";

/// Source-language property paths with a different spelling in the target.
const PROPERTY_RENAMES: &[(&str, &str)] = &[
    ("file.extension", "file.ext"),
    ("file.cday", "file.ctime"),
    ("file.cdate", "file.ctime"),
    ("file.mday", "file.mtime"),
    ("file.mdate", "file.mtime"),
    ("file.outlinks", "file.links"),
    ("file.inlinks", "file.backlinks"),
];

/// Source-language function names with a different spelling in the target.
/// Keys are lower-case; lookups are case-insensitive.
const FUNCTION_RENAMES: &[(&str, &str)] = &[
    ("dateformat", "formatDate"),
    ("choice", "if"),
    ("econtains", "contains"),
    ("regexmatch", "matches"),
    ("number", "toNumber"),
    ("string", "toString"),
    ("dur", "duration"),
];

/// Index keys rewritten to prefix date accessors: `x.year` -> `year(x)`.
const DATE_PARTS: &[&str] = &[
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "millisecond",
];

/// Transform failure. The whole call aborts; no partial configuration is
/// ever returned.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Structurally valid header shape with no table conversion
    /// (LIST, TASK, CALENDAR)
    UnsupportedHeader(&'static str),

    /// Field nesting beyond the supported bound
    DepthExceeded,
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::UnsupportedHeader(kw) => {
                write!(f, "unsupported header: {} queries cannot be converted", kw)
            }
            TransformError::DepthExceeded => {
                write!(f, "field nesting exceeds {} levels", MAX_DEPTH)
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Map a property path through the rename table. Unknown paths pass
/// through unchanged, which also makes the mapping idempotent.
pub fn rename_property(path: &str) -> String {
    for (from, to) in PROPERTY_RENAMES {
        if *from == path {
            return (*to).to_string();
        }
    }
    path.to_string()
}

fn rename_function(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    for (from, to) in FUNCTION_RENAMES {
        if *from == lower {
            return (*to).to_string();
        }
    }
    name.to_string()
}

/// Quote a string for the target expression language.
fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Render a duration as the target's quoted `"N unit"` string: weeks
/// convert to days, the unit is singular exactly when the amount is 1.
fn duration_text(duration: &DurationValue, negate: bool) -> String {
    let normalized = duration.normalized();
    let amount = if negate {
        -normalized.amount
    } else {
        normalized.amount
    };
    let suffix = if amount.abs() == 1 { "" } else { "s" };
    format!("{} {}{}", amount, normalized.unit.singular(), suffix)
}

/// Extract a pure property path (`a.b.c`) rooted at a variable, if this
/// field is one. Anything else is structural proof of computation.
fn property_path(field: &Field) -> Option<String> {
    match field {
        Field::Variable(name) => Some(name.clone()),
        Field::Index { object, key } => {
            let base = property_path(object)?;
            match key.as_ref() {
                Field::Literal(Literal::String(k)) if is_identifier(k) => {
                    Some(format!("{}.{}", base, k))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// True when the field reads as a boolean condition: comparisons, logical
/// combinations, and negations. Used to decide whether `&`/`|` become
/// filter groups or stay infix text.
fn is_predicate(field: &Field) -> bool {
    match field {
        Field::BinaryOp { op, .. } => op.is_comparison() || op.is_logical(),
        Field::Negated(_) => true,
        _ => false,
    }
}

/// True when the field references the note's tag list.
fn is_tags_reference(field: &Field) -> bool {
    match field {
        Field::Variable(name) => name.eq_ignore_ascii_case("tags"),
        _ => property_path(field).is_some_and(|p| p.eq_ignore_ascii_case("file.tags")),
    }
}

fn operator_text(op: BinOp) -> &'static str {
    match op {
        BinOp::Equal => "==",
        BinOp::NotEqual => "!=",
        BinOp::LessThan => "<",
        BinOp::GreaterThan => ">",
        BinOp::LessEqual => "<=",
        BinOp::GreaterEqual => ">=",
        BinOp::Add => "+",
        BinOp::Subtract => "-",
        BinOp::Multiply => "*",
        BinOp::Divide => "/",
        BinOp::Modulo => "%",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        op if op.is_comparison() => 3,
        BinOp::Add | BinOp::Subtract => 4,
        _ => 5,
    }
}

/// Lower a source tree to a predicate, or `None` when the source imposes
/// no restriction. Same-operator groups are flattened as they are built.
pub fn lower_source(source: &Source) -> Option<Filter> {
    match source {
        Source::Empty => None,
        Source::Folder(path) => Some(Filter::Condition(format!(
            "file.inFolder({})",
            quoted(path)
        ))),
        Source::Tag(tag) => Some(Filter::Condition(format!("file.hasTag({})", quoted(tag)))),
        Source::Link(target) => Some(Filter::Condition(format!(
            "file.hasLink({})",
            quoted(target)
        ))),
        Source::Negated(inner) => lower_source(inner).map(Filter::negate),
        Source::BinaryOp { op, left, right } => {
            let parts: Vec<Filter> = [lower_source(left), lower_source(right)]
                .into_iter()
                .flatten()
                .collect();
            if parts.is_empty() {
                return None;
            }
            Some(match op {
                SourceOp::And => Filter::and(parts),
                SourceOp::Or => Filter::or(parts),
            })
        }
    }
}

/// Transforms one [`Query`] into a [`BaseConfig`].
///
/// Holds the per-call formula counter; construct one per call (or reuse -
/// state is reset on entry) but never share an instance across concurrent
/// calls.
#[derive(Default)]
pub struct Transformer {
    formula_count: usize,
    depth: usize,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a parsed query. Only TABLE headers convert; the other
    /// shapes fail with [`TransformError::UnsupportedHeader`] rather than
    /// being coerced into a table.
    pub fn transform(&mut self, query: &Query) -> Result<BaseConfig, TransformError> {
        self.formula_count = 0;
        self.depth = 0;

        match &query.header {
            Header::Table { fields, show_id } => {
                self.transform_table(fields, *show_id, &query.source, &query.operations)
            }
            other => Err(TransformError::UnsupportedHeader(other.keyword())),
        }
    }

    fn transform_table(
        &mut self,
        fields: &[NamedField],
        show_id: bool,
        source: &Source,
        operations: &[Operation],
    ) -> Result<BaseConfig, TransformError> {
        let mut config = BaseConfig::default();
        let mut view = ViewConfig::table("Table");

        let mut order = vec![];
        if show_id {
            config
                .display
                .insert(IDENTITY_COLUMN.to_string(), IDENTITY_LABEL.to_string());
            order.push(IDENTITY_COLUMN.to_string());
        }
        for named in fields {
            let path = self.column_ref(Some(&named.name), &named.field, &mut config.formulas)?;
            config.display.insert(path.clone(), named.name.clone());
            // A column naming the identity path again must not duplicate
            // its order entry.
            if !order.contains(&path) {
                order.push(path);
            }
        }
        if !order.is_empty() {
            view.order = Some(order);
        }

        // Each clause kind owns one slot on the default view, so a repeated
        // clause overwrites the earlier one.
        let mut where_filter = None;
        for operation in operations {
            match operation {
                Operation::Where(condition) => {
                    where_filter = Some(self.lower_filter(condition)?);
                }
                Operation::SortBy(sort_fields) => {
                    view.sort = sort_fields
                        .iter()
                        .map(|sf| {
                            Ok(SortSpec {
                                column: self.column_ref(None, &sf.field, &mut config.formulas)?,
                                direction: match sf.direction {
                                    SortDirection::Ascending => Direction::Asc,
                                    SortDirection::Descending => Direction::Desc,
                                },
                            })
                        })
                        .collect::<Result<Vec<_>, TransformError>>()?;
                }
                Operation::Limit(amount) => {
                    // Only literal integers cap the view; anything else
                    // leaves it unlimited. Documented leniency, not a bug.
                    view.limit = literal_limit(amount);
                }
                Operation::GroupBy(named) => {
                    view.group_by = Some(self.column_ref(
                        Some(&named.name),
                        &named.field,
                        &mut config.formulas,
                    )?);
                }
                // Parsed for completeness; no counterpart in the target.
                Operation::Flatten(_) | Operation::Extract(_) => {}
            }
        }

        view.filters = match (lower_source(source), where_filter) {
            (Some(from_source), Some(from_where)) => {
                Some(Filter::and(vec![from_source, from_where]))
            }
            (source_only, where_only) => source_only.or(where_only),
        };

        config.views.push(view);
        Ok(config)
    }

    /// Resolve a field to a column path: plain property chains keep their
    /// (renamed) path, anything computed becomes a named formula.
    fn column_ref(
        &mut self,
        label: Option<&str>,
        field: &Field,
        formulas: &mut BTreeMap<String, String>,
    ) -> Result<String, TransformError> {
        if let Some(path) = property_path(field) {
            return Ok(rename_property(&path));
        }

        let body = self.lower_expr(field)?;

        // A sort or group key repeating a column expression reuses that
        // column's formula instead of minting a second key.
        if let Some((key, _)) = formulas.iter().find(|(_, existing)| **existing == body) {
            return Ok(format!("formula.{}", key));
        }

        let key = self.formula_key(label, formulas);
        formulas.insert(key.clone(), body);
        Ok(format!("formula.{}", key))
    }

    /// Derive a formula key from the display alias when it is alias-shaped
    /// (words only), else from the positional counter. Keys are unique
    /// within one transform call.
    fn formula_key(&mut self, label: Option<&str>, formulas: &BTreeMap<String, String>) -> String {
        let base = match label.and_then(alias_key) {
            Some(key) => key,
            None => {
                self.formula_count += 1;
                format!("formula_{}", self.formula_count)
            }
        };

        let mut key = base.clone();
        let mut n = 1;
        while formulas.contains_key(&key) {
            n += 1;
            key = format!("{}_{}", base, n);
        }
        key
    }

    fn enter(&mut self) -> Result<(), TransformError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(TransformError::DepthExceeded);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Lower a WHERE-context field to a predicate tree.
    ///
    /// Logical operators become groups when either operand is itself a
    /// condition; negation always becomes a one-element NOT group, for
    /// leaves and groups alike.
    pub fn lower_filter(&mut self, field: &Field) -> Result<Filter, TransformError> {
        self.enter()?;
        let result = self.lower_filter_inner(field);
        self.leave();
        result
    }

    fn lower_filter_inner(&mut self, field: &Field) -> Result<Filter, TransformError> {
        match field {
            Field::BinaryOp { op, left, right }
                if op.is_logical() && (is_predicate(left) || is_predicate(right)) =>
            {
                let parts = vec![self.lower_filter(left)?, self.lower_filter(right)?];
                Ok(match op {
                    BinOp::And => Filter::and(parts),
                    _ => Filter::or(parts),
                })
            }
            Field::Negated(child) => Ok(self.lower_filter(child)?.negate()),
            _ => Ok(Filter::Condition(self.lower_expr(field)?)),
        }
    }

    /// Lower a field to target expression text (formula bodies, leaf
    /// conditions, function arguments).
    pub fn lower_expr(&mut self, field: &Field) -> Result<String, TransformError> {
        self.enter()?;
        let result = self.lower_expr_inner(field);
        self.leave();
        result
    }

    fn lower_expr_inner(&mut self, field: &Field) -> Result<String, TransformError> {
        match field {
            Field::Variable(name) => Ok(rename_property(name)),
            Field::Literal(literal) => Ok(self.lower_literal(literal)),
            Field::Index { object, key } => self.lower_index(field, object, key),
            Field::BinaryOp { op, left, right } => self.lower_binary(*op, left, right),
            Field::Function { name, args } => self.lower_function(name, args),
            Field::Negated(child) => {
                let inner = self.lower_expr(child)?;
                if matches!(child.as_ref(), Field::BinaryOp { .. }) {
                    Ok(format!("!({})", inner))
                } else {
                    Ok(format!("!{}", inner))
                }
            }
            Field::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.lower_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("[{}]", items.join(", ")))
            }
        }
    }

    fn lower_literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::String(s) => quoted(s),
            Literal::Integer(n) => n.to_string(),
            Literal::Float(x) => x.to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::Null => "null".to_string(),
            Literal::Date(DateValue::Today) => "now()".to_string(),
            Literal::Date(DateValue::Tomorrow) => "now() + \"1 day\"".to_string(),
            Literal::Date(DateValue::Yesterday) => "now() + \"-1 day\"".to_string(),
            Literal::Date(DateValue::Ymd { year, month, day }) => {
                format!("date(\"{:04}-{:02}-{:02}\")", year, month, day)
            }
            Literal::Duration(d) => quoted(&duration_text(d, false)),
        }
    }

    fn lower_index(
        &mut self,
        whole: &Field,
        object: &Field,
        key: &Field,
    ) -> Result<String, TransformError> {
        // Date-part accessors rewrite to prefix functions before any path
        // handling: status.year is year(status) even though the chain is
        // otherwise plain.
        if let Field::Literal(Literal::String(k)) = key {
            if DATE_PARTS.contains(&k.as_str()) {
                return Ok(format!("{}({})", k, self.lower_expr(object)?));
            }
        }

        if let Some(path) = property_path(whole) {
            return Ok(rename_property(&path));
        }

        match key {
            Field::Literal(Literal::String(k)) if is_identifier(k) => {
                Ok(format!("{}.{}", self.lower_expr(object)?, k))
            }
            _ => Ok(format!(
                "{}[{}]",
                self.lower_expr(object)?,
                self.lower_expr(key)?
            )),
        }
    }

    fn lower_binary(
        &mut self,
        op: BinOp,
        left: &Field,
        right: &Field,
    ) -> Result<String, TransformError> {
        // Date arithmetic: shifting by a duration is always spelled with
        // `+`; subtraction negates the duration string instead.
        if matches!(op, BinOp::Add | BinOp::Subtract) {
            if let Field::Literal(Literal::Duration(d)) = right {
                let negate = op == BinOp::Subtract;
                return Ok(format!(
                    "{} + {}",
                    self.lower_operand(left, op, false)?,
                    quoted(&duration_text(d, negate))
                ));
            }
        }

        Ok(format!(
            "{} {} {}",
            self.lower_operand(left, op, false)?,
            operator_text(op),
            self.lower_operand(right, op, true)?
        ))
    }

    /// Lower one operand, parenthesizing when its operator binds looser
    /// than the parent's (or equally, on the right of `-`, `/`, `%`).
    fn lower_operand(
        &mut self,
        field: &Field,
        parent: BinOp,
        right_side: bool,
    ) -> Result<String, TransformError> {
        let text = self.lower_expr(field)?;
        if let Field::BinaryOp { op, .. } = field {
            let needs_parens = precedence(*op) < precedence(parent)
                || (right_side
                    && precedence(*op) == precedence(parent)
                    && matches!(parent, BinOp::Subtract | BinOp::Divide | BinOp::Modulo));
            if needs_parens {
                return Ok(format!("({})", text));
            }
        }
        Ok(text)
    }

    fn lower_function(&mut self, name: &str, args: &[Field]) -> Result<String, TransformError> {
        let lower = name.to_ascii_lowercase();

        // Tag membership gets the dedicated predicate instead of the
        // generic contains form.
        if lower == "contains" && args.len() == 2 && is_tags_reference(&args[0]) {
            return Ok(format!("file.hasTag({})", self.lower_expr(&args[1])?));
        }

        if lower == "notempty" && args.len() == 1 {
            return Ok(format!("!isEmpty({})", self.lower_expr(&args[0])?));
        }

        let args = args
            .iter()
            .map(|arg| self.lower_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("{}({})", rename_function(name), args.join(", ")))
    }
}

/// Lower-case an alias into a formula key when it is alias-shaped:
/// letters, digits, underscores, dashes, and spaces only, with spaces
/// becoming underscores. Expression text standing in for a missing alias
/// never qualifies, so those columns fall back to positional keys.
fn alias_key(label: &str) -> Option<String> {
    let trimmed = label.trim();
    let alias_shaped = trimmed
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ');
    if !alias_shaped {
        return None;
    }
    Some(trimmed.to_ascii_lowercase().replace(' ', "_"))
}

/// Best-effort literal-integer reading for LIMIT amounts.
fn literal_limit(field: &Field) -> Option<i64> {
    match field {
        Field::Literal(Literal::Integer(n)) => Some(*n),
        Field::Literal(Literal::Float(x)) if x.fract() == 0.0 => Some(*x as i64),
        Field::Literal(Literal::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Convert a parsed query with a fresh [`Transformer`].
pub fn transform(query: &Query) -> Result<BaseConfig, TransformError> {
    Transformer::new().transform(query)
}
