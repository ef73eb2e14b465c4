//! Target configuration model.
//!
//! These types mirror the logical shape of the on-disk declarative view
//! format: a file-level filter, named formulas, display labels, and a list
//! of views. Encoding to the actual YAML file is left to the consuming
//! application; [`BaseConfig::to_value`] produces the exact logical JSON
//! shape that encoder round-trips.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A boolean predicate tree: a leaf condition string or an `and`/`or`/`not`
/// group.
///
/// Built through the [`Filter::and`] / [`Filter::or`] constructors so that
/// nested same-operator groups are always flattened: an AND never directly
/// contains another AND, and an OR never directly contains another OR.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A leaf condition, already rendered in the target expression language
    ///
    /// # Example
    /// ```text
    /// status != "done"
    /// ```
    Condition(String),

    /// All children must hold
    And(Vec<Filter>),

    /// Any child may hold
    Or(Vec<Filter>),

    /// No child may hold; always carries exactly one element
    Not(Vec<Filter>),
}

impl Filter {
    /// Combine filters under AND, inlining children that are themselves
    /// AND groups. A single surviving part is returned as-is rather than
    /// wrapped in a one-element group.
    pub fn and(parts: Vec<Filter>) -> Filter {
        Self::group(parts, true)
    }

    /// Combine filters under OR; same flattening rules as [`Filter::and`].
    pub fn or(parts: Vec<Filter>) -> Filter {
        Self::group(parts, false)
    }

    fn group(parts: Vec<Filter>, conjunction: bool) -> Filter {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Filter::And(children) if conjunction => flat.extend(children),
                Filter::Or(children) if !conjunction => flat.extend(children),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.into_iter().next().expect("len checked");
        }
        if conjunction {
            Filter::And(flat)
        } else {
            Filter::Or(flat)
        }
    }

    /// Negate this filter. Always produces a one-element NOT group, for
    /// leaves and groups alike; consumers rely on that shape.
    pub fn negate(self) -> Filter {
        Filter::Not(vec![self])
    }

    /// Encode into the logical output shape: leaves are plain strings,
    /// groups are single-key objects.
    pub fn to_value(&self) -> Value {
        match self {
            Filter::Condition(s) => Value::String(s.clone()),
            Filter::And(children) => Self::group_value("and", children),
            Filter::Or(children) => Self::group_value("or", children),
            Filter::Not(children) => Self::group_value("not", children),
        }
    }

    fn group_value(key: &str, children: &[Filter]) -> Value {
        let mut map = Map::new();
        map.insert(
            key.to_string(),
            Value::Array(children.iter().map(Filter::to_value).collect()),
        );
        Value::Object(map)
    }
}

/// Sort direction, serialized lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One sort key of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    /// Column path (a property path or `formula.<key>`)
    pub column: String,
    pub direction: Direction,
}

/// One view over the selected notes.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// View layout, e.g. `"table"`
    pub view_type: String,
    /// Display name of the view
    pub name: String,
    /// Row cap; absent means unlimited
    pub limit: Option<i64>,
    /// View-scoped predicate
    pub filters: Option<Filter>,
    /// Column paths in display order
    pub order: Option<Vec<String>>,
    /// Property path the rows are grouped under
    pub group_by: Option<String>,
    /// Sort keys, outermost first
    pub sort: Vec<SortSpec>,
}

impl ViewConfig {
    /// A fresh table view with the given display name.
    pub fn table(name: impl Into<String>) -> Self {
        ViewConfig {
            view_type: "table".to_string(),
            name: name.into(),
            limit: None,
            filters: None,
            order: None,
            group_by: None,
            sort: vec![],
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(self.view_type.clone()));
        map.insert("name".to_string(), Value::String(self.name.clone()));
        if let Some(limit) = self.limit {
            map.insert("limit".to_string(), Value::Number(limit.into()));
        }
        if let Some(filters) = &self.filters {
            map.insert("filters".to_string(), filters.to_value());
        }
        if let Some(order) = &self.order {
            map.insert(
                "order".to_string(),
                Value::Array(order.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(group_by) = &self.group_by {
            map.insert("group_by".to_string(), Value::String(group_by.clone()));
        }
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|s| {
                    let mut entry = Map::new();
                    entry.insert("column".to_string(), Value::String(s.column.clone()));
                    entry.insert(
                        "direction".to_string(),
                        Value::String(s.direction.as_str().to_string()),
                    );
                    Value::Object(entry)
                })
                .collect();
            map.insert("sort".to_string(), Value::Array(sort));
        }
        Value::Object(map)
    }
}

/// Complete declarative view configuration produced by one transform call.
///
/// Maps use [`BTreeMap`] so the encoded output is deterministic; column
/// order is carried by each view's `order` list, not by the `display` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseConfig {
    /// File-level predicate shared by all views
    pub filters: Option<Filter>,
    /// Formula key to formula body
    pub formulas: BTreeMap<String, String>,
    /// Column path to display label
    pub display: BTreeMap<String, String>,
    /// Views, in definition order
    pub views: Vec<ViewConfig>,
}

impl BaseConfig {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(filters) = &self.filters {
            map.insert("filters".to_string(), filters.to_value());
        }
        if !self.formulas.is_empty() {
            let formulas = self
                .formulas
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            map.insert("formulas".to_string(), Value::Object(formulas));
        }
        if !self.display.is_empty() {
            let display = self
                .display
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            map.insert("display".to_string(), Value::Object(display));
        }
        map.insert(
            "views".to_string(),
            Value::Array(self.views.iter().map(ViewConfig::to_value).collect()),
        );
        Value::Object(map)
    }
}
