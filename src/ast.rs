//! # Vantage Query Language - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for vantage's tabular
//! query language: a keyword-clause language (`TABLE ... FROM ... WHERE ...`)
//! for selecting and shaping notes in a personal knowledge base.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Binary operators (comparison, arithmetic, logical)
//! - **[fields]** - Expression nodes (literals, property access, operations)
//! - **[sources]** - Selection predicates derived from the FROM clause
//! - **[query]** - Complete query structure: header, source, and operations
//!
//! ## Quick Start
//!
//! ```text
//! TABLE file.name, status
//! FROM "tasks"
//! WHERE status != "done"
//! SORT file.name ASC
//! LIMIT 5
//! ```
//!
//! This query selects notes under the `tasks` folder, keeps the unfinished
//! ones, and presents their name and status as a sorted, limited table.
//!
//! ## Core Concepts
//!
//! ### Clause Structure
//!
//! Every query opens with a header clause naming the result shape
//! (`TABLE`, `LIST`, `TASK`, `CALENDAR`), optionally followed by a source
//! clause (`FROM`) and any number of operation clauses (`WHERE`, `SORT`,
//! `LIMIT`, `GROUP BY`, `FLATTEN`, `EXTRACT`). Keywords are case-insensitive
//! and clause bodies may span multiple lines.
//!
//! ### Fields
//!
//! A [`fields::Field`] is a recursive expression tree: variables, literals
//! (including first-class date and duration literals), dotted or bracketed
//! property access, binary operations, function calls, negation, and list
//! literals.
//!
//! ### Sources
//!
//! A [`sources::Source`] selects which notes a query ranges over: quoted
//! folder paths, `#tags`, `[[links]]`, and `and`/`or`/`!` combinations.

pub mod tokens;
pub mod operators;
pub mod fields;
pub mod sources;
pub mod query;

pub use tokens::Token;
pub use operators::{BinOp, SourceOp};
pub use fields::{DateValue, DurationUnit, DurationValue, Field, Literal};
pub use sources::Source;
pub use query::{Header, NamedField, Operation, Query, SortDirection, SortField};
