//! Validate queries without emitting a configuration

use super::CliError;
use crate::{parser, transform};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query to validate
    pub query: String,
    /// Only validate syntax, skip the transform
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// The query parses and converts
    Convertible,
}

/// Validate a query: parse it, and unless `syntax_only` is set, run the
/// transform to surface unsupported constructs.
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = parser::parse(&options.query)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    transform::transform(&query)?;
    Ok(CheckResult::Convertible)
}
