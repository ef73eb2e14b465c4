//! Convert a query to its view configuration

use super::CliError;
use crate::{output, parser, transform};

/// Options for the convert command
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// The query to convert
    pub query: String,
    /// Pretty-print the output
    pub pretty: bool,
}

/// Convert a query text into the JSON rendition of its configuration.
pub fn execute_convert(options: &ConvertOptions) -> Result<String, CliError> {
    let query = parser::parse(&options.query)?;
    let config = transform::transform(&query)?;

    if options.pretty {
        Ok(output::to_json_pretty(&config))
    } else {
        Ok(output::to_json(&config))
    }
}
