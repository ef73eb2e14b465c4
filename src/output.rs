//! JSON encoding of the logical output shape.
//!
//! The on-disk format of the consuming application is YAML and is written
//! by an external encoder; this module only renders the logical
//! [`BaseConfig`] shape as JSON for CLI output, tests, and debugging. The
//! shape is identical either way: string filter leaves, single-key logical
//! groups, lower-case sort directions.
//!
//! # Examples
//!
//! ```
//! use vantage::{parser, transform, output};
//!
//! let query = parser::parse("TABLE WITHOUT ID status").unwrap();
//! let config = transform::transform(&query).unwrap();
//! let json = output::to_json(&config);
//! assert!(json.contains("\"views\""));
//! ```

use crate::config::BaseConfig;

/// Encode a configuration as compact JSON.
pub fn to_json(config: &BaseConfig) -> String {
    serde_json::to_string(&config.to_value()).expect("config values always serialize")
}

/// Encode a configuration as pretty-printed JSON.
pub fn to_json_pretty(config: &BaseConfig) -> String {
    serde_json::to_string_pretty(&config.to_value()).expect("config values always serialize")
}
