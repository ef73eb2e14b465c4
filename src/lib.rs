pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod transform;

pub use ast::{BinOp, Field, Header, Literal, NamedField, Operation, Query, Source, Token};
pub use config::{BaseConfig, Direction, Filter, SortSpec, ViewConfig};
pub use lexer::{LexError, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{parse, ParseError, Parser};
pub use transform::{transform, TransformError, Transformer};
