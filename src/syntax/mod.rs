// Syntax model for schema files
pub mod ast;
mod cache;
pub mod file;
pub mod formatter;

pub use ast::*;
pub use cache::{ParseCache, content_hash};
pub use file::{ProtoFile, SyntaxError};
pub use formatter::{FormatOptions, RenumberOptions, format, format_range};

pub use crate::base::{Position, Span};
