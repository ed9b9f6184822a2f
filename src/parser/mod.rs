//! Error-tolerant parser for Protocol Buffers schema files
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens, trivia included
//!     ↓
//! Parser → ProtoFile (typed AST + syntax errors)
//!     ↓
//! HIR → workspace symbol index, resolution, diagnostics
//! ```
//!
//! Trivia stays in the token stream so the parser can pick up doc comments
//! and the formatter can reuse the same lexer line by line.

#[allow(clippy::module_inception)]
mod parser;

mod lexer;

pub use lexer::{Lexer, Token, TokenKind, parse_int_literal, tokenize, unquote};
pub use parser::parse;
pub(crate) use parser::qualify;
