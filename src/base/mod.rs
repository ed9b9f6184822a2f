//! Foundation types for the protoscope toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Position`], [`Span`] - Line/column positions for AST nodes and diagnostics
//! - [`LineIndex`] - Byte offset to line/column conversion
//! - [`text_utils`] - Identifier and naming-style helpers
//!
//! This module has NO dependencies on other protoscope modules.

mod line_index;
mod position;
pub mod text_utils;

pub use line_index::LineIndex;
pub use position::{Position, Span};

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};
