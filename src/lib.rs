//! # protoscope-base
//!
//! Core library for Protocol Buffers schema intelligence: error-tolerant
//! parsing, a cross-file symbol index, rule-based diagnostics and a
//! line-oriented formatter with field renumbering.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost: diagnostics, formatting, resolve, symbols
//!   ↓
//! hir       → Analyzer, symbol index, resolution, import graph, rules
//!   ↓
//! project   → Settings, import path resolution
//!   ↓
//! syntax    → AST types, ParseCache, formatter
//!   ↓
//! parser    → Logos lexer, recursive-descent parser
//!   ↓
//! base      → Primitives (Position, Span, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → project → hir → ide)
// ============================================================================

/// Foundation types: Position, Span, LineIndex, naming helpers
pub mod base;

/// Parser: Logos lexer, error-tolerant recursive-descent parser
pub mod parser;

/// Syntax: AST types, parse cache, formatter
pub mod syntax;

/// Project configuration: settings object, import roots
pub mod project;

/// High-level IR: analyzer, symbol index, diagnostics
pub mod hir;

/// IDE features: diagnostics, formatting, resolve-reference, symbols
pub mod ide;

// Re-export foundation types
pub use base::{LineIndex, Position, Span, TextRange, TextSize};

// Re-export the main entry points
pub use hir::{Analyzer, Diagnostic, Severity};
pub use ide::AnalysisHost;
pub use parser::parse;
pub use project::Settings;
pub use syntax::{FormatOptions, ProtoFile, format, format_range};
