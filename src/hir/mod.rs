//! High-level IR (HIR): the workspace-wide semantic model.
//!
//! ## Key Types
//!
//! - [`Analyzer`]: owns the symbol index; all mutation flows through it
//! - [`WorkspaceSymbolIndex`]: qualified name → declarations, per-file imports
//! - [`Resolver`]: protobuf scope-chain name resolution
//! - [`ImportGraph`]: resolved imports and cycle detection
//! - [`Diagnostic`]: output of the rule-based diagnostics engine
//!
//! ## Data Flow
//!
//! ```text
//! ProtoFile (syntax)
//!     │
//!     ▼
//! Analyzer::update_file     ← remove old entries, insert new ones
//!     │
//!     ▼
//! AnalyzerSnapshot          ← read guard: Resolver, ImportGraph, visibility
//!     │
//!     ▼
//! diagnostics::evaluate     ← local rules + workspace rules
//! ```

mod analyzer;
pub mod diagnostics;
mod imports;
mod index;
mod resolve;
mod symbols;

pub use analyzer::{Analyzer, AnalyzerSnapshot};
pub use diagnostics::{Diagnostic, RelatedInfo, Rule, RuleError, RuleScope, Severity, evaluate};
pub use imports::{ImportCycle, ImportGraph};
pub use index::{ImportEdge, WorkspaceSymbolIndex};
pub use resolve::{Resolver, scope_chain};
pub use symbols::{SymbolEntry, SymbolKind, file_symbols};
