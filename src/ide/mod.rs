//! IDE features: High-level APIs for editor request handlers.
//!
//! This module provides the interface between the semantic model (HIR)
//! and an editor protocol server. Each function corresponds to a request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No protocol types**: Uses our own types, converted at the boundary
//! 3. **Composable**: Built on top of HIR queries
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use protoscope::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content("file:///a.proto", "package p; message A {}");
//!
//! let analysis = host.analysis();
//! let symbols = analysis.workspace_symbols("p.");
//! ```

mod analysis;
mod edits;
mod goto;
mod symbols;

pub use analysis::{Analysis, AnalysisHost};
pub use edits::{TextEdit, format_document, format_range};
pub use goto::{Location, resolve_reference};
pub use symbols::{SymbolInfo, document_symbols, workspace_symbols};
