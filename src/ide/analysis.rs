//! AnalysisHost and Analysis: Unified state management for IDE features.
//!
//! The `AnalysisHost` owns all mutable state (parse cache, analyzer and
//! settings) and provides `Analysis` snapshots for querying. A snapshot holds
//! the analyzer's read lock, so every query made through it sees the same
//! consistent workspace.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//!
//! // Apply file changes
//! host.set_file_content("file:///a.proto", "message A {}");
//!
//! // Get a snapshot for queries
//! let analysis = host.analysis();
//! let diagnostics = analysis.diagnostics("file:///a.proto");
//! let symbols = analysis.workspace_symbols("A");
//! ```

use serde_json::Value;
use tracing::debug;

use crate::base::{Position, Span};
use crate::hir::{self, Analyzer, AnalyzerSnapshot, Diagnostic};
use crate::project::{ConfigError, Settings};
use crate::syntax::{ParseCache, SyntaxError};

use super::{Location, SymbolInfo, TextEdit};

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `set_file_content()`, `remove_file()` and
/// `update_settings()`, then get a consistent snapshot via `analysis()`.
#[derive(Default)]
pub struct AnalysisHost {
    analyzer: Analyzer,
    cache: ParseCache,
    settings: Settings,
}

impl AnalysisHost {
    /// Create a new empty AnalysisHost.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` (reusing the cached tree when it is unchanged) and index it.
    ///
    /// Returns the syntax errors of the file.
    pub fn set_file_content(&mut self, uri: &str, text: &str) -> Vec<SyntaxError> {
        let file = self.cache.get_or_parse(uri, text);
        let errors = file.errors.clone();
        self.analyzer.update_file(file);
        errors
    }

    /// Drop a file from the cache and the index. Returns whether it was known.
    pub fn remove_file(&mut self, uri: &str) -> bool {
        self.cache.invalidate(uri);
        self.analyzer.remove_file(uri)
    }

    /// Apply a flat settings object. Rejected keys keep their previous value
    /// and are returned.
    pub fn update_settings(&mut self, value: &Value) -> Vec<ConfigError> {
        let errors = self.settings.apply_json(value);
        self.analyzer
            .set_import_paths(self.settings.import_paths.iter().cloned());
        debug!(rejected = errors.len(), "settings updated");
        errors
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis {
            snapshot: self.analyzer.snapshot(),
            settings: &self.settings,
        }
    }
}

/// An immutable snapshot of the analysis state.
///
/// All IDE queries go through this struct to ensure consistent results.
pub struct Analysis<'a> {
    snapshot: AnalyzerSnapshot<'a>,
    settings: &'a Settings,
}

impl Analysis<'_> {
    /// Diagnostics of an indexed file; empty for unknown URIs.
    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        let Some(file) = self.snapshot.file(uri) else {
            return Vec::new();
        };
        hir::evaluate(file, &self.snapshot, &self.settings.diagnostics)
    }

    /// Full-document formatting edit; `None` when nothing changes.
    pub fn format_document(&self, text: &str, uri: &str) -> Option<TextEdit> {
        debug!(uri, "format document");
        super::edits::format_document(text, &self.settings.format)
    }

    /// Formatting edit for the lines covered by `range`.
    pub fn format_range(&self, text: &str, range: Span, uri: &str) -> Option<TextEdit> {
        debug!(uri, start = range.start.line, end = range.end.line, "format range");
        super::edits::format_range(text, range, &self.settings.format)
    }

    /// Declaration location of the reference at `position`.
    pub fn resolve_reference(&self, uri: &str, position: Position) -> Option<Location> {
        super::resolve_reference(&self.snapshot, uri, position)
    }

    /// Search for symbols across the workspace.
    pub fn workspace_symbols(&self, query: &str) -> Vec<SymbolInfo> {
        super::workspace_symbols(self.snapshot.index(), query)
    }

    /// Get all symbols in a document.
    pub fn document_symbols(&self, uri: &str) -> Vec<SymbolInfo> {
        super::document_symbols(self.snapshot.index(), uri)
    }

    pub fn snapshot(&self) -> &AnalyzerSnapshot<'_> {
        &self.snapshot
    }
}
