//! Symbol listing for workspace and document views.

use std::sync::Arc;

use serde::Serialize;

use super::goto::Location;
use crate::hir::{SymbolEntry, SymbolKind, WorkspaceSymbolIndex};

/// A symbol for the workspace symbol list or document outline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SymbolInfo {
    pub name: Arc<str>,
    pub qualified_name: Arc<str>,
    pub kind: SymbolKind,
    pub location: Location,
    /// Qualified name of the enclosing declaration, if nested.
    pub container_name: Option<Arc<str>>,
}

impl SymbolInfo {
    pub fn from_entry(symbol: &SymbolEntry) -> Self {
        Self {
            name: Arc::from(symbol.name.as_str()),
            qualified_name: symbol.qualified_name.clone(),
            kind: symbol.kind,
            location: Location::from(symbol),
            container_name: symbol.container.clone(),
        }
    }
}

/// Get all symbols in the workspace whose qualified name contains `query`
/// (case-insensitive). An empty query matches everything.
///
/// Sorted by qualified name, then by URI for duplicate declarations.
pub fn workspace_symbols(index: &WorkspaceSymbolIndex, query: &str) -> Vec<SymbolInfo> {
    let query = query.to_lowercase();
    let mut results: Vec<SymbolInfo> = index
        .symbols()
        .filter(|sym| query.is_empty() || sym.qualified_name.to_lowercase().contains(&query))
        .map(SymbolInfo::from_entry)
        .collect();

    results.sort_by(|a, b| {
        a.qualified_name
            .cmp(&b.qualified_name)
            .then_with(|| a.location.uri.cmp(&b.location.uri))
    });
    results
}

/// Get all symbols declared in a file, in source order.
pub fn document_symbols(index: &WorkspaceSymbolIndex, uri: &str) -> Vec<SymbolInfo> {
    let mut results: Vec<SymbolInfo> = index
        .symbols_in_file(uri)
        .into_iter()
        .map(SymbolInfo::from_entry)
        .collect();
    results.sort_by_key(|s| s.location.range.start);
    results
}
