//! Workspace-wide symbol index.
//!
//! Maps qualified names to the declarations that define them, keeps the
//! current [`ProtoFile`] of every indexed URI and the raw import edges of
//! each file. All mutation goes through [`WorkspaceSymbolIndex::update_file`]
//! and [`WorkspaceSymbolIndex::remove_file`], which drop every entry owned by
//! the URI before inserting the new ones.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::symbols::{SymbolEntry, file_symbols};
use crate::base::Span;
use crate::syntax::{ImportModifier, ProtoFile};

/// An import statement as recorded in the index. The target URI is resolved
/// on demand because the imported file may be indexed later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportEdge {
    pub from: Arc<str>,
    pub path: SmolStr,
    pub modifier: ImportModifier,
    /// Range of the whole import statement.
    pub span: Span,
}

/// The cross-file qualified name → declaration map.
#[derive(Clone, Debug, Default)]
pub struct WorkspaceSymbolIndex {
    /// Qualified name → owners, ordered by owning URI (ties keep source order).
    symbols: IndexMap<Arc<str>, Vec<SymbolEntry>>,
    files: IndexMap<Arc<str>, Arc<ProtoFile>>,
    imports: FxHashMap<Arc<str>, Vec<ImportEdge>>,
    /// URI → qualified names it contributed.
    by_file: FxHashMap<Arc<str>, Vec<Arc<str>>>,
}

impl WorkspaceSymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything owned by `file.uri` with the contents of `file`.
    pub fn update_file(&mut self, file: Arc<ProtoFile>) {
        let uri = file.uri.clone();
        let removed = self.remove_entries(&uri);

        let symbols = file_symbols(&file);
        let inserted = symbols.len();
        let mut names = Vec::with_capacity(inserted);
        for symbol in symbols {
            names.push(symbol.qualified_name.clone());
            let owners = self
                .symbols
                .entry(symbol.qualified_name.clone())
                .or_default();
            let at = owners.partition_point(|o| o.uri <= symbol.uri);
            owners.insert(at, symbol);
        }

        let edges = file
            .imports
            .iter()
            .map(|import| ImportEdge {
                from: uri.clone(),
                path: import.path.clone(),
                modifier: import.modifier,
                span: import.span,
            })
            .collect();

        self.by_file.insert(uri.clone(), names);
        self.imports.insert(uri.clone(), edges);
        self.files.insert(uri.clone(), file);
        debug!(%uri, removed, inserted, "index updated");
    }

    /// Drop a file and everything it contributed. Returns whether it was known.
    pub fn remove_file(&mut self, uri: &str) -> bool {
        let removed = self.remove_entries(uri);
        self.imports.remove(uri);
        let known = self.files.shift_remove(uri).is_some();
        if known {
            debug!(uri, removed, "file removed from index");
        }
        known
    }

    fn remove_entries(&mut self, uri: &str) -> usize {
        let Some(names) = self.by_file.remove(uri) else {
            return 0;
        };
        let mut removed = 0;
        for name in names {
            let Some(owners) = self.symbols.get_mut(&name) else {
                continue;
            };
            let before = owners.len();
            owners.retain(|o| o.uri.as_ref() != uri);
            removed += before - owners.len();
            if owners.is_empty() {
                self.symbols.shift_remove(&name);
            }
        }
        removed
    }

    /// The canonical owner of a qualified name: the one whose URI sorts first.
    pub fn lookup(&self, qualified_name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(qualified_name)?.first()
    }

    /// Every declaration of a qualified name across the workspace.
    pub fn lookup_all(&self, qualified_name: &str) -> &[SymbolEntry] {
        self.symbols
            .get(qualified_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.symbols.values().flatten()
    }

    pub fn symbols_in_file(&self, uri: &str) -> Vec<&SymbolEntry> {
        self.symbols().filter(|s| s.uri.as_ref() == uri).collect()
    }

    pub fn file(&self, uri: &str) -> Option<&Arc<ProtoFile>> {
        self.files.get(uri)
    }

    pub fn files(&self) -> impl Iterator<Item = &Arc<ProtoFile>> {
        self.files.values()
    }

    pub fn uris(&self) -> indexmap::map::Keys<'_, Arc<str>, Arc<ProtoFile>> {
        self.files.keys()
    }

    pub fn import_edges(&self, uri: &str) -> &[ImportEdge] {
        self.imports
            .get(uri)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct qualified names.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
