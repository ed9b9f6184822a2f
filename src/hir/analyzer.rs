//! The Analyzer: owner of the workspace symbol index.
//!
//! Every mutation takes the write lock for the whole remove-then-insert of one
//! file, so readers holding an [`AnalyzerSnapshot`] never observe a file with
//! only part of its declarations replaced.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashSet;

use super::imports::{ImportCycle, ImportGraph};
use super::index::WorkspaceSymbolIndex;
use super::resolve::Resolver;
use super::symbols::SymbolEntry;
use crate::project::ImportResolver;
use crate::syntax::{ImportModifier, ProtoFile};

#[derive(Default)]
pub struct Analyzer {
    index: RwLock<WorkspaceSymbolIndex>,
    imports: RwLock<ImportResolver>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all entries owned by `file.uri` with the declarations of `file`.
    pub fn update_file(&self, file: Arc<ProtoFile>) {
        self.index.write().update_file(file);
    }

    pub fn remove_file(&self, uri: &str) -> bool {
        self.index.write().remove_file(uri)
    }

    /// Search roots for import paths, tried after the importing file's directory.
    pub fn set_import_paths(&self, paths: impl IntoIterator<Item = impl Into<String>>) {
        self.imports.write().set_roots(paths);
    }

    /// A consistent read view. Updates block while it is alive.
    pub fn snapshot(&self) -> AnalyzerSnapshot<'_> {
        AnalyzerSnapshot {
            index: self.index.read(),
            imports: self.imports.read(),
        }
    }

    pub fn resolve_type_reference(&self, scope: &str, name: &str) -> Option<SymbolEntry> {
        self.snapshot().resolver().resolve_type(scope, name).cloned()
    }

    pub fn imported_file_uris(&self, uri: &str) -> Vec<Arc<str>> {
        self.snapshot().imported_file_uris(uri)
    }

    pub fn detect_cycles(&self) -> Vec<ImportCycle> {
        self.snapshot().detect_cycles()
    }
}

/// Read guard over the index and import roots.
pub struct AnalyzerSnapshot<'a> {
    index: RwLockReadGuard<'a, WorkspaceSymbolIndex>,
    imports: RwLockReadGuard<'a, ImportResolver>,
}

impl AnalyzerSnapshot<'_> {
    pub fn index(&self) -> &WorkspaceSymbolIndex {
        &self.index
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.index)
    }

    pub fn file(&self, uri: &str) -> Option<&Arc<ProtoFile>> {
        self.index.file(uri)
    }

    /// Resolve an import path written in `from` to an indexed URI.
    pub fn resolve_import(&self, from: &str, path: &str) -> Option<Arc<str>> {
        self.imports.resolve(from, path, self.index.uris())
    }

    /// Resolved targets of the direct imports of `uri`, in statement order.
    /// Unresolved imports are skipped.
    pub fn imported_file_uris(&self, uri: &str) -> Vec<Arc<str>> {
        let mut out: Vec<Arc<str>> = Vec::new();
        for edge in self.index.import_edges(uri) {
            if let Some(target) = self.resolve_import(uri, &edge.path) {
                if !out.contains(&target) {
                    out.push(target);
                }
            }
        }
        out
    }

    /// Files whose declarations `uri` may reference: itself, its direct
    /// imports, and everything those re-export through `import public`.
    pub fn visible_files(&self, uri: &str) -> FxHashSet<Arc<str>> {
        let mut visible = FxHashSet::default();
        if let Some(file) = self.index.file(uri) {
            visible.insert(file.uri.clone());
        }
        for import in self.imported_file_uris(uri) {
            visible.extend(self.exported_files(import));
        }
        visible
    }

    /// `uri` plus every file it re-exports through `import public`, transitively.
    pub fn exported_files(&self, uri: Arc<str>) -> FxHashSet<Arc<str>> {
        let mut exported = FxHashSet::default();
        let mut stack = vec![uri];
        while let Some(next) = stack.pop() {
            if !exported.insert(next.clone()) {
                continue;
            }
            for edge in self.index.import_edges(&next) {
                if edge.modifier != ImportModifier::Public {
                    continue;
                }
                if let Some(target) = self.resolve_import(&next, &edge.path) {
                    stack.push(target);
                }
            }
        }
        exported
    }

    pub fn import_graph(&self) -> ImportGraph {
        ImportGraph::build(&self.index, &self.imports)
    }

    pub fn detect_cycles(&self) -> Vec<ImportCycle> {
        self.import_graph().cycles()
    }
}
