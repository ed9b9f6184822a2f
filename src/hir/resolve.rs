//! Name resolution: resolving type references to their declarations.
//!
//! Lookup follows protobuf scoping: a relative name is tried in the scope
//! the reference appears in, then in each enclosing scope out to the
//! package, then through the package's parent packages, and finally as a
//! fully qualified name. The first candidate that exists wins. A leading `.`
//! skips the walk and looks the name up exactly.

use tracing::trace;

use super::index::WorkspaceSymbolIndex;
use super::symbols::{SymbolEntry, SymbolKind};
use crate::syntax::TypeReference;

/// Resolver over a snapshot of the symbol index.
pub struct Resolver<'a> {
    index: &'a WorkspaceSymbolIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a WorkspaceSymbolIndex) -> Self {
        Self { index }
    }

    /// Resolve a message or enum name as seen from `scope`.
    pub fn resolve_type(&self, scope: &str, name: &str) -> Option<&'a SymbolEntry> {
        self.resolve_with(scope, name, SymbolKind::is_type)
    }

    pub fn resolve_reference(&self, reference: &TypeReference) -> Option<&'a SymbolEntry> {
        self.resolve_type(&reference.scope, &reference.name)
    }

    /// Resolve a parenthesized custom option name such as `(my.opt)`.
    pub fn resolve_extension(&self, scope: &str, name: &str) -> Option<&'a SymbolEntry> {
        self.resolve_with(scope, name, |kind| kind == SymbolKind::Extension)
    }

    /// Resolve `name` from `scope`, accepting only symbols whose kind passes
    /// `accept`.
    pub fn resolve_with(
        &self,
        scope: &str,
        name: &str,
        accept: impl Fn(SymbolKind) -> bool,
    ) -> Option<&'a SymbolEntry> {
        if name.is_empty() {
            return None;
        }
        let lookup = |candidate: &str| {
            trace!(candidate, "resolution candidate");
            self.index.lookup(candidate).filter(|s| accept(s.kind))
        };

        if let Some(absolute) = name.strip_prefix('.') {
            return lookup(absolute);
        }

        for scope in scope_chain(scope) {
            let candidate = if scope.is_empty() {
                name.to_string()
            } else {
                format!("{scope}.{name}")
            };
            if let Some(symbol) = lookup(&candidate) {
                return Some(symbol);
            }
        }
        None
    }
}

/// `a.b.c` yields `a.b.c`, `a.b`, `a`, and the root scope ``.
pub fn scope_chain(scope: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(scope);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current.is_empty() {
            None
        } else {
            Some(current.rfind('.').map_or("", |idx| &current[..idx]))
        };
        Some(current)
    })
}
