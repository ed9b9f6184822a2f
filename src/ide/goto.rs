//! Resolve-reference (go-to-definition) implementation.

use std::sync::Arc;

use serde::Serialize;

use crate::base::{Position, Span};
use crate::hir::{AnalyzerSnapshot, SymbolEntry};

/// A location in a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub uri: Arc<str>,
    pub range: Span,
}

impl From<&SymbolEntry> for Location {
    fn from(symbol: &SymbolEntry) -> Self {
        Self {
            uri: symbol.uri.clone(),
            range: symbol.name_span,
        }
    }
}

/// Find the declaration referenced at `position`.
///
/// Handles type references (field types, map values, rpc types, extendees),
/// parenthesized custom option names and import paths. An import resolves to
/// the start of the imported file.
pub fn resolve_reference(
    snapshot: &AnalyzerSnapshot<'_>,
    uri: &str,
    position: Position,
) -> Option<Location> {
    let file = snapshot.file(uri)?;
    let resolver = snapshot.resolver();

    if let Some(reference) = file.type_reference_at(position) {
        return resolver.resolve_reference(reference).map(Location::from);
    }

    let option = file
        .all_options()
        .into_iter()
        .find(|o| o.name_span.contains(position));
    if let Some(option) = option {
        let name = option.extension_name()?;
        return resolver
            .resolve_extension(file.package_name(), name)
            .map(Location::from);
    }

    let import = file.import_at(position)?;
    let target = snapshot.resolve_import(uri, &import.path)?;
    Some(Location {
        uri: target,
        range: Span::default(),
    })
}
