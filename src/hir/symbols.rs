//! Symbols extracted from a parsed file for the workspace index.

use std::sync::Arc;

use serde::Serialize;
use smol_str::SmolStr;

use crate::base::Span;
use crate::syntax::{Declaration, ProtoFile};

/// What kind of declaration a symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Message,
    Enum,
    EnumValue,
    Service,
    Rpc,
    /// A field declared inside an `extend` block.
    Extension,
}

impl SymbolKind {
    /// Kinds a field or rpc type reference may name.
    pub fn is_type(self) -> bool {
        matches!(self, SymbolKind::Message | SymbolKind::Enum)
    }

    pub fn display(self) -> &'static str {
        match self {
            SymbolKind::Message => "message",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumValue => "enum value",
            SymbolKind::Service => "service",
            SymbolKind::Rpc => "rpc",
            SymbolKind::Extension => "extension",
        }
    }
}

/// One named declaration owned by one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: SmolStr,
    pub qualified_name: Arc<str>,
    pub kind: SymbolKind,
    /// URI of the declaring file.
    pub uri: Arc<str>,
    /// Full declaration range.
    pub span: Span,
    pub name_span: Span,
    pub deprecated: bool,
    pub doc: Option<String>,
    /// Qualified name of the enclosing declaration, if nested.
    pub container: Option<Arc<str>>,
}

/// Extract every indexable symbol of a file, in source order.
pub fn file_symbols(file: &ProtoFile) -> Vec<SymbolEntry> {
    let mut symbols = Vec::new();
    collect(file, &file.declarations, None, &mut symbols);
    symbols
}

fn collect(
    file: &ProtoFile,
    decls: &[Declaration],
    container: Option<&Arc<str>>,
    out: &mut Vec<SymbolEntry>,
) {
    let symbol = |kind: SymbolKind, name: &SmolStr, qualified_name: &Arc<str>| SymbolEntry {
        name: name.clone(),
        qualified_name: qualified_name.clone(),
        kind,
        uri: file.uri.clone(),
        span: Span::default(),
        name_span: Span::default(),
        deprecated: false,
        doc: None,
        container: container.cloned(),
    };

    for decl in decls {
        match decl {
            Declaration::Message(m) => {
                out.push(SymbolEntry {
                    span: m.span,
                    name_span: m.name_span,
                    deprecated: decl.is_deprecated(),
                    doc: m.doc.clone(),
                    ..symbol(SymbolKind::Message, &m.name, &m.qualified_name)
                });
                collect(file, &m.nested, Some(&m.qualified_name), out);
            }
            Declaration::Enum(e) => {
                out.push(SymbolEntry {
                    span: e.span,
                    name_span: e.name_span,
                    deprecated: decl.is_deprecated(),
                    doc: e.doc.clone(),
                    ..symbol(SymbolKind::Enum, &e.name, &e.qualified_name)
                });
                out.extend(e.values.iter().map(|value| SymbolEntry {
                    span: value.span,
                    name_span: value.name_span,
                    deprecated: value.is_deprecated(),
                    doc: value.doc.clone(),
                    container: Some(e.qualified_name.clone()),
                    ..symbol(SymbolKind::EnumValue, &value.name, &value.qualified_name)
                }));
            }
            Declaration::Service(s) => {
                out.push(SymbolEntry {
                    span: s.span,
                    name_span: s.name_span,
                    deprecated: decl.is_deprecated(),
                    doc: s.doc.clone(),
                    ..symbol(SymbolKind::Service, &s.name, &s.qualified_name)
                });
                out.extend(s.rpcs.iter().map(|rpc| SymbolEntry {
                    span: rpc.span,
                    name_span: rpc.name_span,
                    deprecated: rpc.is_deprecated(),
                    doc: rpc.doc.clone(),
                    container: Some(s.qualified_name.clone()),
                    ..symbol(SymbolKind::Rpc, &rpc.name, &rpc.qualified_name)
                }));
            }
            Declaration::Extend(x) => {
                out.extend(x.fields.iter().map(|field| SymbolEntry {
                    span: field.span,
                    name_span: field.name_span,
                    deprecated: field.is_deprecated(),
                    doc: field.doc.clone(),
                    ..symbol(SymbolKind::Extension, &field.name, &field.qualified_name)
                }));
            }
        }
    }
}
