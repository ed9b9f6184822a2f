//! The parsed representation of one schema file.

use std::sync::Arc;

use super::ast::{
    Declaration, Import, OptionDecl, Package, SyntaxDecl, SyntaxKeyword, TypeReference,
};
use crate::base::Span;

/// A syntax error recorded during parsing. Never thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A parsed schema file.
///
/// Immutable once produced: a reparse yields a new `ProtoFile` which replaces
/// the old one wholesale. Shared as `Arc<ProtoFile>` between the parse cache,
/// the symbol index and diagnostic rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoFile {
    pub uri: Arc<str>,
    /// Fx hash of the source text this file was parsed from.
    pub content_hash: u64,
    pub syntax: Option<SyntaxDecl>,
    pub package: Option<Package>,
    pub imports: Vec<Import>,
    pub options: Vec<OptionDecl>,
    pub declarations: Vec<Declaration>,
    pub errors: Vec<SyntaxError>,
}

impl ProtoFile {
    /// Package name, or the empty string for files without a package.
    pub fn package_name(&self) -> &str {
        self.package.as_ref().map_or("", |p| &p.name)
    }

    /// `true` for `syntax = "proto2"` and for files without a syntax statement.
    pub fn is_proto2(&self) -> bool {
        match &self.syntax {
            None => true,
            Some(s) => s.kind == SyntaxKeyword::Syntax && s.value == "proto2",
        }
    }

    pub fn is_proto3(&self) -> bool {
        self.syntax
            .as_ref()
            .is_some_and(|s| s.kind == SyntaxKeyword::Syntax && s.value == "proto3")
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Visit every declaration depth-first with its nesting depth (top level = 1).
    pub fn walk_declarations<'a>(&'a self, f: &mut impl FnMut(&'a Declaration, usize)) {
        fn walk<'a>(
            decls: &'a [Declaration],
            depth: usize,
            f: &mut impl FnMut(&'a Declaration, usize),
        ) {
            for decl in decls {
                f(decl, depth);
                walk(decl.nested(), depth + 1, f);
            }
        }
        walk(&self.declarations, 1, f);
    }

    /// All declarations, depth-first.
    pub fn all_declarations(&self) -> Vec<&Declaration> {
        let mut out = Vec::new();
        self.walk_declarations(&mut |decl, _| out.push(decl));
        out
    }

    /// Every type reference in the file: field types, map values, extendees,
    /// rpc request and response types.
    pub fn type_references(&self) -> Vec<&TypeReference> {
        let mut refs = Vec::new();
        self.walk_declarations(&mut |decl, _| match decl {
            Declaration::Message(m) => {
                refs.extend(m.all_fields().filter_map(|f| f.ty.type_reference()));
            }
            Declaration::Extend(x) => {
                refs.push(&x.extendee);
                refs.extend(x.fields.iter().filter_map(|f| f.ty.type_reference()));
            }
            Declaration::Service(s) => {
                for rpc in &s.rpcs {
                    refs.push(&rpc.input);
                    refs.push(&rpc.output);
                }
            }
            Declaration::Enum(_) => {}
        });
        refs
    }

    /// Every option in the file, at any level.
    pub fn all_options(&self) -> Vec<&OptionDecl> {
        let mut options: Vec<&OptionDecl> = self.options.iter().collect();
        self.walk_declarations(&mut |decl, _| {
            options.extend(decl.options());
            match decl {
                Declaration::Message(m) => {
                    options.extend(m.all_fields().flat_map(|f| f.options.iter()));
                    options.extend(m.oneofs.iter().flat_map(|o| o.options.iter()));
                }
                Declaration::Enum(e) => {
                    options.extend(e.values.iter().flat_map(|v| v.options.iter()));
                }
                Declaration::Service(s) => {
                    options.extend(s.rpcs.iter().flat_map(|r| r.options.iter()));
                }
                Declaration::Extend(x) => {
                    options.extend(x.fields.iter().flat_map(|f| f.options.iter()));
                }
            }
        });
        options
    }

    /// Find the innermost type reference covering a position.
    pub fn type_reference_at(&self, position: crate::base::Position) -> Option<&TypeReference> {
        self.type_references()
            .into_iter()
            .find(|r| r.span.contains(position))
    }

    /// Find the import whose path literal covers a position.
    pub fn import_at(&self, position: crate::base::Position) -> Option<&Import> {
        self.imports.iter().find(|i| i.path_span.contains(position))
    }
}
