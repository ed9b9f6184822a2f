//! Rules that consult the analyzer snapshot.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{Diagnostic, RelatedInfo, RuleContext, RuleError, codes};
use crate::hir::resolve::Resolver;
use crate::hir::symbols::SymbolKind;
use crate::parser::qualify;
use crate::syntax::{Declaration, FieldType, ImportModifier, ProtoFile};

type RuleResult = Result<Vec<Diagnostic>, RuleError>;

/// Workspace rules read the file's import edges from the index, so the file
/// must have been indexed.
fn ensure_indexed(cx: &RuleContext<'_>) -> Result<(), RuleError> {
    match cx.snapshot.file(&cx.file.uri) {
        Some(_) => Ok(()),
        None => Err(RuleError::NotIndexed(cx.file.uri.clone())),
    }
}

pub(super) fn references(cx: &RuleContext<'_>) -> RuleResult {
    ensure_indexed(cx)?;
    let resolver = cx.snapshot.resolver();
    let visible = cx.snapshot.visible_files(&cx.file.uri);
    let mut out = Vec::new();
    for reference in cx.file.type_references() {
        if reference.name.is_empty() {
            continue;
        }
        match resolver.resolve_reference(reference) {
            None => out.push(
                Diagnostic::error(
                    reference.span,
                    format!("unresolved type '{}'", reference.name),
                )
                .with_code(codes::UNDEFINED_REFERENCE),
            ),
            Some(symbol) if !visible.contains(&symbol.uri) => out.push(
                Diagnostic::warning(
                    reference.span,
                    format!(
                        "'{}' is declared in '{}', which is not imported",
                        symbol.qualified_name, symbol.uri
                    ),
                )
                .with_code(codes::MISSING_IMPORT)
                .with_related(RelatedInfo::new(&symbol.uri, symbol.name_span, "declared here")),
            ),
            Some(_) => {}
        }
    }
    Ok(out)
}

pub(super) fn imports(cx: &RuleContext<'_>) -> RuleResult {
    Ok(cx
        .file
        .imports
        .iter()
        .filter(|import| {
            cx.snapshot
                .resolve_import(&cx.file.uri, &import.path)
                .is_none()
        })
        .map(|import| {
            Diagnostic::error(
                import.path_span,
                format!("import '{}' was not found", import.path),
            )
            .with_code(codes::UNRESOLVED_IMPORT)
        })
        .collect())
}

/// URIs of every declaration the file refers to by type or custom option.
fn referenced_files(file: &ProtoFile, resolver: &Resolver<'_>) -> FxHashSet<Arc<str>> {
    let mut used: FxHashSet<Arc<str>> = file
        .type_references()
        .into_iter()
        .filter_map(|r| resolver.resolve_reference(r))
        .map(|symbol| symbol.uri.clone())
        .collect();
    for option in file.all_options() {
        if let Some(name) = option.extension_name() {
            if let Some(symbol) = resolver.resolve_extension(file.package_name(), name) {
                used.insert(symbol.uri.clone());
            }
        }
    }
    used
}

pub(super) fn unused_imports(cx: &RuleContext<'_>) -> RuleResult {
    ensure_indexed(cx)?;
    let resolver = cx.snapshot.resolver();
    let used = referenced_files(cx.file, &resolver);
    let mut out = Vec::new();
    for import in &cx.file.imports {
        // Public imports re-export; weak imports are allowed to go unused.
        if import.modifier != ImportModifier::None {
            continue;
        }
        let Some(target) = cx.snapshot.resolve_import(&cx.file.uri, &import.path) else {
            continue;
        };
        if target == cx.file.uri {
            continue;
        }
        let provided = cx.snapshot.exported_files(target);
        if provided.iter().any(|uri| used.contains(uri)) {
            continue;
        }
        out.push(
            Diagnostic::warning(import.span, format!("import '{}' is unused", import.path))
                .with_code(codes::UNUSED_IMPORT),
        );
    }
    Ok(out)
}

pub(super) fn duplicate_symbols(cx: &RuleContext<'_>) -> RuleResult {
    ensure_indexed(cx)?;
    let index = cx.snapshot.index();
    let mut reported = FxHashSet::default();
    let mut out = Vec::new();
    for symbol in index.symbols_in_file(&cx.file.uri) {
        if !reported.insert(symbol.qualified_name.clone()) {
            continue;
        }
        let others: Vec<_> = index
            .lookup_all(&symbol.qualified_name)
            .iter()
            .filter(|owner| owner.uri != symbol.uri)
            .collect();
        if others.is_empty() {
            continue;
        }
        let elsewhere: Vec<&str> = others.iter().map(|o| o.uri.as_ref()).collect();
        let mut diagnostic = Diagnostic::error(
            symbol.name_span,
            format!(
                "'{}' is also declared in {}",
                symbol.qualified_name,
                elsewhere.join(", ")
            ),
        )
        .with_code(codes::DUPLICATE_SYMBOL);
        for other in others {
            diagnostic = diagnostic.with_related(RelatedInfo::new(
                &other.uri,
                other.name_span,
                "other declaration",
            ));
        }
        out.push(diagnostic);
    }
    Ok(out)
}

pub(super) fn deprecated(cx: &RuleContext<'_>) -> RuleResult {
    ensure_indexed(cx)?;
    let resolver = cx.snapshot.resolver();
    let index = cx.snapshot.index();
    let mut out = Vec::new();

    for reference in cx.file.type_references() {
        if let Some(symbol) = resolver.resolve_reference(reference) {
            if symbol.deprecated {
                out.push(
                    Diagnostic::warning(
                        reference.span,
                        format!("'{}' is deprecated", symbol.qualified_name),
                    )
                    .with_code(codes::DEPRECATED),
                );
            }
        }
    }

    for option in cx.file.all_options() {
        let Some(name) = option.extension_name() else {
            continue;
        };
        if let Some(symbol) = resolver.resolve_extension(cx.file.package_name(), name) {
            if symbol.deprecated {
                out.push(
                    Diagnostic::warning(
                        option.name_span,
                        format!("option '{}' is deprecated", symbol.qualified_name),
                    )
                    .with_code(codes::DEPRECATED),
                );
            }
        }
    }

    // `[default = VALUE]` naming a deprecated enum value.
    let mut fields = Vec::new();
    cx.file.walk_declarations(&mut |decl, _| match decl {
        Declaration::Message(m) => fields.extend(m.all_fields()),
        Declaration::Extend(x) => fields.extend(x.fields.iter()),
        _ => {}
    });
    for field in fields {
        let FieldType::Named(reference) = &field.ty else {
            continue;
        };
        let Some(default) = field.options.iter().find(|o| o.name == "default") else {
            continue;
        };
        let Some(enum_symbol) = resolver
            .resolve_reference(reference)
            .filter(|s| s.kind == SymbolKind::Enum)
        else {
            continue;
        };
        let parent = enum_symbol
            .qualified_name
            .rfind('.')
            .map_or("", |idx| &enum_symbol.qualified_name[..idx]);
        let value_name = qualify(parent, default.value.trim());
        let value = index
            .lookup_all(&value_name)
            .iter()
            .find(|v| {
                v.kind == SymbolKind::EnumValue
                    && v.container.as_ref() == Some(&enum_symbol.qualified_name)
            });
        if value.is_some_and(|v| v.deprecated) {
            out.push(
                Diagnostic::warning(
                    default.span,
                    format!("enum value '{}' is deprecated", default.value.trim()),
                )
                .with_code(codes::DEPRECATED),
            );
        }
    }
    Ok(out)
}

fn find_declaration<'f>(file: &'f ProtoFile, qualified_name: &str) -> Option<&'f Declaration> {
    let mut found = None;
    file.walk_declarations(&mut |decl, _| {
        let hit = decl
            .qualified_name()
            .is_some_and(|q| q.as_ref() == qualified_name);
        if found.is_none() && hit {
            found = Some(decl);
        }
    });
    found
}

/// Qualified type of the extension field named by a custom option.
fn extension_type(
    cx: &RuleContext<'_>,
    resolver: &Resolver<'_>,
    file: &ProtoFile,
    name: &str,
) -> Option<Arc<str>> {
    let symbol = resolver.resolve_extension(file.package_name(), name)?;
    let owner = cx.snapshot.file(&symbol.uri)?;
    let mut ty = None;
    owner.walk_declarations(&mut |decl, _| {
        if let Declaration::Extend(x) = decl {
            let field = x
                .fields
                .iter()
                .find(|f| f.qualified_name == symbol.qualified_name);
            if let Some(field) = field {
                ty = field.ty.type_reference().cloned();
            }
        }
    });
    let reference = ty?;
    resolver
        .resolve_reference(&reference)
        .map(|s| s.qualified_name.clone())
}

pub(super) fn unused_symbols(cx: &RuleContext<'_>) -> RuleResult {
    ensure_indexed(cx)?;
    let index = cx.snapshot.index();
    let resolver = cx.snapshot.resolver();

    // Referenced from another file.
    let mut used: FxHashSet<Arc<str>> = FxHashSet::default();
    for other in index.files().filter(|f| f.uri != cx.file.uri) {
        used.extend(
            other
                .type_references()
                .into_iter()
                .filter_map(|r| resolver.resolve_reference(r))
                .map(|s| s.qualified_name.clone()),
        );
    }

    // Entry points: rpc request/response types and custom option types.
    let mut queue: Vec<Arc<str>> = used.iter().cloned().collect();
    for file in index.files() {
        file.walk_declarations(&mut |decl, _| {
            if let Declaration::Service(s) = decl {
                for rpc in &s.rpcs {
                    for reference in [&rpc.input, &rpc.output] {
                        if let Some(symbol) = resolver.resolve_reference(reference) {
                            queue.push(symbol.qualified_name.clone());
                        }
                    }
                }
            }
        });
        for option in file.all_options() {
            if let Some(name) = option.extension_name() {
                queue.extend(extension_type(cx, &resolver, file, name));
            }
        }
    }

    // Field types of anything reachable are reachable too.
    let mut reachable: FxHashSet<Arc<str>> = FxHashSet::default();
    while let Some(name) = queue.pop() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        let Some(symbol) = index.lookup(&name) else {
            continue;
        };
        let Some(owner) = cx.snapshot.file(&symbol.uri) else {
            continue;
        };
        if let Some(Declaration::Message(m)) = find_declaration(owner, &name) {
            queue.extend(
                m.all_fields()
                    .filter_map(|f| f.ty.type_reference())
                    .filter_map(|r| resolver.resolve_reference(r))
                    .map(|s| s.qualified_name.clone()),
            );
        }
    }

    Ok(index
        .symbols_in_file(&cx.file.uri)
        .into_iter()
        .filter(|s| s.kind.is_type() && !reachable.contains(&s.qualified_name))
        .map(|s| {
            Diagnostic::info(
                s.name_span,
                format!(
                    "{} '{}' is not used by another file or any service",
                    s.kind.display(),
                    s.name
                ),
            )
            .with_code(codes::UNUSED_SYMBOL)
        })
        .collect())
}

pub(super) fn circular_imports(cx: &RuleContext<'_>) -> RuleResult {
    ensure_indexed(cx)?;
    let uri = &cx.file.uri;
    let mut out = Vec::new();
    for cycle in cx.snapshot.detect_cycles() {
        let Some(pos) = cycle.files.iter().position(|f| f == uri) else {
            continue;
        };
        let next = &cycle.files[(pos + 1) % cycle.files.len()];
        let import = cx.file.imports.iter().find(|import| {
            cx.snapshot
                .resolve_import(uri, &import.path)
                .is_some_and(|target| &target == next)
        });
        let Some(import) = import.or(cx.file.imports.first()) else {
            continue;
        };
        out.push(
            Diagnostic::error(
                import.span,
                format!("circular import: {}", cycle.describe()),
            )
            .with_code(codes::CIRCULAR_DEPENDENCY),
        );
    }
    Ok(out)
}
