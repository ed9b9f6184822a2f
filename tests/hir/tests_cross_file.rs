//! Cross-file resolution and index consistency across updates.

use std::sync::Arc;

use protoscope::hir::diagnostics::codes;
use protoscope::hir::SymbolKind;
use protoscope::{Analyzer, parse};

use crate::helpers::host_helpers::{describe, diagnostics_for, host_from_sources, with_code};
use crate::helpers::source_fixtures::{COMMON_URI, ORDERS_URI, workspace};

const A_URI: &str = "file:///ws/a.proto";
const B_URI: &str = "file:///ws/b.proto";

fn analyzer_with(files: &[(&str, &str)]) -> Analyzer {
    let analyzer = Analyzer::new();
    for (uri, text) in files {
        analyzer.update_file(Arc::new(parse(text, uri)));
    }
    analyzer
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[test]
fn test_same_package_reference_across_files() {
    let analyzer = analyzer_with(&[
        (A_URI, "package foo;\nmessage Bar {}\n"),
        (B_URI, "package foo;\nimport \"a.proto\";\nmessage Baz {\n  Bar b = 1;\n}\n"),
    ]);

    let bar = analyzer
        .resolve_type_reference("foo.Baz", "Bar")
        .expect("Bar should resolve from foo.Baz");
    assert_eq!(bar.qualified_name.as_ref(), "foo.Bar");
    assert_eq!(bar.uri.as_ref(), A_URI);
    assert_eq!(bar.kind, SymbolKind::Message);
    assert_eq!(
        analyzer.imported_file_uris(B_URI),
        vec![Arc::<str>::from(A_URI)]
    );
}

#[test]
fn test_fixture_workspace_resolves() {
    let host = host_from_sources(&workspace());
    let analyzer = host.analyzer();

    let money = analyzer
        .resolve_type_reference("acme.orders.Order", "acme.common.Money")
        .expect("partially qualified reference");
    assert_eq!(money.uri.as_ref(), COMMON_URI);

    let item = analyzer
        .resolve_type_reference("acme.orders.OrderService", "Order.LineItem")
        .expect("nested type through its parent");
    assert_eq!(item.qualified_name.as_ref(), "acme.orders.Order.LineItem");

    let absolute = analyzer.resolve_type_reference("acme.orders.Order", ".acme.common.Status");
    assert_eq!(absolute.map(|s| s.kind), Some(SymbolKind::Enum));

    assert!(analyzer.resolve_type_reference("acme.orders.Order", "Money").is_none());
}

#[test]
fn test_fixture_workspace_is_clean() {
    let host = host_from_sources(&workspace());
    for uri in [COMMON_URI, ORDERS_URI] {
        let diagnostics = diagnostics_for(&host, uri);
        assert!(diagnostics.is_empty(), "{uri}:\n{}", describe(&diagnostics));
    }
}

#[test]
fn test_innermost_scope_wins() {
    let analyzer = analyzer_with(&[(
        A_URI,
        "package p;\nmessage Item {}\nmessage Outer {\n  message Item {}\n  Item inner = 1;\n}\n",
    )]);
    let item = analyzer.resolve_type_reference("p.Outer", "Item");
    assert_eq!(
        item.map(|s| s.qualified_name.to_string()).as_deref(),
        Some("p.Outer.Item")
    );
}

// ============================================================================
// UPDATE CONSISTENCY
// ============================================================================

#[test]
fn test_removed_declaration_stops_resolving() {
    let mut host = host_from_sources(&[
        (A_URI, "package foo;\nmessage Bar {}\nmessage Qux {}\n"),
        (
            B_URI,
            "package foo;\nimport \"a.proto\";\nmessage Baz {\n  Bar b = 1;\n  Qux q = 2;\n}\n",
        ),
    ]);
    assert!(diagnostics_for(&host, B_URI).is_empty());

    host.set_file_content(A_URI, "package foo;\nmessage Bar {}\n");
    assert!(host.analyzer().resolve_type_reference("foo.Baz", "Qux").is_none());
    assert!(host.analyzer().resolve_type_reference("foo.Baz", "Bar").is_some());

    let unresolved = with_code(&diagnostics_for(&host, B_URI), codes::UNDEFINED_REFERENCE);
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].message.as_ref(), "unresolved type 'Qux'");
    assert_eq!(unresolved[0].range.start.line, 4);
}

#[test]
fn test_removed_file_leaves_no_entries() {
    let mut host = host_from_sources(&[
        (A_URI, "package foo;\nmessage Bar {}\n"),
        (B_URI, "package foo;\nimport \"a.proto\";\nmessage Baz {\n  Bar b = 1;\n}\n"),
    ]);
    assert!(host.remove_file(A_URI));
    assert!(!host.remove_file(A_URI));

    let snapshot = host.analyzer().snapshot();
    assert!(snapshot.index().lookup("foo.Bar").is_none());
    assert!(snapshot.index().symbols().all(|s| s.uri.as_ref() != A_URI));
    drop(snapshot);

    let diagnostics = diagnostics_for(&host, B_URI);
    assert_eq!(with_code(&diagnostics, codes::UNRESOLVED_IMPORT).len(), 1);
    assert_eq!(with_code(&diagnostics, codes::UNDEFINED_REFERENCE).len(), 1);
}

#[test]
fn test_readding_file_restores_resolution() {
    let mut host = host_from_sources(&[(
        B_URI,
        "package foo;\nimport \"a.proto\";\nmessage Baz {\n  Bar b = 1;\n}\n",
    )]);
    assert!(!diagnostics_for(&host, B_URI).is_empty());

    host.set_file_content(A_URI, "package foo;\nmessage Bar {}\n");
    let diagnostics = diagnostics_for(&host, B_URI);
    assert!(diagnostics.is_empty(), "{}", describe(&diagnostics));
}

#[test]
fn test_update_replaces_old_declarations() {
    let analyzer = analyzer_with(&[(A_URI, "package p;\nmessage Old {}\n")]);
    analyzer.update_file(Arc::new(parse("package p;\nmessage New {}\n", A_URI)));

    let snapshot = analyzer.snapshot();
    let names: Vec<_> = snapshot
        .index()
        .symbols_in_file(A_URI)
        .into_iter()
        .map(|s| s.qualified_name.to_string())
        .collect();
    assert_eq!(names, vec!["p.New"]);
}

#[test]
fn test_duplicate_owner_is_deterministic() {
    let a = (A_URI, "package p;\nmessage Dup {}\n");
    let b = (B_URI, "package p;\nmessage Dup {}\n");
    for order in [[a, b], [b, a]] {
        let analyzer = analyzer_with(&order);
        let owner = analyzer
            .resolve_type_reference("p", "Dup")
            .expect("duplicate still resolves");
        assert_eq!(owner.uri.as_ref(), A_URI);
    }
}
