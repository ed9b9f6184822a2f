//! Resolve-reference and symbol queries over the fixture workspace.

use protoscope::Position;
use protoscope::hir::SymbolKind;

use crate::helpers::host_helpers::host_from_sources;
use crate::helpers::source_fixtures::{COMMON_URI, ORDERS_URI, workspace};

#[test]
fn test_resolve_field_type_across_files() {
    let host = host_from_sources(&workspace());
    let analysis = host.analysis();

    // `  acme.common.Money total = 2;`
    let location = analysis
        .resolve_reference(ORDERS_URI, Position::new(8, 16))
        .expect("Money should resolve");
    assert_eq!(location.uri.as_ref(), COMMON_URI);
    assert_eq!(location.range.start, Position::new(5, 8));
    assert_eq!(location.range.end, Position::new(5, 13));
}

#[test]
fn test_resolve_nested_type_in_same_file() {
    let host = host_from_sources(&workspace());
    // `  repeated LineItem items = 4;`
    let location = host
        .analysis()
        .resolve_reference(ORDERS_URI, Position::new(10, 13))
        .expect("LineItem should resolve");
    assert_eq!(location.uri.as_ref(), ORDERS_URI);
    assert_eq!(location.range.start.line, 17);
}

#[test]
fn test_resolve_rpc_types() {
    let host = host_from_sources(&workspace());
    // `  rpc GetOrder (GetOrderRequest) returns (Order);`
    let analysis = host.analysis();
    let input = analysis
        .resolve_reference(ORDERS_URI, Position::new(28, 18))
        .expect("request type");
    assert_eq!(input.range.start.line, 23);
    let output = analysis
        .resolve_reference(ORDERS_URI, Position::new(28, 45))
        .expect("response type");
    assert_eq!(output.range.start.line, 6);
}

#[test]
fn test_resolve_import_path() {
    let host = host_from_sources(&workspace());
    let location = host
        .analysis()
        .resolve_reference(ORDERS_URI, Position::new(4, 10))
        .expect("import path should resolve");
    assert_eq!(location.uri.as_ref(), COMMON_URI);
    assert_eq!(location.range.start, Position::new(0, 0));
}

#[test]
fn test_resolve_on_whitespace_and_keywords() {
    let host = host_from_sources(&workspace());
    let analysis = host.analysis();
    assert!(analysis.resolve_reference(ORDERS_URI, Position::new(1, 0)).is_none());
    assert!(analysis.resolve_reference(ORDERS_URI, Position::new(6, 2)).is_none());
    assert!(analysis.resolve_reference("file:///ws/none.proto", Position::new(0, 0)).is_none());
}

#[test]
fn test_workspace_symbol_query() {
    let host = host_from_sources(&workspace());
    let analysis = host.analysis();

    let found = analysis.workspace_symbols("lineitem");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].qualified_name.as_ref(), "acme.orders.Order.LineItem");
    assert_eq!(found[0].container_name.as_deref(), Some("acme.orders.Order"));
    assert_eq!(found[0].kind, SymbolKind::Message);

    let common: Vec<_> = analysis
        .workspace_symbols("acme.common")
        .into_iter()
        .map(|s| s.qualified_name.to_string())
        .collect();
    assert_eq!(
        common,
        vec![
            "acme.common.Money",
            "acme.common.STATUS_ACTIVE",
            "acme.common.STATUS_UNSPECIFIED",
            "acme.common.Status",
        ]
    );
    assert!(analysis.workspace_symbols("no-such-symbol").is_empty());
}

#[test]
fn test_document_outline() {
    let host = host_from_sources(&workspace());
    let outline: Vec<_> = host
        .analysis()
        .document_symbols(ORDERS_URI)
        .into_iter()
        .map(|s| (s.name.to_string(), s.kind))
        .collect();
    assert_eq!(
        outline,
        vec![
            ("Order".to_string(), SymbolKind::Message),
            ("LineItem".to_string(), SymbolKind::Message),
            ("GetOrderRequest".to_string(), SymbolKind::Message),
            ("OrderService".to_string(), SymbolKind::Service),
            ("GetOrder".to_string(), SymbolKind::Rpc),
        ]
    );
}
