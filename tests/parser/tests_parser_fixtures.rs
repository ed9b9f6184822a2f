//! Parser tests over complete, well-formed schema files.

use protoscope::parse;
use protoscope::syntax::{Declaration, FieldModifier, FieldType, ImportModifier, ScalarType};

use crate::helpers::source_fixtures::{COMMON, COMMON_URI, ORDERS, ORDERS_URI};

#[test]
fn test_fixtures_parse_cleanly() {
    for (uri, text) in [(COMMON_URI, COMMON), (ORDERS_URI, ORDERS)] {
        let file = parse(text, uri);
        assert!(file.errors.is_empty(), "{uri}: {:?}", file.errors);
        assert_eq!(file.uri.as_ref(), uri);
        assert!(file.is_proto3());
    }
}

#[test]
fn test_orders_structure() {
    let file = parse(ORDERS, ORDERS_URI);
    assert_eq!(file.package_name(), "acme.orders");
    assert_eq!(file.imports.len(), 1);
    assert_eq!(file.imports[0].path, "common.proto");
    assert_eq!(file.imports[0].modifier, ImportModifier::None);

    let names: Vec<_> = file.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["Order", "GetOrderRequest", "OrderService"]);

    let Declaration::Message(order) = &file.declarations[0] else {
        panic!("expected message");
    };
    assert_eq!(order.qualified_name.as_ref(), "acme.orders.Order");
    assert_eq!(order.fields.len(), 5);
    assert_eq!(order.oneofs.len(), 1);
    assert_eq!(order.oneofs[0].fields.len(), 2);
    assert_eq!(order.nested.len(), 1);
    assert_eq!(
        order.nested[0].qualified_name().map(|q| q.as_ref()),
        Some("acme.orders.Order.LineItem")
    );

    assert_eq!(order.fields[3].modifier, FieldModifier::Repeated);
    assert!(matches!(
        &order.fields[4].ty,
        FieldType::Map { key: ScalarType::String, .. }
    ));
    let numbers: Vec<_> = order.all_fields().filter_map(|f| f.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_type_references_carry_scope() {
    let file = parse(ORDERS, ORDERS_URI);
    let refs: Vec<_> = file
        .type_references()
        .into_iter()
        .map(|r| (r.name.as_str(), r.scope.as_ref()))
        .collect();
    assert_eq!(
        refs,
        vec![
            ("acme.common.Money", "acme.orders.Order"),
            ("acme.common.Status", "acme.orders.Order"),
            ("LineItem", "acme.orders.Order"),
            ("GetOrderRequest", "acme.orders.OrderService"),
            ("Order", "acme.orders.OrderService"),
        ]
    );
}

#[test]
fn test_doc_comment_on_fixture() {
    let file = parse(COMMON, COMMON_URI);
    assert_eq!(file.declarations[0].doc(), Some("Money amount in minor units."));
    assert_eq!(file.declarations[1].doc(), None);
}

#[test]
fn test_spans_point_at_names() {
    let file = parse(COMMON, COMMON_URI);
    let money = file.declarations[0].name_span();
    assert_eq!((money.start.line, money.start.column), (5, 8));
    assert_eq!((money.end.line, money.end.column), (5, 13));
}
