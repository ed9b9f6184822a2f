//! Diagnostic policies and settings toggles, end to end through the host.

use protoscope::Severity;
use protoscope::hir::diagnostics::codes;
use rstest::rstest;
use serde_json::json;

use crate::helpers::host_helpers::{describe, diagnostics_for, host_from_sources, with_code};
use crate::helpers::source_fixtures::{COMMON, COMMON_URI, ORDERS, ORDERS_URI, workspace};

const URI: &str = "file:///ws/check.proto";

/// One problem per toggleable rule family.
const PROBLEMS: &str = r#"syntax = "proto2";
import "missing.proto";
message bad_name {
  required int32 id = 1;
  Unknown thing = 2;
  int32 zero = 0;
}
"#;

// ============================================================================
// FIELD NUMBERS
// ============================================================================

#[test]
fn test_duplicate_field_number_first_wins() {
    let host = host_from_sources(&[(
        URI,
        "message M {\n  int32 a = 1;\n  int32 b = 1;\n  int32 c = 1;\n}\n",
    )]);
    let diagnostics = diagnostics_for(&host, URI);
    let duplicates = with_code(&diagnostics, codes::DUPLICATE_DEFINITION);
    assert_eq!(duplicates.len(), 2, "{}", describe(&diagnostics));

    let lines: Vec<_> = duplicates.iter().map(|d| d.range.start.line).collect();
    assert_eq!(lines, vec![2, 3]);
    for duplicate in &duplicates {
        assert_eq!(duplicate.severity, Severity::Error);
        assert_eq!(duplicate.related.len(), 1);
        assert_eq!(duplicate.related[0].range.start.line, 1);
        assert_eq!(duplicate.related[0].uri.as_ref(), URI);
    }
}

#[test]
fn test_oneof_numbers_share_the_message_space() {
    let host = host_from_sources(&[(
        URI,
        "message M {\n  int32 a = 1;\n  oneof o {\n    int32 b = 1;\n  }\n}\n",
    )]);
    let duplicates = with_code(&diagnostics_for(&host, URI), codes::DUPLICATE_DEFINITION);
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].range.start.line, 3);
}

#[rstest]
#[case::zero("int32 x = 0;", codes::INVALID_NUMBER)]
#[case::too_large("int32 x = 536870912;", codes::INVALID_NUMBER)]
#[case::implementation_band("int32 x = 19500;", codes::INVALID_NUMBER)]
#[case::reserved_number("reserved 5;\n  int32 x = 5;", codes::RESERVED)]
#[case::reserved_name("reserved \"x\";\n  int32 x = 6;", codes::RESERVED)]
fn test_field_number_rules(#[case] body: &str, #[case] code: &str) {
    let text = format!("message M {{\n  {body}\n}}\n");
    let host = host_from_sources(&[(URI, &text)]);
    let diagnostics = diagnostics_for(&host, URI);
    assert_eq!(with_code(&diagnostics, code).len(), 1, "{}", describe(&diagnostics));
}

#[test]
fn test_valid_upper_bound() {
    let host = host_from_sources(&[(URI, "message M {\n  int32 x = 536870911;\n}\n")]);
    let diagnostics = diagnostics_for(&host, URI);
    assert!(diagnostics.is_empty(), "{}", describe(&diagnostics));
}

// ============================================================================
// SETTINGS TOGGLES
// ============================================================================

#[rstest]
#[case::naming("diagnostics.naming", codes::NAMING_CONVENTION)]
#[case::references("diagnostics.references", codes::UNDEFINED_REFERENCE)]
#[case::imports("diagnostics.imports", codes::UNRESOLVED_IMPORT)]
#[case::discouraged("diagnostics.discouraged", codes::REQUIRED_FIELD)]
#[case::field_tags("diagnostics.fieldTags", codes::INVALID_NUMBER)]
fn test_disabling_a_rule_family(#[case] key: &str, #[case] code: &str) {
    let mut host = host_from_sources(&[(URI, PROBLEMS)]);
    let before = diagnostics_for(&host, URI);
    assert!(!with_code(&before, code).is_empty(), "{}", describe(&before));

    let errors = host.update_settings(&json!({ key: false }));
    assert!(errors.is_empty(), "{errors:?}");

    let after = diagnostics_for(&host, URI);
    assert!(with_code(&after, code).is_empty(), "{}", describe(&after));
    assert!(after.len() < before.len());
}

#[test]
fn test_unused_symbols_opt_in() {
    let orders = ORDERS.replace(
        "message GetOrderRequest {",
        "message Orphan {\n  string note = 1;\n}\n\nmessage GetOrderRequest {",
    );
    let mut host = host_from_sources(&[(COMMON_URI, COMMON), (ORDERS_URI, &orders)]);
    assert!(with_code(&diagnostics_for(&host, ORDERS_URI), codes::UNUSED_SYMBOL).is_empty());

    host.update_settings(&json!({ "diagnostics": { "unusedSymbols": true } }));
    let unused = with_code(&diagnostics_for(&host, ORDERS_URI), codes::UNUSED_SYMBOL);
    assert_eq!(unused.len(), 1, "{}", describe(&unused));
    assert_eq!(unused[0].severity, Severity::Info);
    assert!(unused[0].message.contains("'Orphan'"));
    assert!(with_code(&diagnostics_for(&host, COMMON_URI), codes::UNUSED_SYMBOL).is_empty());
}

#[test]
fn test_nesting_depth_setting() {
    let text = "message A {\n  message B {\n    message C {\n      int32 x = 1;\n    }\n  }\n}\n";
    let mut host = host_from_sources(&[(URI, text)]);
    assert!(with_code(&diagnostics_for(&host, URI), codes::NESTING_DEPTH).is_empty());

    host.update_settings(&json!({ "diagnostics.maxNestingDepth": 2 }));
    let deep = with_code(&diagnostics_for(&host, URI), codes::NESTING_DEPTH);
    assert_eq!(deep.len(), 1);
    assert_eq!(deep[0].range.start.line, 2);
}

#[test]
fn test_rejected_setting_keeps_previous_value() {
    let mut host = host_from_sources(&[(URI, PROBLEMS)]);
    let errors = host.update_settings(&json!({ "diagnostics.naming": "off" }));
    assert_eq!(errors.len(), 1);
    assert!(host.settings().diagnostics.naming.enabled);
    assert!(!with_code(&diagnostics_for(&host, URI), codes::NAMING_CONVENTION).is_empty());
}

// ============================================================================
// WORKSPACE RULES
// ============================================================================

#[test]
fn test_cross_file_duplicate_flags_every_owner() {
    let host = host_from_sources(&[
        ("file:///ws/a.proto", "package p;\nmessage Dup {}\n"),
        ("file:///ws/b.proto", "package p;\nmessage Dup {}\n"),
    ]);
    for (uri, other) in [
        ("file:///ws/a.proto", "file:///ws/b.proto"),
        ("file:///ws/b.proto", "file:///ws/a.proto"),
    ] {
        let duplicates = with_code(&diagnostics_for(&host, uri), codes::DUPLICATE_SYMBOL);
        assert_eq!(duplicates.len(), 1, "{uri}");
        assert_eq!(duplicates[0].related[0].uri.as_ref(), other);
    }
}

#[test]
fn test_unused_import_in_fixture_workspace() {
    let orders = ORDERS
        .replace("acme.common.Money total = 2;", "int64 total = 2;")
        .replace("acme.common.Status status = 3;", "int32 status = 3;");
    let host = host_from_sources(&[(COMMON_URI, COMMON), (ORDERS_URI, &orders)]);
    let unused = with_code(&diagnostics_for(&host, ORDERS_URI), codes::UNUSED_IMPORT);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].message.as_ref(), "import 'common.proto' is unused");
    assert_eq!(unused[0].severity, Severity::Warning);
}

#[test]
fn test_diagnostics_sorted_by_position() {
    let host = host_from_sources(&[(URI, PROBLEMS)]);
    let diagnostics = diagnostics_for(&host, URI);
    assert!(
        diagnostics
            .windows(2)
            .all(|w| w[0].range.start <= w[1].range.start),
        "{}",
        describe(&diagnostics)
    );
}

#[test]
fn test_unknown_uri_has_no_diagnostics() {
    let host = host_from_sources(&workspace());
    assert!(diagnostics_for(&host, "file:///ws/nowhere.proto").is_empty());
}
