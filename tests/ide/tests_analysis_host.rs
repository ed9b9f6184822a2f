//! AnalysisHost lifecycle: edits, settings and formatting requests.

use protoscope::{AnalysisHost, Span};
use serde_json::json;

use crate::helpers::host_helpers::{diagnostics_for, host_from_sources};
use crate::helpers::source_fixtures::{ORDERS, ORDERS_URI, workspace};

const URI: &str = "file:///ws/edit.proto";

#[test]
fn test_syntax_errors_surface_as_diagnostics() {
    let mut host = AnalysisHost::new();
    let errors = host.set_file_content(URI, "message A {\n  int32 a = 1;\n");
    assert_eq!(errors.len(), 1);

    let diagnostics = diagnostics_for(&host, URI);
    assert!(diagnostics.iter().any(|d| d.code() == Some("E0000")));
}

#[test]
fn test_edit_then_fix() {
    let mut host = AnalysisHost::new();
    host.set_file_content(URI, "message A {\n  Missing m = 1;\n}\n");
    assert!(!diagnostics_for(&host, URI).is_empty());

    host.set_file_content(URI, "message A {\n  int32 m = 1;\n}\n");
    assert!(diagnostics_for(&host, URI).is_empty());
}

#[test]
fn test_format_document_edit() {
    let host = host_from_sources(&workspace());
    let analysis = host.analysis();

    let messy = ORDERS.replace("  string id = 1;\n", "string    id=1;\n");
    let edit = analysis
        .format_document(&messy, ORDERS_URI)
        .expect("messy input needs an edit");
    assert_eq!(edit.range.start.line, 0);
    assert!(edit.new_text.contains("\n  string id = 1;\n"));
    assert!(analysis.format_document(&edit.new_text, ORDERS_URI).is_none());
}

#[test]
fn test_format_range_edit() {
    let host = AnalysisHost::new();
    let text = "message A {\n  int32 a = 1;\n      int32   b = 2;\n}\n";
    let edit = host
        .analysis()
        .format_range(text, Span::from_coords(2, 0, 2, 0), URI)
        .expect("misindented line");
    assert_eq!(edit.range, Span::from_coords(2, 0, 2, 20));
    assert_eq!(edit.new_text, "  int32 b = 2;");
}

#[test]
fn test_renumber_through_settings() {
    let mut host = AnalysisHost::new();
    let text = "message A {\n  int32 a;\n  int32 b;\n}\n";
    assert!(host.analysis().format_document(text, URI).is_none());

    let errors = host.update_settings(&json!({
        "renumber.enabled": true,
        "renumber.startNumber": 5,
        "renumber.increment": 5,
    }));
    assert!(errors.is_empty(), "{errors:?}");
    let edit = host
        .analysis()
        .format_document(text, URI)
        .expect("numbers are inserted");
    assert_eq!(edit.new_text, "message A {\n  int32 a = 5;\n  int32 b = 10;\n}\n");
}

#[test]
fn test_import_paths_setting() {
    let mut host = host_from_sources(&[
        ("file:///ws/proto/acme/base.proto", "package acme;\nmessage Base {}\n"),
        // A second candidate makes the suffix fallback ambiguous.
        ("file:///ws/vendor/acme/base.proto", "package vendor;\nmessage Other {}\n"),
        (
            "file:///ws/app/main.proto",
            "import \"acme/base.proto\";\nmessage Main {\n  acme.Base base = 1;\n}\n",
        ),
    ]);
    let before = diagnostics_for(&host, "file:///ws/app/main.proto");
    assert!(before.iter().any(|d| d.code() == Some("E0002")));

    host.update_settings(&json!({ "importPaths": ["file:///ws/proto"] }));
    let after = diagnostics_for(&host, "file:///ws/app/main.proto");
    assert!(after.is_empty(), "{after:?}");
}
