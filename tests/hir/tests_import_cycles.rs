//! Circular import detection.

use std::sync::Arc;

use protoscope::hir::diagnostics::codes;

use crate::helpers::host_helpers::{diagnostics_for, host_from_sources, with_code};
use crate::helpers::source_fixtures::workspace;

const A_URI: &str = "file:///ws/a.proto";
const B_URI: &str = "file:///ws/b.proto";
const C_URI: &str = "file:///ws/c.proto";

#[test]
fn test_two_file_cycle() {
    let host = host_from_sources(&[
        (A_URI, "import \"b.proto\";\n"),
        (B_URI, "import \"a.proto\";\n"),
    ]);

    let cycles = host.analyzer().detect_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(
        cycles[0].files,
        vec![Arc::<str>::from(A_URI), Arc::<str>::from(B_URI)]
    );

    for uri in [A_URI, B_URI] {
        let circular = with_code(&diagnostics_for(&host, uri), codes::CIRCULAR_DEPENDENCY);
        assert_eq!(circular.len(), 1, "{uri}");
        assert_eq!(
            circular[0].message.as_ref(),
            "circular import: file:///ws/a.proto -> file:///ws/b.proto -> file:///ws/a.proto"
        );
        assert_eq!(circular[0].range.start.line, 0);
    }
}

#[test]
fn test_self_import_is_a_cycle() {
    let host = host_from_sources(&[(A_URI, "message A {}\nimport \"a.proto\";\n")]);

    let cycles = host.analyzer().detect_cycles();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].contains(A_URI));

    let circular = with_code(&diagnostics_for(&host, A_URI), codes::CIRCULAR_DEPENDENCY);
    assert_eq!(circular.len(), 1);
    assert_eq!(circular[0].range.start.line, 1);
}

#[test]
fn test_three_file_cycle_reported_once_per_file() {
    let host = host_from_sources(&[
        (A_URI, "import \"b.proto\";\n"),
        (B_URI, "import \"c.proto\";\n"),
        (C_URI, "import \"a.proto\";\n"),
    ]);
    let cycles = host.analyzer().detect_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].files.len(), 3);
    for uri in [A_URI, B_URI, C_URI] {
        assert_eq!(
            with_code(&diagnostics_for(&host, uri), codes::CIRCULAR_DEPENDENCY).len(),
            1
        );
    }
}

#[test]
fn test_breaking_the_cycle_clears_it() {
    let mut host = host_from_sources(&[
        (A_URI, "import \"b.proto\";\n"),
        (B_URI, "import \"a.proto\";\n"),
    ]);
    host.set_file_content(B_URI, "message B {}\n");

    assert!(host.analyzer().detect_cycles().is_empty());
    assert!(with_code(&diagnostics_for(&host, A_URI), codes::CIRCULAR_DEPENDENCY).is_empty());
}

#[test]
fn test_acyclic_workspace() {
    let host = host_from_sources(&workspace());
    assert!(host.analyzer().detect_cycles().is_empty());
}

#[test]
fn test_branching_component_names_real_import_chains() {
    let host = host_from_sources(&[
        (A_URI, "import \"b.proto\";\nimport \"c.proto\";\n"),
        (B_URI, "import \"a.proto\";\n"),
        (C_URI, "import \"a.proto\";\n"),
    ]);
    let described: Vec<String> = host
        .analyzer()
        .detect_cycles()
        .iter()
        .map(|cycle| cycle.describe())
        .collect();
    assert_eq!(
        described,
        vec![
            "file:///ws/a.proto -> file:///ws/b.proto -> file:///ws/a.proto",
            "file:///ws/a.proto -> file:///ws/c.proto -> file:///ws/a.proto",
        ]
    );

    let mut on_a = with_code(&diagnostics_for(&host, A_URI), codes::CIRCULAR_DEPENDENCY);
    on_a.sort_by_key(|d| d.range.start.line);
    let lines: Vec<u32> = on_a.iter().map(|d| d.range.start.line).collect();
    assert_eq!(lines, vec![0, 1]);
    assert!(on_a[1].message.contains("c.proto -> file:///ws/a.proto"));

    let on_c = with_code(&diagnostics_for(&host, C_URI), codes::CIRCULAR_DEPENDENCY);
    assert_eq!(on_c.len(), 1);
    assert!(!on_c[0].message.contains("b.proto"));
}
