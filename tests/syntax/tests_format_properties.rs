//! Properties every formatter run must hold, whatever the input.

use protoscope::{FormatOptions, Span, format, format_range, parse};
use rstest::rstest;

use crate::helpers::source_fixtures::{COMMON, ORDERS};

const MESSY: &str = "syntax = \"proto3\";\npackage demo;\n\n\n\nmessage   Outer{\nstring   name=1 ;\n    message Inner {\n         int32    depth   =  2;\n}\n  /* block\n        comment */\n\tmap< string ,int32 >   counts = 3;\n}\n\n\n";

#[rstest]
#[case::common(COMMON)]
#[case::orders(ORDERS)]
#[case::messy(MESSY)]
#[case::broken("message A {\n int32 a = 1;\n  string b\n")]
#[case::empty("")]
fn test_format_is_idempotent(#[case] source: &str) {
    for options in [
        FormatOptions::default(),
        FormatOptions::default().with_renumbering(1, 1),
    ] {
        let once = format(source, &options);
        let twice = format(&once, &options);
        assert_eq!(once, twice, "not idempotent with {options:?}");
    }
}

#[test]
fn test_messy_input_normalized() {
    let formatted = format(MESSY, &FormatOptions::default());
    assert_eq!(
        formatted,
        "syntax = \"proto3\";\npackage demo;\n\nmessage Outer {\n  string name = 1;\n  message Inner {\n    int32 depth = 2;\n  }\n  /* block\n  comment */\n  map<string, int32> counts = 3;\n}\n"
    );
}

#[test]
fn test_formatting_preserves_the_parse() {
    let options = FormatOptions::default();
    for source in [COMMON, ORDERS, MESSY] {
        let before = parse(source, "file:///x.proto");
        let after = parse(&format(source, &options), "file:///x.proto");
        let names = |file: &protoscope::ProtoFile| -> Vec<String> {
            file.declarations
                .iter()
                .map(|d| d.name().to_string())
                .collect()
        };
        assert_eq!(names(&before), names(&after));
        assert_eq!(before.errors.len(), after.errors.len());
    }
}

#[test]
fn test_range_matches_document_lines() {
    let options = FormatOptions::default();
    let whole: Vec<String> = format(MESSY, &options).lines().map(String::from).collect();
    // Line 6 of MESSY ("string   name=1 ;") is line 4 of the output.
    let ranged = format_range(MESSY, Span::from_coords(6, 0, 6, 0), &options);
    assert_eq!(ranged, whole[4]);
}

#[test]
fn test_range_infers_indent_from_context() {
    let source = "message A {\n  message B {\nint32 x = 1;\n  }\n}\n";
    let ranged = format_range(source, Span::from_coords(2, 0, 2, 5), &FormatOptions::default());
    assert_eq!(ranged, "    int32 x = 1;");
}

#[test]
fn test_tabs_option() {
    let options = FormatOptions {
        insert_spaces: false,
        ..FormatOptions::default()
    };
    assert_eq!(
        format("message A {\nint32 x = 1;\n}\n", &options),
        "message A {\n\tint32 x = 1;\n}\n"
    );
}
