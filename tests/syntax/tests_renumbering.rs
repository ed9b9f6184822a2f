//! Field renumbering through the public formatter entry point.

use protoscope::syntax::{Declaration, Message};
use protoscope::{FormatOptions, format, parse};
use rstest::rstest;

fn renumbering() -> FormatOptions {
    FormatOptions::default().with_renumbering(1, 1)
}

/// Numbers of all fields of the first message, oneof members included,
/// in source order.
fn field_numbers(text: &str) -> Vec<i64> {
    let file = parse(text, "file:///n.proto");
    let Some(Declaration::Message(message)) = file.declarations.first() else {
        panic!("expected a message in {text:?}");
    };
    let mut fields: Vec<_> = message.all_fields().collect();
    fields.sort_by_key(|f| f.span.start);
    fields.iter().filter_map(|f| f.number).collect()
}

fn first_message(text: &str) -> Message {
    match parse(text, "file:///n.proto").declarations.into_iter().next() {
        Some(Declaration::Message(message)) => message,
        other => panic!("expected a message, found {other:?}"),
    }
}

#[test]
fn test_oneof_shares_message_counter() {
    let source = "message M {\n  int32 a = 1;\n  int32 b = 2;\n  oneof choice {\n    string c;\n    string d;\n  }\n  bool e;\n}\n";
    let formatted = format(source, &renumbering());
    assert_eq!(field_numbers(&formatted), vec![1, 2, 3, 4, 5]);
    let message = first_message(&formatted);
    assert_eq!(message.oneofs[0].fields[1].number, Some(4));
}

#[test]
fn test_reserved_band_is_skipped() {
    let source = "message A {\n  int32 a = 18999;\n  int32 b;\n  int32 c;\n}\n";
    let formatted = format(source, &renumbering());
    assert_eq!(field_numbers(&formatted), vec![18999, 20000, 20001]);
}

#[test]
fn test_no_number_lands_in_the_band() {
    let mut source = String::from("message Wide {\n");
    for i in 0..30 {
        source.push_str(&format!("  int32 f{i};\n"));
    }
    source.push_str("}\n");

    let formatted = format(&source, &FormatOptions::default().with_renumbering(18990, 1));
    let numbers = field_numbers(&formatted);
    assert_eq!(numbers.len(), 30);
    assert!(numbers.iter().all(|n| !(19000..=19999).contains(n)), "{numbers:?}");
    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(numbers[9], 18999);
    assert_eq!(numbers[10], 20000);
}

#[rstest]
#[case::sequential("message A {\n  int32 a = 1;\n  int32 b = 2;\n  oneof o {\n    int32 c = 3;\n  }\n  int32 d = 4;\n}\n", 1, 1)]
#[case::stepped("message A {\n  int32 a = 10;\n  int32 b = 20;\n  int32 c = 30;\n}\n", 10, 10)]
#[case::nested("message A {\n  int32 a = 1;\n  message B {\n    int32 x = 1;\n  }\n  enum E {\n    E_ZERO = 0;\n    E_ONE = 1;\n  }\n  int32 b = 2;\n}\n", 1, 1)]
fn test_sequential_numbering_is_stable(#[case] source: &str, #[case] start: i64, #[case] increment: i64) {
    let options = FormatOptions::default().with_renumbering(start, increment);
    assert_eq!(format(source, &options), source);
}

#[test]
fn test_nested_scopes_count_independently() {
    let source = "message A {\n  int32 a;\n  message B {\n    int32 x;\n    int32 y;\n  }\n  enum E {\n    E_ZERO;\n    E_ONE;\n  }\n  int32 b;\n}\n";
    let formatted = format(source, &renumbering());
    assert_eq!(
        formatted,
        "message A {\n  int32 a = 1;\n  message B {\n    int32 x = 1;\n    int32 y = 2;\n  }\n  enum E {\n    E_ZERO = 0;\n    E_ONE = 1;\n  }\n  int32 b = 2;\n}\n"
    );
}

#[test]
fn test_renumbering_off_leaves_numbers_alone() {
    let source = "message A {\n  int32 a = 7;\n  int32 b;\n}\n";
    assert_eq!(format(source, &FormatOptions::default()), source);
}

#[test]
fn test_field_with_options_on_following_lines_advances_counter() {
    let source = "message A {\n  int32 a = 1 [\n    deprecated = true\n  ];\n  int32 b;\n  string c [\n    json_name = \"see\"\n  ];\n}\n";
    let formatted = format(source, &renumbering());
    assert_eq!(field_numbers(&formatted), vec![1, 2, 3]);
    assert_eq!(
        formatted,
        "message A {\n  int32 a = 1 [\n    deprecated = true\n  ];\n  int32 b = 2;\n  string c = 3 [\n    json_name = \"see\"\n  ];\n}\n"
    );
    assert_eq!(format(&formatted, &renumbering()), formatted);
}

#[test]
fn test_multiline_aggregate_options_are_not_fields() {
    let source = "message A {\n  option (acme.shape) = {\n    kind: 1\n    label: \"x\"\n  };\n  int32 a;\n  int32 b = 5 [(acme.rule) = {\n    min: 1\n  }];\n  int32 c;\n}\n";
    let formatted = format(source, &renumbering());
    assert_eq!(field_numbers(&formatted), vec![1, 5, 6]);
    assert!(formatted.contains("\n    kind: 1\n"), "{formatted}");
    assert!(formatted.contains("\n      min: 1\n  }];\n"), "{formatted}");
}

#[rstest]
#[case::message("message A\n{\n  int32 a;\n  int32 b;\n}\n", "message A\n{\n  int32 a = 1;\n  int32 b = 2;\n}\n")]
#[case::enumeration("enum E\n{\n  E_ZERO;\n  E_ONE;\n}\n", "enum E\n{\n  E_ZERO = 0;\n  E_ONE = 1;\n}\n")]
#[case::comment_between("message A // note\n// more\n{\n  int32 a;\n}\n", "message A // note\n// more\n{\n  int32 a = 1;\n}\n")]
fn test_header_split_from_its_brace(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(format(source, &renumbering()), expected);
}

#[test]
fn test_out_of_range_explicit_number_does_not_panic() {
    let source = "message A {\n  int32 a = 9223372036854775807;\n  int32 b;\n}\n";
    assert_eq!(
        format(source, &renumbering()),
        "message A {\n  int32 a = 9223372036854775807;\n  int32 b = 1;\n}\n"
    );
}
