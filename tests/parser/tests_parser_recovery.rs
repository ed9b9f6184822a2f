//! Error recovery: malformed input never aborts parsing.

use protoscope::parse;
use protoscope::syntax::Declaration;
use rstest::rstest;

#[rstest]
#[case::empty("")]
#[case::only_braces("}}}{{{")]
#[case::stray_tokens("= ; 42 \"str\" .")]
#[case::unterminated_string("message A { string s = 1 [default = \"oops]; }")]
#[case::unterminated_comment("/* never closed\nmessage A {}")]
#[case::truncated_map("message A { map<string, int32 x = 1; }")]
#[case::truncated_rpc("service S { rpc Get (A) returns")]
#[case::keyword_soup("message message enum enum service oneof")]
#[case::deep_nesting("message A { message B { message C { message D {")]
fn test_parse_never_panics(#[case] text: &str) {
    let file = parse(text, "file:///broken.proto");
    assert_eq!(file.uri.as_ref(), "file:///broken.proto");
}

#[rstest]
#[case("message A {", 1)]
#[case("message A { int32 a = 1;", 1)]
#[case("enum E { A = 0;", 1)]
#[case("message A {\n  int32 = 1;\n}", 1)]
fn test_error_count(#[case] text: &str, #[case] expected: usize) {
    let file = parse(text, "file:///broken.proto");
    assert_eq!(file.errors.len(), expected, "{:?}", file.errors);
}

#[test]
fn test_declarations_after_error_survive() {
    let file = parse(
        "message A {\n  int32 = 1;\n  string ok = 2;\n}\n\nenum E {\n  E_ZERO = 0;\n}\n",
        "file:///r.proto",
    );
    assert_eq!(file.errors.len(), 1);
    assert_eq!(file.errors[0].span.start.line, 1);
    let names: Vec<_> = file.declarations.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["A", "E"]);
}

#[test]
fn test_partial_message_is_indexed_material() {
    let file = parse(
        "package p;\nmessage Partial {\n  int32 a = 1;\n  message Inner {}\n",
        "file:///p.proto",
    );
    assert!(file.has_errors());
    let Declaration::Message(partial) = &file.declarations[0] else {
        panic!("expected message");
    };
    assert_eq!(partial.qualified_name.as_ref(), "p.Partial");
    assert_eq!(partial.fields.len(), 1);
    assert_eq!(partial.nested.len(), 1);
}

#[test]
fn test_reparse_is_deterministic() {
    let text = "message A {\n  int32 a = 1\n  string b = 2;\n}\n";
    assert_eq!(parse(text, "file:///a.proto"), parse(text, "file:///a.proto"));
}
