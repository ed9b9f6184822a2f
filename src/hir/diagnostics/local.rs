//! Rules that look only at one file's AST.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::{Diagnostic, RelatedInfo, RuleContext, RuleError, codes};
use crate::base::Span;
use crate::base::text_utils::{
    is_lower_snake_case, is_upper_camel_case, is_upper_snake_case, to_lower_snake_case,
    to_upper_camel_case, to_upper_snake_case,
};
use crate::hir::symbols::file_symbols;
use crate::syntax::{
    Declaration, Field, FieldModifier, IMPLEMENTATION_RESERVED, MAX_ENUM_VALUE, MAX_FIELD_NUMBER,
    Message, Reserved,
};

type RuleResult = Result<Vec<Diagnostic>, RuleError>;

pub(super) fn syntax(cx: &RuleContext<'_>) -> RuleResult {
    Ok(cx
        .file
        .errors
        .iter()
        .map(|error| {
            Diagnostic::error(error.span, error.message.as_str()).with_code(codes::SYNTAX_ERROR)
        })
        .collect())
}

// ============================================================================
// NAMING
// ============================================================================

#[derive(Clone, Copy)]
enum Style {
    UpperCamel,
    LowerSnake,
    UpperSnake,
}

impl Style {
    fn matches(self, name: &str) -> bool {
        match self {
            Style::UpperCamel => is_upper_camel_case(name),
            Style::LowerSnake => is_lower_snake_case(name),
            Style::UpperSnake => is_upper_snake_case(name),
        }
    }

    fn convert(self, name: &str) -> String {
        match self {
            Style::UpperCamel => to_upper_camel_case(name),
            Style::LowerSnake => to_lower_snake_case(name),
            Style::UpperSnake => to_upper_snake_case(name),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Style::UpperCamel => "UpperCamelCase",
            Style::LowerSnake => "lower_snake_case",
            Style::UpperSnake => "UPPER_SNAKE_CASE",
        }
    }
}

fn check_name(out: &mut Vec<Diagnostic>, what: &str, name: &str, span: Span, style: Style) {
    if name.is_empty() || style.matches(name) {
        return;
    }
    let suggestion = style.convert(name);
    let message = if suggestion.is_empty() || suggestion == name {
        format!("{what} name '{name}' should be {}", style.label())
    } else {
        format!(
            "{what} name '{name}' should be {} (e.g. '{suggestion}')",
            style.label()
        )
    };
    out.push(Diagnostic::warning(span, message).with_code(codes::NAMING_CONVENTION));
}

pub(super) fn naming(cx: &RuleContext<'_>) -> RuleResult {
    let naming = &cx.settings.naming;
    let mut out = Vec::new();
    cx.file.walk_declarations(&mut |decl, _| match decl {
        Declaration::Message(m) => {
            if naming.messages {
                check_name(&mut out, "message", &m.name, m.name_span, Style::UpperCamel);
            }
            if naming.fields {
                for field in m.all_fields() {
                    check_name(&mut out, "field", &field.name, field.name_span, Style::LowerSnake);
                }
                for oneof in &m.oneofs {
                    check_name(&mut out, "oneof", &oneof.name, oneof.name_span, Style::LowerSnake);
                }
            }
        }
        Declaration::Enum(e) => {
            if naming.messages {
                check_name(&mut out, "enum", &e.name, e.name_span, Style::UpperCamel);
            }
            if naming.enum_values {
                for value in &e.values {
                    check_name(
                        &mut out,
                        "enum value",
                        &value.name,
                        value.name_span,
                        Style::UpperSnake,
                    );
                }
            }
        }
        Declaration::Service(s) => {
            if naming.messages {
                check_name(&mut out, "service", &s.name, s.name_span, Style::UpperCamel);
                for rpc in &s.rpcs {
                    check_name(&mut out, "rpc", &rpc.name, rpc.name_span, Style::UpperCamel);
                }
            }
        }
        Declaration::Extend(x) => {
            if naming.fields {
                for field in &x.fields {
                    check_name(&mut out, "field", &field.name, field.name_span, Style::LowerSnake);
                }
            }
        }
    });
    Ok(out)
}

// ============================================================================
// FIELD TAGS
// ============================================================================

fn check_field_range(out: &mut Vec<Diagnostic>, field: &Field, number: i64) -> bool {
    let message = if !(1..=MAX_FIELD_NUMBER).contains(&number) {
        format!("field number {number} is out of range; valid numbers are 1 to {MAX_FIELD_NUMBER}")
    } else if IMPLEMENTATION_RESERVED.contains(&number) {
        format!(
            "field number {number} is reserved for the protobuf implementation ({} to {})",
            IMPLEMENTATION_RESERVED.start(),
            IMPLEMENTATION_RESERVED.end()
        )
    } else {
        return true;
    };
    out.push(Diagnostic::error(field.number_span, message).with_code(codes::INVALID_NUMBER));
    false
}

fn reserved_number_hit(
    uri: &Arc<str>,
    reserved: &[Reserved],
    number: i64,
    span: Span,
    message: String,
) -> Option<Diagnostic> {
    let range = reserved.iter().flat_map(|r| r.ranges.iter()).find(|r| r.contains(number))?;
    Some(
        Diagnostic::error(span, message)
            .with_code(codes::RESERVED)
            .with_related(RelatedInfo::new(uri, range.span, "reserved here")),
    )
}

fn reserved_name_hit(
    uri: &Arc<str>,
    reserved: &[Reserved],
    name: &str,
    span: Span,
    message: String,
) -> Option<Diagnostic> {
    let (_, at) = reserved
        .iter()
        .flat_map(|r| r.names.iter())
        .find(|(reserved, _)| reserved == name)?;
    Some(
        Diagnostic::error(span, message)
            .with_code(codes::RESERVED)
            .with_related(RelatedInfo::new(uri, *at, "reserved here")),
    )
}

fn check_message_tags(out: &mut Vec<Diagnostic>, uri: &Arc<str>, m: &Message) {
    for field in m.all_fields() {
        if let Some(number) = field.number {
            if check_field_range(out, field, number) {
                let reserved = reserved_number_hit(
                    uri,
                    &m.reserved,
                    number,
                    field.number_span,
                    format!("field number {number} is reserved in message '{}'", m.name),
                );
                if let Some(diagnostic) = reserved {
                    out.push(diagnostic);
                } else if let Some(range) = m.extensions.iter().find(|r| r.contains(number)) {
                    out.push(
                        Diagnostic::error(
                            field.number_span,
                            format!(
                                "field number {number} overlaps the extension range {} to {}",
                                range.start, range.end
                            ),
                        )
                        .with_code(codes::INVALID_NUMBER),
                    );
                }
            }
        }
        out.extend(reserved_name_hit(
            uri,
            &m.reserved,
            &field.name,
            field.name_span,
            format!("field name '{}' is reserved in message '{}'", field.name, m.name),
        ));
    }
}

pub(super) fn field_tags(cx: &RuleContext<'_>) -> RuleResult {
    let uri = &cx.file.uri;
    let proto3 = cx.file.is_proto3();
    let mut out = Vec::new();
    cx.file.walk_declarations(&mut |decl, _| match decl {
        Declaration::Message(m) => check_message_tags(&mut out, uri, m),
        Declaration::Enum(e) => {
            for value in &e.values {
                let Some(number) = value.number else {
                    continue;
                };
                if !(i64::from(i32::MIN)..=MAX_ENUM_VALUE).contains(&number) {
                    out.push(
                        Diagnostic::error(
                            value.number_span,
                            format!("enum value {number} is out of the int32 range"),
                        )
                        .with_code(codes::INVALID_NUMBER),
                    );
                    continue;
                }
                out.extend(reserved_number_hit(
                    uri,
                    &e.reserved,
                    number,
                    value.number_span,
                    format!("enum value {number} is reserved in enum '{}'", e.name),
                ));
                out.extend(reserved_name_hit(
                    uri,
                    &e.reserved,
                    &value.name,
                    value.name_span,
                    format!("enum value name '{}' is reserved in enum '{}'", value.name, e.name),
                ));
            }
            if proto3 {
                if let Some(first) = e.values.first() {
                    if first.number.is_some_and(|n| n != 0) {
                        out.push(
                            Diagnostic::error(
                                first.number_span,
                                format!("the first value of proto3 enum '{}' must be zero", e.name),
                            )
                            .with_code(codes::ENUM_FIRST_VALUE),
                        );
                    }
                }
            }
        }
        Declaration::Extend(x) => {
            for field in &x.fields {
                if let Some(number) = field.number {
                    check_field_range(&mut out, field, number);
                }
            }
        }
        Declaration::Service(_) => {}
    });
    Ok(out)
}

// ============================================================================
// DUPLICATES
// ============================================================================

fn check_message_duplicates(out: &mut Vec<Diagnostic>, uri: &Arc<str>, m: &Message) {
    let mut fields: Vec<&Field> = m.all_fields().collect();
    fields.sort_by_key(|f| f.span.start);

    let mut numbers: FxHashMap<i64, &Field> = FxHashMap::default();
    let mut names: FxHashMap<&str, &Field> = FxHashMap::default();
    for field in fields {
        if let Some(number) = field.number {
            match numbers.entry(number) {
                Entry::Occupied(first) => {
                    let first = *first.get();
                    out.push(
                        Diagnostic::error(
                            field.number_span,
                            format!("field number {number} is already used by '{}'", first.name),
                        )
                        .with_code(codes::DUPLICATE_DEFINITION)
                        .with_related(RelatedInfo::new(
                            uri,
                            first.number_span,
                            format!("first use of field number {number}"),
                        )),
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(field);
                }
            }
        }
        if field.name.is_empty() {
            continue;
        }
        match names.entry(field.name.as_str()) {
            Entry::Occupied(first) => {
                let first = *first.get();
                out.push(
                    Diagnostic::error(
                        field.name_span,
                        format!(
                            "field '{}' is already defined in message '{}'",
                            field.name, m.name
                        ),
                    )
                    .with_code(codes::DUPLICATE_DEFINITION)
                    .with_related(RelatedInfo::new(uri, first.name_span, "previous definition")),
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(field);
            }
        }
    }
}

pub(super) fn duplicates(cx: &RuleContext<'_>) -> RuleResult {
    let uri = &cx.file.uri;
    let mut out = Vec::new();
    cx.file.walk_declarations(&mut |decl, _| match decl {
        Declaration::Message(m) => check_message_duplicates(&mut out, uri, m),
        Declaration::Enum(e) if !e.allow_alias() => {
            let mut numbers = FxHashMap::default();
            for value in &e.values {
                let Some(number) = value.number else {
                    continue;
                };
                match numbers.entry(number) {
                    Entry::Occupied(first) => {
                        let (first_name, first_span): &(&str, Span) = first.get();
                        out.push(
                            Diagnostic::error(
                                value.number_span,
                                format!(
                                    "enum value number {number} is already used by '{first_name}'; \
                                     set 'option allow_alias = true;' to allow aliases"
                                ),
                            )
                            .with_code(codes::DUPLICATE_DEFINITION)
                            .with_related(RelatedInfo::new(uri, *first_span, "first use")),
                        );
                    }
                    Entry::Vacant(slot) => {
                        slot.insert((value.name.as_str(), value.number_span));
                    }
                }
            }
        }
        _ => {}
    });

    // Same qualified name twice in this file: the later declaration is flagged.
    let mut seen: FxHashMap<Arc<str>, Span> = FxHashMap::default();
    for symbol in file_symbols(cx.file) {
        if symbol.name.is_empty() {
            continue;
        }
        match seen.entry(symbol.qualified_name.clone()) {
            Entry::Occupied(first) => out.push(
                Diagnostic::error(
                    symbol.name_span,
                    format!("'{}' is already defined in this file", symbol.qualified_name),
                )
                .with_code(codes::DUPLICATE_DEFINITION)
                .with_related(RelatedInfo::new(uri, *first.get(), "previous definition")),
            ),
            Entry::Vacant(slot) => {
                slot.insert(symbol.name_span);
            }
        }
    }
    Ok(out)
}

// ============================================================================
// DISCOURAGED CONSTRUCTS
// ============================================================================

fn check_required(out: &mut Vec<Diagnostic>, field: &Field) {
    if field.modifier == FieldModifier::Required {
        out.push(
            Diagnostic::warning(
                field.span,
                format!(
                    "'required' field '{}' is discouraged; required fields cannot be removed safely",
                    field.name
                ),
            )
            .with_code(codes::REQUIRED_FIELD),
        );
    }
}

pub(super) fn discouraged(cx: &RuleContext<'_>) -> RuleResult {
    let max_depth = cx.settings.max_nesting_depth;
    let mut out = Vec::new();
    cx.file.walk_declarations(&mut |decl, depth| {
        match decl {
            Declaration::Message(m) => {
                m.all_fields().for_each(|f| check_required(&mut out, f));
                if m.is_empty() && !m.name.is_empty() {
                    out.push(
                        Diagnostic::warning(m.name_span, format!("message '{}' is empty", m.name))
                            .with_code(codes::EMPTY_MESSAGE),
                    );
                }
            }
            Declaration::Extend(x) => x.fields.iter().for_each(|f| check_required(&mut out, f)),
            Declaration::Enum(_) | Declaration::Service(_) => {}
        }
        if depth > max_depth {
            out.push(
                Diagnostic::warning(
                    decl.name_span(),
                    format!(
                        "'{}' is nested {depth} levels deep; the maximum is {max_depth}",
                        decl.name()
                    ),
                )
                .with_code(codes::NESTING_DEPTH),
            );
        }
    });
    Ok(out)
}
