//! AST types for a parsed schema file.
//!
//! Every node carries the [`Span`] of its full source text and, where it has
//! one, the span of its name. Names are stored as [`SmolStr`]; qualified names
//! and URIs as `Arc<str>` so they can be shared with the symbol index.

use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::Span;

/// Largest valid field number (2^29 - 1).
pub const MAX_FIELD_NUMBER: i64 = 536_870_911;
/// Largest valid enum value (int32).
pub const MAX_ENUM_VALUE: i64 = i32::MAX as i64;
/// Field numbers reserved for the protobuf implementation.
pub const IMPLEMENTATION_RESERVED: std::ops::RangeInclusive<i64> = 19_000..=19_999;

// ============================================================================
// FILE-LEVEL STATEMENTS
// ============================================================================

/// `syntax = "proto3";` or `edition = "2023";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDecl {
    pub kind: SyntaxKeyword,
    pub value: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKeyword {
    Syntax,
    Edition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: Arc<str>,
    pub span: Span,
    pub name_span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportModifier {
    None,
    Public,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// The import path as written, without quotes.
    pub path: SmolStr,
    pub modifier: ImportModifier,
    pub span: Span,
    pub path_span: Span,
}

/// An option statement or a single entry of a `[...]` option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    /// Option name as written, e.g. `deprecated` or `(my.ext).field`.
    pub name: SmolStr,
    /// Source text of the value (string literals keep their quotes).
    pub value: String,
    pub span: Span,
    pub name_span: Span,
}

impl OptionDecl {
    /// The extension name inside the leading parentheses, if any.
    ///
    /// `(foo.bar).baz` yields `foo.bar`.
    pub fn extension_name(&self) -> Option<&str> {
        let rest = self.name.strip_prefix('(')?;
        let end = rest.find(')')?;
        Some(&rest[..end])
    }

    pub fn is_true(&self) -> bool {
        self.value == "true"
    }
}

pub(crate) fn option_is_true(options: &[OptionDecl], name: &str) -> bool {
    options.iter().any(|o| o.name == name && o.is_true())
}

// ============================================================================
// TYPES AND REFERENCES
// ============================================================================

/// An unresolved textual type name recorded at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Name as written, possibly dotted and possibly with a leading `.`.
    pub name: SmolStr,
    /// Qualified name of the scope the reference appears in.
    pub scope: Arc<str>,
    pub span: Span,
}

impl TypeReference {
    pub fn is_fully_qualified(&self) -> bool {
        self.name.starts_with('.')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "double" => ScalarType::Double,
            "float" => ScalarType::Float,
            "int32" => ScalarType::Int32,
            "int64" => ScalarType::Int64,
            "uint32" => ScalarType::Uint32,
            "uint64" => ScalarType::Uint64,
            "sint32" => ScalarType::Sint32,
            "sint64" => ScalarType::Sint64,
            "fixed32" => ScalarType::Fixed32,
            "fixed64" => ScalarType::Fixed64,
            "sfixed32" => ScalarType::Sfixed32,
            "sfixed64" => ScalarType::Sfixed64,
            "bool" => ScalarType::Bool,
            "string" => ScalarType::String,
            "bytes" => ScalarType::Bytes,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Named(TypeReference),
    Map {
        key: ScalarType,
        value: Box<FieldType>,
    },
}

impl FieldType {
    /// The type reference that needs resolution, if any.
    pub fn type_reference(&self) -> Option<&TypeReference> {
        match self {
            FieldType::Scalar(_) => None,
            FieldType::Named(r) => Some(r),
            FieldType::Map { value, .. } => value.type_reference(),
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, FieldType::Map { .. })
    }
}

// ============================================================================
// DECLARATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldModifier {
    None,
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: SmolStr,
    /// Qualified name: enclosing message name plus field name.
    pub qualified_name: Arc<str>,
    pub ty: FieldType,
    /// `None` when the number is missing (a syntax error is recorded).
    pub number: Option<i64>,
    pub modifier: FieldModifier,
    pub options: Vec<OptionDecl>,
    pub doc: Option<String>,
    pub span: Span,
    pub name_span: Span,
    pub number_span: Span,
}

impl Field {
    pub fn is_deprecated(&self) -> bool {
        option_is_true(&self.options, "deprecated")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oneof {
    pub name: SmolStr,
    pub fields: Vec<Field>,
    pub options: Vec<OptionDecl>,
    pub doc: Option<String>,
    pub span: Span,
    pub name_span: Span,
}

/// One entry of a `reserved` or `extensions` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    pub start: i64,
    pub end: i64,
    pub span: Span,
}

impl NumberRange {
    pub fn contains(&self, number: i64) -> bool {
        (self.start..=self.end).contains(&number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reserved {
    pub ranges: Vec<NumberRange>,
    pub names: Vec<(SmolStr, Span)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub name: SmolStr,
    pub qualified_name: Arc<str>,
    pub fields: Vec<Field>,
    pub oneofs: Vec<Oneof>,
    pub nested: Vec<Declaration>,
    pub reserved: Vec<Reserved>,
    pub extensions: Vec<NumberRange>,
    pub options: Vec<OptionDecl>,
    pub doc: Option<String>,
    pub span: Span,
    pub name_span: Span,
}

impl Message {
    /// Fields declared directly and inside oneofs, in declaration order per group.
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .chain(self.oneofs.iter().flat_map(|o| o.fields.iter()))
    }

    pub fn reserved_ranges(&self) -> impl Iterator<Item = &NumberRange> {
        self.reserved.iter().flat_map(|r| r.ranges.iter())
    }

    pub fn reserved_names(&self) -> impl Iterator<Item = &str> {
        self.reserved
            .iter()
            .flat_map(|r| r.names.iter().map(|(n, _)| n.as_str()))
    }

    /// No fields, oneofs, nested declarations, reserved or extension ranges.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.oneofs.is_empty()
            && self.nested.is_empty()
            && self.reserved.is_empty()
            && self.extensions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: SmolStr,
    pub qualified_name: Arc<str>,
    pub number: Option<i64>,
    pub options: Vec<OptionDecl>,
    pub doc: Option<String>,
    pub span: Span,
    pub name_span: Span,
    pub number_span: Span,
}

impl EnumValue {
    pub fn is_deprecated(&self) -> bool {
        option_is_true(&self.options, "deprecated")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub name: SmolStr,
    pub qualified_name: Arc<str>,
    pub values: Vec<EnumValue>,
    pub reserved: Vec<Reserved>,
    pub options: Vec<OptionDecl>,
    pub doc: Option<String>,
    pub span: Span,
    pub name_span: Span,
}

impl Enum {
    pub fn allow_alias(&self) -> bool {
        option_is_true(&self.options, "allow_alias")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rpc {
    pub name: SmolStr,
    pub qualified_name: Arc<str>,
    pub input: TypeReference,
    pub output: TypeReference,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub options: Vec<OptionDecl>,
    pub doc: Option<String>,
    pub span: Span,
    pub name_span: Span,
}

impl Rpc {
    pub fn is_deprecated(&self) -> bool {
        option_is_true(&self.options, "deprecated")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: SmolStr,
    pub qualified_name: Arc<str>,
    pub rpcs: Vec<Rpc>,
    pub options: Vec<OptionDecl>,
    pub doc: Option<String>,
    pub span: Span,
    pub name_span: Span,
}

/// `extend Foo { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extend {
    pub extendee: TypeReference,
    /// Extension fields; their qualified names live in the enclosing scope.
    pub fields: Vec<Field>,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Message(Message),
    Enum(Enum),
    Service(Service),
    Extend(Extend),
}

impl Declaration {
    /// Name of the declaration; `extend` blocks are named after their extendee.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Message(m) => &m.name,
            Declaration::Enum(e) => &e.name,
            Declaration::Service(s) => &s.name,
            Declaration::Extend(x) => &x.extendee.name,
        }
    }

    /// Qualified name; `None` for `extend` blocks which introduce no scope.
    pub fn qualified_name(&self) -> Option<&Arc<str>> {
        match self {
            Declaration::Message(m) => Some(&m.qualified_name),
            Declaration::Enum(e) => Some(&e.qualified_name),
            Declaration::Service(s) => Some(&s.qualified_name),
            Declaration::Extend(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Declaration::Message(m) => m.span,
            Declaration::Enum(e) => e.span,
            Declaration::Service(s) => s.span,
            Declaration::Extend(x) => x.span,
        }
    }

    pub fn name_span(&self) -> Span {
        match self {
            Declaration::Message(m) => m.name_span,
            Declaration::Enum(e) => e.name_span,
            Declaration::Service(s) => s.name_span,
            Declaration::Extend(x) => x.extendee.span,
        }
    }

    pub fn options(&self) -> &[OptionDecl] {
        match self {
            Declaration::Message(m) => &m.options,
            Declaration::Enum(e) => &e.options,
            Declaration::Service(s) => &s.options,
            Declaration::Extend(_) => &[],
        }
    }

    pub fn is_deprecated(&self) -> bool {
        option_is_true(self.options(), "deprecated")
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Declaration::Message(m) => m.doc.as_deref(),
            Declaration::Enum(e) => e.doc.as_deref(),
            Declaration::Service(s) => s.doc.as_deref(),
            Declaration::Extend(x) => x.doc.as_deref(),
        }
    }

    /// Directly nested declarations (only messages nest).
    pub fn nested(&self) -> &[Declaration] {
        match self {
            Declaration::Message(m) => &m.nested,
            _ => &[],
        }
    }
}
