//! Recursive descent parser for schema files
//!
//! Builds the typed AST directly from the token stream. The parser never
//! fails: every problem is recorded as a [`SyntaxError`] and parsing resumes
//! at the next statement boundary, so an unterminated message still yields the
//! fields parsed so far.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::lexer::{Lexer, Token, TokenKind, parse_int_literal, unquote};
use crate::base::{LineIndex, Span};
use crate::syntax::ast::{
    Declaration, Enum, EnumValue, Extend, Field, FieldModifier, FieldType, Import,
    ImportModifier, MAX_ENUM_VALUE, MAX_FIELD_NUMBER, Message, NumberRange, Oneof, OptionDecl,
    Package, Reserved, Rpc, ScalarType, Service, SyntaxDecl, SyntaxKeyword, TypeReference,
};
use crate::syntax::{ProtoFile, SyntaxError, content_hash};

/// Parse schema source text into a [`ProtoFile`].
///
/// This is a pure function of `(text, uri)`; callers that want to avoid
/// reparsing unchanged text should go through [`crate::syntax::ParseCache`].
pub fn parse(text: &str, uri: &str) -> ProtoFile {
    let tokens: Vec<_> = Lexer::new(text).collect();
    let mut parser = Parser::new(text, &tokens);
    let mut file = ProtoFile {
        uri: Arc::from(uri),
        content_hash: content_hash(text),
        syntax: None,
        package: None,
        imports: Vec::new(),
        options: Vec::new(),
        declarations: Vec::new(),
        errors: Vec::new(),
    };
    parser.parse_file(&mut file);
    file.errors = parser.errors;
    file
}

/// Join a scope and a simple name into a qualified name.
pub(crate) fn qualify(scope: &str, name: &str) -> Arc<str> {
    if scope.is_empty() {
        Arc::from(name)
    } else {
        Arc::from(format!("{scope}.{name}"))
    }
}

/// The parser state
struct Parser<'a> {
    text: &'a str,
    tokens: &'a [Token<'a>],
    /// Indices of non-trivia tokens.
    significant: Vec<usize>,
    pos: usize,
    last_end: TextSize,
    line_index: LineIndex,
    errors: Vec<SyntaxError>,
    package: Arc<str>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, tokens: &'a [Token<'a>]) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            text,
            tokens,
            significant,
            pos: 0,
            last_end: TextSize::new(0),
            line_index: LineIndex::new(text),
            errors: Vec::new(),
            package: Arc::from(""),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.significant.get(self.pos).map(|&i| &self.tokens[i])
    }

    fn current_kind(&self) -> TokenKind {
        self.nth(0)
    }

    fn current_text(&self) -> &'a str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.significant
            .get(self.pos + n)
            .map(|&i| self.tokens[i].kind)
            .unwrap_or(TokenKind::Error)
    }

    fn at(&self, kind: TokenKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.at(TokenKind::Ident) && self.current_text() == keyword
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.significant.len()
    }

    fn current_offset(&self) -> TextSize {
        self.current()
            .map(|t| t.offset)
            .unwrap_or_else(|| TextSize::of(self.text))
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.current()?.clone();
        self.last_end = token.range().end();
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if self.at(kind) {
            self.bump()
        } else {
            self.error(format!("expected {}, found {}", kind.describe(), self.found()));
            None
        }
    }

    fn expect_semicolon(&mut self) {
        if !self.eat(TokenKind::Semicolon) {
            self.error_after_last(format!("expected ';', found {}", self.found()));
        }
    }

    fn found(&self) -> String {
        match self.current() {
            Some(t) if t.kind == TokenKind::Ident => format!("'{}'", t.text),
            Some(t) => t.kind.describe().to_string(),
            None => "end of file".to_string(),
        }
    }

    // =========================================================================
    // Spans and errors
    // =========================================================================

    fn span(&self, range: TextRange) -> Span {
        self.line_index.span(self.text, range)
    }

    fn span_from(&self, start: TextSize) -> Span {
        let end = self.last_end.max(start);
        self.span(TextRange::new(start, end))
    }

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| t.range())
            .unwrap_or_else(|| TextRange::empty(TextSize::of(self.text)));
        let span = self.span(range);
        self.errors.push(SyntaxError::new(message, span));
    }

    /// Report at the end of the previous token (for missing terminators).
    fn error_after_last(&mut self, message: impl Into<String>) {
        let span = self.span(TextRange::empty(self.last_end));
        self.errors.push(SyntaxError::new(message, span));
    }

    /// Skip to the end of the current statement.
    ///
    /// Stops after a `;`, after a balanced `{ ... }` block, or before a `}`
    /// that closes the enclosing body. Always makes progress unless at `}`.
    fn recover(&mut self) {
        while !self.at_eof() {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::RBrace => return,
                TokenKind::LBrace => {
                    self.skip_balanced_braces();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn skip_balanced_braces(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    // =========================================================================
    // Documentation comments
    // =========================================================================

    /// Comments directly above the current token, joined into one string.
    ///
    /// A blank line or a trailing comment of the previous statement ends the
    /// documentation block.
    fn leading_doc(&self) -> Option<String> {
        let &idx = self.significant.get(self.pos)?;
        let mut comments = Vec::new();
        let mut i = idx;
        while i > 0 {
            let token = &self.tokens[i - 1];
            match token.kind {
                TokenKind::Whitespace => {
                    if token.text.matches('\n').count() > 1 {
                        break;
                    }
                }
                TokenKind::LineComment | TokenKind::BlockComment => {
                    if self.is_trailing_comment(i - 1) {
                        break;
                    }
                    comments.push(token.text);
                }
                _ => break,
            }
            i -= 1;
        }
        if comments.is_empty() {
            return None;
        }
        comments.reverse();
        let text = comments
            .iter()
            .map(|c| comment_text(c))
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    /// A comment on the same line as a preceding non-trivia token.
    fn is_trailing_comment(&self, idx: usize) -> bool {
        let mut i = idx;
        while i > 0 {
            let prev = &self.tokens[i - 1];
            match prev.kind {
                TokenKind::Whitespace if prev.text.contains('\n') => return false,
                TokenKind::Whitespace => {}
                kind if kind.is_comment() => return false,
                _ => return true,
            }
            i -= 1;
        }
        false
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// `ident ('.' ident)*`, optionally with a leading `.`
    fn dotted_name(&mut self, allow_leading_dot: bool) -> Option<(SmolStr, TextRange)> {
        let start = self.current_offset();
        let mut name = String::new();
        if allow_leading_dot && self.eat(TokenKind::Dot) {
            name.push('.');
        }
        let first = self.expect(TokenKind::Ident)?;
        name.push_str(first.text);
        while self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
            self.bump();
            if let Some(part) = self.bump() {
                name.push('.');
                name.push_str(part.text);
            }
        }
        Some((SmolStr::from(name), TextRange::new(start, self.last_end)))
    }

    fn ident(&mut self) -> Option<(SmolStr, Span)> {
        let token = self.expect(TokenKind::Ident)?;
        Some((SmolStr::from(token.text), self.span(token.range())))
    }

    /// Signed integer literal.
    fn integer(&mut self) -> Option<(i64, Span)> {
        let start = self.current_offset();
        let negative = self.eat(TokenKind::Minus);
        let token = self.expect(TokenKind::IntLiteral)?;
        let span = self.span_from(start);
        match parse_int_literal(token.text) {
            Some(value) => Some((if negative { -value } else { value }, span)),
            None => {
                self.errors
                    .push(SyntaxError::new("integer literal out of range", span));
                None
            }
        }
    }

    // =========================================================================
    // File level
    // =========================================================================

    fn parse_file(&mut self, file: &mut ProtoFile) {
        while !self.at_eof() {
            let doc = self.leading_doc();
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.bump();
                }
                TokenKind::Ident => match self.current_text() {
                    "syntax" | "edition" => {
                        let decl = self.parse_syntax();
                        if file.syntax.is_some() || !file.declarations.is_empty() {
                            self.errors.push(SyntaxError::new(
                                "syntax declaration must be the first statement",
                                decl.as_ref().map(|d| d.span).unwrap_or_default(),
                            ));
                        }
                        if file.syntax.is_none() {
                            file.syntax = decl;
                        }
                    }
                    "package" => {
                        if let Some(package) = self.parse_package() {
                            if file.package.is_some() {
                                self.errors.push(SyntaxError::new(
                                    "multiple package declarations",
                                    package.span,
                                ));
                            } else {
                                self.package = package.name.clone();
                                file.package = Some(package);
                            }
                        }
                    }
                    "import" => {
                        if let Some(import) = self.parse_import() {
                            file.imports.push(import);
                        }
                    }
                    "option" => {
                        if let Some(option) = self.parse_option_statement() {
                            file.options.push(option);
                        }
                    }
                    _ => {
                        let scope = self.package.clone();
                        match self.parse_declaration(&scope, doc) {
                            Some(decl) => file.declarations.push(decl),
                            None => {
                                self.error(format!(
                                    "unexpected {} at top level",
                                    self.found()
                                ));
                                self.recover();
                            }
                        }
                    }
                },
                TokenKind::RBrace => {
                    self.error("unexpected '}'");
                    self.bump();
                }
                _ => {
                    self.error(format!("unexpected {} at top level", self.found()));
                    self.recover();
                }
            }
        }
    }

    /// message / enum / service / extend, or `None` if the current token
    /// starts none of them.
    fn parse_declaration(
        &mut self,
        scope: &Arc<str>,
        doc: Option<String>,
    ) -> Option<Declaration> {
        if self.nth(1) != TokenKind::Ident && self.nth(1) != TokenKind::Dot {
            return None;
        }
        match self.current_text() {
            "message" => Some(Declaration::Message(self.parse_message(scope, doc))),
            "enum" => Some(Declaration::Enum(self.parse_enum(scope, doc))),
            "service" => Some(Declaration::Service(self.parse_service(scope, doc))),
            "extend" => Some(Declaration::Extend(self.parse_extend(scope, doc))),
            _ => None,
        }
    }

    fn parse_syntax(&mut self) -> Option<SyntaxDecl> {
        let start = self.current_offset();
        let keyword = self.bump()?;
        let kind = if keyword.text == "edition" {
            SyntaxKeyword::Edition
        } else {
            SyntaxKeyword::Syntax
        };
        self.expect(TokenKind::Eq)?;
        let value = self.expect(TokenKind::StringLiteral);
        self.expect_semicolon();
        let value = value?;
        Some(SyntaxDecl {
            kind,
            value: SmolStr::from(unquote(value.text)),
            span: self.span_from(start),
        })
    }

    fn parse_package(&mut self) -> Option<Package> {
        let start = self.current_offset();
        self.bump();
        let Some((name, range)) = self.dotted_name(false) else {
            self.recover();
            return None;
        };
        self.expect_semicolon();
        Some(Package {
            name: Arc::from(name.as_str()),
            span: self.span_from(start),
            name_span: self.span(range),
        })
    }

    fn parse_import(&mut self) -> Option<Import> {
        let start = self.current_offset();
        self.bump();
        let modifier = if self.eat_keyword("public") {
            ImportModifier::Public
        } else if self.eat_keyword("weak") {
            ImportModifier::Weak
        } else {
            ImportModifier::None
        };
        let Some(path) = self.expect(TokenKind::StringLiteral) else {
            self.recover();
            return None;
        };
        self.expect_semicolon();
        Some(Import {
            path: SmolStr::from(unquote(path.text)),
            modifier,
            span: self.span_from(start),
            path_span: self.span(path.range()),
        })
    }

    // =========================================================================
    // Options
    // =========================================================================

    fn parse_option_statement(&mut self) -> Option<OptionDecl> {
        let start = self.current_offset();
        self.bump();
        let option = self.parse_option_body(start);
        match option {
            Some(option) => {
                self.expect_semicolon();
                Some(OptionDecl {
                    span: self.span_from(start),
                    ..option
                })
            }
            None => {
                self.recover();
                None
            }
        }
    }

    /// `name = value` (shared by option statements and `[...]` lists)
    fn parse_option_body(&mut self, start: TextSize) -> Option<OptionDecl> {
        let name_start = self.current_offset();
        let name = self.parse_option_name()?;
        let name_span = self.span_from(name_start);
        self.expect(TokenKind::Eq)?;
        let value = self.parse_option_value()?;
        Some(OptionDecl {
            name,
            value,
            span: self.span_from(start),
            name_span,
        })
    }

    /// `ident` or `(full.ident)`, followed by `.ident` / `.(ext)` parts.
    fn parse_option_name(&mut self) -> Option<SmolStr> {
        let mut name = String::new();
        loop {
            if self.eat(TokenKind::LParen) {
                let (ext, _) = self.dotted_name(true)?;
                self.expect(TokenKind::RParen)?;
                name.push('(');
                name.push_str(&ext);
                name.push(')');
            } else {
                let token = self.expect(TokenKind::Ident)?;
                name.push_str(token.text);
            }
            if self.at(TokenKind::Dot) {
                self.bump();
                name.push('.');
            } else {
                break;
            }
        }
        Some(SmolStr::from(name))
    }

    /// A constant, an identifier or an aggregate `{ ... }` value; the
    /// returned string is the source text of the value.
    fn parse_option_value(&mut self) -> Option<String> {
        let start = self.current_offset();
        match self.current_kind() {
            TokenKind::LBrace => self.skip_balanced_braces(),
            TokenKind::Minus | TokenKind::Plus => {
                self.bump();
                if self.at(TokenKind::IntLiteral)
                    || self.at(TokenKind::FloatLiteral)
                    || self.at(TokenKind::Ident)
                {
                    self.bump();
                } else {
                    self.error(format!("expected number, found {}", self.found()));
                    return None;
                }
            }
            TokenKind::IntLiteral | TokenKind::FloatLiteral => {
                self.bump();
            }
            TokenKind::StringLiteral => {
                while self.at(TokenKind::StringLiteral) {
                    self.bump();
                }
            }
            TokenKind::Ident | TokenKind::Dot => {
                self.dotted_name(true)?;
            }
            _ => {
                self.error(format!("expected option value, found {}", self.found()));
                return None;
            }
        }
        let range = TextRange::new(start, self.last_end);
        Some(self.text[range].to_string())
    }

    /// `[name = value, ...]`; returns an empty list when not at `[`.
    fn parse_field_options(&mut self) -> Vec<OptionDecl> {
        let mut options = Vec::new();
        if !self.eat(TokenKind::LBracket) {
            return options;
        }
        loop {
            let start = self.current_offset();
            match self.parse_option_body(start) {
                Some(option) => options.push(option),
                None => {
                    while !self.at_eof()
                        && !self.at(TokenKind::RBracket)
                        && !self.at(TokenKind::Semicolon)
                        && !self.at(TokenKind::RBrace)
                    {
                        self.bump();
                    }
                    break;
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket);
        options
    }

    // =========================================================================
    // Messages
    // =========================================================================

    fn parse_message(&mut self, scope: &Arc<str>, doc: Option<String>) -> Message {
        let start = self.current_offset();
        self.bump();
        let (name, name_span) = self
            .ident()
            .unwrap_or_else(|| (SmolStr::default(), self.span_from(start)));
        let qualified_name = qualify(scope, &name);
        let mut message = Message {
            name,
            qualified_name: qualified_name.clone(),
            fields: Vec::new(),
            oneofs: Vec::new(),
            nested: Vec::new(),
            reserved: Vec::new(),
            extensions: Vec::new(),
            options: Vec::new(),
            doc,
            span: Span::default(),
            name_span,
        };

        if self.expect(TokenKind::LBrace).is_none() {
            self.recover();
            message.span = self.span_from(start);
            return message;
        }

        loop {
            if self.at_eof() {
                self.error(format!(
                    "unterminated message '{}': expected '}}'",
                    message.name
                ));
                break;
            }
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let doc = self.leading_doc();
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.bump();
                }
                TokenKind::Ident | TokenKind::Dot => {
                    if let Some(decl) = self.parse_declaration(&qualified_name, doc.clone()) {
                        message.nested.push(decl);
                        continue;
                    }
                    match self.current_text() {
                        "oneof" if self.nth(1) == TokenKind::Ident => {
                            let oneof = self.parse_oneof(&qualified_name, doc);
                            message.oneofs.push(oneof);
                        }
                        "option" => {
                            if let Some(option) = self.parse_option_statement() {
                                message.options.push(option);
                            }
                        }
                        "reserved" => {
                            if let Some(reserved) = self.parse_reserved(MAX_FIELD_NUMBER) {
                                message.reserved.push(reserved);
                            }
                        }
                        "extensions" => {
                            let ranges = self.parse_extensions();
                            message.extensions.extend(ranges);
                        }
                        _ => {
                            if let Some(field) = self.parse_field(&qualified_name, &qualified_name, doc)
                            {
                                message.fields.push(field);
                            }
                        }
                    }
                }
                _ => {
                    self.error(format!("unexpected {} in message body", self.found()));
                    self.recover();
                }
            }
        }

        message.span = self.span_from(start);
        message
    }

    /// A field declaration. `type_scope` is where the field's type is
    /// resolved from, `name_scope` where its qualified name lives.
    fn parse_field(
        &mut self,
        type_scope: &Arc<str>,
        name_scope: &Arc<str>,
        doc: Option<String>,
    ) -> Option<Field> {
        let start = self.current_offset();
        let modifier = if self.nth(1) == TokenKind::Ident || self.nth(1) == TokenKind::Dot {
            match self.current_text() {
                "optional" => FieldModifier::Optional,
                "required" => FieldModifier::Required,
                "repeated" => FieldModifier::Repeated,
                _ => FieldModifier::None,
            }
        } else {
            FieldModifier::None
        };
        if modifier != FieldModifier::None {
            self.bump();
        }

        let Some(ty) = self.parse_field_type(type_scope) else {
            self.recover();
            return None;
        };

        let Some((name, name_span)) = self.ident() else {
            self.recover();
            return None;
        };

        let (number, number_span) = if self.eat(TokenKind::Eq) {
            match self.integer() {
                Some((n, span)) => (Some(n), span),
                None => (None, self.span_from(start)),
            }
        } else {
            self.error_after_last(format!("missing field number for '{name}'"));
            (None, name_span)
        };

        let options = self.parse_field_options();
        self.expect_semicolon();

        Some(Field {
            qualified_name: qualify(name_scope, &name),
            name,
            ty,
            number,
            modifier,
            options,
            doc,
            span: self.span_from(start),
            name_span,
            number_span,
        })
    }

    fn parse_field_type(&mut self, scope: &Arc<str>) -> Option<FieldType> {
        if self.at_keyword("map") && self.nth(1) == TokenKind::LAngle {
            self.bump();
            self.bump();
            let key_token = self.expect(TokenKind::Ident)?;
            let key = match ScalarType::from_name(key_token.text) {
                Some(k) if !matches!(k, ScalarType::Double | ScalarType::Float | ScalarType::Bytes) => k,
                _ => {
                    let span = self.span(key_token.range());
                    self.errors.push(SyntaxError::new(
                        format!("invalid map key type '{}'", key_token.text),
                        span,
                    ));
                    ScalarType::String
                }
            };
            self.expect(TokenKind::Comma)?;
            let value = self.parse_named_type(scope)?;
            self.expect(TokenKind::RAngle)?;
            return Some(FieldType::Map {
                key,
                value: Box::new(value),
            });
        }
        self.parse_named_type(scope)
    }

    fn parse_named_type(&mut self, scope: &Arc<str>) -> Option<FieldType> {
        let (name, range) = self.dotted_name(true)?;
        if let Some(scalar) = ScalarType::from_name(&name) {
            return Some(FieldType::Scalar(scalar));
        }
        Some(FieldType::Named(TypeReference {
            name,
            scope: scope.clone(),
            span: self.span(range),
        }))
    }

    fn parse_oneof(&mut self, message_name: &Arc<str>, doc: Option<String>) -> Oneof {
        let start = self.current_offset();
        self.bump();
        let (name, name_span) = self
            .ident()
            .unwrap_or_else(|| (SmolStr::default(), self.span_from(start)));
        let mut oneof = Oneof {
            name,
            fields: Vec::new(),
            options: Vec::new(),
            doc,
            span: Span::default(),
            name_span,
        };
        if self.expect(TokenKind::LBrace).is_none() {
            self.recover();
            oneof.span = self.span_from(start);
            return oneof;
        }
        loop {
            if self.at_eof() {
                self.error(format!("unterminated oneof '{}': expected '}}'", oneof.name));
                break;
            }
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let doc = self.leading_doc();
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.bump();
                }
                TokenKind::Ident if self.current_text() == "option" => {
                    if let Some(option) = self.parse_option_statement() {
                        oneof.options.push(option);
                    }
                }
                TokenKind::Ident | TokenKind::Dot => {
                    if let Some(field) = self.parse_field(message_name, message_name, doc) {
                        if field.modifier != FieldModifier::None {
                            self.errors.push(SyntaxError::new(
                                "fields in oneofs must not have labels",
                                field.span,
                            ));
                        }
                        oneof.fields.push(field);
                    }
                }
                _ => {
                    self.error(format!("unexpected {} in oneof body", self.found()));
                    self.recover();
                }
            }
        }
        oneof.span = self.span_from(start);
        oneof
    }

    /// `reserved 1, 5 to 10, 20 to max;` or `reserved "foo", "bar";`
    fn parse_reserved(&mut self, max: i64) -> Option<Reserved> {
        let start = self.current_offset();
        self.bump();
        let mut reserved = Reserved {
            ranges: Vec::new(),
            names: Vec::new(),
            span: Span::default(),
        };
        if self.at(TokenKind::StringLiteral) || self.at(TokenKind::Ident) {
            loop {
                let Some(token) = self.bump() else { break };
                let name = match token.kind {
                    TokenKind::StringLiteral => unquote(token.text),
                    TokenKind::Ident => token.text.to_string(),
                    _ => {
                        self.error(format!("expected reserved name, found {}", token.kind.describe()));
                        break;
                    }
                };
                reserved
                    .names
                    .push((SmolStr::from(name), self.span(token.range())));
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        } else {
            match self.parse_number_ranges(max) {
                Some(ranges) => reserved.ranges = ranges,
                None => {
                    self.recover();
                    return None;
                }
            }
        }
        self.expect_semicolon();
        reserved.span = self.span_from(start);
        Some(reserved)
    }

    fn parse_extensions(&mut self) -> Vec<NumberRange> {
        self.bump();
        let Some(ranges) = self.parse_number_ranges(MAX_FIELD_NUMBER) else {
            self.recover();
            return Vec::new();
        };
        self.parse_field_options();
        self.expect_semicolon();
        ranges
    }

    fn parse_number_ranges(&mut self, max: i64) -> Option<Vec<NumberRange>> {
        let mut ranges = Vec::new();
        loop {
            let range_start = self.current_offset();
            let (start, _) = self.integer()?;
            let end = if self.eat_keyword("to") {
                if self.eat_keyword("max") {
                    max
                } else {
                    self.integer()?.0
                }
            } else {
                start
            };
            if end < start {
                self.error_after_last("range end must not be smaller than its start");
            }
            ranges.push(NumberRange {
                start,
                end,
                span: self.span_from(range_start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Some(ranges)
    }

    // =========================================================================
    // Enums
    // =========================================================================

    fn parse_enum(&mut self, scope: &Arc<str>, doc: Option<String>) -> Enum {
        let start = self.current_offset();
        self.bump();
        let (name, name_span) = self
            .ident()
            .unwrap_or_else(|| (SmolStr::default(), self.span_from(start)));
        let mut en = Enum {
            qualified_name: qualify(scope, &name),
            name,
            values: Vec::new(),
            reserved: Vec::new(),
            options: Vec::new(),
            doc,
            span: Span::default(),
            name_span,
        };
        if self.expect(TokenKind::LBrace).is_none() {
            self.recover();
            en.span = self.span_from(start);
            return en;
        }
        loop {
            if self.at_eof() {
                self.error(format!("unterminated enum '{}': expected '}}'", en.name));
                break;
            }
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let doc = self.leading_doc();
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.bump();
                }
                TokenKind::Ident => match self.current_text() {
                    "option" if self.nth(1) != TokenKind::Eq => {
                        if let Some(option) = self.parse_option_statement() {
                            en.options.push(option);
                        }
                    }
                    "reserved" if self.nth(1) != TokenKind::Eq => {
                        if let Some(reserved) = self.parse_reserved(MAX_ENUM_VALUE) {
                            en.reserved.push(reserved);
                        }
                    }
                    _ => {
                        // Enum values live in the enum's enclosing scope.
                        if let Some(value) = self.parse_enum_value(scope, doc) {
                            en.values.push(value);
                        }
                    }
                },
                _ => {
                    self.error(format!("unexpected {} in enum body", self.found()));
                    self.recover();
                }
            }
        }
        en.span = self.span_from(start);
        en
    }

    fn parse_enum_value(&mut self, scope: &Arc<str>, doc: Option<String>) -> Option<EnumValue> {
        let start = self.current_offset();
        let (name, name_span) = self.ident()?;
        let (number, number_span) = if self.eat(TokenKind::Eq) {
            match self.integer() {
                Some((n, span)) => (Some(n), span),
                None => (None, name_span),
            }
        } else {
            self.error_after_last(format!("missing value for enum constant '{name}'"));
            (None, name_span)
        };
        let options = self.parse_field_options();
        self.expect_semicolon();
        Some(EnumValue {
            qualified_name: qualify(scope, &name),
            name,
            number,
            options,
            doc,
            span: self.span_from(start),
            name_span,
            number_span,
        })
    }

    // =========================================================================
    // Services
    // =========================================================================

    fn parse_service(&mut self, scope: &Arc<str>, doc: Option<String>) -> Service {
        let start = self.current_offset();
        self.bump();
        let (name, name_span) = self
            .ident()
            .unwrap_or_else(|| (SmolStr::default(), self.span_from(start)));
        let qualified_name = qualify(scope, &name);
        let mut service = Service {
            name,
            qualified_name: qualified_name.clone(),
            rpcs: Vec::new(),
            options: Vec::new(),
            doc,
            span: Span::default(),
            name_span,
        };
        if self.expect(TokenKind::LBrace).is_none() {
            self.recover();
            service.span = self.span_from(start);
            return service;
        }
        loop {
            if self.at_eof() {
                self.error(format!(
                    "unterminated service '{}': expected '}}'",
                    service.name
                ));
                break;
            }
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let doc = self.leading_doc();
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            if self.at_keyword("rpc") {
                if let Some(rpc) = self.parse_rpc(&qualified_name, doc) {
                    service.rpcs.push(rpc);
                }
            } else if self.at_keyword("option") {
                if let Some(option) = self.parse_option_statement() {
                    service.options.push(option);
                }
            } else {
                self.error(format!("unexpected {} in service body", self.found()));
                self.recover();
            }
        }
        service.span = self.span_from(start);
        service
    }

    fn parse_rpc(&mut self, service: &Arc<str>, doc: Option<String>) -> Option<Rpc> {
        let start = self.current_offset();
        self.bump();
        let Some((name, name_span)) = self.ident() else {
            self.recover();
            return None;
        };
        let Some((input, client_streaming)) = self.parse_rpc_type(service) else {
            self.recover();
            return None;
        };
        if !self.eat_keyword("returns") {
            self.error(format!("expected 'returns', found {}", self.found()));
            self.recover();
            return None;
        }
        let Some((output, server_streaming)) = self.parse_rpc_type(service) else {
            self.recover();
            return None;
        };

        let mut options = Vec::new();
        if self.eat(TokenKind::LBrace) {
            loop {
                if self.at_eof() {
                    self.error(format!("unterminated rpc '{name}': expected '}}'"));
                    break;
                }
                if self.eat(TokenKind::RBrace) {
                    break;
                }
                if self.eat(TokenKind::Semicolon) {
                    continue;
                }
                if self.at_keyword("option") {
                    if let Some(option) = self.parse_option_statement() {
                        options.push(option);
                    }
                } else {
                    self.error(format!("unexpected {} in rpc body", self.found()));
                    self.recover();
                }
            }
            self.eat(TokenKind::Semicolon);
        } else {
            self.expect_semicolon();
        }

        Some(Rpc {
            qualified_name: qualify(service, &name),
            name,
            input,
            output,
            client_streaming,
            server_streaming,
            options,
            doc,
            span: self.span_from(start),
            name_span,
        })
    }

    /// `( [stream] Type )`
    fn parse_rpc_type(&mut self, scope: &Arc<str>) -> Option<(TypeReference, bool)> {
        self.expect(TokenKind::LParen)?;
        let streaming = self.at_keyword("stream")
            && matches!(self.nth(1), TokenKind::Ident | TokenKind::Dot);
        if streaming {
            self.bump();
        }
        let (name, range) = self.dotted_name(true)?;
        self.expect(TokenKind::RParen)?;
        Some((
            TypeReference {
                name,
                scope: scope.clone(),
                span: self.span(range),
            },
            streaming,
        ))
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    fn parse_extend(&mut self, scope: &Arc<str>, doc: Option<String>) -> Extend {
        let start = self.current_offset();
        self.bump();
        let extendee = match self.dotted_name(true) {
            Some((name, range)) => TypeReference {
                name,
                scope: scope.clone(),
                span: self.span(range),
            },
            None => TypeReference {
                name: SmolStr::default(),
                scope: scope.clone(),
                span: self.span_from(start),
            },
        };
        let mut extend = Extend {
            extendee,
            fields: Vec::new(),
            doc,
            span: Span::default(),
        };
        if self.expect(TokenKind::LBrace).is_none() {
            self.recover();
            extend.span = self.span_from(start);
            return extend;
        }
        loop {
            if self.at_eof() {
                self.error(format!(
                    "unterminated extend '{}': expected '}}'",
                    extend.extendee.name
                ));
                break;
            }
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let doc = self.leading_doc();
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.bump();
                }
                TokenKind::Ident | TokenKind::Dot => {
                    if let Some(field) = self.parse_field(scope, scope, doc) {
                        extend.fields.push(field);
                    }
                }
                _ => {
                    self.error(format!("unexpected {} in extend body", self.found()));
                    self.recover();
                }
            }
        }
        extend.span = self.span_from(start);
        extend
    }
}

/// Strip comment markers from a line or block comment.
fn comment_text(comment: &str) -> String {
    if let Some(line) = comment.strip_prefix("//") {
        return line.strip_prefix(' ').unwrap_or(line).trim_end().to_string();
    }
    let inner = comment
        .strip_prefix("/*")
        .and_then(|c| c.strip_suffix("*/"))
        .unwrap_or(comment);
    inner
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
