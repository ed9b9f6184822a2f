//! Structural matching of single source lines.
//!
//! A line is lexed with the schema lexer, split into significant pieces and
//! trailing comments, and matched against the handful of shapes the formatter
//! rewrites. Anything else is left alone.

use crate::parser::{Lexer, TokenKind, parse_int_literal};

/// A significant token of a line, or one synthesized by the renumberer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Piece {
    pub kind: TokenKind,
    pub text: String,
    /// No whitespace separated this piece from the previous one in the source.
    pub glued: bool,
}

impl Piece {
    fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            glued: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HeaderKind {
    Message,
    Enum,
    Oneof,
    Service,
    Extend,
}

impl HeaderKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "message" => HeaderKind::Message,
            "enum" => HeaderKind::Enum,
            "oneof" => HeaderKind::Oneof,
            "service" => HeaderKind::Service,
            "extend" => HeaderKind::Extend,
            _ => return None,
        })
    }
}

/// Number position inside a field-like line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Numbered {
    pub number: Option<i64>,
    /// Where `= N` goes when the number is missing.
    pub insert_at: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LineKind {
    Field(Numbered),
    MapField(Numbered),
    EnumValue(Numbered),
    Header(HeaderKind),
    Option,
    Other,
}

/// Words that start statements other than fields and enum values.
const STATEMENT_KEYWORDS: &[&str] = &[
    "syntax",
    "edition",
    "package",
    "import",
    "option",
    "message",
    "enum",
    "service",
    "oneof",
    "extend",
    "rpc",
    "returns",
    "reserved",
    "extensions",
];

const FIELD_MODIFIERS: &[&str] = &["optional", "required", "repeated"];

#[derive(Debug, Clone)]
pub(super) struct Line {
    pub pieces: Vec<Piece>,
    pub trailing: Vec<Piece>,
    pub kind: LineKind,
}

/// Lex and classify one trimmed line. Returns `None` for lines that should
/// pass through untouched: comment-only lines, lines with lexer errors, and
/// lines with a comment between significant tokens.
pub(super) fn analyze(text: &str) -> Option<Line> {
    let mut pieces = Vec::new();
    let mut trailing = Vec::new();
    let mut glued = true;
    for token in Lexer::new(text) {
        match token.kind {
            TokenKind::Error => return None,
            TokenKind::Whitespace => glued = false,
            kind if kind.is_comment() => {
                trailing.push(Piece {
                    kind,
                    text: token.text.to_string(),
                    glued,
                });
                glued = false;
            }
            kind => {
                if !trailing.is_empty() {
                    return None;
                }
                pieces.push(Piece {
                    kind,
                    text: token.text.to_string(),
                    glued,
                });
                glued = true;
            }
        }
    }
    if pieces.is_empty() {
        return None;
    }
    let kind = classify(&pieces);
    Some(Line {
        pieces,
        trailing,
        kind,
    })
}

/// Header keyword of the first word of a line, if any.
pub(super) fn header_kind(text: &str) -> Option<HeaderKind> {
    let word = text.split(|c: char| !c.is_ascii_alphanumeric() && c != '_').next()?;
    HeaderKind::from_keyword(word)
}

fn classify(pieces: &[Piece]) -> LineKind {
    let is = |i: usize, kind: TokenKind| pieces.get(i).is_some_and(|p| p.kind == kind);
    let word = |i: usize| {
        pieces
            .get(i)
            .filter(|p| p.kind == TokenKind::Ident)
            .map(|p| p.text.as_str())
    };
    let Some(first) = word(0) else {
        return LineKind::Other;
    };

    if let Some(kind) = HeaderKind::from_keyword(first) {
        let end = dotted_name_end(pieces, 1);
        if end > 1 && end + 1 == pieces.len() && is(end, TokenKind::LBrace) {
            return LineKind::Header(kind);
        }
        return LineKind::Other;
    }

    if first == "option" {
        return if is(pieces.len() - 1, TokenKind::Semicolon) {
            LineKind::Option
        } else {
            LineKind::Other
        };
    }

    if STATEMENT_KEYWORDS.contains(&first) {
        return LineKind::Other;
    }

    if first == "map" && is(1, TokenKind::LAngle) {
        // map < K , V > name
        if word(2).is_some() && is(3, TokenKind::Comma) {
            let value_end = dotted_name_end(pieces, 4);
            if value_end > 4 && is(value_end, TokenKind::RAngle) && word(value_end + 1).is_some()
            {
                if let Some(numbered) = numbered_tail(pieces, value_end + 2) {
                    return LineKind::MapField(numbered);
                }
            }
        }
        return LineKind::Other;
    }

    // NAME [= N] [opts];
    if let Some(numbered) = numbered_tail(pieces, 1) {
        return LineKind::EnumValue(numbered);
    }

    let mut i = 0;
    if FIELD_MODIFIERS.contains(&first) && (is(1, TokenKind::Ident) || is(1, TokenKind::Dot)) {
        i = 1;
    }
    let type_end = dotted_name_end(pieces, i);
    if type_end > i && word(type_end).is_some() {
        if let Some(numbered) = numbered_tail(pieces, type_end + 1) {
            return LineKind::Field(numbered);
        }
    }
    LineKind::Other
}

/// End index (exclusive) of `[.] ident (. ident)*` starting at `start`;
/// `start` itself when there is no name.
fn dotted_name_end(pieces: &[Piece], start: usize) -> usize {
    let mut i = start;
    if pieces.get(i).is_some_and(|p| p.kind == TokenKind::Dot) {
        i += 1;
    }
    if !pieces.get(i).is_some_and(|p| p.kind == TokenKind::Ident) {
        return start;
    }
    i += 1;
    while pieces.get(i).is_some_and(|p| p.kind == TokenKind::Dot)
        && pieces.get(i + 1).is_some_and(|p| p.kind == TokenKind::Ident)
    {
        i += 2;
    }
    i
}

/// `[= [-]int] ['[' ... ']'] ;` ending the line, or `[= [-]int] '[' ...`
/// with the options bracket still open at the end of the line.
fn numbered_tail(pieces: &[Piece], start: usize) -> Option<Numbered> {
    let kind_at = |i: usize| pieces.get(i).map(|p| p.kind);
    let mut i = start;
    let mut number = None;
    if kind_at(i) == Some(TokenKind::Eq) {
        i += 1;
        let negative = kind_at(i) == Some(TokenKind::Minus);
        if negative {
            i += 1;
        }
        if kind_at(i) != Some(TokenKind::IntLiteral) {
            return None;
        }
        let value = parse_int_literal(&pieces[i].text)?;
        number = Some(if negative { -value } else { value });
        i += 1;
    }
    let insert_at = i;
    if kind_at(i) == Some(TokenKind::LBracket) {
        let mut depth = 0usize;
        loop {
            let Some(kind) = kind_at(i) else {
                // options continue on the next lines
                return Some(Numbered { number, insert_at });
            };
            match kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        i += 1;
    }
    (kind_at(i) == Some(TokenKind::Semicolon) && i + 1 == pieces.len())
        .then_some(Numbered { number, insert_at })
}

impl Line {
    /// Insert `= number` at the slot recorded during classification.
    pub(super) fn insert_number(&mut self, numbered: Numbered, number: i64) {
        let at = numbered.insert_at.min(self.pieces.len());
        self.pieces.splice(
            at..at,
            [
                Piece::synthetic(TokenKind::Eq, "="),
                Piece::synthetic(TokenKind::IntLiteral, number.to_string()),
            ],
        );
    }

    /// Render with canonical spacing.
    pub(super) fn render(&self) -> String {
        let mut out = String::new();
        for (i, piece) in self.pieces.iter().enumerate() {
            if i > 0 && needs_space(&self.pieces, i) {
                out.push(' ');
            }
            out.push_str(&piece.text);
        }
        for comment in &self.trailing {
            out.push(' ');
            out.push_str(&comment.text);
        }
        out
    }
}

fn needs_space(pieces: &[Piece], i: usize) -> bool {
    use TokenKind::*;
    let prev = &pieces[i - 1];
    let next = &pieces[i];
    match (prev.kind, next.kind) {
        (_, Semicolon | Comma | RParen | RBracket | RAngle | Colon) => false,
        (LParen | LBracket | LAngle | Dot, _) => false,
        (Ident, LAngle) => false,
        // `foo.Bar` stays glued, `repeated .foo.Bar` keeps its space
        (Ident | RParen, Dot) => !next.glued,
        (Minus | Plus, IntLiteral | FloatLiteral | Ident) => {
            let before = i.checked_sub(2).map(|j| pieces[j].kind);
            !matches!(
                before,
                None | Some(Eq | Comma | LParen | LBracket | Colon | LBrace)
            )
        }
        (LBrace, RBrace) => false,
        _ => true,
    }
}
