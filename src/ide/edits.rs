//! Formatting requests expressed as text edits.

use serde::Serialize;

use crate::base::{Position, Span};
use crate::syntax::{self, FormatOptions};

/// Replace `range` with `new_text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: Span,
    pub new_text: String,
}

/// Edit replacing the whole document with its formatted text; `None` when
/// the document is already formatted.
pub fn format_document(text: &str, options: &FormatOptions) -> Option<TextEdit> {
    let formatted = syntax::format(text, options);
    if formatted == text {
        return None;
    }
    Some(TextEdit {
        range: document_span(text),
        new_text: formatted,
    })
}

/// Edit replacing the whole lines covered by `range`; `None` when they are
/// already formatted or the range starts past the end of the document.
pub fn format_range(text: &str, range: Span, options: &FormatOptions) -> Option<TextEdit> {
    let lines: Vec<&str> = text.lines().collect();
    let start = range.start.line as usize;
    if start >= lines.len() {
        return None;
    }
    let end = (range.end.line.max(range.start.line) as usize).min(lines.len() - 1);

    let formatted = syntax::format_range(text, range, options);
    let original = lines[start..=end].join("\n");
    if formatted == original {
        return None;
    }
    Some(TextEdit {
        range: Span::new(
            Position::new(start as u32, 0),
            Position::new(end as u32, lines[end].chars().count() as u32),
        ),
        new_text: formatted,
    })
}

/// Span from the start of `text` to its end.
fn document_span(text: &str) -> Span {
    let last_line = text.split('\n').count().saturating_sub(1);
    let last = text.rsplit('\n').next().unwrap_or_default();
    Span::new(
        Position::new(0, 0),
        Position::new(last_line as u32, last.chars().count() as u32),
    )
}
