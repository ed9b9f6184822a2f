//! Line-oriented formatter for schema files
//!
//! The formatter works on raw text rather than the AST so it keeps working
//! while a file is transiently invalid during editing. A single pass tracks
//! brace and bracket depth, re-indents every line (block comment interiors included, but
//! never reflowed), normalizes the spacing of recognized single-line
//! constructs and, when enabled, renumbers fields and enum values.

mod line;
mod options;
mod renumber;


use tracing::debug;

use crate::base::Span;
use line::LineKind;
pub use options::{FormatOptions, RenumberOptions};
use renumber::Renumberer;

/// Format a whole document.
pub fn format(source: &str, options: &FormatOptions) -> String {
    let mut formatter = LineFormatter::new(options);
    let mut lines: Vec<String> = source
        .lines()
        .filter_map(|line| formatter.format_line(line))
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// Format the lines covered by `range` (whole lines, inclusive).
///
/// Lines before the range are run through the formatter for their state
/// only, so the range starts at the indentation implied by the brace nesting
/// since the start of the document and renumbering continues the enclosing
/// scope's counter.
pub fn format_range(source: &str, range: Span, options: &FormatOptions) -> String {
    let start = range.start.line as usize;
    let end = range.end.line.max(range.start.line) as usize;
    let mut formatter = LineFormatter::new(options);
    let mut lines = Vec::new();
    for (index, line) in source.lines().enumerate().take(end + 1) {
        if index == start {
            debug!(line = start, depth = formatter.depth, "inferred range indent");
        }
        let formatted = formatter.format_line(line);
        if index >= start {
            lines.extend(formatted);
        }
    }
    lines.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Brace {
    Open,
    Close,
}

/// Braces and brackets of one line outside strings and comments.
#[derive(Debug, Default)]
struct LineScan {
    braces: Vec<Brace>,
    /// `}` before any other code on the line.
    leading_closes: usize,
    /// `]` before any other code on the line.
    leading_bracket_closes: usize,
    /// Net change in `[` nesting.
    bracket_delta: isize,
    ends_in_block_comment: bool,
}

fn scan_line(line: &str, in_block_comment: bool) -> LineScan {
    let mut scan = LineScan::default();
    let mut in_block = in_block_comment;
    let mut seen_code = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block = false;
            }
            continue;
        }
        match c {
            '/' if chars.peek() == Some(&'/') => break,
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_block = true;
            }
            '"' | '\'' => {
                seen_code = true;
                while let Some(s) = chars.next() {
                    if s == '\\' {
                        chars.next();
                    } else if s == c {
                        break;
                    }
                }
            }
            '{' => {
                seen_code = true;
                scan.braces.push(Brace::Open);
            }
            '}' => {
                if !seen_code {
                    scan.leading_closes += 1;
                }
                scan.braces.push(Brace::Close);
            }
            '[' => {
                seen_code = true;
                scan.bracket_delta += 1;
            }
            ']' => {
                if !seen_code {
                    scan.leading_bracket_closes += 1;
                }
                scan.bracket_delta -= 1;
            }
            c if c.is_whitespace() => {}
            _ => seen_code = true,
        }
    }
    scan.ends_in_block_comment = in_block;
    scan
}

/// Formatter state carried from line to line.
struct LineFormatter<'a> {
    options: &'a FormatOptions,
    depth: usize,
    /// Open `[` of a field's options spanning several lines.
    bracket_depth: usize,
    in_block_comment: bool,
    blank_run: usize,
    /// Header of a declaration whose `{` has not been seen yet.
    pending_header: Option<line::HeaderKind>,
    renumberer: Renumberer,
}

impl<'a> LineFormatter<'a> {
    fn new(options: &'a FormatOptions) -> Self {
        Self {
            options,
            depth: 0,
            bracket_depth: 0,
            in_block_comment: false,
            blank_run: 0,
            pending_header: None,
            renumberer: Renumberer::new(options.renumber),
        }
    }

    /// Format one line; `None` when the line is dropped.
    fn format_line(&mut self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();

        if self.in_block_comment {
            let scan = scan_line(trimmed, true);
            self.in_block_comment = scan.ends_in_block_comment;
            let indent = self.options.indent(self.depth + self.bracket_depth);
            self.apply_braces(&scan.braces, None);
            self.bracket_depth = self.bracket_depth.saturating_add_signed(scan.bracket_delta);
            if trimmed.is_empty() {
                return Some(String::new());
            }
            return Some(if trimmed.starts_with('*') {
                format!("{indent} {trimmed}")
            } else {
                format!("{indent}{trimmed}")
            });
        }

        if trimmed.is_empty() {
            self.blank_run += 1;
            return (self.blank_run <= self.options.max_blank_lines).then(String::new);
        }
        self.blank_run = 0;

        let scan = scan_line(trimmed, false);
        let level = self.depth.saturating_sub(scan.leading_closes)
            + self.bracket_depth.saturating_sub(scan.leading_bracket_closes);
        let (leading, rest) = scan.braces.split_at(scan.leading_closes);
        self.apply_braces(leading, None);

        let in_options = self.bracket_depth > 0;
        let content = if scan.ends_in_block_comment {
            self.in_block_comment = true;
            trimmed.to_string()
        } else if in_options {
            trimmed.to_string()
        } else {
            self.rewrite(trimmed)
        };

        let pending = self.pending_header.take();
        let header = line::header_kind(trimmed);
        if rest.contains(&Brace::Open) {
            self.apply_braces(rest, header.or(pending));
        } else {
            self.apply_braces(rest, None);
            // `message Foo` with its `{` on a later line
            let comment_only = trimmed.starts_with("//") || trimmed.starts_with("/*");
            self.pending_header = if comment_only { pending } else { header };
        }
        self.bracket_depth = self.bracket_depth.saturating_add_signed(scan.bracket_delta);
        Some(format!("{}{}", self.options.indent(level), content))
    }

    /// Normalize a recognized line and renumber it if enabled.
    fn rewrite(&mut self, text: &str) -> String {
        let Some(mut line) = line::analyze(text) else {
            return text.to_string();
        };
        if self.options.renumber.enabled {
            match line.kind {
                LineKind::Field(numbered) | LineKind::MapField(numbered) => {
                    if let Some(number) = self.renumberer.field(numbered.number) {
                        line.insert_number(numbered, number);
                    }
                }
                LineKind::EnumValue(numbered) if self.renumberer.in_enum() => {
                    if let Some(number) = self.renumberer.enum_value(numbered.number) {
                        line.insert_number(numbered, number);
                    }
                }
                _ => {}
            }
        }
        match line.kind {
            LineKind::Other => text.to_string(),
            _ => line.render(),
        }
    }

    /// Update depth and the renumbering scope stack. The first `{` of a
    /// declaration header opens that declaration's scope.
    fn apply_braces(&mut self, braces: &[Brace], mut header: Option<line::HeaderKind>) {
        for brace in braces {
            match brace {
                Brace::Open => {
                    self.depth += 1;
                    self.renumberer.enter(header.take());
                }
                Brace::Close => {
                    self.depth = self.depth.saturating_sub(1);
                    self.renumberer.exit();
                }
            }
        }
    }
}
