//! Diagnostics: rule-based checks over a parsed file and the workspace.
//!
//! Rules are plain descriptors in the static [`RULES`] table. Each one names
//! the settings flag that enables it and a function from
//! `(file, analyzer snapshot, settings)` to diagnostics. Local rules look only
//! at the file's AST; workspace rules also consult the symbol index.
//!
//! A rule that fails, by returning [`RuleError`] or by panicking, loses its
//! output for that file and nothing else. The failure is logged.

mod local;
mod workspace;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use super::analyzer::AnalyzerSnapshot;
use crate::base::Span;
use crate::project::DiagnosticSettings;
use crate::syntax::ProtoFile;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Span,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// A secondary location attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelatedInfo {
    pub uri: Arc<str>,
    pub range: Span,
    pub message: Arc<str>,
}

impl RelatedInfo {
    pub fn new(uri: &Arc<str>, range: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            uri: uri.clone(),
            range,
            message: message.into(),
        }
    }
}

impl Diagnostic {
    fn new(severity: Severity, range: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(range: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, range, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(range: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, range, message)
    }

    pub fn info(range: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Info, range, message)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes.
///
/// ## Code Ranges
///
/// - **E0000-E0099**: errors (syntax, resolution, numbering, duplicates, cycles)
/// - **W0001-W0099**: warnings and information (unused, deprecated, conventions)
pub mod codes {
    // ========================================================================
    // ERRORS (E0000-E0099)
    // ========================================================================

    /// Syntax error recorded by the parser.
    pub const SYNTAX_ERROR: &str = "E0000";
    /// Type reference that resolves to nothing.
    pub const UNDEFINED_REFERENCE: &str = "E0001";
    /// Import path that matches no known file.
    pub const UNRESOLVED_IMPORT: &str = "E0002";
    /// Field or enum value number out of range or in the implementation band.
    pub const INVALID_NUMBER: &str = "E0003";
    /// Duplicate name or number within one scope.
    pub const DUPLICATE_DEFINITION: &str = "E0004";
    /// Number or name listed in a `reserved` statement.
    pub const RESERVED: &str = "E0005";
    /// Qualified name declared in more than one file.
    pub const DUPLICATE_SYMBOL: &str = "E0006";
    /// Circular import.
    pub const CIRCULAR_DEPENDENCY: &str = "E0007";
    /// First value of a proto3 enum is not zero.
    pub const ENUM_FIRST_VALUE: &str = "E0008";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// Unused symbol.
    pub const UNUSED_SYMBOL: &str = "W0001";
    /// Deprecated usage.
    pub const DEPRECATED: &str = "W0002";
    /// Naming convention violation.
    pub const NAMING_CONVENTION: &str = "W0003";
    /// Import whose declarations are never referenced.
    pub const UNUSED_IMPORT: &str = "W0004";
    /// `required` field.
    pub const REQUIRED_FIELD: &str = "W0005";
    /// Message without any content.
    pub const EMPTY_MESSAGE: &str = "W0006";
    /// Declaration nested deeper than the configured maximum.
    pub const NESTING_DEPTH: &str = "W0007";
    /// Reference to a declaration in a file that is not imported.
    pub const MISSING_IMPORT: &str = "W0008";
}

// ============================================================================
// RULES
// ============================================================================

/// Whether a rule needs the workspace index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleScope {
    /// AST only.
    Local,
    /// Consults the analyzer snapshot.
    Workspace,
}

/// Internal failure of a diagnostic rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("file '{0}' is not indexed")]
    NotIndexed(Arc<str>),
    #[error("rule panicked: {0}")]
    Panicked(String),
}

/// Input of one rule evaluation.
pub struct RuleContext<'a> {
    pub file: &'a ProtoFile,
    pub snapshot: &'a AnalyzerSnapshot<'a>,
    pub settings: &'a DiagnosticSettings,
}

/// A toggleable diagnostic rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub scope: RuleScope,
    pub enabled: fn(&DiagnosticSettings) -> bool,
    pub evaluate: fn(&RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Every rule, in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        id: "syntax",
        scope: RuleScope::Local,
        enabled: |_| true,
        evaluate: local::syntax,
    },
    Rule {
        id: "naming",
        scope: RuleScope::Local,
        enabled: |s| s.naming.enabled,
        evaluate: local::naming,
    },
    Rule {
        id: "field-tags",
        scope: RuleScope::Local,
        enabled: |s| s.field_tags,
        evaluate: local::field_tags,
    },
    Rule {
        id: "duplicates",
        scope: RuleScope::Local,
        enabled: |s| s.duplicates,
        evaluate: local::duplicates,
    },
    Rule {
        id: "discouraged",
        scope: RuleScope::Local,
        enabled: |s| s.discouraged,
        evaluate: local::discouraged,
    },
    Rule {
        id: "references",
        scope: RuleScope::Workspace,
        enabled: |s| s.references,
        evaluate: workspace::references,
    },
    Rule {
        id: "imports",
        scope: RuleScope::Workspace,
        enabled: |s| s.imports,
        evaluate: workspace::imports,
    },
    Rule {
        id: "unused-imports",
        scope: RuleScope::Workspace,
        enabled: |s| s.imports && s.unused_imports,
        evaluate: workspace::unused_imports,
    },
    Rule {
        id: "duplicate-symbols",
        scope: RuleScope::Workspace,
        enabled: |s| s.duplicates,
        evaluate: workspace::duplicate_symbols,
    },
    Rule {
        id: "deprecated",
        scope: RuleScope::Workspace,
        enabled: |s| s.deprecated,
        evaluate: workspace::deprecated,
    },
    Rule {
        id: "unused-symbols",
        scope: RuleScope::Workspace,
        enabled: |s| s.unused_symbols,
        evaluate: workspace::unused_symbols,
    },
    Rule {
        id: "circular-imports",
        scope: RuleScope::Workspace,
        enabled: |s| s.circular_imports,
        evaluate: workspace::circular_imports,
    },
];

/// Run every enabled rule of [`RULES`] on `file`.
pub fn evaluate(
    file: &ProtoFile,
    snapshot: &AnalyzerSnapshot<'_>,
    settings: &DiagnosticSettings,
) -> Vec<Diagnostic> {
    evaluate_rules(RULES, file, snapshot, settings)
}

/// Run the enabled subset of `rules` on `file`. Diagnostics are ordered by
/// start position; rules keep their relative order on ties.
pub fn evaluate_rules(
    rules: &[Rule],
    file: &ProtoFile,
    snapshot: &AnalyzerSnapshot<'_>,
    settings: &DiagnosticSettings,
) -> Vec<Diagnostic> {
    let cx = RuleContext {
        file,
        snapshot,
        settings,
    };
    let mut diagnostics = Vec::new();
    for rule in rules.iter().filter(|rule| (rule.enabled)(settings)) {
        match run_isolated(rule, &cx) {
            Ok(found) => diagnostics.extend(found),
            Err(error) => warn!(rule = rule.id, uri = %file.uri, %error, "diagnostic rule failed"),
        }
    }
    diagnostics.sort_by_key(|d| d.range.start);
    diagnostics
}

fn run_isolated(rule: &Rule, cx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
    panic::catch_unwind(AssertUnwindSafe(|| (rule.evaluate)(cx))).unwrap_or_else(|payload| {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Err(RuleError::Panicked(message))
    })
}
