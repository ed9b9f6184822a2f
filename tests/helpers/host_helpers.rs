//! Helpers for setting up analysis hosts and inspecting diagnostics.

use protoscope::hir::Diagnostic;
use protoscope::ide::AnalysisHost;

/// Creates an AnalysisHost with the given `(uri, text)` files.
///
/// Panics if any file has syntax errors.
pub fn host_from_sources(files: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (uri, text) in files {
        let errors = host.set_file_content(uri, text);
        assert!(errors.is_empty(), "Parse errors in '{}': {:?}", uri, errors);
    }
    host
}

/// All diagnostics of one file.
pub fn diagnostics_for(host: &AnalysisHost, uri: &str) -> Vec<Diagnostic> {
    host.analysis().diagnostics(uri)
}

/// Diagnostics carrying `code`.
pub fn with_code(diagnostics: &[Diagnostic], code: &str) -> Vec<Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.code() == Some(code))
        .cloned()
        .collect()
}

/// Render diagnostics one per line for assertion messages.
pub fn describe(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| {
            format!(
                "  {}:{} {} {}",
                d.range.start.line + 1,
                d.range.start.column + 1,
                d.code().unwrap_or("-"),
                d.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
