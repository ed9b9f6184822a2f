//! Workspace configuration and import-path handling.

mod import_resolver;
mod settings;

pub use import_resolver::ImportResolver;
pub use settings::{ConfigError, DiagnosticSettings, NamingSettings, Settings};
