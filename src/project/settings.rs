//! Host-supplied configuration.
//!
//! The host delivers a flat JSON object with dotted keys. Every key is
//! optional; bad entries are reported as [`ConfigError`] and leave the
//! previous value in place, so a usable [`Settings`] always comes back.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::syntax::{FormatOptions, RenumberOptions};

/// A rejected configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The settings payload was not a JSON object.
    #[error("settings must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A key this library does not know about.
    #[error("unknown setting '{0}'")]
    UnknownKey(String),

    /// A known key with a value of the wrong type or out of range.
    #[error("invalid value for '{key}': expected {expected}, found {found}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        found: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, expected: &'static str, found: &Value) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

/// Naming-convention toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingSettings {
    pub enabled: bool,
    pub messages: bool,
    pub fields: bool,
    pub enum_values: bool,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            messages: true,
            fields: true,
            enum_values: true,
        }
    }
}

/// Enablement flags of the diagnostic rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticSettings {
    pub naming: NamingSettings,
    pub references: bool,
    pub imports: bool,
    pub unused_imports: bool,
    pub field_tags: bool,
    pub duplicates: bool,
    pub discouraged: bool,
    pub max_nesting_depth: usize,
    pub deprecated: bool,
    pub unused_symbols: bool,
    pub circular_imports: bool,
}

impl Default for DiagnosticSettings {
    fn default() -> Self {
        Self {
            naming: NamingSettings::default(),
            references: true,
            imports: true,
            unused_imports: true,
            field_tags: true,
            duplicates: true,
            discouraged: true,
            max_nesting_depth: 5,
            deprecated: true,
            unused_symbols: false,
            circular_imports: true,
        }
    }
}

/// Complete configuration of the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub diagnostics: DiagnosticSettings,
    pub format: FormatOptions,
    /// Extra roots searched when resolving import paths.
    pub import_paths: Vec<String>,
}

impl Settings {
    /// Build settings from defaults plus a flat JSON object.
    pub fn from_flat_json(value: &Value) -> (Self, Vec<ConfigError>) {
        let mut settings = Self::default();
        let errors = settings.apply_json(value);
        (settings, errors)
    }

    /// Apply the keys present in `value` on top of the current settings.
    ///
    /// Nested objects are accepted and flattened into dotted keys, so
    /// `{"format": {"indentSize": 4}}` is the same as `{"format.indentSize": 4}`.
    pub fn apply_json(&mut self, value: &Value) -> Vec<ConfigError> {
        let Value::Object(map) = value else {
            let error = ConfigError::NotAnObject(json_type(value));
            warn!(%error, "rejected settings");
            return vec![error];
        };
        let mut entries = Vec::new();
        flatten(None, map, &mut entries);

        let mut errors = Vec::new();
        for (key, value) in entries {
            if let Err(error) = self.apply_entry(&key, value) {
                warn!(%error, "rejected setting");
                errors.push(error);
            }
        }
        errors
    }

    fn apply_entry(&mut self, key: &str, value: &Value) -> Result<(), ConfigError> {
        let diagnostics = &mut self.diagnostics;
        match key {
            "diagnostics.naming" => diagnostics.naming.enabled = bool_value(key, value)?,
            "diagnostics.naming.messages" => diagnostics.naming.messages = bool_value(key, value)?,
            "diagnostics.naming.fields" => diagnostics.naming.fields = bool_value(key, value)?,
            "diagnostics.naming.enumValues" => {
                diagnostics.naming.enum_values = bool_value(key, value)?
            }
            "diagnostics.references" => diagnostics.references = bool_value(key, value)?,
            "diagnostics.imports" => diagnostics.imports = bool_value(key, value)?,
            "diagnostics.unusedImports" => diagnostics.unused_imports = bool_value(key, value)?,
            "diagnostics.fieldTags" => diagnostics.field_tags = bool_value(key, value)?,
            "diagnostics.duplicates" => diagnostics.duplicates = bool_value(key, value)?,
            "diagnostics.discouraged" => diagnostics.discouraged = bool_value(key, value)?,
            "diagnostics.maxNestingDepth" => {
                diagnostics.max_nesting_depth = int_value(key, value, 1, i64::from(u16::MAX))? as usize
            }
            "diagnostics.deprecated" => diagnostics.deprecated = bool_value(key, value)?,
            "diagnostics.unusedSymbols" => diagnostics.unused_symbols = bool_value(key, value)?,
            "diagnostics.circularImports" => {
                diagnostics.circular_imports = bool_value(key, value)?
            }
            "format.indentSize" => self.format.tab_size = int_value(key, value, 1, 16)? as usize,
            "format.insertSpaces" => self.format.insert_spaces = bool_value(key, value)?,
            "format.maxBlankLines" => {
                self.format.max_blank_lines = int_value(key, value, 0, i64::from(u16::MAX))? as usize
            }
            "renumber.enabled" => self.format.renumber.enabled = bool_value(key, value)?,
            "renumber.startNumber" => {
                self.format.renumber.start_number = int_value(key, value, 1, MAX_RENUMBER)?
            }
            "renumber.increment" => {
                self.format.renumber.increment = int_value(key, value, 1, MAX_RENUMBER)?
            }
            "importPaths" => self.import_paths = string_list(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn renumber(&self) -> RenumberOptions {
        self.format.renumber
    }
}

const MAX_RENUMBER: i64 = crate::syntax::MAX_FIELD_NUMBER;

fn flatten<'v>(prefix: Option<&str>, map: &'v Map<String, Value>, out: &mut Vec<(String, &'v Value)>) {
    for (key, value) in map {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten(Some(&key), inner, out),
            _ => out.push((key, value)),
        }
    }
}

fn bool_value(key: &str, value: &Value) -> Result<bool, ConfigError> {
    value
        .as_bool()
        .ok_or_else(|| ConfigError::invalid(key, "a boolean", value))
}

fn int_value(key: &str, value: &Value, min: i64, max: i64) -> Result<i64, ConfigError> {
    value
        .as_i64()
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(|| ConfigError::invalid(key, "an integer in range", value))
}

fn string_list(key: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    let invalid = || ConfigError::invalid(key, "an array of strings", value);
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
