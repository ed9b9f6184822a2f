//! Formatting options

/// Formatting options for schema files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Number of spaces per indentation level (or tab width if using tabs)
    pub tab_size: usize,
    /// Use spaces for indentation (false = use tabs)
    pub insert_spaces: bool,
    /// Runs of blank lines longer than this are collapsed
    pub max_blank_lines: usize,
    pub renumber: RenumberOptions,
}

/// Settings for the field-number renumbering pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenumberOptions {
    pub enabled: bool,
    /// First number assigned in a message (enums always start at 0)
    pub start_number: i64,
    pub increment: i64,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            tab_size: 2,
            insert_spaces: true,
            max_blank_lines: 1,
            renumber: RenumberOptions::default(),
        }
    }
}

impl Default for RenumberOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            start_number: 1,
            increment: 1,
        }
    }
}

impl FormatOptions {
    /// Generate indentation string for the given level
    pub fn indent(&self, level: usize) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_size * level)
        } else {
            "\t".repeat(level)
        }
    }

    /// Same options with renumbering switched on.
    pub fn with_renumbering(mut self, start_number: i64, increment: i64) -> Self {
        self.renumber = RenumberOptions {
            enabled: true,
            start_number,
            increment,
        };
        self
    }
}
