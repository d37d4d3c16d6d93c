//! Configuration for the tutoring engine

use crate::template::TemplateRegistry;
use crate::validate::AbbreviationTable;

/// Everything a tutor needs besides the clue itself, built once and passed in
#[derive(Debug, Clone, Default)]
pub struct TutorConfig {
    /// Learner-facing text catalog
    pub templates: TemplateRegistry,
    /// Curated abbreviation lookup used by the validator
    pub abbreviations: AbbreviationTable,
    /// Treat validator warnings as errors when starting a session
    pub strict_warnings: bool,
}

impl TutorConfig {
    /// Create a new configuration with the built-in catalogs
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template catalog
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Set the abbreviation table
    pub fn with_abbreviations(mut self, abbreviations: AbbreviationTable) -> Self {
        self.abbreviations = abbreviations;
        self
    }

    /// Enable or disable strict warnings
    pub fn with_strict_warnings(mut self, strict: bool) -> Self {
        self.strict_warnings = strict;
        self
    }
}
