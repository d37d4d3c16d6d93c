//! Template registry: the learner-facing text catalog
//!
//! The catalog is a typed struct with one field per step kind and per
//! transform operation, so a missing kind fails when the catalog is loaded
//! rather than on the first session that reaches it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::clue::{DefinitionPart, IndicatorKind, OperationKind, StepKind};
use crate::error::Span;

use super::lexer;

/// Built-in catalog
const DEFAULT_CATALOG: &str = include_str!("../../assets/templates.toml");

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Placeholder not present in the resolution context
    #[error("unknown placeholder '{{{name}}}'")]
    UnknownPlaceholder {
        name: String,
        template: String,
        span: Span,
    },

    /// A brace that is neither escaped nor part of a placeholder
    #[error("unbalanced brace in template")]
    UnbalancedBrace { template: String, span: Span },

    /// Text varies by a discriminant the step does not carry
    #[error("{field} varies by sub-kind but no discriminant was given")]
    MissingDiscriminant { field: String },

    /// Discriminant value has no entry in a keyed text
    #[error("{field} has no entry for '{value}'")]
    UnmappedDiscriminant { field: String, value: String },

    /// Fragment template lacks a required form
    #[error("{field} is required")]
    MissingField { field: String },

    /// Error reading a catalog file
    #[error("error reading template catalog {path}: {message}")]
    FileReadError { path: PathBuf, message: String },

    /// Error decoding catalog TOML
    #[error("failed to parse template catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TemplateError {
    /// The template body and byte span the error points at, when known
    pub fn source_span(&self) -> Option<(&str, &Span)> {
        match self {
            Self::UnknownPlaceholder { template, span, .. }
            | Self::UnbalancedBrace { template, span } => Some((template.as_str(), span)),
            _ => None,
        }
    }
}

/// Text that is either fixed or keyed by a step's discriminant
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TemplateText {
    Plain(String),
    Keyed(BTreeMap<String, String>),
}

/// The discriminant a step's text may vary by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discriminant {
    Indicator(IndicatorKind),
    Part(DefinitionPart),
}

impl Discriminant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discriminant::Indicator(kind) => kind.as_str(),
            Discriminant::Part(part) => part.as_str(),
        }
    }
}

impl TemplateText {
    /// Pick the body for `discriminant`. Keyed text never falls back silently.
    pub fn select(&self, field: &str, discriminant: Option<Discriminant>) -> Result<&str, TemplateError> {
        match self {
            TemplateText::Plain(text) => Ok(text),
            TemplateText::Keyed(map) => {
                let key = discriminant.ok_or_else(|| TemplateError::MissingDiscriminant {
                    field: field.to_string(),
                })?;
                map.get(key.as_str())
                    .map(String::as_str)
                    .ok_or_else(|| TemplateError::UnmappedDiscriminant {
                        field: field.to_string(),
                        value: key.as_str().to_string(),
                    })
            }
        }
    }

    fn bodies(&self) -> Vec<&str> {
        match self {
            TemplateText::Plain(text) => vec![text],
            TemplateText::Keyed(map) => map.values().map(String::as_str).collect(),
        }
    }
}

/// Texts for one step kind
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepTemplate {
    pub title: TemplateText,
    #[serde(default)]
    pub intro: Option<TemplateText>,
    pub prompt: TemplateText,
    pub hint: TemplateText,
    pub completion: TemplateText,
}

impl StepTemplate {
    fn texts(&self) -> Vec<(&'static str, &TemplateText)> {
        let mut texts = vec![
            ("title", &self.title),
            ("prompt", &self.prompt),
            ("hint", &self.hint),
            ("completion", &self.completion),
        ];
        if let Some(intro) = &self.intro {
            texts.push(("intro", intro));
        }
        texts
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepCatalog {
    pub definition: StepTemplate,
    pub wordplay_choice: StepTemplate,
    pub indicator: StepTemplate,
    pub outer_fragment: StepTemplate,
    pub inner_fragment: StepTemplate,
    pub source_fragment: StepTemplate,
    pub multi_definition: StepTemplate,
    pub abbreviation_scan: StepTemplate,
    pub assembly: StepTemplate,
}

/// Prompts for one transform operation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentTemplate {
    /// Shown while a dependent fragment's inputs are unsolved, and always for independent ones
    pub prompt: String,
    /// Shown once a dependent fragment's inputs are known
    #[serde(default)]
    pub with_inputs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentCatalog {
    pub synonym: FragmentTemplate,
    pub abbreviation: FragmentTemplate,
    pub literal: FragmentTemplate,
    pub reversal: FragmentTemplate,
    pub deletion: FragmentTemplate,
    pub anagram: FragmentTemplate,
    pub container: FragmentTemplate,
    pub letter_selection: FragmentTemplate,
    pub homophone: FragmentTemplate,
    pub substitution: FragmentTemplate,
}

/// Symbols used by breakdown notation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotationStyle {
    #[serde(default = "default_arrow")]
    pub arrow: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_arrow() -> String {
    " → ".to_string()
}

fn default_separator() -> String {
    " + ".to_string()
}

impl Default for NotationStyle {
    fn default() -> Self {
        Self {
            arrow: default_arrow(),
            separator: default_separator(),
        }
    }
}

/// Registry for learner-facing text, constructed once and passed in
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateRegistry {
    pub steps: StepCatalog,
    pub fragments: FragmentCatalog,
    #[serde(default)]
    pub notation: NotationStyle,
}

impl TemplateRegistry {
    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|e| TemplateError::FileReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Load a catalog from a TOML string and check it is complete
    pub fn from_toml(content: &str) -> Result<Self, TemplateError> {
        let registry: TemplateRegistry = toml::from_str(content)?;
        registry.check()?;
        Ok(registry)
    }

    /// Texts for a step kind
    pub fn step(&self, kind: StepKind) -> &StepTemplate {
        let steps = &self.steps;
        match kind {
            StepKind::Definition => &steps.definition,
            StepKind::WordplayChoice => &steps.wordplay_choice,
            StepKind::Indicator => &steps.indicator,
            StepKind::OuterFragment => &steps.outer_fragment,
            StepKind::InnerFragment => &steps.inner_fragment,
            StepKind::SourceFragment => &steps.source_fragment,
            StepKind::MultiDefinition => &steps.multi_definition,
            StepKind::AbbreviationScan => &steps.abbreviation_scan,
            StepKind::Assembly => &steps.assembly,
        }
    }

    /// Prompts for a transform operation
    pub fn fragment(&self, operation: OperationKind) -> &FragmentTemplate {
        let f = &self.fragments;
        match operation {
            OperationKind::Synonym => &f.synonym,
            OperationKind::Abbreviation => &f.abbreviation,
            OperationKind::Literal => &f.literal,
            OperationKind::Reversal => &f.reversal,
            OperationKind::Deletion => &f.deletion,
            OperationKind::Anagram => &f.anagram,
            OperationKind::Container => &f.container,
            OperationKind::LetterSelection => &f.letter_selection,
            OperationKind::Homophone => &f.homophone,
            OperationKind::Substitution => &f.substitution,
        }
    }

    /// Verify keyed texts cover their closed sets and every body lexes.
    fn check(&self) -> Result<(), TemplateError> {
        let step_kinds = [
            StepKind::Definition,
            StepKind::WordplayChoice,
            StepKind::Indicator,
            StepKind::OuterFragment,
            StepKind::InnerFragment,
            StepKind::SourceFragment,
            StepKind::MultiDefinition,
            StepKind::AbbreviationScan,
            StepKind::Assembly,
        ];
        let indicator_keys: Vec<&str> = IndicatorKind::ALL.iter().map(|k| k.as_str()).collect();
        let part_keys: Vec<&str> = DefinitionPart::ALL.iter().map(|p| p.as_str()).collect();

        for kind in step_kinds {
            let required: &[&str] = match kind {
                StepKind::Indicator => &indicator_keys,
                StepKind::MultiDefinition => &part_keys,
                _ => &[],
            };
            for (field, text) in self.step(kind).texts() {
                let field = format!("steps.{}.{}", kind, field);
                if let TemplateText::Keyed(map) = text {
                    if required.is_empty() {
                        return Err(TemplateError::MissingDiscriminant { field });
                    }
                    if let Some(missing) = required.iter().find(|k| !map.contains_key(**k)) {
                        return Err(TemplateError::UnmappedDiscriminant {
                            field,
                            value: missing.to_string(),
                        });
                    }
                }
                for body in text.bodies() {
                    lexer::segments(body)?;
                }
            }
        }

        for operation in OPERATIONS {
            let template = self.fragment(operation);
            lexer::segments(&template.prompt)?;
            match (&template.with_inputs, operation.is_dependent()) {
                (Some(body), _) => {
                    lexer::segments(body)?;
                }
                (None, true) => {
                    return Err(TemplateError::MissingField {
                        field: format!("fragments.{}.with_inputs", operation),
                    })
                }
                (None, false) => {}
            }
        }
        Ok(())
    }
}

const OPERATIONS: [OperationKind; 10] = [
    OperationKind::Synonym,
    OperationKind::Abbreviation,
    OperationKind::Literal,
    OperationKind::Reversal,
    OperationKind::Deletion,
    OperationKind::Anagram,
    OperationKind::Container,
    OperationKind::LetterSelection,
    OperationKind::Homophone,
    OperationKind::Substitution,
];

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::from_toml(DEFAULT_CATALOG).expect("Default template catalog should be valid")
    }
}
