//! Clue definitions: the immutable, pre-authored input to a tutoring session
//!
//! A clue is authored as TOML:
//!
//! ```toml
//! id = "visit"
//! words = ["Come", "by", "five", "do", "you", "mean"]
//! answer = "VISIT"
//! enumeration = "5"
//! category = "charade"
//!
//! [[steps]]
//! kind = "definition"
//! indices = [0, 1]
//!
//! [[steps]]
//! kind = "assembly"
//! result = "VISIT"
//!
//! [[steps.transforms]]
//! role = "first part"
//! operation = "abbreviation"
//! indices = [2]
//! result = "V"
//! hint = "Roman numeral"
//! ```

pub mod enumeration;
pub mod source;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use enumeration::{Enumeration, EnumerationError};
pub use source::{ClueSource, DirectoryClueSource};

/// Errors that can occur when loading a clue definition
#[derive(Debug, Error)]
pub enum ClueLoadError {
    #[error("failed to read clue file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse clue TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("no clue found for key '{key}'")]
    NotFound { key: String },
}

/// A fully authored clue: words, answer, and the ordered teaching steps
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClueDefinition {
    #[serde(default)]
    pub id: String,
    pub words: Vec<String>,
    pub answer: String,
    pub enumeration: String,
    #[serde(default)]
    pub category: String,
    /// The clue has no decodable wordplay (e.g. a cryptic definition)
    #[serde(default)]
    pub no_wordplay: bool,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl ClueDefinition {
    /// Load a clue from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ClueLoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a clue from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ClueLoadError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse the enumeration string
    pub fn parsed_enumeration(&self) -> Result<Enumeration, EnumerationError> {
        Enumeration::parse(&self.enumeration)
    }

    /// Answer letters, uppercase, without spaces or hyphens
    pub fn clean_answer(&self) -> String {
        crate::letters::clean(&self.answer)
    }

    /// The clue words at `indices`, joined by spaces. Out-of-range indices are skipped.
    pub fn words_at(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .filter_map(|&i| self.words.get(i))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The full clue text
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// Position of the first assembly step, if any
    pub fn assembly_position(&self) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| matches!(s, StepSpec::Assembly { .. }))
    }
}

/// One teaching step. Every case carries only the fields it needs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    Definition {
        #[serde(default)]
        indices: Vec<usize>,
    },
    WordplayChoice {
        #[serde(default)]
        options: Vec<String>,
        #[serde(default)]
        expected: String,
    },
    Indicator {
        #[serde(default)]
        indices: Vec<usize>,
        indicator_kind: Option<IndicatorKind>,
    },
    OuterFragment {
        #[serde(default)]
        indices: Vec<usize>,
    },
    InnerFragment {
        #[serde(default)]
        indices: Vec<usize>,
    },
    SourceFragment {
        #[serde(default)]
        indices: Vec<usize>,
    },
    MultiDefinition {
        #[serde(default)]
        indices: Vec<usize>,
        definition_part: Option<DefinitionPart>,
    },
    AbbreviationScan {
        #[serde(default)]
        indices: Vec<usize>,
    },
    Assembly {
        #[serde(default)]
        transforms: Vec<TransformSpec>,
        #[serde(default)]
        result: String,
    },
}

impl StepSpec {
    pub fn kind(&self) -> StepKind {
        match self {
            StepSpec::Definition { .. } => StepKind::Definition,
            StepSpec::WordplayChoice { .. } => StepKind::WordplayChoice,
            StepSpec::Indicator { .. } => StepKind::Indicator,
            StepSpec::OuterFragment { .. } => StepKind::OuterFragment,
            StepSpec::InnerFragment { .. } => StepKind::InnerFragment,
            StepSpec::SourceFragment { .. } => StepKind::SourceFragment,
            StepSpec::MultiDefinition { .. } => StepKind::MultiDefinition,
            StepSpec::AbbreviationScan { .. } => StepKind::AbbreviationScan,
            StepSpec::Assembly { .. } => StepKind::Assembly,
        }
    }

    /// Word indices for selection steps; `None` for choice and assembly steps
    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            StepSpec::Definition { indices }
            | StepSpec::Indicator { indices, .. }
            | StepSpec::OuterFragment { indices }
            | StepSpec::InnerFragment { indices }
            | StepSpec::SourceFragment { indices }
            | StepSpec::MultiDefinition { indices, .. }
            | StepSpec::AbbreviationScan { indices } => Some(indices),
            StepSpec::WordplayChoice { .. } | StepSpec::Assembly { .. } => None,
        }
    }

    /// How the learner answers this step
    pub fn input_mode(&self) -> InputMode {
        match self {
            StepSpec::WordplayChoice { .. } => InputMode::Choice,
            StepSpec::Assembly { .. } => InputMode::Letters,
            _ => InputMode::Selection,
        }
    }
}

/// Tag-only view of [`StepSpec`], used for display and template lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Definition,
    WordplayChoice,
    Indicator,
    OuterFragment,
    InnerFragment,
    SourceFragment,
    MultiDefinition,
    AbbreviationScan,
    Assembly,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Definition => "definition",
            StepKind::WordplayChoice => "wordplay_choice",
            StepKind::Indicator => "indicator",
            StepKind::OuterFragment => "outer_fragment",
            StepKind::InnerFragment => "inner_fragment",
            StepKind::SourceFragment => "source_fragment",
            StepKind::MultiDefinition => "multi_definition",
            StepKind::AbbreviationScan => "abbreviation_scan",
            StepKind::Assembly => "assembly",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The comparison rule a step's answer is checked with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Set equality over word indices
    Selection,
    /// Case-insensitive option text
    Choice,
    /// Letter-normalised typed text
    Letters,
}

/// Sub-kind of an indicator step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Anagram,
    Reversal,
    Deletion,
    Container,
    Insertion,
    Hidden,
    Homophone,
    Substitution,
    LetterSelection,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 9] = [
        IndicatorKind::Anagram,
        IndicatorKind::Reversal,
        IndicatorKind::Deletion,
        IndicatorKind::Container,
        IndicatorKind::Insertion,
        IndicatorKind::Hidden,
        IndicatorKind::Homophone,
        IndicatorKind::Substitution,
        IndicatorKind::LetterSelection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Anagram => "anagram",
            IndicatorKind::Reversal => "reversal",
            IndicatorKind::Deletion => "deletion",
            IndicatorKind::Container => "container",
            IndicatorKind::Insertion => "insertion",
            IndicatorKind::Hidden => "hidden",
            IndicatorKind::Homophone => "homophone",
            IndicatorKind::Substitution => "substitution",
            IndicatorKind::LetterSelection => "letter_selection",
        }
    }

    /// Whether an indicator of this kind licenses a transform of `op`.
    ///
    /// A hidden-word indicator also licenses a reversal (reversed hidden words).
    pub fn licenses(&self, op: OperationKind) -> bool {
        use IndicatorKind as I;
        use OperationKind as O;
        matches!(
            (self, op),
            (I::Anagram, O::Anagram)
                | (I::Reversal, O::Reversal)
                | (I::Hidden, O::Reversal)
                | (I::Deletion, O::Deletion)
                | (I::Container, O::Container)
                | (I::Insertion, O::Container)
                | (I::Homophone, O::Homophone)
                | (I::Substitution, O::Substitution)
                | (I::Hidden, O::LetterSelection)
                | (I::LetterSelection, O::LetterSelection)
        )
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal of one part of a multi-part definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionPart {
    First,
    Second,
    Third,
}

impl DefinitionPart {
    pub const ALL: [DefinitionPart; 3] = [
        DefinitionPart::First,
        DefinitionPart::Second,
        DefinitionPart::Third,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionPart::First => "first",
            DefinitionPart::Second => "second",
            DefinitionPart::Third => "third",
        }
    }
}

impl fmt::Display for DefinitionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One letter-producing operation inside an assembly step
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransformSpec {
    /// Free-text role, display only ("outer", "inner", "first part" ...)
    #[serde(default)]
    pub role: String,
    pub operation: OperationKind,
    /// Source word indices into the clue
    #[serde(default)]
    pub indices: Vec<usize>,
    /// Canonical result letters
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub hint: String,
}

impl TransformSpec {
    /// Cleaned result letters
    pub fn letters(&self) -> String {
        crate::letters::clean(&self.result)
    }

    pub fn letter_count(&self) -> usize {
        crate::letters::count(&self.result)
    }

    pub fn is_dependent(&self) -> bool {
        self.operation.is_dependent()
    }

    /// Whether `role` appears as a whole word of this transform's role
    pub fn has_role(&self, role: &str) -> bool {
        self.role
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.eq_ignore_ascii_case(role))
    }
}

/// The letter manipulation a transform performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Synonym,
    Abbreviation,
    Literal,
    Reversal,
    Deletion,
    Anagram,
    Container,
    LetterSelection,
    Homophone,
    Substitution,
}

impl OperationKind {
    /// Dependent operations act on earlier fragments rather than clue words
    pub fn is_dependent(&self) -> bool {
        matches!(
            self,
            OperationKind::Reversal
                | OperationKind::Deletion
                | OperationKind::Anagram
                | OperationKind::Container
                | OperationKind::Homophone
                | OperationKind::Substitution
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Synonym => "synonym",
            OperationKind::Abbreviation => "abbreviation",
            OperationKind::Literal => "literal",
            OperationKind::Reversal => "reversal",
            OperationKind::Deletion => "deletion",
            OperationKind::Anagram => "anagram",
            OperationKind::Container => "container",
            OperationKind::LetterSelection => "letter_selection",
            OperationKind::Homophone => "homophone",
            OperationKind::Substitution => "substitution",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUE: &str = r#"
        id = "visit"
        words = ["Come", "by", "five", "do", "you", "mean"]
        answer = "VISIT"
        enumeration = "5"
        category = "charade"

        [[steps]]
        kind = "definition"
        indices = [0, 1]

        [[steps]]
        kind = "indicator"
        indices = [3]
        indicator_kind = "reversal"

        [[steps]]
        kind = "assembly"
        result = "VISIT"

        [[steps.transforms]]
        role = "first part"
        operation = "abbreviation"
        indices = [2]
        result = "V"
        hint = "Roman numeral"
    "#;

    #[test]
    fn test_parse_clue_toml() {
        let clue = ClueDefinition::from_toml(CLUE).expect("Should parse");
        assert_eq!(clue.id, "visit");
        assert_eq!(clue.steps.len(), 3);
        assert_eq!(clue.steps[0].kind(), StepKind::Definition);
        assert_eq!(clue.words_at(&[0, 1]), "Come by");
        assert_eq!(clue.assembly_position(), Some(2));
        match &clue.steps[1] {
            StepSpec::Indicator { indicator_kind, .. } => {
                assert_eq!(*indicator_kind, Some(IndicatorKind::Reversal))
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_unknown_step_kind_rejected() {
        let bad = CLUE.replace("kind = \"definition\"", "kind = \"cryptic\"");
        assert!(matches!(
            ClueDefinition::from_toml(&bad),
            Err(ClueLoadError::Toml(_))
        ));
    }

    #[test]
    fn test_dependent_operations() {
        assert!(OperationKind::Reversal.is_dependent());
        assert!(OperationKind::Homophone.is_dependent());
        assert!(!OperationKind::Synonym.is_dependent());
        assert!(!OperationKind::LetterSelection.is_dependent());
    }

    #[test]
    fn test_hidden_indicator_licenses_reversal() {
        assert!(IndicatorKind::Hidden.licenses(OperationKind::Reversal));
        assert!(IndicatorKind::Insertion.licenses(OperationKind::Container));
        assert!(!IndicatorKind::Anagram.licenses(OperationKind::Reversal));
    }

    #[test]
    fn test_role_matches_whole_words() {
        let transform = |role: &str| TransformSpec {
            role: role.to_string(),
            operation: OperationKind::Synonym,
            indices: vec![0],
            result: "DIPS".to_string(),
            hint: String::new(),
        };
        assert!(transform("Outer part").has_role("outer"));
        assert!(transform("outer-source").has_role("outer"));
        assert!(!transform("router").has_role("outer"));
        assert!(!transform("beginner").has_role("inner"));
    }
}
