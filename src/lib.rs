//! Cryptic Tutor - a step-by-step tutoring engine for cryptic crossword clues
//!
//! A clue is authored as TOML: its words, answer, enumeration and an ordered
//! list of teaching steps ending in an assembly of word fragments. The engine
//! validates the annotation, then walks a learner through the steps one
//! submission at a time, rendering a [`Snapshot`] after every action.
//!
//! # Example
//!
//! ```rust
//! use cryptic_tutor::{ClueDefinition, Submission, Tutor};
//!
//! let clue = ClueDefinition::from_toml(r#"
//!     id = "visit"
//!     words = ["Come", "by", "five", "do", "you", "mean"]
//!     answer = "VISIT"
//!     enumeration = "5"
//!
//!     [[steps]]
//!     kind = "definition"
//!     indices = [0, 1]
//!
//!     [[steps]]
//!     kind = "assembly"
//!     result = "VISIT"
//!
//!     [[steps.transforms]]
//!     role = "first part"
//!     operation = "abbreviation"
//!     indices = [2]
//!     result = "V"
//!     hint = "Roman numeral"
//!
//!     [[steps.transforms]]
//!     role = "second part"
//!     operation = "synonym"
//!     indices = [3, 4, 5]
//!     result = "ISIT"
//!     hint = "A question"
//! "#).unwrap();
//!
//! let tutor = Tutor::default();
//! let (mut session, _) = tutor.start(clue).unwrap();
//! assert!(tutor.submit(&mut session, Submission::Indices(vec![0, 1])).unwrap().accepted);
//! tutor.submit_fragment(&mut session, 0, "V").unwrap();
//! let outcome = tutor.submit_fragment(&mut session, 1, "ISIT").unwrap();
//! assert!(outcome.snapshot.answer_locked);
//! ```

pub mod assembly;
pub mod clue;
pub mod config;
pub mod error;
pub mod letters;
pub mod logging;
pub mod session;
pub mod template;
pub mod validate;

pub use clue::{ClueDefinition, ClueLoadError, ClueSource, DirectoryClueSource, Enumeration, StepSpec, TransformSpec};
pub use config::TutorConfig;
pub use error::TutorError;
pub use session::{Outcome, Session, Snapshot, Submission, Tutor, UiAction};
pub use template::{TemplateError, TemplateRegistry};
pub use validate::{AbbreviationTable, ValidationReport};

/// Parse a clue from TOML and validate it with the built-in abbreviation table
///
/// # Example
///
/// ```rust
/// use cryptic_tutor::validate_source;
///
/// let report = validate_source(r#"
///     words = ["Broken", "tiles"]
///     answer = "ISLET"
///     enumeration = "5"
/// "#).unwrap();
///
/// assert!(report.has_errors());
/// ```
pub fn validate_source(source: &str) -> Result<ValidationReport, TutorError> {
    validate_source_with_config(source, &TutorConfig::default())
}

/// Parse a clue from TOML and validate it with a custom configuration
pub fn validate_source_with_config(source: &str, config: &TutorConfig) -> Result<ValidationReport, TutorError> {
    let clue = ClueDefinition::from_toml(source)?;
    Ok(validate::validate(&clue, &config.abbreviations))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISLET: &str = r#"
        id = "islet"
        words = ["Tiles", "broken", "on", "small", "island"]
        answer = "ISLET"
        enumeration = "5"

        [[steps]]
        kind = "definition"
        indices = [3, 4]

        [[steps]]
        kind = "indicator"
        indices = [1]
        indicator_kind = "anagram"

        [[steps]]
        kind = "assembly"
        result = "ISLET"

        [[steps.transforms]]
        role = "fodder"
        operation = "literal"
        indices = [0]
        result = "TILES"
        hint = "Take the word as written"

        [[steps.transforms]]
        role = "anagram"
        operation = "anagram"
        indices = [1]
        result = "ISLET"
        hint = "Rearrange the letters"
    "#;

    #[test]
    fn test_validate_source_clean() {
        let report = validate_source(ISLET).unwrap();
        assert!(!report.has_errors(), "{:?}", report.errors());
    }

    #[test]
    fn test_validate_source_bad_toml() {
        let err = validate_source("words = 3").unwrap_err();
        assert!(matches!(err, TutorError::Clue(_)));
    }

    #[test]
    fn test_validate_source_corrupted_anagram() {
        let corrupted = ISLET.replace("result = \"ISLET\"\n        hint", "result = \"ISLES\"\n        hint");
        let report = validate_source(&corrupted).unwrap();
        assert!(report.has_errors());
    }

    #[test]
    fn test_full_walkthrough() {
        let tutor = Tutor::default();
        let clue = ClueDefinition::from_toml(ISLET).unwrap();
        let (mut session, _) = tutor.start(clue).unwrap();
        assert!(tutor.submit(&mut session, Submission::Indices(vec![3, 4])).unwrap().accepted);
        assert!(tutor.submit(&mut session, Submission::Indices(vec![1])).unwrap().accepted);
        let outcome = tutor.submit_fragment(&mut session, 1, "islet").unwrap();
        assert!(outcome.accepted);
        assert!(outcome.snapshot.complete);
        assert_eq!(session.assembly.solved.get(&0).map(String::as_str), Some("TILES"));
    }
}
