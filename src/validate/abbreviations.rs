//! Curated abbreviation lookup used to sanity-check `abbreviation` transforms

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_TABLE: &str = include_str!("../../assets/abbreviations.toml");

/// Errors that can occur when loading an abbreviation table
#[derive(Error, Debug)]
pub enum AbbreviationError {
    #[error("Failed to read abbreviation file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse abbreviation TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Word (lowercase) -> accepted abbreviations (uppercase)
#[derive(Debug, Clone, PartialEq)]
pub struct AbbreviationTable {
    entries: HashMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct TomlTable {
    abbreviations: HashMap<String, Vec<String>>,
}

impl AbbreviationTable {
    /// Load a table from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, AbbreviationError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a table from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, AbbreviationError> {
        let parsed: TomlTable = toml::from_str(content)?;
        let entries = parsed
            .abbreviations
            .into_iter()
            .map(|(word, abbrevs)| {
                (
                    word.to_lowercase(),
                    abbrevs.iter().map(|a| crate::letters::clean(a)).collect(),
                )
            })
            .collect();
        Ok(Self { entries })
    }

    /// Merge another table's entries into this one
    pub fn extend(&mut self, other: AbbreviationTable) {
        for (word, abbrevs) in other.entries {
            let slot = self.entries.entry(word).or_default();
            for a in abbrevs {
                if !slot.contains(&a) {
                    slot.push(a);
                }
            }
        }
    }

    /// Accepted abbreviations for a word or phrase
    pub fn lookup(&self, source: &str) -> Option<&[String]> {
        self.entries
            .get(&normalise_source(source))
            .map(Vec::as_slice)
    }

    /// Whether `letters` is a known abbreviation of `source`
    pub fn accepts(&self, source: &str, letters: &str) -> bool {
        let letters = crate::letters::clean(letters);
        self.lookup(source)
            .is_some_and(|known| known.iter().any(|k| *k == letters))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalise_source(source: &str) -> String {
    source
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        Self::from_toml(DEFAULT_TABLE).expect("Default abbreviation table should be valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = AbbreviationTable::default();
        assert!(!table.is_empty());
        assert!(table.accepts("five", "V"));
        assert!(table.accepts("Right,", "r"));
        assert!(!table.accepts("five", "X"));
        assert!(!table.accepts("unheard-of", "U"));
    }

    #[test]
    fn test_extend_merges() {
        let mut table = AbbreviationTable::default();
        let extra = AbbreviationTable::from_toml(
            r#"
[abbreviations]
five = ["FIV"]
spades = ["S"]
"#,
        )
        .expect("Should parse");
        table.extend(extra);
        assert!(table.accepts("five", "V"));
        assert!(table.accepts("five", "FIV"));
        assert!(table.accepts("spades", "S"));
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(AbbreviationTable::from_toml("abbreviations = 3").is_err());
    }
}
