//! Clue repositories: where pre-authored clue definitions come from

use std::path::PathBuf;

use super::{ClueDefinition, ClueLoadError};

/// Supplies one fully formed clue definition per lookup key
pub trait ClueSource {
    fn load(&self, key: &str) -> Result<ClueDefinition, ClueLoadError>;
}

/// Reads `<root>/<key>.toml`
#[derive(Debug, Clone)]
pub struct DirectoryClueSource {
    root: PathBuf,
}

impl DirectoryClueSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to its file path
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.toml", key))
    }
}

impl ClueSource for DirectoryClueSource {
    fn load(&self, key: &str) -> Result<ClueDefinition, ClueLoadError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(ClueLoadError::NotFound {
                key: key.to_string(),
            });
        }
        let mut clue = ClueDefinition::from_file(&path)?;
        if clue.id.is_empty() {
            clue.id = key.to_string();
        }
        Ok(clue)
    }
}
