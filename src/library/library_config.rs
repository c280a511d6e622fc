//! Where a module library lives on disk.
//!
//! # Examples
//!
//! ```
//! use sword::library::LibraryConfig;
//!
//! let config: LibraryConfig = serde_json::from_str(r#"{
//!     "bible_dirs": ["/usr/share/sword/bibles"],
//!     "recursive": true
//! }"#)?;
//! assert!(config.dictionary_dirs.is_empty());
//! assert_eq!(config.file_pattern, r"(?i)\.zip$");
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::readers::ModuleType;
use crate::Result;

/// Archive name pattern used when none is configured.
pub const DEFAULT_FILE_PATTERN: &str = r"(?i)\.zip$";

/// Configuration for scanning a module library.
///
/// Missing fields take their default, so a JSON file only lists what it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directories holding bible and commentary archives
    pub bible_dirs: Vec<PathBuf>,
    /// Directories holding dictionary archives
    pub dictionary_dirs: Vec<PathBuf>,
    /// Directories holding morphology archives
    pub morphology_dirs: Vec<PathBuf>,
    /// Whether to descend into subdirectories
    pub recursive: bool,
    /// Regex matched against archive file names
    pub file_pattern: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            bible_dirs: Vec::new(),
            dictionary_dirs: Vec::new(),
            morphology_dirs: Vec::new(),
            recursive: false,
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
        }
    }
}

impl LibraryConfig {
    /// Reads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Compiled [`LibraryConfig::file_pattern`].
    pub fn file_regex(&self) -> Result<Regex> {
        Ok(Regex::new(&self.file_pattern)?)
    }

    /// Every configured directory with the type of module it holds.
    pub fn dirs(&self) -> Vec<(&Path, ModuleType)> {
        let typed = [
            (&self.bible_dirs, ModuleType::Bible),
            (&self.dictionary_dirs, ModuleType::Dictionary),
            (&self.morphology_dirs, ModuleType::Morphology),
        ];
        typed
            .into_iter()
            .flat_map(|(dirs, module_type)| dirs.iter().map(move |dir| (dir.as_path(), module_type)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SwordError;

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        let config = LibraryConfig {
            bible_dirs: vec!["bibles".into()],
            morphology_dirs: vec!["morph".into()],
            recursive: true,
            ..Default::default()
        };
        config.save_json_file(&path).unwrap();
        let loaded = LibraryConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);

        let dirs = loaded.dirs();
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[1], (Path::new("morph"), ModuleType::Morphology));
    }

    #[test]
    fn test_bad_pattern_and_bad_json() {
        let config = LibraryConfig { file_pattern: "(".into(), ..Default::default() };
        assert!(matches!(config.file_regex(), Err(SwordError::ParserError { .. })));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, b"{\"recursive\": \"yes\"}").unwrap();
        assert!(matches!(LibraryConfig::from_json_file(&path), Err(SwordError::ParserError { .. })));
    }
}
