//! Unified path management for FitRoom files.
//!
//! Everything FitRoom writes lives under one per-user data directory:
//!
//! ```text
//! ~/.local/share/fitroom/      # data directory (platform equivalent)
//! ├── secret.json              # API key
//! ├── wardrobe.toml            # optional user wardrobe extension
//! └── exports/                 # rendered outfit images
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Centralized path resolution for FitRoom.
///
/// A base override replaces the platform data directory, used by tests and
/// the `--data-dir` flag.
#[derive(Debug, Clone, Default)]
pub struct FitroomPaths {
    base: Option<PathBuf>,
}

impl FitroomPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the FitRoom data directory.
    ///
    /// Uses the platform data dir (`~/.local/share/fitroom` on Linux)
    /// unless a base override was given.
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("fitroom"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Path to the API key file.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("secret.json"))
    }

    /// Path to the optional wardrobe extension file.
    pub fn wardrobe_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("wardrobe.toml"))
    }

    /// Directory rendered outfit images are exported into.
    pub fn export_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("exports"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = FitroomPaths::new(Some(PathBuf::from("/tmp/fitroom-test")));
        assert_eq!(paths.data_dir().unwrap(), PathBuf::from("/tmp/fitroom-test"));
        assert_eq!(
            paths.secret_file().unwrap(),
            PathBuf::from("/tmp/fitroom-test/secret.json")
        );
        assert_eq!(
            paths.wardrobe_file().unwrap(),
            PathBuf::from("/tmp/fitroom-test/wardrobe.toml")
        );
        assert_eq!(
            paths.export_dir().unwrap(),
            PathBuf::from("/tmp/fitroom-test/exports")
        );
    }
}
