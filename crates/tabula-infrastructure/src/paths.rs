//! Unified path management for tabula files.
//!
//! This ensures consistency across all platforms (Linux, macOS, Windows).

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Platform directory could not be determined.
    #[error("Cannot find {0} directory")]
    DirNotFound(&'static str),
}

/// Unified path management for tabula.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/tabula/            # Config directory
/// └── config.toml              # Store policy configuration
///
/// ~/.local/share/tabula/       # Data directory
/// └── store/                   # Blob store, one JSON document per key
///     ├── tab_projects.json
///     ├── session_snapshots.json
///     └── ...
/// ```
pub struct TabulaPaths;

impl TabulaPaths {
    const APP_NAME: &'static str = "tabula";

    /// Returns the tabula configuration directory (e.g., `~/.config/tabula/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_NAME))
            .ok_or(PathError::DirNotFound("config"))
    }

    /// Returns the tabula data directory (e.g., `~/.local/share/tabula/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(Self::APP_NAME))
            .ok_or(PathError::DirNotFound("data"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory holding the blob store documents.
    pub fn store_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store"))
    }
}
