use std::path::{Path, PathBuf};

use maskmap_mapping::{DirStore, StoreError};
use thiserror::Error;

use crate::settings::{LocalSettings, SettingsError};

const HOME_ENV: &str = "MASKMAP_HOME";
const DEFAULT_WORKSPACE_PATH: &str = ".config/maskmap";
const SETTINGS_FILE_NAME: &str = "config.yaml";
const MAPPING_DIR_NAME: &str = "mapping";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),
    #[error("path is not a directory: {0}")]
    PathIsNotDirectory(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The directory holding local settings and the mapping profiles.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: Option<&Path>) -> Result<Self, WorkspaceError> {
        let path = {
            if let Some(path) = path {
                path.to_owned()
            } else {
                Self::default_path()?
            }
        };

        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        } else if !path.is_dir() {
            return Err(WorkspaceError::PathIsNotDirectory(
                path.display().to_string(),
            ));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings_path(&self) -> PathBuf {
        self.path.join(SETTINGS_FILE_NAME)
    }

    pub fn mapping_dir(&self) -> PathBuf {
        self.path.join(MAPPING_DIR_NAME)
    }

    pub fn store(&self) -> Result<DirStore, WorkspaceError> {
        Ok(DirStore::new(self.mapping_dir())?)
    }

    pub fn load_settings(&self) -> Result<LocalSettings, WorkspaceError> {
        Ok(LocalSettings::load(&self.settings_path())?)
    }

    pub fn save_settings(&self, settings: &LocalSettings) -> Result<(), WorkspaceError> {
        Ok(settings.save(&self.settings_path())?)
    }

    /// `$MASKMAP_HOME`, or `~/.config/maskmap`.
    pub fn default_path() -> Result<PathBuf, WorkspaceError> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(home));
        }
        let path = std::env::var("HOME")
            .map(PathBuf::from)
            .map(|p| p.join(DEFAULT_WORKSPACE_PATH))
            .map_err(|_| WorkspaceError::EnvVarNotSet("HOME".to_string()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(Some(&dir.path().join("ws"))).unwrap();
        assert!(ws.path().is_dir());
        assert_eq!(ws.mapping_dir(), dir.path().join("ws").join("mapping"));
        ws.store().unwrap();
        assert!(ws.mapping_dir().is_dir());
    }

    #[test]
    fn rejects_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(
            Workspace::new(Some(&file)),
            Err(WorkspaceError::PathIsNotDirectory(_))
        ));
    }
}
