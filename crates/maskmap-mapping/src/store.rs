use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parse::{parse_mapping_config, to_json};
use crate::{MappingConfig, ProfileError};

const PROFILE_EXTENSION: &str = ".json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file name is not safe: {0}")]
    UnsafeName(String),
    #[error("mapping profile not found: {0}")]
    NotFound(String),
    #[error("path is not a directory: {0}")]
    NotDirectory(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Persistence for named mapping profiles.
pub trait ProfileStore {
    /// Profile file names, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;
    fn load(&self, name: &str) -> Result<MappingConfig, StoreError>;
    /// Write the whole profile. The last writer wins.
    fn save(&self, name: &str, config: &MappingConfig) -> Result<(), StoreError>;
}

/// A file name that stays inside its directory and is not hidden.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && !name.contains(['/', '\\', ':'])
        && !name.chars().any(char::is_control)
}

/// Normalize a profile name to its file name, adding `.json` when absent.
pub fn profile_file_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if !is_safe_file_name(name) {
        return Err(StoreError::UnsafeName(name.to_string()));
    }
    if name.ends_with(PROFILE_EXTENSION) {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}{PROFILE_EXTENSION}"))
    }
}

/// Profiles stored as pretty JSON files in one directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store, creating the directory when missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)?;
        } else if !root.is_dir() {
            return Err(StoreError::NotDirectory(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn profile_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(profile_file_name(name)?))
    }

    pub fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.profile_path(name)?.is_file())
    }
}

impl ProfileStore for DirStore {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if name.ends_with(PROFILE_EXTENSION) && is_safe_file_name(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<MappingConfig, StoreError> {
        let path = self.profile_path(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(parse_mapping_config(&content)?)
    }

    fn save(&self, name: &str, config: &MappingConfig) -> Result<(), StoreError> {
        let path = self.profile_path(name)?;
        let json = to_json(config)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_mapping_config;

    #[test]
    fn rejects_unsafe_names() {
        for name in ["", "../x.json", "a/b.json", ".hidden.json", "a\\b", "c:d"] {
            assert!(!is_safe_file_name(name), "{name:?}");
        }
        assert!(is_safe_file_name("default.json"));
        assert!(matches!(
            profile_file_name("../etc/passwd"),
            Err(StoreError::UnsafeName(_))
        ));
        assert_eq!(profile_file_name("game").unwrap(), "game.json");
        assert_eq!(profile_file_name("game.json").unwrap(), "game.json");
    }

    #[test]
    fn save_list_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path().join("mapping")).unwrap();
        let config = default_mapping_config();

        store.save("b", &config).unwrap();
        store.save("a.json", &config).unwrap();
        fs::write(store.path().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list().unwrap(), ["a.json", "b.json"]);
        assert_eq!(store.load("b").unwrap(), config);
    }

    #[test]
    fn missing_profile_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path()).unwrap();
        assert!(matches!(store.load("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn broken_profile_is_a_profile_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirStore::new(dir.path()).unwrap();
        fs::write(dir.path().join("bad.json"), "{").unwrap();
        assert!(matches!(store.load("bad"), Err(StoreError::Profile(_))));
    }
}
