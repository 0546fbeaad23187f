//! Filesystem profile store
//!
//! Profiles are bincode files laid out as
//! `<root>/<Category>/<name>_<version>.libv`.

use super::{ProfileStore, PROFILE_EXTENSION};
use crate::error::StorageError;
use crate::profile::{LibProfile, LibraryDescription};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Bumped whenever the persisted layout of [`LibProfile`] changes
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct ProfileEnvelope {
    format_version: u32,
    profile: LibProfile,
}

pub struct FsProfileStore {
    root: PathBuf,
}

impl FsProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProfileStore for FsProfileStore {
    fn list(&self) -> Result<Vec<PathBuf>, StorageError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        if !self.root.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "Profile directory {} is not a directory",
                self.root.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(
                        "Failed to read directory entry in {}: {}",
                        self.root.display(),
                        e
                    );
                    continue;
                }
            };
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension() == Some(std::ffi::OsStr::new(PROFILE_EXTENSION))
            {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn path_for(&self, description: &LibraryDescription) -> PathBuf {
        self.root
            .join(description.category.name())
            .join(format!("{}.{}", description.file_stem(), PROFILE_EXTENSION))
    }

    fn save(&self, profile: &LibProfile) -> Result<PathBuf, StorageError> {
        if profile.hash_trees.is_empty() || profile.hash_trees.iter().any(|t| t.is_empty()) {
            return Err(StorageError::Serialization(format!(
                "Refusing to store profile {} with empty hash trees",
                profile.description
            )));
        }

        let path = self.path_for(&profile.description);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let envelope = ProfileEnvelope {
            format_version: FORMAT_VERSION,
            profile: profile.clone(),
        };
        let bytes = bincode::serialize(&envelope)?;
        std::fs::write(&path, bytes)?;
        tracing::debug!("Stored profile {} at {}", profile.description, path.display());
        Ok(path)
    }

    fn load(&self, path: &Path) -> Result<LibProfile, StorageError> {
        let bytes = std::fs::read(path)?;
        let envelope: ProfileEnvelope =
            bincode::deserialize(&bytes).map_err(|e| StorageError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(StorageError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported format version {} (expected {})",
                    envelope.format_version, FORMAT_VERSION
                ),
            });
        }
        if envelope.profile.hash_trees.is_empty() {
            return Err(StorageError::Corrupt {
                path: path.to_path_buf(),
                reason: "profile contains no hash trees".to_string(),
            });
        }
        Ok(envelope.profile)
    }
}
