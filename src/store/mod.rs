//! Profile storage
//!
//! Library profiles are profiled once and persisted; matching runs load them
//! into a read-only [`LibraryCatalog`].

pub mod catalog;
pub mod fs;

pub use catalog::{CatalogLoad, LibraryCatalog, SkippedEntry};
pub use fs::FsProfileStore;

use crate::error::StorageError;
use crate::profile::{LibProfile, LibraryDescription};
use std::path::{Path, PathBuf};

/// File extension of persisted library profiles
pub const PROFILE_EXTENSION: &str = "libv";

/// Persistence backend for library profiles
pub trait ProfileStore: Send + Sync {
    /// Locations of all stored profiles, in a stable order
    fn list(&self) -> Result<Vec<PathBuf>, StorageError>;
    /// Location a profile with `description` is stored at
    fn path_for(&self, description: &LibraryDescription) -> PathBuf;
    fn save(&self, profile: &LibProfile) -> Result<PathBuf, StorageError>;
    fn load(&self, path: &Path) -> Result<LibProfile, StorageError>;
}
