//! Error types for the fingerprinting engine.
//!
//! Expected outcomes of matching messy real-world input (empty trees, missing
//! root packages, combinatorial blow-up) are modelled as result variants in
//! their own modules. The errors here cover invalid input, misuse and I/O.

use crate::tree::TreeConfig;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Invalid class hierarchy: {0}")]
    HierarchyError(String),

    #[error("Invalid library description: {0}")]
    DescriptionError(String),

    #[error("Hash tree for {0} is empty, no classes survived filtering")]
    EmptyHashTree(String),

    #[error("Refusing to compare hash trees built with different configs (app: {app}, lib: {lib})")]
    ConfigMismatch { app: TreeConfig, lib: TreeConfig },

    #[error("Unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    #[error("Matching task failed: {0}")]
    TaskFailed(String),
}

/// Errors raised by profile persistence
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt profile {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Profile not found: {0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
