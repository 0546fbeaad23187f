//! libsift: Obfuscation-Tolerant Library Fingerprinting
//!
//! Profiles third-party libraries as Merkle hash trees over their packages,
//! classes and fuzzy method descriptors, and detects them in applications
//! even when identifiers were renamed and package hierarchies flattened.

pub mod access;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod hash;
pub mod hierarchy;
pub mod identify;
pub mod logging;
pub mod matching;
pub mod pkg;
pub mod profile;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
