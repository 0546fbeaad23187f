//! Hash primitive
//!
//! Pluggable digests over byte sequences. MD5 is the default used for
//! profiles; SHA-1, SHA-256 and BLAKE3 are available for stronger collision
//! resistance, and a 32-bit string hash is kept as a lightweight legacy option.

use crate::error::ApiError;
use crate::types::NodeHash;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Digest algorithm used to build a hash tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
    Blake3,
    Legacy32,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Blake3,
        HashAlgorithm::Legacy32,
    ];

    /// Hash `bytes` with this algorithm
    pub fn digest(self, bytes: &[u8]) -> NodeHash {
        let out = match self {
            HashAlgorithm::Md5 => md5::compute(bytes).0.to_vec(),
            HashAlgorithm::Sha1 => sha1::Sha1::digest(bytes).to_vec(),
            HashAlgorithm::Sha256 => sha2::Sha256::digest(bytes).to_vec(),
            HashAlgorithm::Blake3 => blake3::hash(bytes).as_bytes().to_vec(),
            HashAlgorithm::Legacy32 => legacy_string_hash(bytes).to_be_bytes().to_vec(),
        };
        NodeHash::new(out)
    }

    /// Length of the produced digest in bytes
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 | HashAlgorithm::Blake3 => 32,
            HashAlgorithm::Legacy32 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Legacy32 => "legacy32",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            "legacy32" | "hashcode" => Ok(HashAlgorithm::Legacy32),
            _ => Err(ApiError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

/// 32-bit polynomial string hash (`h = 31 * h + c` over UTF-16 code units).
///
/// Input bytes are decoded as UTF-8 first, invalid sequences are replaced.
fn legacy_string_hash(bytes: &[u8]) -> i32 {
    String::from_utf8_lossy(bytes)
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32))
}

/// Total lexicographic order over digests: first differing byte wins,
/// otherwise the shorter one sorts first.
pub fn compare_digests(a: &[u8], b: &[u8]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}
