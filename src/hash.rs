// src/hash.rs

//! Hashing helpers for profile identities and generated artifacts
//!
//! | Use Case | Algorithm | Why |
//! |----------|-----------|-----|
//! | Profile directory names | XXH128 | Fast, short, only needs to separate profiles |
//! | Generated artifact digests | SHA-256 | Reported to users, compared across machines |

use sha2::{Digest, Sha256};
use std::fmt;
use xxhash_rust::xxh3::xxh3_128;

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Xxh128,
}

impl HashAlgorithm {
    /// Get the algorithm name as a string
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Xxh128 => "xxh128",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A hash value with its algorithm
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest
    pub value: String,
}

impl ContentHash {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Format as a prefixed string (e.g., "sha256:abc123...")
    pub fn to_prefixed_string(&self) -> String {
        format!("{}:{}", self.algorithm.name(), self.value)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Compute hash of a byte slice
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> ContentHash {
    let value = match algorithm {
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
        HashAlgorithm::Xxh128 => format!("{:032x}", xxh3_128(data)),
    };
    ContentHash { algorithm, value }
}
