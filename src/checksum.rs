//! Checksums of generated headers

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 checksum of an artifact's contents
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for summaries
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }

    pub fn verify(&self, content: &str) -> bool {
        Self::from_str(content) == *self
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = "#define NATOMS 0\n";
        assert_eq!(Checksum::from_str(content), Checksum::from_str(content));
    }

    #[test]
    fn test_checksum_different_content() {
        assert_ne!(Checksum::from_str("#define A 0\n"), Checksum::from_str("#define A 1\n"));
    }

    #[test]
    fn test_checksum_verification() {
        let checksum = Checksum::from_str("content");
        assert!(checksum.verify("content"));
        assert!(!checksum.verify("different content"));
        assert_eq!(checksum.short().len(), 12);
        assert_eq!(checksum.as_str().len(), 64);
    }
}
