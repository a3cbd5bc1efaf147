//! Source checksums
//!
//! Provides [`Checksum`], the Blake3 digest of a source file's original text.
//! Parsers record it on [`SourceMeta`](crate::SourceMeta) so later passes can
//! tell whether the text a tree was parsed from has changed on disk.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 digest of source text
///
/// Immutable and cheap to copy. Serialized as a lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Checksum([u8; 32]);

impl Checksum {
    /// Algorithm name recorded alongside the digest
    pub const ALGORITHM: &'static str = "blake3";

    /// Create a checksum from raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Digest bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compute the checksum of source text
    #[inline]
    #[must_use]
    pub fn of_text(text: &str) -> Self {
        Self::compute(text.as_bytes())
    }

    /// Compute the checksum of arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create from a byte slice
    ///
    /// # Errors
    /// Returns error if the slice is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ChecksumError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| ChecksumError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// First 16 hex characters, for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Whether `text` still hashes to this checksum
    #[inline]
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        Self::of_text(text) == *self
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Checksum {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for Checksum {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Checksum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when decoding a checksum
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    /// Invalid digest length
    #[error("invalid checksum length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_of_text_is_deterministic() {
        assert_eq!(Checksum::of_text("a=b\n"), Checksum::of_text("a=b\n"));
        assert_ne!(Checksum::of_text("a=b\n"), Checksum::of_text("a=c\n"));
    }

    #[test]
    fn checksum_from_slice_invalid_length() {
        let result = Checksum::from_slice(&[1u8; 31]);
        assert!(matches!(
            result,
            Err(ChecksumError::InvalidLength {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn checksum_display_and_parse() {
        let checksum = Checksum::of_text("hello");
        let parsed: Checksum = checksum.to_string().parse().unwrap();
        assert_eq!(checksum, parsed);
        assert!(checksum.to_string().starts_with(&checksum.short()));
    }

    #[test]
    fn checksum_matches() {
        let checksum = Checksum::of_text("key=value");
        assert!(checksum.matches("key=value"));
        assert!(!checksum.matches("key=other"));
    }

    #[test]
    fn checksum_serde_is_hex_string() {
        let checksum = Checksum::of_text("x");
        let json = serde_json::to_string(&checksum).unwrap();
        assert_eq!(json.len(), 66);
        let decoded: Checksum = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, checksum);
    }
}
