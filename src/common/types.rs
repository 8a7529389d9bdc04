//! Shared type definitions for the Merkle verifier
//!
//! Identifiers, hashes, block rows and the stored-hash encoding used by every
//! store implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

/// Length of a canonical (binary) hash
pub const HASH_LEN: usize = 32;

/// Canonical binary form of a double-SHA256 digest
pub type Hash32 = [u8; HASH_LEN];

/// Root recorded for blocks without transactions
pub const NULL_HASH: Hash32 = [0; HASH_LEN];

/// Identifier of an independent ledger instance
pub type ChainId = u64;

/// Identifier of a block row
pub type BlockId = u64;

/// A hash as it is kept by a store, before canonicalization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHash(pub Vec<u8>);

impl StoredHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// One block as listed for a chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRecord {
    pub block_id: BlockId,
    /// Recorded Merkle root in stored representation
    pub merkle_root: StoredHash,
    /// Recorded number of transactions
    pub num_tx: u64,
}

/// Checked and bad counts for one chain or a whole run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub checked: u64,
    pub bad: u64,
}

impl VerificationResult {
    pub fn new(checked: u64, bad: u64) -> Self {
        Self { checked, bad }
    }

    pub fn merge(mut self, other: VerificationResult) -> Self {
        self += other;
        self
    }

    pub fn is_clean(&self) -> bool {
        self.bad == 0
    }
}

impl AddAssign for VerificationResult {
    fn add_assign(&mut self, other: Self) {
        self.checked += other.checked;
        self.bad += other.bad;
    }
}

/// Failure to turn a stored hash into its canonical form
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashDecodeError {
    #[error("hash has {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("stored hash is not valid hex: {0}")]
    Hex(String),
}

/// How a store keeps hash columns.
///
/// Hashes are always stored byte-reversed (display order); the encoding only
/// decides whether the column holds those bytes raw or as lowercase hex text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashEncoding {
    #[default]
    Binary,
    Hex,
}

impl HashEncoding {
    /// Stored representation to canonical binary hash
    pub fn decode(&self, stored: &StoredHash) -> Result<Hash32, HashDecodeError> {
        let mut bytes = match self {
            HashEncoding::Binary => stored.as_bytes().to_vec(),
            HashEncoding::Hex => {
                hex::decode(stored.as_bytes()).map_err(|e| HashDecodeError::Hex(e.to_string()))?
            }
        };

        if bytes.len() != HASH_LEN {
            return Err(HashDecodeError::Length {
                expected: HASH_LEN,
                actual: bytes.len(),
            });
        }

        bytes.reverse();
        let mut hash = NULL_HASH;
        hash.copy_from_slice(&bytes);
        Ok(hash)
    }

    /// Canonical binary hash to stored representation
    pub fn encode(&self, hash: &Hash32) -> StoredHash {
        let mut reversed = *hash;
        reversed.reverse();
        match self {
            HashEncoding::Binary => StoredHash(reversed.to_vec()),
            HashEncoding::Hex => StoredHash(hex::encode(reversed).into_bytes()),
        }
    }
}

impl fmt::Display for HashEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashEncoding::Binary => write!(f, "binary"),
            HashEncoding::Hex => write!(f, "hex"),
        }
    }
}

impl FromStr for HashEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(HashEncoding::Binary),
            "hex" => Ok(HashEncoding::Hex),
            other => Err(format!("unknown hash encoding '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hash() -> Hash32 {
        let mut hash = NULL_HASH;
        for (i, b) in hash.iter_mut().enumerate() {
            *b = i as u8;
        }
        hash
    }

    #[test]
    fn test_binary_encoding_reverses() {
        let hash = sample_hash();
        let stored = HashEncoding::Binary.encode(&hash);

        assert_eq!(stored.as_bytes()[0], 31);
        assert_eq!(stored.as_bytes()[31], 0);
        assert_eq!(HashEncoding::Binary.decode(&stored).unwrap(), hash);
    }

    #[test]
    fn test_hex_encoding_is_display_order() {
        let hash = sample_hash();
        let stored = HashEncoding::Hex.encode(&hash);

        assert!(stored.as_bytes().starts_with(b"1f1e1d"));
        assert_eq!(HashEncoding::Hex.decode(&stored).unwrap(), hash);
    }

    #[test]
    fn test_decode_rejects_short_hash() {
        let stored = StoredHash(vec![0xab; 20]);
        assert_eq!(
            HashEncoding::Binary.decode(&stored),
            Err(HashDecodeError::Length { expected: 32, actual: 20 })
        );
    }

    #[test]
    fn test_decode_rejects_bad_hex() {
        let stored = StoredHash(b"zz".to_vec());
        assert!(matches!(
            HashEncoding::Hex.decode(&stored),
            Err(HashDecodeError::Hex(_))
        ));
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("HEX".parse::<HashEncoding>().unwrap(), HashEncoding::Hex);
        assert_eq!("binary".parse::<HashEncoding>().unwrap(), HashEncoding::Binary);
        assert!("base64".parse::<HashEncoding>().is_err());
    }

    #[test]
    fn test_result_merge() {
        let mut total = VerificationResult::default();
        total += VerificationResult::new(1000, 2);
        let total = total.merge(VerificationResult::new(5, 1));

        assert_eq!(total, VerificationResult::new(1005, 3));
        assert!(!total.is_clean());
    }
}
