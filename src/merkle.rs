//! Transaction Merkle root computation
//!
//! Bitcoin-style binary tree: each level is reduced pairwise and an odd last
//! element is paired with itself.

use crate::common::types::{Hash32, NULL_HASH};
use sha2::{Digest, Sha256};

/// SHA-256 applied twice
pub fn double_sha256(data: &[u8]) -> Hash32 {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Reduce `leaves` to a single root using `hash_fn` on each concatenated pair.
///
/// Returns `None` when there are no leaves. A single leaf is its own root.
pub fn merkle_root_with<F>(leaves: &[Hash32], hash_fn: F) -> Option<Hash32>
where
    F: Fn(&[u8]) -> Hash32,
{
    let mut level: Vec<Hash32> = leaves.to_vec();
    let mut buf = [0u8; 64];

    while level.len() > 1 {
        let size = level.len();
        let mut next_level = Vec::with_capacity((size + 1) / 2);

        for i in (0..size).step_by(2) {
            let j = (i + 1).min(size - 1);
            buf[..32].copy_from_slice(&level[i]);
            buf[32..].copy_from_slice(&level[j]);
            next_level.push(hash_fn(&buf));
        }

        level = next_level;
    }

    level.first().copied()
}

/// Root of a block's transaction hashes, `NULL_HASH` for an empty block
pub fn transactions_root(tx_hashes: &[Hash32]) -> Hash32 {
    merkle_root_with(tx_hashes, double_sha256).unwrap_or(NULL_HASH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u8) -> Hash32 {
        double_sha256(&[n])
    }

    fn pair(a: &Hash32, b: &Hash32) -> Hash32 {
        let mut buf = a.to_vec();
        buf.extend_from_slice(b);
        double_sha256(&buf)
    }

    #[test]
    fn test_double_sha256_known_vector() {
        // sha256d("hello")
        assert_eq!(
            hex::encode(double_sha256(b"hello")),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_empty_is_null_hash() {
        assert_eq!(merkle_root_with(&[], double_sha256), None);
        assert_eq!(transactions_root(&[]), NULL_HASH);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let h = leaf(7);
        assert_eq!(transactions_root(&[h]), h);
    }

    #[test]
    fn test_two_leaves() {
        let (a, b) = (leaf(1), leaf(2));
        assert_eq!(transactions_root(&[a, b]), pair(&a, &b));
    }

    #[test]
    fn test_odd_leaf_is_duplicated() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let expected = pair(&pair(&a, &b), &pair(&c, &c));
        assert_eq!(transactions_root(&[a, b, c]), expected);
    }

    #[test]
    fn test_odd_intermediate_level() {
        // 5 leaves -> 3 -> 2 -> 1, the middle level has an odd count too
        let l: Vec<Hash32> = (1..=5).map(leaf).collect();
        let level1 = [pair(&l[0], &l[1]), pair(&l[2], &l[3]), pair(&l[4], &l[4])];
        let level2 = [pair(&level1[0], &level1[1]), pair(&level1[2], &level1[2])];
        let expected = pair(&level2[0], &level2[1]);

        assert_eq!(transactions_root(&l), expected);
    }

    #[test]
    fn test_deterministic() {
        let leaves: Vec<Hash32> = (0..9).map(leaf).collect();
        assert_eq!(transactions_root(&leaves), transactions_root(&leaves));
    }

    #[test]
    fn test_order_sensitive() {
        let leaves: Vec<Hash32> = (0..4).map(leaf).collect();
        let mut swapped = leaves.clone();
        swapped.swap(0, 3);
        assert_ne!(transactions_root(&leaves), transactions_root(&swapped));
    }

    #[test]
    fn test_custom_hash_fn() {
        // xor-fold keeps the arithmetic easy to follow
        let fold = |data: &[u8]| {
            let mut out = [0u8; 32];
            for (i, b) in data.iter().enumerate() {
                out[i % 32] ^= b;
            }
            out
        };
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_eq!(merkle_root_with(&[a, b], fold), Some([3u8; 32]));
    }

    #[test]
    fn test_bitcoin_block_170() {
        // First block with a non-coinbase transaction. Txids in display order.
        let txids = [
            "b1fea52486ce0c62bb442b530a3f0132b826c74e473d1f2c220bfa78111c5082",
            "f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16",
        ];
        let leaves: Vec<Hash32> = txids
            .iter()
            .map(|t| {
                let mut h: Hash32 = hex::decode(t).unwrap().try_into().unwrap();
                h.reverse();
                h
            })
            .collect();

        let mut root = transactions_root(&leaves);
        root.reverse();
        assert_eq!(
            hex::encode(root),
            "7dac2c5666815c17a3b36427de37bb9d2e2c5ccec3f8633eb91a4205cb4c10ff"
        );
    }
}
