//! Shared helpers for integration tests

#![allow(dead_code)]

use machine_merkle::{Hash, HashPrimitive, Keccak256Hasher, ZeroHashTable};

/// Full Keccak-256 zero-hash table
pub fn keccak_zeros() -> ZeroHashTable<Keccak256Hasher> {
    ZeroHashTable::new(Keccak256Hasher)
}

/// Deterministic non-trivial bytes
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

/// Tree hash computed bottom-up from words, independent of the crate's recursion
pub fn naive_tree_hash<H: HashPrimitive>(hasher: &H, data: &[u8]) -> Hash {
    let mut level: Vec<Hash> = data.chunks(8).map(|word| hasher.hash(word)).collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| hasher.merge(&pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

/// Copy of `hash` with a single bit flipped
pub fn flip_bit(hash: &Hash, bit: usize) -> Hash {
    let mut bytes = *hash.as_bytes();
    bytes[(bit / 8) % bytes.len()] ^= 1 << (bit % 8);
    Hash::from_bytes(bytes)
}
