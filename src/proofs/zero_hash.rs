//! Hashes of pristine (all-zero) subtrees
//!
//! `get(n)` is the root hash of an all-zero subtree spanning `2^n` bytes,
//! for `n` from the word size up to the configured maximum level. The table
//! owns the hash primitive it was built with so every component that reads
//! pristine hashes also merges with the same primitive.

use crate::core::{error::*, hash::HashPrimitive, types::*};
use tracing::debug;

/// Precomputed table of pristine subtree hashes, indexed by log2 size
#[derive(Debug, Clone)]
pub struct ZeroHashTable<H> {
    hasher: H,
    max_level: u32,
    /// entries[i] covers 2^(LOG2_WORD_SIZE + i) bytes
    entries: Vec<Hash>,
}

impl<H: HashPrimitive> ZeroHashTable<H> {
    /// Build the table up to the full address space
    pub fn new(hasher: H) -> Self {
        let mut table = Self {
            hasher,
            max_level: LOG2_WORD_SIZE,
            entries: Vec::with_capacity((LOG2_ROOT_SIZE - LOG2_WORD_SIZE + 1) as usize),
        };
        table.fill(LOG2_ROOT_SIZE);
        table
    }

    /// Build the table up to `max_level` (inclusive)
    pub fn build(hasher: H, max_level: u32) -> Result<Self> {
        if !(LOG2_WORD_SIZE..=LOG2_ROOT_SIZE).contains(&max_level) {
            return Err(MerkleError::log2_out_of_range(
                max_level,
                LOG2_WORD_SIZE,
                LOG2_ROOT_SIZE,
            ));
        }
        let mut table = Self {
            hasher,
            max_level: LOG2_WORD_SIZE,
            entries: Vec::with_capacity((max_level - LOG2_WORD_SIZE + 1) as usize),
        };
        table.fill(max_level);
        Ok(table)
    }

    fn fill(&mut self, max_level: u32) {
        if self.entries.is_empty() {
            let zero_word = [0u8; 1 << LOG2_WORD_SIZE];
            self.entries.push(self.hasher.hash(&zero_word));
        }
        while (self.entries.len() as u32) < max_level - LOG2_WORD_SIZE + 1 {
            // entries is never empty here
            let child = self.entries[self.entries.len() - 1];
            self.entries.push(self.hasher.merge(&child, &child));
        }
        self.max_level = max_level;
        debug!(
            hash = %self.hasher.function(),
            max_level,
            "zero hash table ready"
        );
    }

    /// Grow the table so that it covers `max_level`
    pub fn extend_to(&mut self, max_level: u32) -> Result<()> {
        if max_level > LOG2_ROOT_SIZE {
            return Err(MerkleError::log2_out_of_range(
                max_level,
                LOG2_WORD_SIZE,
                LOG2_ROOT_SIZE,
            ));
        }
        if max_level > self.max_level {
            self.fill(max_level);
        }
        Ok(())
    }

    /// Hash of a pristine subtree spanning `2^log2_size` bytes
    pub fn get(&self, log2_size: u32) -> Result<Hash> {
        if log2_size < LOG2_WORD_SIZE || log2_size > self.max_level {
            return Err(MerkleError::log2_out_of_range(
                log2_size,
                LOG2_WORD_SIZE,
                self.max_level,
            ));
        }
        Ok(self.entries[(log2_size - LOG2_WORD_SIZE) as usize])
    }

    /// Largest log2 size covered
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// The primitive this table was built with
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Iterate `(log2_size, hash)` pairs from the word size upward
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Hash)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, hash)| (LOG2_WORD_SIZE + i as u32, hash))
    }
}
