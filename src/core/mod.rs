//! Core types and utilities
//!
//! This module contains the fundamental data types, the hash primitive
//! abstraction and error handling used throughout the crate.

pub mod error;
pub mod hash;
pub mod types;

// Re-export commonly used items
pub use error::{ErrorKind, MerkleError, Result};
pub use hash::{HashFunction, HashPrimitive, Keccak256Hasher, Sha256Hasher};
pub use types::{
    align_down, is_aligned, Hash, RootHash, HASH_SIZE, LOG2_PAGE_SIZE, LOG2_ROOT_SIZE,
    LOG2_WORD_SIZE,
};
