//! Merkle tree hashing and proofs over the machine address space
//!
//! This module provides the zero-hash table, region and page hashing,
//! extension of a region hash into an enclosing tree, proof construction and
//! verification, and a sparse memory image tying them together.

pub mod extend;
pub mod image;
pub mod incremental;
pub mod proof;
pub mod region;
pub mod zero_hash;

// Re-export commonly used items
pub use extend::{calculate_region_hash_at, extend_region_hash};
pub use image::{MemoryImage, MemoryRegion};
pub use incremental::{calculate_region_hash, IncrementalPageTree};
pub use proof::{compute_proof_root_hash, sibling_index, Proof, VerificationOutcome};
pub use region::calculate_root_hash;
pub use zero_hash::ZeroHashTable;
