//! machine-merkle - Merkle proofs over a machine's 2^64-byte address space
//!
//! The state of an emulated machine is a binary Merkle tree over its whole
//! address space. Leaves are 8-byte words; almost all of the space is never
//! touched and is represented by precomputed pristine hashes, so any aligned
//! node can be hashed or proved without materializing it.
//!
//! # Core Features
//!
//! - **Zero-hash table**: hashes of all-zero subtrees at every power-of-two size
//! - **Region hashing**: buffers hashed directly or page by page with an
//!   incremental accumulator that pads missing pages with pristine hashes
//! - **Region extension**: lift a region hash into any enclosing pristine tree
//! - **Proofs**: build and verify proofs for any aligned node
//! - **Access logs**: validated records of reads and writes with optional proofs
//!
//! # Example Usage
//!
//! ```rust
//! use machine_merkle::{Keccak256Hasher, MemoryImage, MemoryRegion, ZeroHashTable};
//!
//! let zeros = ZeroHashTable::new(Keccak256Hasher);
//! let mut image = MemoryImage::new(&zeros, 12)?;
//! image.add_region(MemoryRegion::new(0x8000_0000, 16, vec![0x13; 1024])?)?;
//!
//! let proof = image.prove(0x8000_0008, 3)?;
//! assert_eq!(*proof.root_hash(), image.root_hash()?);
//! assert!(proof.verify(&Keccak256Hasher).is_verified());
//! # Ok::<(), machine_merkle::MerkleError>(())
//! ```

pub mod access_log;
pub mod cli;
pub mod config;
pub mod core;
pub mod proofs;

// Re-export commonly used types
pub use core::{
    error::{ErrorKind, MerkleError, Result},
    hash::{HashFunction, HashPrimitive, Keccak256Hasher, Sha256Hasher},
    types::{Hash, RootHash, LOG2_PAGE_SIZE, LOG2_ROOT_SIZE, LOG2_WORD_SIZE},
};

pub use proofs::{
    calculate_region_hash, calculate_region_hash_at, calculate_root_hash,
    compute_proof_root_hash, extend_region_hash, IncrementalPageTree, MemoryImage, MemoryRegion,
    Proof, VerificationOutcome, ZeroHashTable,
};

pub use access_log::{Access, AccessLog, AccessLogType, AccessType, BracketNote, BracketType};

pub use config::MerkleConfig;

/// Current version of machine-merkle
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
