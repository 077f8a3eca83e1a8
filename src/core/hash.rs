//! Hash primitives for the machine Merkle tree
//!
//! Every internal node of the tree is `merge(left, right) = H(left ++ right)`.
//! The same primitive must be used by the zero-hash table, region hashing,
//! the page accumulator, region extension and proof verification.

use crate::core::types::Hash;
use digest::Digest;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::Keccak256;
use std::fmt;
use std::str::FromStr;

/// A 256-bit digest function plus the canonical two-child merge
pub trait HashPrimitive: Send + Sync {
    /// Hash arbitrary bytes
    fn hash(&self, data: &[u8]) -> Hash;

    /// Combine two child hashes into their parent
    fn merge(&self, left: &Hash, right: &Hash) -> Hash {
        let mut buffer = [0u8; 64];
        buffer[..32].copy_from_slice(left.as_bytes());
        buffer[32..].copy_from_slice(right.as_bytes());
        self.hash(&buffer)
    }

    /// Which digest this is
    fn function(&self) -> HashFunction;
}

impl<H: HashPrimitive + ?Sized> HashPrimitive for Box<H> {
    fn hash(&self, data: &[u8]) -> Hash {
        (**self).hash(data)
    }

    fn merge(&self, left: &Hash, right: &Hash) -> Hash {
        (**self).merge(left, right)
    }

    fn function(&self) -> HashFunction {
        (**self).function()
    }
}

fn digest_to_hash<D: Digest>(data: &[u8]) -> Hash {
    let mut hasher = D::new();
    hasher.update(data);
    let output = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&output[..32]);
    Hash::from_bytes(bytes)
}

/// Keccak-256 (pre-standard SHA-3 padding), the digest of the reference machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keccak256Hasher;

impl HashPrimitive for Keccak256Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        digest_to_hash::<Keccak256>(data)
    }

    fn merge(&self, left: &Hash, right: &Hash) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(left.as_bytes());
        hasher.update(right.as_bytes());
        Hash::from_bytes(hasher.finalize().into())
    }

    fn function(&self) -> HashFunction {
        HashFunction::Keccak256
    }
}

/// SHA-256
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

impl HashPrimitive for Sha256Hasher {
    fn hash(&self, data: &[u8]) -> Hash {
        digest_to_hash::<Sha256>(data)
    }

    fn merge(&self, left: &Hash, right: &Hash) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(left.as_bytes());
        hasher.update(right.as_bytes());
        Hash::from_bytes(hasher.finalize().into())
    }

    fn function(&self) -> HashFunction {
        HashFunction::Sha256
    }
}

/// Runtime selection of the digest, used by configuration and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    #[default]
    Keccak256,
    Sha256,
}

impl HashFunction {
    pub fn name(&self) -> &'static str {
        match self {
            HashFunction::Keccak256 => "keccak256",
            HashFunction::Sha256 => "sha256",
        }
    }

    /// Instantiate the primitive
    pub fn hasher(&self) -> Box<dyn HashPrimitive> {
        match self {
            HashFunction::Keccak256 => Box::new(Keccak256Hasher),
            HashFunction::Sha256 => Box::new(Sha256Hasher),
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keccak256" | "keccak" | "keccak-256" => Ok(HashFunction::Keccak256),
            "sha256" | "sha-256" => Ok(HashFunction::Sha256),
            other => Err(format!("unknown hash function '{}'", other)),
        }
    }
}
