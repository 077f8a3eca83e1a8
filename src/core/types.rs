//! Core data types for the machine Merkle tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of a hash in bytes
pub const HASH_SIZE: usize = 32;

/// log2 of the word size, the leaf granularity of the tree (8 bytes)
pub const LOG2_WORD_SIZE: u32 = 3;

/// log2 of the page size used when hashing memory regions (4 KiB)
pub const LOG2_PAGE_SIZE: u32 = 12;

/// log2 of the size of the whole address space covered by the tree
pub const LOG2_ROOT_SIZE: u32 = 64;

/// 32-byte digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a Hash from a 32-byte array
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a slice, which must be exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; HASH_SIZE] = bytes.try_into().ok()?;
        Some(Hash(array))
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Create a Hash from a hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex)?;
        if bytes.len() != HASH_SIZE {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut array = [0u8; HASH_SIZE];
        array.copy_from_slice(&bytes);
        Ok(Hash(array))
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// All-zero bytes. This is NOT the hash of a pristine region, see `ZeroHashTable`.
    pub fn zero() -> Self {
        Hash([0u8; HASH_SIZE])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &hex::encode(self.0)[..8])
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Hex strings for human-readable formats, raw bytes for binary ones
impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let hex_string = String::deserialize(deserializer)?;
            Hash::from_hex(&hex_string).map_err(serde::de::Error::custom)
        } else {
            <[u8; HASH_SIZE]>::deserialize(deserializer).map(Hash)
        }
    }
}

/// Root hash of a tree
pub type RootHash = Hash;

/// Mask with the low `log2_size` bits set
pub fn low_mask(log2_size: u32) -> u64 {
    if log2_size >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << log2_size) - 1
    }
}

/// Round `address` down to a multiple of `2^log2_size`
pub fn align_down(address: u64, log2_size: u32) -> u64 {
    address & !low_mask(log2_size)
}

/// Whether `address` is a multiple of `2^log2_size`
pub fn is_aligned(address: u64, log2_size: u32) -> bool {
    address & low_mask(log2_size) == 0
}

/// Size in bytes of a `2^log2_size` node, if it fits in memory
pub fn size_of_log2(log2_size: u32) -> Option<usize> {
    if log2_size >= usize::BITS {
        None
    } else {
        Some(1usize << log2_size)
    }
}
