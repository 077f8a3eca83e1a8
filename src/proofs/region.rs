//! Root hash of a concrete, power-of-two sized byte buffer

use crate::core::{error::*, hash::HashPrimitive, types::*};

/// Compute the Merkle root of `data`, which must be exactly `2^log2_size` bytes.
///
/// Leaves are words of `2^LOG2_WORD_SIZE` bytes. Each level splits its buffer
/// with the first half receiving `ceil(len / 2)` bytes.
pub fn calculate_root_hash<H: HashPrimitive + ?Sized>(
    hasher: &H,
    data: &[u8],
    log2_size: u32,
) -> Result<Hash> {
    if log2_size < LOG2_WORD_SIZE {
        return Err(MerkleError::log2_out_of_range(
            log2_size,
            LOG2_WORD_SIZE,
            LOG2_ROOT_SIZE,
        ));
    }
    let expected = size_of_log2(log2_size)
        .ok_or_else(|| MerkleError::invalid_geometry("buffer too large to materialize"))?;
    if data.len() != expected {
        return Err(MerkleError::invalid_buffer_size(expected as u64, data.len()));
    }
    Ok(root_hash_unchecked(hasher, data, log2_size))
}

// Recursion depth is bounded by log2_size - LOG2_WORD_SIZE.
fn root_hash_unchecked<H: HashPrimitive + ?Sized>(hasher: &H, data: &[u8], log2_size: u32) -> Hash {
    if log2_size == LOG2_WORD_SIZE {
        return hasher.hash(data);
    }
    let split = data.len() / 2 + data.len() % 2;
    let (first, second) = data.split_at(split);
    let left = root_hash_unchecked(hasher, first, log2_size - 1);
    let right = root_hash_unchecked(hasher, second, log2_size - 1);
    hasher.merge(&left, &right)
}

/// Root hash of `data` placed at the start of a `2^log2_size` node, zero-padded.
pub(crate) fn calculate_padded_root_hash<H: HashPrimitive + ?Sized>(
    hasher: &H,
    data: &[u8],
    log2_size: u32,
) -> Result<Hash> {
    let size = size_of_log2(log2_size)
        .ok_or_else(|| MerkleError::invalid_geometry("buffer too large to materialize"))?;
    if data.len() > size {
        return Err(MerkleError::invalid_buffer_size(size as u64, data.len()));
    }
    if data.len() == size {
        return calculate_root_hash(hasher, data, log2_size);
    }
    let mut padded = vec![0u8; size];
    padded[..data.len()].copy_from_slice(data);
    calculate_root_hash(hasher, &padded, log2_size)
}
