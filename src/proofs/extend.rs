//! Lifting the hash of an aligned region into a larger pristine tree

use crate::core::{error::*, hash::HashPrimitive, types::*};
use crate::proofs::region::calculate_root_hash;
use crate::proofs::zero_hash::ZeroHashTable;
use tracing::trace;

/// Extend the hash of the `2^data_log2_size` node at `data_address` up to the
/// `2^tree_log2_size` node containing it, with every other byte pristine.
pub fn extend_region_hash<H: HashPrimitive>(
    zeros: &ZeroHashTable<H>,
    data_hash: Hash,
    data_address: u64,
    data_log2_size: u32,
    tree_log2_size: u32,
) -> Result<Hash> {
    if data_log2_size < LOG2_WORD_SIZE || data_log2_size > tree_log2_size {
        return Err(MerkleError::log2_out_of_range(
            data_log2_size,
            LOG2_WORD_SIZE,
            tree_log2_size,
        ));
    }
    if tree_log2_size > zeros.max_level() {
        return Err(MerkleError::log2_out_of_range(
            tree_log2_size,
            data_log2_size,
            zeros.max_level(),
        ));
    }
    if !is_aligned(data_address, data_log2_size) {
        return Err(MerkleError::misaligned(data_address, data_log2_size));
    }

    let hasher = zeros.hasher();
    let mut hash = data_hash;
    let mut address = data_address;
    for level in data_log2_size + 1..=tree_log2_size {
        let pristine = zeros.get(level - 1)?;
        if is_aligned(address, level) {
            hash = hasher.merge(&hash, &pristine);
        } else {
            hash = hasher.merge(&pristine, &hash);
            address = align_down(address, level);
        }
    }
    trace!(data_address, data_log2_size, tree_log2_size, "region hash extended");
    Ok(hash)
}

/// Hash `data` as the node containing `data_address` and extend it to `tree_log2_size`.
///
/// `data_address` may point anywhere inside the node; it is rounded down to
/// the node's natural `2^data_log2_size` boundary first.
pub fn calculate_region_hash_at<H: HashPrimitive>(
    zeros: &ZeroHashTable<H>,
    data_address: u64,
    data: &[u8],
    data_log2_size: u32,
    tree_log2_size: u32,
) -> Result<Hash> {
    let address = align_down(data_address, data_log2_size);
    let data_hash = calculate_root_hash(zeros.hasher(), data, data_log2_size)?;
    extend_region_hash(zeros, data_hash, address, data_log2_size, tree_log2_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::Keccak256Hasher;

    #[test]
    fn test_identity() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let hash = Keccak256Hasher.hash(b"node");
        assert_eq!(extend_region_hash(&zeros, hash, 0x1000, 12, 12).unwrap(), hash);
    }

    #[test]
    fn test_one_level_left_and_right() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let hash = Keccak256Hasher.hash(b"node");
        let pristine = zeros.get(12).unwrap();

        let left = extend_region_hash(&zeros, hash, 0x2000, 12, 13).unwrap();
        assert_eq!(left, Keccak256Hasher.merge(&hash, &pristine));

        let right = extend_region_hash(&zeros, hash, 0x3000, 12, 13).unwrap();
        assert_eq!(right, Keccak256Hasher.merge(&pristine, &hash));
    }

    #[test]
    fn test_right_then_left() {
        // 0x1000 is the right child of [0, 0x2000), which is the left child of [0, 0x4000)
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let hash = Keccak256Hasher.hash(b"node");
        let h = zeros.hasher();
        let expected = h.merge(&h.merge(&zeros.get(12).unwrap(), &hash), &zeros.get(13).unwrap());
        assert_eq!(extend_region_hash(&zeros, hash, 0x1000, 12, 14).unwrap(), expected);
    }

    #[test]
    fn test_full_address_space() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let pristine_page = zeros.get(12).unwrap();
        let root = extend_region_hash(&zeros, pristine_page, 0xffff_ffff_ffff_f000, 12, 64).unwrap();
        assert_eq!(root, zeros.get(64).unwrap());
    }

    #[test]
    fn test_rejects_misaligned_address() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let err = extend_region_hash(&zeros, Hash::zero(), 0x1004, 12, 20).unwrap_err();
        assert!(matches!(err, MerkleError::MisalignedAddress { .. }));
        assert!(extend_region_hash(&zeros, Hash::zero(), 0, 20, 12).is_err());
    }

    #[test]
    fn test_unaligned_start_is_rounded() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let data = [5u8; 16];
        assert_eq!(
            calculate_region_hash_at(&zeros, 0x47, &data, 4, 10).unwrap(),
            calculate_region_hash_at(&zeros, 0x40, &data, 4, 10).unwrap()
        );
    }
}
