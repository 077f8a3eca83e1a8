//! Region extension tests

mod common;

use machine_merkle::{
    calculate_region_hash_at, calculate_root_hash, extend_region_hash, HashPrimitive,
    Keccak256Hasher, MerkleError,
};
use proptest::prelude::*;

#[test]
fn test_identity_and_one_level() {
    let zeros = common::keccak_zeros();
    let hash = Keccak256Hasher.hash(b"region");
    assert_eq!(extend_region_hash(&zeros, hash, 0x40, 6, 6).unwrap(), hash);
    assert_eq!(
        extend_region_hash(&zeros, hash, 0x80, 6, 7).unwrap(),
        Keccak256Hasher.merge(&hash, &zeros.get(6).unwrap())
    );
    assert_eq!(
        extend_region_hash(&zeros, hash, 0x40, 6, 7).unwrap(),
        Keccak256Hasher.merge(&zeros.get(6).unwrap(), &hash)
    );
}

#[test]
fn test_pristine_region_extends_to_pristine_root() {
    let zeros = common::keccak_zeros();
    for address in [0u64, 0x1000, 0x8000_0000, 0xffff_ffff_ffff_f000] {
        assert_eq!(
            extend_region_hash(&zeros, zeros.get(12).unwrap(), address, 12, 64).unwrap(),
            zeros.get(64).unwrap()
        );
    }
}

#[test]
fn test_tree_smaller_than_region_rejected() {
    let zeros = common::keccak_zeros();
    let err = extend_region_hash(&zeros, zeros.get(12).unwrap(), 0, 12, 11).unwrap_err();
    assert!(err.is_contract_violation());
}

#[test]
fn test_misaligned_region_rejected() {
    let zeros = common::keccak_zeros();
    let err = extend_region_hash(&zeros, zeros.get(4).unwrap(), 0x8, 4, 10).unwrap_err();
    assert!(matches!(
        err,
        MerkleError::MisalignedAddress {
            address: 0x8,
            log2_size: 4
        }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Extending a region equals hashing the enclosing buffer with the region in place
    #[test]
    fn extension_matches_materialized_tree(slot in 0usize..32, seed in any::<u8>()) {
        let zeros = common::keccak_zeros();
        let data = common::pattern(16, seed);
        let address = (slot * 16) as u64;
        let mut full = vec![0u8; 512];
        full[slot * 16..slot * 16 + 16].copy_from_slice(&data);
        prop_assert_eq!(
            calculate_region_hash_at(&zeros, address, &data, 4, 9).unwrap(),
            calculate_root_hash(&Keccak256Hasher, &full, 9).unwrap()
        );
    }

    #[test]
    fn unaligned_start_rounds_down(slot in 0u64..32, offset in 0u64..16) {
        let zeros = common::keccak_zeros();
        let data = common::pattern(16, 3);
        prop_assert_eq!(
            calculate_region_hash_at(&zeros, slot * 16 + offset, &data, 4, 12).unwrap(),
            calculate_region_hash_at(&zeros, slot * 16, &data, 4, 12).unwrap()
        );
    }
}
