//! Region hashing tests

mod common;

use machine_merkle::{calculate_root_hash, HashPrimitive, Keccak256Hasher, MerkleError};
use proptest::prelude::*;

#[test]
fn test_matches_naive_tree() {
    for log2_size in 3..=10 {
        let data = common::pattern(1 << log2_size, log2_size as u8);
        assert_eq!(
            calculate_root_hash(&Keccak256Hasher, &data, log2_size).unwrap(),
            common::naive_tree_hash(&Keccak256Hasher, &data)
        );
    }
}

#[test]
fn test_rejects_wrong_sizes() {
    let err = calculate_root_hash(&Keccak256Hasher, &[0u8; 15], 4).unwrap_err();
    assert!(matches!(
        err,
        MerkleError::InvalidBufferSize {
            expected: 16,
            actual: 15
        }
    ));
    assert!(err.is_contract_violation());

    let err = calculate_root_hash(&Keccak256Hasher, &[0u8; 4], 2).unwrap_err();
    assert!(matches!(err, MerkleError::Log2SizeOutOfRange { .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn split_stable(log2_size in 4u32..11, seed in any::<u8>()) {
        let data = common::pattern(1 << log2_size, seed);
        let whole = calculate_root_hash(&Keccak256Hasher, &data, log2_size).unwrap();
        let (left, right) = data.split_at(data.len() / 2);
        let left = calculate_root_hash(&Keccak256Hasher, left, log2_size - 1).unwrap();
        let right = calculate_root_hash(&Keccak256Hasher, right, log2_size - 1).unwrap();
        prop_assert_eq!(whole, Keccak256Hasher.merge(&left, &right));
    }

    #[test]
    fn deterministic(data in proptest::collection::vec(any::<u8>(), 64)) {
        let first = calculate_root_hash(&Keccak256Hasher, &data, 6).unwrap();
        let second = calculate_root_hash(&Keccak256Hasher, &data, 6).unwrap();
        prop_assert_eq!(first, second);
    }
}
