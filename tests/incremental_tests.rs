//! Incremental page accumulator tests

mod common;

use machine_merkle::{
    calculate_region_hash, calculate_root_hash, Hash, HashPrimitive, IncrementalPageTree,
    Keccak256Hasher, MerkleError,
};
use proptest::prelude::*;
use rstest::rstest;

fn page_hashes(count: usize, page_log2_size: u32, seed: u8) -> (Vec<u8>, Vec<Hash>) {
    let page_size = 1usize << page_log2_size;
    let data = common::pattern(count * page_size, seed);
    let hashes = data
        .chunks(page_size)
        .map(|page| calculate_root_hash(&Keccak256Hasher, page, page_log2_size).unwrap())
        .collect();
    (data, hashes)
}

/// Accumulated root after `k` pages equals hashing those pages followed by zero pages
fn check_prefix(page_log2_size: u32, tree_log2_size: u32, k: usize) {
    let zeros = common::keccak_zeros();
    let (data, hashes) = page_hashes(k, page_log2_size, 7);
    let mut tree = IncrementalPageTree::new(&zeros, page_log2_size, tree_log2_size).unwrap();
    for hash in hashes {
        tree.add_page(hash).unwrap();
    }
    let mut full = vec![0u8; 1 << tree_log2_size];
    full[..data.len()].copy_from_slice(&data);
    assert_eq!(
        tree.root_hash().unwrap(),
        calculate_root_hash(&Keccak256Hasher, &full, tree_log2_size).unwrap(),
        "page 2^{}, tree 2^{}, {} pages",
        page_log2_size,
        tree_log2_size,
        k
    );
}

#[rstest]
#[case(3, 3)]
#[case(3, 5)]
#[case(3, 7)]
#[case(4, 8)]
#[case(6, 9)]
fn test_every_prefix_matches_region_hash(#[case] page_log2_size: u32, #[case] tree_log2_size: u32) {
    let max_pages = 1usize << (tree_log2_size - page_log2_size);
    for k in 0..=max_pages {
        check_prefix(page_log2_size, tree_log2_size, k);
    }
}

#[test]
fn test_three_of_four_pages() {
    let zeros = common::keccak_zeros();
    let hasher = Keccak256Hasher;
    let (h0, h1, h2) = (hasher.hash(b"h0"), hasher.hash(b"h1"), hasher.hash(b"h2"));
    let mut tree = IncrementalPageTree::new(&zeros, 3, 5).unwrap();
    assert_eq!(tree.max_pages(), 4);
    for hash in [h0, h1, h2] {
        tree.add_page(hash).unwrap();
    }
    let expected = hasher.merge(
        &hasher.merge(&h0, &h1),
        &hasher.merge(&h2, &zeros.get(3).unwrap()),
    );
    assert_eq!(tree.root_hash().unwrap(), expected);
}

#[test]
fn test_capacity_is_enforced() {
    let zeros = common::keccak_zeros();
    let mut tree = IncrementalPageTree::new(&zeros, 3, 5).unwrap();
    for seed in 0..4u8 {
        tree.add_page(Keccak256Hasher.hash(&[seed])).unwrap();
    }
    let before = tree.root_hash().unwrap();
    let err = tree.add_page(Hash::zero()).unwrap_err();
    assert!(matches!(err, MerkleError::CapacityExceeded { max_pages: 4 }));
    assert!(err.is_contract_violation());
    assert_eq!(tree.root_hash().unwrap(), before);
}

#[test]
fn test_region_hash_of_page_multiple() {
    let zeros = common::keccak_zeros();
    let data = common::pattern(3 * 4096, 1);
    let mut full = vec![0u8; 1 << 14];
    full[..data.len()].copy_from_slice(&data);
    assert_eq!(
        calculate_region_hash(&zeros, &data, 12, 14).unwrap(),
        calculate_root_hash(&Keccak256Hasher, &full, 14).unwrap()
    );
}

#[test]
fn test_region_hash_rejects_oversized_data() {
    let zeros = common::keccak_zeros();
    let err = calculate_region_hash(&zeros, &[0u8; 33], 3, 5).unwrap_err();
    assert!(matches!(err, MerkleError::CapacityExceeded { max_pages: 4 }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn partial_region_matches_padded_buffer(len in 0usize..=512, seed in any::<u8>()) {
        let zeros = common::keccak_zeros();
        let data = common::pattern(len, seed);
        let mut full = vec![0u8; 512];
        full[..len].copy_from_slice(&data);
        prop_assert_eq!(
            calculate_region_hash(&zeros, &data, 5, 9).unwrap(),
            calculate_root_hash(&Keccak256Hasher, &full, 9).unwrap()
        );
    }
}
