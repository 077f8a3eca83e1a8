//! Merkle proofs and their verification
//!
//! A proof ties the hash of a `2^log2_target_size` node at `target_address`
//! to the hash of the enclosing `2^log2_root_size` tree. The sibling for tree
//! level `level` (the sibling of the node of size `2^level` on the path) is
//! stored at index `log2_root_size - level - 1`: index 0 holds the sibling
//! just below the root, the last index the sibling of the target itself.

use crate::core::{error::*, hash::HashPrimitive, types::*};
use crate::proofs::zero_hash::ZeroHashTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of recomputing a proof's root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The recomputed root equals the claimed root
    Verified,
    /// The recomputed root differs from the claimed root
    Mismatch { claimed: Hash, computed: Hash },
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }

    /// Turn a mismatch into an error for callers that treat it as fatal
    pub fn into_result(self) -> Result<()> {
        match self {
            VerificationOutcome::Verified => Ok(()),
            VerificationOutcome::Mismatch { claimed, computed } => {
                Err(MerkleError::RootMismatch { claimed, computed })
            }
        }
    }
}

/// Index of the sibling for `level` in a proof rooted at `log2_root_size`
pub fn sibling_index(log2_root_size: u32, level: u32) -> usize {
    (log2_root_size - level - 1) as usize
}

fn check_shape(
    target_address: u64,
    log2_target_size: u32,
    log2_root_size: u32,
    sibling_count: usize,
) -> Result<()> {
    if log2_root_size > LOG2_ROOT_SIZE {
        return Err(MerkleError::invalid_proof(format!(
            "log2_root_size {} exceeds {}",
            log2_root_size, LOG2_ROOT_SIZE
        )));
    }
    if log2_target_size < LOG2_WORD_SIZE || log2_target_size > log2_root_size {
        return Err(MerkleError::invalid_proof(format!(
            "log2_target_size {} outside {}..={}",
            log2_target_size, LOG2_WORD_SIZE, log2_root_size
        )));
    }
    if !is_aligned(target_address, log2_target_size) {
        return Err(MerkleError::invalid_proof(format!(
            "target address {:#x} is not aligned to 2^{}",
            target_address, log2_target_size
        )));
    }
    let expected = (log2_root_size - log2_target_size) as usize;
    if sibling_count != expected {
        return Err(MerkleError::invalid_proof(format!(
            "expected {} sibling hashes, got {}",
            expected, sibling_count
        )));
    }
    Ok(())
}

/// Recompute the root hash implied by a target hash, its address and siblings.
///
/// This never decides whether a proof is valid; the caller compares the
/// result with the root it trusts. Only a malformed shape is an error.
pub fn compute_proof_root_hash<H: HashPrimitive + ?Sized>(
    hasher: &H,
    target_hash: &Hash,
    target_address: u64,
    log2_target_size: u32,
    log2_root_size: u32,
    sibling_hashes: &[Hash],
) -> Result<Hash> {
    check_shape(
        target_address,
        log2_target_size,
        log2_root_size,
        sibling_hashes.len(),
    )?;
    Ok(fold_siblings(
        hasher,
        *target_hash,
        target_address,
        log2_target_size,
        log2_root_size,
        sibling_hashes,
    ))
}

fn fold_siblings<H: HashPrimitive + ?Sized>(
    hasher: &H,
    target_hash: Hash,
    target_address: u64,
    log2_target_size: u32,
    log2_root_size: u32,
    sibling_hashes: &[Hash],
) -> Hash {
    let mut hash = target_hash;
    for level in log2_target_size..log2_root_size {
        let sibling = &sibling_hashes[sibling_index(log2_root_size, level)];
        if (target_address >> level) & 1 != 0 {
            hash = hasher.merge(sibling, &hash);
        } else {
            hash = hasher.merge(&hash, sibling);
        }
    }
    hash
}

/// Wire form of a proof before its shape is checked
#[derive(Deserialize)]
struct UncheckedProof {
    target_address: u64,
    log2_target_size: u32,
    log2_root_size: u32,
    target_hash: Hash,
    root_hash: Hash,
    sibling_hashes: Vec<Hash>,
}

impl TryFrom<UncheckedProof> for Proof {
    type Error = MerkleError;

    fn try_from(raw: UncheckedProof) -> Result<Self> {
        Proof::new(
            raw.target_address,
            raw.log2_target_size,
            raw.log2_root_size,
            raw.target_hash,
            raw.root_hash,
            raw.sibling_hashes,
        )
    }
}

/// Merkle proof for a node of the machine tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedProof")]
pub struct Proof {
    target_address: u64,
    log2_target_size: u32,
    log2_root_size: u32,
    target_hash: Hash,
    root_hash: Hash,
    sibling_hashes: Vec<Hash>,
}

impl Proof {
    /// Create a proof, checking that the sibling count matches the sizes
    pub fn new(
        target_address: u64,
        log2_target_size: u32,
        log2_root_size: u32,
        target_hash: Hash,
        root_hash: Hash,
        sibling_hashes: Vec<Hash>,
    ) -> Result<Self> {
        check_shape(
            target_address,
            log2_target_size,
            log2_root_size,
            sibling_hashes.len(),
        )?;
        Ok(Self {
            target_address,
            log2_target_size,
            log2_root_size,
            target_hash,
            root_hash,
            sibling_hashes,
        })
    }

    /// Build a proof by asking `sibling_at(address, log2_size)` for the hash of
    /// each sibling node; the root hash is computed from the result.
    pub fn build<H, F>(
        hasher: &H,
        target_address: u64,
        log2_target_size: u32,
        log2_root_size: u32,
        target_hash: Hash,
        mut sibling_at: F,
    ) -> Result<Self>
    where
        H: HashPrimitive + ?Sized,
        F: FnMut(u64, u32) -> Result<Hash>,
    {
        let count = log2_root_size.saturating_sub(log2_target_size) as usize;
        check_shape(target_address, log2_target_size, log2_root_size, count)?;

        let mut sibling_hashes = vec![Hash::zero(); count];
        for level in log2_target_size..log2_root_size {
            let sibling_address = align_down(target_address, level) ^ (1u64 << level);
            sibling_hashes[sibling_index(log2_root_size, level)] =
                sibling_at(sibling_address, level)?;
        }
        let root_hash = fold_siblings(
            hasher,
            target_hash,
            target_address,
            log2_target_size,
            log2_root_size,
            &sibling_hashes,
        );
        debug!(
            target_address,
            log2_target_size, log2_root_size, "proof built"
        );
        Ok(Self {
            target_address,
            log2_target_size,
            log2_root_size,
            target_hash,
            root_hash,
            sibling_hashes,
        })
    }

    /// Proof for a node in an otherwise pristine tree
    pub fn pristine<H: HashPrimitive>(
        zeros: &ZeroHashTable<H>,
        target_hash: Hash,
        target_address: u64,
        log2_target_size: u32,
        log2_root_size: u32,
    ) -> Result<Self> {
        Self::build(
            zeros.hasher(),
            target_address,
            log2_target_size,
            log2_root_size,
            target_hash,
            |_, level| zeros.get(level),
        )
    }

    /// Recompute the root from the target hash and the siblings
    pub fn compute_root_hash<H: HashPrimitive + ?Sized>(&self, hasher: &H) -> Hash {
        fold_siblings(
            hasher,
            self.target_hash,
            self.target_address,
            self.log2_target_size,
            self.log2_root_size,
            &self.sibling_hashes,
        )
    }

    /// Compare the recomputed root with the claimed one
    pub fn verify<H: HashPrimitive + ?Sized>(&self, hasher: &H) -> VerificationOutcome {
        let computed = self.compute_root_hash(hasher);
        if computed == self.root_hash {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::Mismatch {
                claimed: self.root_hash,
                computed,
            }
        }
    }

    pub fn target_address(&self) -> u64 {
        self.target_address
    }

    pub fn log2_target_size(&self) -> u32 {
        self.log2_target_size
    }

    pub fn log2_root_size(&self) -> u32 {
        self.log2_root_size
    }

    pub fn target_hash(&self) -> &Hash {
        &self.target_hash
    }

    pub fn root_hash(&self) -> &Hash {
        &self.root_hash
    }

    /// Siblings in storage order (index 0 just below the root)
    pub fn sibling_hashes(&self) -> &[Hash] {
        &self.sibling_hashes
    }

    /// Sibling of the node of size `2^level` on the path to the target
    pub fn sibling_hash(&self, level: u32) -> Result<&Hash> {
        if level < self.log2_target_size || level >= self.log2_root_size {
            return Err(MerkleError::log2_out_of_range(
                level,
                self.log2_target_size,
                self.log2_root_size.saturating_sub(1),
            ));
        }
        Ok(&self.sibling_hashes[sibling_index(self.log2_root_size, level)])
    }

    /// Replace the claimed root, keeping the rest of the proof
    pub fn with_root_hash(mut self, root_hash: Hash) -> Self {
        self.root_hash = root_hash;
        self
    }

    /// Replace the target hash, keeping the rest of the proof
    pub fn with_target_hash(mut self, target_hash: Hash) -> Self {
        self.target_hash = target_hash;
        self
    }

    /// Replace one sibling, addressed by tree level
    pub fn with_sibling_hash(mut self, level: u32, hash: Hash) -> Result<Self> {
        self.sibling_hash(level)?;
        let index = sibling_index(self.log2_root_size, level);
        self.sibling_hashes[index] = hash;
        Ok(self)
    }

    /// Serialize proof to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(MerkleError::JsonSerialization)
    }

    /// Deserialize proof from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(MerkleError::JsonSerialization)
    }

    /// Compact binary encoding in wire field order
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(MerkleError::Serialization)
    }

    /// Decode the binary encoding, re-checking the sibling count
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(MerkleError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::Keccak256Hasher;
    use crate::proofs::extend::extend_region_hash;

    #[test]
    fn test_pristine_proof_matches_extension() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let target = Keccak256Hasher.hash(b"page");
        let proof = Proof::pristine(&zeros, target, 0x7000, 12, 20).unwrap();
        assert_eq!(
            *proof.root_hash(),
            extend_region_hash(&zeros, target, 0x7000, 12, 20).unwrap()
        );
        assert!(proof.verify(&Keccak256Hasher).is_verified());
    }

    #[test]
    fn test_sibling_index_convention() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let proof = Proof::pristine(&zeros, Hash::zero(), 0, 3, 6).unwrap();
        assert_eq!(proof.sibling_hashes().len(), 3);
        // index 0 is the sibling just below the root
        assert_eq!(proof.sibling_hashes()[0], zeros.get(5).unwrap());
        assert_eq!(proof.sibling_hashes()[2], zeros.get(3).unwrap());
        assert_eq!(*proof.sibling_hash(4).unwrap(), zeros.get(4).unwrap());
        assert!(proof.sibling_hash(6).is_err());
    }

    #[test]
    fn test_shape_errors() {
        let err = Proof::new(0, 3, 5, Hash::zero(), Hash::zero(), vec![Hash::zero()]).unwrap_err();
        assert!(err.is_validation_failure());
        assert!(Proof::new(0, 6, 5, Hash::zero(), Hash::zero(), vec![]).is_err());
        assert!(Proof::new(0, 3, 65, Hash::zero(), Hash::zero(), vec![Hash::zero(); 62]).is_err());
        assert!(Proof::new(4, 3, 3, Hash::zero(), Hash::zero(), vec![]).is_err());
        assert!(Proof::new(8, 3, 3, Hash::zero(), Hash::zero(), vec![]).is_ok());
    }

    #[test]
    fn test_mismatch_is_an_outcome() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let proof = Proof::pristine(&zeros, Hash::zero(), 0x10, 4, 8)
            .unwrap()
            .with_root_hash(Hash::zero());
        let outcome = proof.verify(&Keccak256Hasher);
        assert!(!outcome.is_verified());
        assert!(matches!(
            outcome.into_result(),
            Err(MerkleError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_json_and_binary_encodings() {
        let zeros = ZeroHashTable::new(Keccak256Hasher);
        let proof = Proof::pristine(&zeros, Keccak256Hasher.hash(b"x"), 0x40, 6, 12).unwrap();

        let json = proof.to_json().unwrap();
        assert!(json.contains("\"sibling_hashes\""));
        assert_eq!(Proof::from_json(&json).unwrap(), proof);

        let bytes = proof.to_bytes().unwrap();
        assert_eq!(Proof::from_bytes(&bytes).unwrap(), proof);
    }

    #[test]
    fn test_json_with_wrong_sibling_count_is_rejected() {
        let json = format!(
            r#"{{"target_address":0,"log2_target_size":3,"log2_root_size":5,
                "target_hash":"{h}","root_hash":"{h}","sibling_hashes":["{h}"]}}"#,
            h = Hash::zero().to_hex()
        );
        let err = Proof::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("expected 2 sibling hashes"));
    }
}
