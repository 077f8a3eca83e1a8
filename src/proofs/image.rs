//! Sparse image of the full 2^64 machine address space
//!
//! Only a handful of dyadic regions (ROM, RAM, device shadows, ...) hold
//! real bytes; everything else is pristine and is represented by the
//! zero-hash table. Any aligned node of the tree can be hashed and proved
//! without materializing pristine memory.

use crate::access_log::types::Access;
use crate::core::{error::*, hash::HashPrimitive, types::*};
use crate::proofs::incremental::calculate_region_hash;
use crate::proofs::proof::Proof;
use crate::proofs::region::calculate_padded_root_hash;
use crate::proofs::zero_hash::ZeroHashTable;
use once_cell::unsync::OnceCell;
use tracing::debug;

/// A dyadic range of memory backed by bytes
///
/// `data` holds the leading bytes of the region; the remainder is pristine.
#[derive(Debug, Clone)]
pub struct MemoryRegion {
    address: u64,
    log2_size: u32,
    data: Vec<u8>,
    root_hash: OnceCell<Hash>,
}

impl MemoryRegion {
    /// Create a region of `2^log2_size` bytes at `address`
    pub fn new(address: u64, log2_size: u32, data: Vec<u8>) -> Result<Self> {
        if !(LOG2_WORD_SIZE..=LOG2_ROOT_SIZE).contains(&log2_size) {
            return Err(MerkleError::log2_out_of_range(
                log2_size,
                LOG2_WORD_SIZE,
                LOG2_ROOT_SIZE,
            ));
        }
        if !is_aligned(address, log2_size) {
            return Err(MerkleError::misaligned(address, log2_size));
        }
        if data.len() as u128 > 1u128 << log2_size {
            return Err(MerkleError::InvalidBufferSize {
                expected: 1u64.checked_shl(log2_size).unwrap_or(u64::MAX),
                actual: data.len() as u64,
            });
        }
        Ok(Self {
            address,
            log2_size,
            data,
            root_hash: OnceCell::new(),
        })
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn log2_size(&self) -> u32 {
        self.log2_size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Last address of the region (inclusive)
    pub fn last_address(&self) -> u64 {
        self.address | low_mask(self.log2_size)
    }

    fn contains(&self, address: u64, log2_size: u32) -> bool {
        log2_size <= self.log2_size && align_down(address, self.log2_size) == self.address
    }

    fn overlaps(&self, other: &MemoryRegion) -> bool {
        self.address <= other.last_address() && other.address <= self.last_address()
    }
}

/// Sparse memory made of non-overlapping regions over a pristine background
#[derive(Debug)]
pub struct MemoryImage<'a, H> {
    zeros: &'a ZeroHashTable<H>,
    page_log2_size: u32,
    regions: Vec<MemoryRegion>,
}

impl<'a, H: HashPrimitive> MemoryImage<'a, H> {
    /// Create an all-pristine image
    pub fn new(zeros: &'a ZeroHashTable<H>, page_log2_size: u32) -> Result<Self> {
        if zeros.max_level() < LOG2_ROOT_SIZE {
            return Err(MerkleError::invalid_geometry(format!(
                "zero hash table only reaches 2^{}",
                zeros.max_level()
            )));
        }
        if !(LOG2_WORD_SIZE..=LOG2_ROOT_SIZE).contains(&page_log2_size) {
            return Err(MerkleError::log2_out_of_range(
                page_log2_size,
                LOG2_WORD_SIZE,
                LOG2_ROOT_SIZE,
            ));
        }
        Ok(Self {
            zeros,
            page_log2_size,
            regions: Vec::new(),
        })
    }

    /// Map a region; it must not overlap any region already mapped
    pub fn add_region(&mut self, region: MemoryRegion) -> Result<()> {
        if self.regions.iter().any(|r| r.overlaps(&region)) {
            return Err(MerkleError::RegionOverlap {
                address: region.address,
            });
        }
        debug!(
            address = region.address,
            log2_size = region.log2_size,
            bytes = region.data.len(),
            "region mapped"
        );
        self.regions.push(region);
        self.regions.sort_by_key(|r| r.address);
        Ok(())
    }

    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn zero_hashes(&self) -> &ZeroHashTable<H> {
        self.zeros
    }

    fn region_root_hash(&self, region: &MemoryRegion) -> Result<Hash> {
        region
            .root_hash
            .get_or_try_init(|| {
                if region.log2_size >= self.page_log2_size {
                    calculate_region_hash(
                        self.zeros,
                        &region.data,
                        self.page_log2_size,
                        region.log2_size,
                    )
                } else {
                    calculate_padded_root_hash(self.zeros.hasher(), &region.data, region.log2_size)
                }
            })
            .copied()
    }

    fn hash_inside_region(&self, region: &MemoryRegion, address: u64, log2_size: u32) -> Result<Hash> {
        if log2_size == region.log2_size {
            return self.region_root_hash(region);
        }
        let offset = (address - region.address) as usize;
        if offset >= region.data.len() {
            return self.zeros.get(log2_size);
        }
        let size = size_of_log2(log2_size)
            .ok_or_else(|| MerkleError::invalid_geometry("node too large to materialize"))?;
        let end = region.data.len().min(offset.saturating_add(size));
        let bytes = &region.data[offset..end];
        if log2_size >= self.page_log2_size {
            calculate_region_hash(self.zeros, bytes, self.page_log2_size, log2_size)
        } else {
            calculate_padded_root_hash(self.zeros.hasher(), bytes, log2_size)
        }
    }

    /// Hash of the aligned `2^log2_size` node at `address`
    pub fn node_hash(&self, address: u64, log2_size: u32) -> Result<Hash> {
        if !(LOG2_WORD_SIZE..=LOG2_ROOT_SIZE).contains(&log2_size) {
            return Err(MerkleError::log2_out_of_range(
                log2_size,
                LOG2_WORD_SIZE,
                LOG2_ROOT_SIZE,
            ));
        }
        if !is_aligned(address, log2_size) {
            return Err(MerkleError::misaligned(address, log2_size));
        }
        self.node_hash_aligned(address, log2_size)
    }

    fn node_hash_aligned(&self, address: u64, log2_size: u32) -> Result<Hash> {
        let last = address | low_mask(log2_size);
        let mut intersects = false;
        for region in &self.regions {
            if region.contains(address, log2_size) {
                return self.hash_inside_region(region, address, log2_size);
            }
            if region.address <= last && address <= region.last_address() {
                intersects = true;
            }
        }
        if !intersects {
            return self.zeros.get(log2_size);
        }
        // The node strictly contains at least one region
        let half = log2_size - 1;
        let left = self.node_hash_aligned(address, half)?;
        let right = self.node_hash_aligned(address | (1u64 << half), half)?;
        Ok(self.zeros.hasher().merge(&left, &right))
    }

    /// Root hash of the whole address space
    pub fn root_hash(&self) -> Result<Hash> {
        self.node_hash_aligned(0, LOG2_ROOT_SIZE)
    }

    /// Proof for the aligned `2^log2_target_size` node at `target_address`
    pub fn prove(&self, target_address: u64, log2_target_size: u32) -> Result<Proof> {
        let target_hash = self.node_hash(target_address, log2_target_size)?;
        Proof::build(
            self.zeros.hasher(),
            target_address,
            log2_target_size,
            LOG2_ROOT_SIZE,
            target_hash,
            |address, level| self.node_hash_aligned(address, level),
        )
    }

    fn region_for(&self, address: u64, length: u64) -> Result<usize> {
        let last = address
            .checked_add(length.saturating_sub(1))
            .ok_or(MerkleError::AddressNotMapped { address, length })?;
        self.regions
            .iter()
            .position(|r| r.address <= address && last <= r.last_address())
            .ok_or(MerkleError::AddressNotMapped { address, length })
    }

    /// Bytes of the aligned `2^log2_size` node at `address`
    pub fn read(&self, address: u64, log2_size: u32) -> Result<Vec<u8>> {
        if !(LOG2_WORD_SIZE..=LOG2_ROOT_SIZE).contains(&log2_size) {
            return Err(MerkleError::log2_out_of_range(
                log2_size,
                LOG2_WORD_SIZE,
                LOG2_ROOT_SIZE,
            ));
        }
        if !is_aligned(address, log2_size) {
            return Err(MerkleError::misaligned(address, log2_size));
        }
        let size = size_of_log2(log2_size)
            .ok_or_else(|| MerkleError::invalid_geometry("node too large to materialize"))?;
        let mut bytes = vec![0u8; size];
        let last = address | low_mask(log2_size);
        for region in &self.regions {
            if region.address > last || region.last_address() < address {
                continue;
            }
            // Copy the overlap between the node and the region's backed bytes
            let start = region.address.max(address);
            let backed_end = region.address.saturating_add(region.data.len() as u64);
            let end = backed_end.min(last.saturating_add(1));
            if start >= end {
                continue;
            }
            let src = (start - region.address) as usize..(end - region.address) as usize;
            let dst = (start - address) as usize;
            bytes[dst..dst + src.len()].copy_from_slice(&region.data[src]);
        }
        Ok(bytes)
    }

    /// Overwrite bytes at `address`; the range must lie inside one region
    pub fn write(&mut self, address: u64, bytes: &[u8]) -> Result<()> {
        let index = self.region_for(address, bytes.len() as u64)?;
        let region = &mut self.regions[index];
        let offset = (address - region.address) as usize;
        let end = offset + bytes.len();
        if end > region.data.len() {
            region.data.resize(end, 0);
        }
        region.data[offset..end].copy_from_slice(bytes);
        region.root_hash.take();
        Ok(())
    }

    /// Record a read of the `2^log2_size` node at `address`
    pub fn read_access(&self, address: u64, log2_size: u32, with_proof: bool) -> Result<Access> {
        let read = self.read(address, log2_size)?;
        let proof = if with_proof {
            Some(self.prove(address, log2_size)?)
        } else {
            None
        };
        Access::new_read(address, log2_size, read, proof)
    }

    /// Record and apply a write of `written` to the `2^log2_size` node at `address`.
    ///
    /// The proof, if requested, is taken against the state before the write.
    pub fn write_access(
        &mut self,
        address: u64,
        log2_size: u32,
        written: Vec<u8>,
        with_proof: bool,
    ) -> Result<Access> {
        let read = self.read(address, log2_size)?;
        let proof = if with_proof {
            Some(self.prove(address, log2_size)?)
        } else {
            None
        };
        let access = Access::new_write(address, log2_size, read, written, proof)?;
        self.write(address, access.written().unwrap_or_default())?;
        Ok(access)
    }
}
