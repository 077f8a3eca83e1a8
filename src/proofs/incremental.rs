//! Incremental Merkle tree of pages
//!
//! Pages are folded into the tree strictly in address order. Only one carry
//! hash per level is kept, so a tree of `2^depth` pages is hashed in
//! `O(depth)` memory. Pages that were never added are treated as pristine.

use crate::core::{error::*, hash::HashPrimitive, types::*};
use crate::proofs::region::calculate_padded_root_hash;
use crate::proofs::zero_hash::ZeroHashTable;
use rayon::prelude::*;
use tracing::{debug, trace};

/// Streaming accumulator of page hashes
///
/// Bit `i` of `page_count` is set iff `carry[i]` holds the hash of a closed
/// block of `2^i` pages ending at the current position.
#[derive(Debug, Clone)]
pub struct IncrementalPageTree<'a, H> {
    zeros: &'a ZeroHashTable<H>,
    carry: Vec<Hash>,
    page_log2_size: u32,
    tree_log2_size: u32,
    page_count: u64,
    max_pages: u64,
}

impl<'a, H: HashPrimitive> IncrementalPageTree<'a, H> {
    /// Create an empty tree of `2^tree_log2_size` bytes made of `2^page_log2_size` pages
    pub fn new(
        zeros: &'a ZeroHashTable<H>,
        page_log2_size: u32,
        tree_log2_size: u32,
    ) -> Result<Self> {
        if page_log2_size < LOG2_WORD_SIZE || page_log2_size > tree_log2_size {
            return Err(MerkleError::log2_out_of_range(
                page_log2_size,
                LOG2_WORD_SIZE,
                tree_log2_size,
            ));
        }
        if tree_log2_size > zeros.max_level() {
            return Err(MerkleError::log2_out_of_range(
                tree_log2_size,
                page_log2_size,
                zeros.max_level(),
            ));
        }
        let depth = tree_log2_size - page_log2_size;
        if depth >= u64::BITS {
            return Err(MerkleError::invalid_geometry(format!(
                "a tree of 2^{} pages cannot be counted",
                depth
            )));
        }
        Ok(Self {
            zeros,
            carry: vec![Hash::zero(); depth as usize + 1],
            page_log2_size,
            tree_log2_size,
            page_count: 0,
            max_pages: 1u64 << depth,
        })
    }

    fn depth(&self) -> u32 {
        self.tree_log2_size - self.page_log2_size
    }

    /// Append the hash of the next page
    pub fn add_page(&mut self, page_hash: Hash) -> Result<()> {
        if self.page_count >= self.max_pages {
            return Err(MerkleError::CapacityExceeded {
                max_pages: self.max_pages,
            });
        }
        let hasher = self.zeros.hasher();
        let mut right = page_hash;
        for level in 0..=self.depth() {
            if self.page_count & (1u64 << level) != 0 {
                right = hasher.merge(&self.carry[level as usize], &right);
            } else {
                self.carry[level as usize] = right;
                break;
            }
        }
        self.page_count += 1;
        trace!(page_count = self.page_count, "page added");
        Ok(())
    }

    /// Root hash of the tree with every missing trailing page pristine
    pub fn root_hash(&self) -> Result<Hash> {
        if self.page_count > self.max_pages {
            return Err(MerkleError::invariant(format!(
                "page count {} exceeds max pages {}",
                self.page_count, self.max_pages
            )));
        }
        let depth = self.depth();
        if self.page_count == self.max_pages {
            return Ok(self.carry[depth as usize]);
        }
        let hasher = self.zeros.hasher();
        let mut root = self.zeros.get(self.page_log2_size)?;
        for level in 0..depth {
            if self.page_count & (1u64 << level) != 0 {
                root = hasher.merge(&self.carry[level as usize], &root);
            } else {
                let pristine = self.zeros.get(self.page_log2_size + level)?;
                root = hasher.merge(&root, &pristine);
            }
        }
        Ok(root)
    }

    /// Number of pages added so far
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// Number of pages the tree can hold
    pub fn max_pages(&self) -> u64 {
        self.max_pages
    }

    pub fn page_log2_size(&self) -> u32 {
        self.page_log2_size
    }

    pub fn tree_log2_size(&self) -> u32 {
        self.tree_log2_size
    }

    pub fn is_full(&self) -> bool {
        self.page_count == self.max_pages
    }
}

/// Hash a region whose contents are `data` followed by pristine memory.
///
/// `data` is cut into `2^page_log2_size` pages (the last one zero-padded),
/// pages are hashed in parallel and folded in order into a tree of
/// `2^tree_log2_size` bytes.
pub fn calculate_region_hash<H: HashPrimitive>(
    zeros: &ZeroHashTable<H>,
    data: &[u8],
    page_log2_size: u32,
    tree_log2_size: u32,
) -> Result<Hash> {
    let mut tree = IncrementalPageTree::new(zeros, page_log2_size, tree_log2_size)?;
    let page_size = size_of_log2(page_log2_size)
        .ok_or_else(|| MerkleError::invalid_geometry("page too large to materialize"))?;
    let page_count = data.len().div_ceil(page_size) as u64;
    if page_count > tree.max_pages() {
        return Err(MerkleError::CapacityExceeded {
            max_pages: tree.max_pages(),
        });
    }

    let hasher = zeros.hasher();
    let page_hashes = data
        .par_chunks(page_size)
        .map(|page| calculate_padded_root_hash(hasher, page, page_log2_size))
        .collect::<Result<Vec<Hash>>>()?;

    for page_hash in page_hashes {
        tree.add_page(page_hash)?;
    }
    debug!(
        pages = tree.page_count(),
        max_pages = tree.max_pages(),
        tree_log2_size,
        "region hashed"
    );
    tree.root_hash()
}
