//! CLI command implementations

pub mod check_log;
pub mod config;
pub mod hash_region;
pub mod prove;
pub mod verify_proof;
pub mod zero_hashes;

// Common utilities for commands
use crate::core::types::{LOG2_ROOT_SIZE, LOG2_WORD_SIZE};
use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::Path;

/// Read a whole file, or stdin when the path is "-"
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer)?;
        return Ok(buffer);
    }
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Smallest log2 size, at least a word, that holds `len` bytes
pub fn fitting_log2_size(len: usize) -> Result<u32> {
    let log2_size = (len.max(1) as u64)
        .checked_next_power_of_two()
        .map(|size| size.trailing_zeros())
        .ok_or_else(|| anyhow!("{} bytes do not fit the address space", len))?;
    Ok(log2_size.clamp(LOG2_WORD_SIZE, LOG2_ROOT_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 3)]
    #[case(1, 3)]
    #[case(8, 3)]
    #[case(9, 4)]
    #[case(4096, 12)]
    #[case(4097, 13)]
    fn test_fitting_log2_size(#[case] len: usize, #[case] expected: u32) {
        assert_eq!(fitting_log2_size(len).unwrap(), expected);
    }
}
