//! Hash-region command implementation

use crate::cli::commands::{fitting_log2_size, read_input};
use crate::cli::CliContext;
use crate::core::error::MerkleError;
use crate::proofs::{calculate_region_hash, extend_region_hash};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Execute the hash-region command
pub fn execute(
    ctx: &CliContext,
    file: PathBuf,
    address: u64,
    log2_size: Option<u32>,
    tree_log2_size: Option<u32>,
    json: bool,
) -> Result<()> {
    let data = read_input(&file)?;
    let log2_size = match log2_size {
        Some(log2_size) => log2_size,
        None => fitting_log2_size(data.len())?,
    };
    let tree_log2_size = tree_log2_size.unwrap_or(log2_size);
    if tree_log2_size < log2_size {
        return Err(MerkleError::log2_out_of_range(tree_log2_size, log2_size, 64).into());
    }

    let zeros = ctx.zero_hashes(tree_log2_size)?;
    let page_log2_size = ctx.page_log2_size().min(log2_size);
    let region_hash = calculate_region_hash(&zeros, &data, page_log2_size, log2_size)?;
    let tree_hash = extend_region_hash(&zeros, region_hash, address, log2_size, tree_log2_size)?;

    if json {
        let output = serde_json::json!({
            "file": file.display().to_string(),
            "bytes": data.len(),
            "address": format!("{:#x}", address),
            "log2_size": log2_size,
            "tree_log2_size": tree_log2_size,
            "hash_function": ctx.hash_function.name(),
            "region_hash": region_hash.to_hex(),
            "tree_hash": tree_hash.to_hex(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Region hash".bold());
    println!("  • File: {} ({} bytes)", file.display(), data.len());
    println!("  • Region: 2^{} bytes at {:#x}", log2_size, address);
    if ctx.verbose {
        println!("  • Page size: 2^{}", page_log2_size);
        println!("  • Hash function: {}", ctx.hash_function.name());
    }
    println!("  • Region hash: {}", region_hash.to_hex().cyan());
    if tree_log2_size > log2_size {
        println!(
            "  • Hash of enclosing 2^{} tree: {}",
            tree_log2_size,
            tree_hash.to_hex().cyan()
        );
    }
    Ok(())
}
