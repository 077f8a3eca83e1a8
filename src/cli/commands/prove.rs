//! Prove command implementation

use crate::cli::commands::{fitting_log2_size, read_input};
use crate::cli::CliContext;
use crate::core::types::LOG2_ROOT_SIZE;
use crate::proofs::{MemoryImage, MemoryRegion};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the prove command
pub fn execute(
    ctx: &CliContext,
    file: PathBuf,
    region_address: u64,
    region_log2_size: Option<u32>,
    target_address: u64,
    log2_target_size: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let data = read_input(&file)?;
    let region_log2_size = match region_log2_size {
        Some(log2_size) => log2_size,
        None => fitting_log2_size(data.len())?,
    };

    let zeros = ctx.zero_hashes(LOG2_ROOT_SIZE)?;
    let mut image = MemoryImage::new(&zeros, ctx.page_log2_size())?;
    image.add_region(MemoryRegion::new(region_address, region_log2_size, data)?)?;
    let proof = image.prove(target_address, log2_target_size)?;
    let json = proof.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("Failed to write proof to {}", path.display()))?;
            eprintln!("{}", "✓ Proof generated".green());
            eprintln!("  • Target: 2^{} at {:#x}", log2_target_size, target_address);
            eprintln!("  • Root hash: {}", proof.root_hash().to_hex().cyan());
            eprintln!("  • Written to: {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
