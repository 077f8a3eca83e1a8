//! Verify-proof command implementation

use crate::cli::commands::read_input;
use crate::cli::CliContext;
use crate::core::types::Hash;
use crate::proofs::{Proof, VerificationOutcome};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

fn expected_hash(name: &str, hex: &str, actual: &Hash) -> Result<()> {
    let expected =
        Hash::from_hex(hex).with_context(|| format!("Invalid expected {} hash format", name))?;
    if expected != *actual {
        println!("{}", format!("✗ {} hash mismatch", name).red());
        return Err(anyhow!("proof {} hash is {}, expected {}", name, actual, expected));
    }
    Ok(())
}

/// Execute the verify-proof command
pub fn execute(
    ctx: &CliContext,
    proof: PathBuf,
    root: Option<String>,
    target: Option<String>,
) -> Result<()> {
    let data = read_input(&proof)?;
    let text = String::from_utf8(data).context("Proof is not valid UTF-8")?;
    let proof = Proof::from_json(&text)?;

    if ctx.verbose {
        println!("  • Target: 2^{} at {:#x}", proof.log2_target_size(), proof.target_address());
        println!("  • Tree: 2^{}", proof.log2_root_size());
        println!("  • Target hash: {}", proof.target_hash().to_hex().cyan());
        println!("  • Root hash: {}", proof.root_hash().to_hex().cyan());
        println!("  • Sibling hashes: {}", proof.sibling_hashes().len());
    }

    if let Some(target) = &target {
        expected_hash("target", target, proof.target_hash())?;
    }
    if let Some(root) = &root {
        expected_hash("root", root, proof.root_hash())?;
    }

    let hasher = ctx.hash_function.hasher();
    match proof.verify(&hasher) {
        VerificationOutcome::Verified => {
            println!("{}", "✓ Proof verification successful!".green());
            Ok(())
        }
        VerificationOutcome::Mismatch { claimed, computed } => {
            println!("{}", "✗ Proof verification failed!".red());
            if ctx.verbose {
                println!("  • Claimed root:  {}", claimed);
                println!("  • Computed root: {}", computed);
            }
            Err(anyhow!(
                "recomputed root {} does not match claimed root {}",
                computed,
                claimed
            ))
        }
    }
}
