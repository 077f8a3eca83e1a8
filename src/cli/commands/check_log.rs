//! Check-log command implementation

use crate::access_log::{AccessLog, AccessType};
use crate::cli::commands::read_input;
use crate::cli::CliContext;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the check-log command
pub fn execute(ctx: &CliContext, log: PathBuf, verify_proofs: bool, json: bool) -> Result<()> {
    let data = read_input(&log)?;
    let text = String::from_utf8(data).context("Access log is not valid UTF-8")?;
    let access_log = AccessLog::from_json(&text)?;

    let accesses = access_log.accesses();
    let writes = accesses
        .iter()
        .filter(|a| a.access_type() == AccessType::Write)
        .count();

    let mismatches = if verify_proofs {
        let hasher = ctx.hash_function.hasher();
        let outcomes = access_log.verify_proofs(&hasher)?;
        outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| !outcome.is_verified())
            .map(|(index, _)| index)
            .collect::<Vec<_>>()
    } else {
        Vec::new()
    };

    if json {
        let output = serde_json::json!({
            "valid": mismatches.is_empty(),
            "log_type": access_log.log_type(),
            "accesses": accesses.len(),
            "reads": accesses.len() - writes,
            "writes": writes,
            "brackets": access_log.brackets().len(),
            "notes": access_log.notes().len(),
            "proofs_checked": verify_proofs,
            "failed_proofs": mismatches,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "Access log".bold());
        println!(
            "  • Log type: proofs={}, annotations={}",
            access_log.log_type().proofs,
            access_log.log_type().annotations
        );
        println!(
            "  • Accesses: {} ({} reads, {} writes)",
            accesses.len(),
            accesses.len() - writes,
            writes
        );
        if access_log.log_type().annotations {
            println!(
                "  • Annotations: {} brackets, {} notes",
                access_log.brackets().len(),
                access_log.notes().len()
            );
        }
        if ctx.verbose {
            for (index, access) in accesses.iter().enumerate() {
                println!(
                    "    [{}] {} 2^{} at {:#x}",
                    index + 1,
                    access.access_type(),
                    access.log2_size(),
                    access.address()
                );
            }
        }
        if verify_proofs {
            if mismatches.is_empty() {
                println!("{}", "✓ All proofs verified".green());
            } else {
                for index in &mismatches {
                    println!("{}", format!("✗ Proof of access {} failed", index + 1).red());
                }
            }
        } else {
            println!("{}", "✓ Access log is well formed".green());
        }
    }

    if !mismatches.is_empty() {
        return Err(anyhow!("{} of {} proofs failed", mismatches.len(), accesses.len()));
    }
    Ok(())
}
