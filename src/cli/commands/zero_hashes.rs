//! Zero-hashes command implementation

use crate::cli::CliContext;
use anyhow::Result;
use colored::Colorize;

/// Execute the zero-hashes command
pub fn execute(ctx: &CliContext, max_level: Option<u32>, json: bool) -> Result<()> {
    let max_level = max_level.unwrap_or(ctx.config.tree.zero_table_max_level);
    let zeros = ctx.zero_hashes(max_level)?;
    let entries: Vec<_> = zeros
        .iter()
        .take_while(|(level, _)| *level <= max_level)
        .collect();

    if json {
        let output = serde_json::json!({
            "hash_function": ctx.hash_function.name(),
            "zero_hashes": entries
                .iter()
                .map(|(level, hash)| serde_json::json!({
                    "log2_size": level,
                    "hash": hash.to_hex(),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} ({})",
        "Pristine subtree hashes".bold(),
        ctx.hash_function.name().cyan()
    );
    for (level, hash) in entries {
        println!("  2^{:<3} {}", level, hash.to_hex().dimmed());
    }
    Ok(())
}
