//! mmproof CLI
//!
//! Command-line interface for hashing machine memory and checking Merkle proofs.

use anyhow::Result;
use clap::Parser;
use machine_merkle::cli::{self, Cli, CliContext, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { level };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(fallback))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    if let Commands::Config {
        key,
        value,
        list,
        unset,
        show_origin,
    } = cli.command
    {
        init_logging("info", cli.verbose);
        return cli::commands::config::execute(cli.config, key, value, list, unset, show_origin);
    }

    let ctx = CliContext::from_cli(&cli)?;
    init_logging(&ctx.config.log.level, ctx.verbose);

    // Execute the command
    match cli.command {
        Commands::ZeroHashes { max_level, json } => {
            cli::commands::zero_hashes::execute(&ctx, max_level, json)
        }
        Commands::HashRegion {
            file,
            address,
            log2_size,
            tree_log2_size,
            json,
        } => cli::commands::hash_region::execute(
            &ctx,
            file,
            address,
            log2_size,
            tree_log2_size,
            json,
        ),
        Commands::Prove {
            file,
            region_address,
            region_log2_size,
            target_address,
            log2_target_size,
            output,
        } => cli::commands::prove::execute(
            &ctx,
            file,
            region_address,
            region_log2_size,
            target_address,
            log2_target_size,
            output,
        ),
        Commands::VerifyProof {
            proof,
            root,
            target,
        } => cli::commands::verify_proof::execute(&ctx, proof, root, target),
        Commands::CheckLog {
            log,
            verify_proofs,
            json,
        } => cli::commands::check_log::execute(&ctx, log, verify_proofs, json),
        Commands::Config { .. } => Ok(()),
    }
}
