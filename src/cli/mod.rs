//! Command-line interface for mmproof

use crate::core::hash::HashFunction;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod context;

pub use context::CliContext;

/// mmproof - Merkle proofs over a machine's 2^64-byte address space
#[derive(Parser)]
#[command(
    name = "mmproof",
    version,
    about = "Hash machine memory regions and produce or check Merkle proofs",
    long_about = "mmproof hashes memory regions of a 2^64-byte address space whose untouched parts are pristine, builds Merkle proofs for aligned nodes, and checks proofs and access logs against a root hash."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a configuration file (default: ~/.mmproof/config.toml)
    #[arg(long, global = true, env = "MMPROOF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hash function: keccak256 or sha256 (default: from configuration)
    #[arg(long, global = true)]
    pub hash: Option<HashFunction>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the hashes of pristine subtrees
    ZeroHashes {
        /// Highest log2 size to print
        #[arg(long)]
        max_level: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hash a file as a memory region
    HashRegion {
        /// File holding the region's leading bytes
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Address of the region
        #[arg(long, default_value = "0", value_parser = parse_address)]
        address: u64,

        /// log2 of the region size (default: smallest that fits the file)
        #[arg(long)]
        log2_size: Option<u32>,

        /// log2 of an enclosing pristine tree to extend the hash into
        #[arg(long)]
        tree_log2_size: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a proof for a node of a memory image
    Prove {
        /// File holding the region's leading bytes
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Address the file is mapped at
        #[arg(long, default_value = "0", value_parser = parse_address)]
        region_address: u64,

        /// log2 of the region size (default: smallest that fits the file)
        #[arg(long)]
        region_log2_size: Option<u32>,

        /// Address of the node to prove
        #[arg(long, value_parser = parse_address)]
        target_address: u64,

        /// log2 of the size of the node to prove
        #[arg(long, default_value = "3")]
        log2_target_size: u32,

        /// Write the proof to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a proof
    VerifyProof {
        /// Proof file to verify ("-" for stdin)
        #[arg(value_name = "PROOF")]
        proof: PathBuf,

        /// Expected root hash
        #[arg(long)]
        root: Option<String>,

        /// Expected target hash
        #[arg(long)]
        target: Option<String>,
    },

    /// Validate an access log
    CheckLog {
        /// Access log file ("-" for stdin)
        #[arg(value_name = "LOG")]
        log: PathBuf,

        /// Check the proof of every access
        #[arg(long)]
        verify_proofs: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get and set configuration values
    Config {
        /// Configuration key to get/set
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,

        /// Reset a configuration value to its default
        #[arg(long)]
        unset: bool,

        /// Show configuration file location
        #[arg(long)]
        show_origin: bool,
    },
}

/// Parse a decimal or 0x-prefixed hexadecimal address
pub fn parse_address(value: &str) -> std::result::Result<u64, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex_digits) => u64::from_str_radix(&hex_digits.replace('_', ""), 16),
        None => value.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("4096"), Ok(4096));
        assert_eq!(parse_address("0x8000_0000"), Ok(0x8000_0000));
        assert_eq!(parse_address("0XFF"), Ok(255));
        assert!(parse_address("0xZZ").is_err());
        assert!(parse_address("-1").is_err());
    }
}
