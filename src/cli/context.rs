//! Options shared by every command

use crate::cli::Cli;
use crate::config::MerkleConfig;
use crate::core::error::Result;
use crate::core::hash::{HashFunction, HashPrimitive};
use crate::proofs::ZeroHashTable;
use std::path::PathBuf;

/// Resolved global options
#[derive(Debug, Clone)]
pub struct CliContext {
    pub config: MerkleConfig,
    pub config_path: Option<PathBuf>,
    pub hash_function: HashFunction,
    pub verbose: bool,
}

impl CliContext {
    /// Load configuration and apply command-line overrides
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => MerkleConfig::load_from(path)?,
            None => MerkleConfig::load()?,
        };
        Ok(Self {
            hash_function: cli.hash.unwrap_or(config.tree.hash_function),
            config_path: cli.config.clone(),
            config,
            verbose: cli.verbose,
        })
    }

    /// Zero-hash table reaching at least `2^min_level`
    pub fn zero_hashes(&self, min_level: u32) -> Result<ZeroHashTable<Box<dyn HashPrimitive>>> {
        let max_level = self.config.tree.zero_table_max_level.max(min_level);
        ZeroHashTable::build(self.hash_function.hasher(), max_level)
    }

    /// Page size for region hashing
    pub fn page_log2_size(&self) -> u32 {
        self.config.tree.page_log2_size
    }
}
