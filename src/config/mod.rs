//! Configuration management for mmproof
//!
//! Settings live in ~/.mmproof/config.toml; a missing file means defaults.

pub mod merkle_config;

// Re-export commonly used items
pub use merkle_config::{ConfigKey, LogConfig, MerkleConfig, TreeConfig};
