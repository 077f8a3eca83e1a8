//! User configuration stored in ~/.mmproof/config.toml

use crate::core::error::{MerkleError, Result};
use crate::core::hash::HashFunction;
use crate::core::types::{LOG2_PAGE_SIZE, LOG2_ROOT_SIZE, LOG2_WORD_SIZE};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for mmproof
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerkleConfig {
    /// Tree geometry and hashing
    pub tree: TreeConfig,
    /// Logging
    pub log: LogConfig,
}

/// Tree configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Digest used for every node of the tree
    pub hash_function: HashFunction,
    /// Page size used when hashing regions
    pub page_log2_size: u32,
    /// Highest level of the zero-hash table
    pub zero_table_max_level: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            hash_function: HashFunction::default(),
            page_log2_size: LOG2_PAGE_SIZE,
            zero_table_max_level: LOG2_ROOT_SIZE,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration keys accepted by `mmproof config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TreeHashFunction,
    TreePageLog2Size,
    TreeZeroTableMaxLevel,
    LogLevel,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::TreeHashFunction,
        ConfigKey::TreePageLog2Size,
        ConfigKey::TreeZeroTableMaxLevel,
        ConfigKey::LogLevel,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "tree.hash_function" => Some(ConfigKey::TreeHashFunction),
            "tree.page_log2_size" => Some(ConfigKey::TreePageLog2Size),
            "tree.zero_table_max_level" => Some(ConfigKey::TreeZeroTableMaxLevel),
            "log.level" => Some(ConfigKey::LogLevel),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::TreeHashFunction => "tree.hash_function",
            ConfigKey::TreePageLog2Size => "tree.page_log2_size",
            ConfigKey::TreeZeroTableMaxLevel => "tree.zero_table_max_level",
            ConfigKey::LogLevel => "log.level",
        }
    }
}

fn parse_log2(key: ConfigKey, value: &str) -> Result<u32> {
    value.parse().map_err(|_| {
        MerkleError::configuration(format!("{} must be a non-negative integer", key.as_str()))
    })
}

impl MerkleConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            // Return default configuration if file doesn't exist
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MerkleError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: MerkleConfig = toml::from_str(&content)
            .map_err(|e| MerkleError::configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| MerkleError::configuration(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or(MerkleError::HomeDirectoryNotFound)?;
        Ok(user_dirs.home_dir().join(".mmproof").join("config.toml"))
    }

    /// Reject geometry the tree cannot represent
    pub fn validate(&self) -> Result<()> {
        let tree = &self.tree;
        if !(LOG2_WORD_SIZE..=LOG2_ROOT_SIZE).contains(&tree.zero_table_max_level) {
            return Err(MerkleError::configuration(format!(
                "tree.zero_table_max_level must be in {}..={}",
                LOG2_WORD_SIZE, LOG2_ROOT_SIZE
            )));
        }
        if !(LOG2_WORD_SIZE..=tree.zero_table_max_level).contains(&tree.page_log2_size) {
            return Err(MerkleError::configuration(format!(
                "tree.page_log2_size must be in {}..={}",
                LOG2_WORD_SIZE, tree.zero_table_max_level
            )));
        }
        if self.log.level.trim().is_empty() {
            return Err(MerkleError::configuration("log.level must not be empty"));
        }
        Ok(())
    }

    /// Get a configuration value as text
    pub fn get(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::TreeHashFunction => self.tree.hash_function.to_string(),
            ConfigKey::TreePageLog2Size => self.tree.page_log2_size.to_string(),
            ConfigKey::TreeZeroTableMaxLevel => self.tree.zero_table_max_level.to_string(),
            ConfigKey::LogLevel => self.log.level.clone(),
        }
    }

    /// Set a configuration value from text; the result must still validate
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            ConfigKey::TreeHashFunction => {
                updated.tree.hash_function = value.parse().map_err(|_| {
                    MerkleError::configuration(format!("unknown hash function '{}'", value))
                })?;
            }
            ConfigKey::TreePageLog2Size => updated.tree.page_log2_size = parse_log2(key, value)?,
            ConfigKey::TreeZeroTableMaxLevel => {
                updated.tree.zero_table_max_level = parse_log2(key, value)?
            }
            ConfigKey::LogLevel => updated.log.level = value.to_string(),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reset a value to its default
    pub fn unset(&mut self, key: ConfigKey) {
        let defaults = MerkleConfig::default();
        match key {
            ConfigKey::TreeHashFunction => self.tree.hash_function = defaults.tree.hash_function,
            ConfigKey::TreePageLog2Size => self.tree.page_log2_size = defaults.tree.page_log2_size,
            ConfigKey::TreeZeroTableMaxLevel => {
                self.tree.zero_table_max_level = defaults.tree.zero_table_max_level
            }
            ConfigKey::LogLevel => self.log.level = defaults.log.level,
        }
    }

    /// List all configuration values
    pub fn list(&self) -> Vec<(String, String)> {
        ConfigKey::ALL
            .iter()
            .map(|key| (key.as_str().to_string(), self.get(*key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = MerkleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tree.hash_function, HashFunction::Keccak256);
        assert_eq!(config.tree.page_log2_size, 12);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = MerkleConfig::default();
        config.set(ConfigKey::TreeHashFunction, "sha256").unwrap();
        config.set(ConfigKey::TreePageLog2Size, "10").unwrap();
        config.save_to(&path).unwrap();

        let loaded = MerkleConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();
        let loaded = MerkleConfig::load_from(&path).unwrap();
        assert_eq!(loaded.log.level, "debug");
        assert_eq!(loaded.tree, TreeConfig::default());
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let mut config = MerkleConfig::default();
        assert!(config.set(ConfigKey::TreePageLog2Size, "2").is_err());
        assert!(config.set(ConfigKey::TreeZeroTableMaxLevel, "65").is_err());
        assert!(config.set(ConfigKey::TreeHashFunction, "md5").is_err());
        assert_eq!(config, MerkleConfig::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = MerkleConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, MerkleError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_key_names_roundtrip() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ConfigKey::parse("user.name"), None);
    }
}
