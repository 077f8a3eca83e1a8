//! Configuration command implementation

use crate::config::{ConfigKey, MerkleConfig};
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Execute the config command
pub fn execute(
    config_path: Option<PathBuf>,
    key: Option<String>,
    value: Option<String>,
    list: bool,
    unset: bool,
    show_origin: bool,
) -> Result<()> {
    let config_path = match config_path {
        Some(path) => path,
        None => MerkleConfig::get_config_path()?,
    };
    let mut config = if config_path.exists() {
        MerkleConfig::load_from(&config_path)?
    } else {
        MerkleConfig::default()
    };

    if show_origin {
        println!(
            "{}: {}",
            "Configuration file".bold(),
            config_path.display().to_string().cyan()
        );
        if config_path.exists() {
            println!("{}: {}", "Status".bold(), "exists".green());
        } else {
            println!("{}: {}", "Status".bold(), "not created yet".yellow());
        }
        return Ok(());
    }

    if list {
        for (key, value) in config.list() {
            println!("{} = {}", key.bold(), value.cyan());
        }
        return Ok(());
    }

    let Some(key_str) = key else {
        println!("{}", "Configuration Management".green().bold());
        println!();
        println!("{}", "Usage:".bold());
        println!("  {} Get value", "mmproof config <key>".cyan());
        println!("  {} Set value", "mmproof config <key> <value>".cyan());
        println!("  {} List all", "mmproof config --list".cyan());
        println!("  {} Reset value", "mmproof config --unset <key>".cyan());
        println!();
        println!("{}", "Keys:".bold());
        for key in ConfigKey::ALL {
            println!("  {}", key.as_str().green());
        }
        return Ok(());
    };

    let config_key = ConfigKey::parse(&key_str)
        .ok_or_else(|| anyhow!("Invalid configuration key: {}", key_str))?;

    if unset {
        config.unset(config_key);
        config.save_to(&config_path)?;
        println!("{} {}", "✓".green(), format!("Unset {}", key_str).bold());
    } else if let Some(value) = value {
        config.set(config_key, &value)?;
        config.save_to(&config_path)?;
        println!("{} {} = {}", "✓".green(), key_str.bold(), value.cyan());
    } else {
        println!("{}", config.get(config_key));
    }
    Ok(())
}
