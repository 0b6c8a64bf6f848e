//! Configuration loading from TOML files

mod bosses;
mod constants;
mod data;
mod debuffs;
mod items;
mod spells;

pub use bosses::{load_boss_configs, parse_boss_configs, BossTable};
pub use constants::{
    AiThresholds, CritConstants, EncounterConstants, LootConstants, RegenConstants, SimConstants,
    TimingConstants,
};
pub use data::GameData;
pub use debuffs::{load_debuff_configs, parse_debuff_configs};
pub use items::{load_item_configs, parse_item_configs, ItemTable};
pub use spells::{load_spell_configs, parse_spell_configs};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to read or write JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}
