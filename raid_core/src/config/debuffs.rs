//! Debuff table loading

use super::ConfigError;
use crate::effect::{DebuffDefinition, DebuffTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Container for debuff definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebuffsConfig {
    pub debuffs: Vec<DebuffDefinition>,
}

impl DebuffTable {
    /// Built-in Molten Core debuffs
    pub fn with_defaults() -> Self {
        let toml = include_str!("../../config/debuffs.toml");
        parse_debuff_configs(toml).unwrap_or_else(|err| {
            warn!(%err, "built-in debuff table failed to parse");
            DebuffTable::new()
        })
    }
}

fn into_table(config: DebuffsConfig) -> DebuffTable {
    let mut table = DebuffTable::new();
    for debuff in config.debuffs {
        table.register(debuff);
    }
    table
}

/// Load debuff definitions from a TOML file
pub fn load_debuff_configs(path: &Path) -> Result<DebuffTable, ConfigError> {
    let config: DebuffsConfig = super::load_toml(path)?;
    Ok(into_table(config))
}

/// Load debuff definitions from a TOML string
pub fn parse_debuff_configs(content: &str) -> Result<DebuffTable, ConfigError> {
    let config: DebuffsConfig = super::parse_toml(content)?;
    Ok(into_table(config))
}
