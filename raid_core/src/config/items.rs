//! Item table loading

use super::ConfigError;
use crate::encounter::BossDefinition;
use crate::raid::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Container for item definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsConfig {
    pub items: Vec<Item>,
}

/// Items by id
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    items: BTreeMap<String, Item>,
}

impl ItemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A boss's loot table; unknown ids are skipped
    pub fn loot_for(&self, boss: &BossDefinition) -> Vec<&Item> {
        boss.loot.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Built-in Molten Core loot
    pub fn with_defaults() -> Self {
        let toml = include_str!("../../config/items.toml");
        parse_item_configs(toml).unwrap_or_default()
    }
}

fn into_table(config: ItemsConfig) -> ItemTable {
    let mut table = ItemTable::new();
    for item in config.items {
        table.register(item);
    }
    table
}

/// Load item definitions from a TOML file
pub fn load_item_configs(path: &Path) -> Result<ItemTable, ConfigError> {
    let config: ItemsConfig = super::load_toml(path)?;
    Ok(into_table(config))
}

/// Load item definitions from a TOML string
pub fn parse_item_configs(content: &str) -> Result<ItemTable, ConfigError> {
    let config: ItemsConfig = super::parse_toml(content)?;
    Ok(into_table(config))
}
