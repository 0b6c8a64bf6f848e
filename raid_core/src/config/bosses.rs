//! Boss table loading

use super::ConfigError;
use crate::encounter::{BossDefinition, DamageEvent, DamageEventKind, ScriptKind, TargetRule};
use crate::types::School;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bosses in progression order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BossTable {
    pub bosses: Vec<BossDefinition>,
}

impl BossTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boss, replacing one with the same id in place
    pub fn register(&mut self, boss: BossDefinition) {
        match self.bosses.iter_mut().find(|b| b.id == boss.id) {
            Some(existing) => *existing = boss,
            None => self.bosses.push(boss),
        }
    }

    pub fn get(&self, id: &str) -> Option<&BossDefinition> {
        self.bosses.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BossDefinition> {
        self.bosses.iter()
    }

    pub fn len(&self) -> usize {
        self.bosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }

    /// First boss not in `defeated`
    pub fn next_boss(&self, defeated: &[String]) -> Option<&BossDefinition> {
        self.bosses.iter().find(|b| !defeated.contains(&b.id))
    }

    /// Built-in Molten Core encounters
    pub fn with_defaults() -> Self {
        let toml = include_str!("../../config/bosses.toml");
        parse_boss_configs(toml).unwrap_or_else(|_| {
            let mut table = BossTable::new();
            table.register(lucifron());
            table
        })
    }
}

fn lucifron() -> BossDefinition {
    BossDefinition {
        id: "lucifron".to_string(),
        name: "Lucifron".to_string(),
        max_health: 350_000.0,
        enrage_timer: 300.0,
        damage_events: vec![DamageEvent {
            name: "Melee".to_string(),
            kind: DamageEventKind::TankDamage,
            damage: 1200.0,
            interval: 2.0,
            school: School::Physical,
            target_count: None,
            debuff_id: None,
            target: TargetRule::Tank,
            active_in_phases: None,
        }],
        phase_transitions: Vec::new(),
        script: ScriptKind::Standard,
        loot: Vec::new(),
        drops: 0,
        icon: None,
    }
}

/// Load boss definitions from a TOML file
pub fn load_boss_configs(path: &Path) -> Result<BossTable, ConfigError> {
    let table: BossTable = super::load_toml(path)?;
    Ok(table)
}

/// Load boss definitions from a TOML string
pub fn parse_boss_configs(content: &str) -> Result<BossTable, ConfigError> {
    let table: BossTable = super::parse_toml(content)?;
    Ok(table)
}
