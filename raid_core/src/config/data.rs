//! All static tables bundled together

use super::{
    load_boss_configs, load_debuff_configs, load_item_configs, load_spell_configs, BossTable, ConfigError,
    ItemTable, SimConstants,
};
use crate::ai;
use crate::effect::DebuffTable;
use crate::spell::SpellBook;
use crate::types::WowClass;
use std::path::Path;
use tracing::{debug, info};

/// Read-only lookup tables the simulation queries by id
#[derive(Debug, Clone)]
pub struct GameData {
    pub constants: SimConstants,
    pub spells: SpellBook,
    pub debuffs: DebuffTable,
    pub bosses: BossTable,
    pub items: ItemTable,
}

impl Default for GameData {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GameData {
    /// Built-in tables
    pub fn builtin() -> Self {
        GameData {
            constants: SimConstants::default(),
            spells: SpellBook::with_defaults(),
            debuffs: DebuffTable::with_defaults(),
            bosses: BossTable::with_defaults(),
            items: ItemTable::with_defaults(),
        }
    }

    /// Load every table from `dir`, using the built-in table for missing files
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut data = Self::builtin();

        let path = dir.join("constants.toml");
        if path.exists() {
            data.constants = super::load_toml(&path)?;
        }
        let path = dir.join("spells.toml");
        if path.exists() {
            data.spells = load_spell_configs(&path)?;
        }
        let path = dir.join("debuffs.toml");
        if path.exists() {
            data.debuffs = load_debuff_configs(&path)?;
        }
        let path = dir.join("bosses.toml");
        if path.exists() {
            data.bosses = load_boss_configs(&path)?;
        }
        let path = dir.join("items.toml");
        if path.exists() {
            data.items = load_item_configs(&path)?;
        }

        info!(
            dir = %dir.display(),
            spells = data.spells.len(),
            debuffs = data.debuffs.len(),
            bosses = data.bosses.len(),
            items = data.items.len(),
            "loaded game data"
        );
        data.validate()?;
        Ok(data)
    }

    /// Check every cross-table reference resolves
    ///
    /// Missing icons are cosmetic and never reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        for boss in self.bosses.iter() {
            if boss.max_health <= 0.0 {
                problems.push(format!("boss {} has no health", boss.id));
            }
            for event in &boss.damage_events {
                if event.interval <= 0.0 {
                    problems.push(format!("{} ability {} has no interval", boss.id, event.name));
                }
            }
            for id in boss.debuff_ids() {
                if !self.debuffs.contains(id) {
                    problems.push(format!("boss {} references unknown debuff {id}", boss.id));
                }
            }
            for id in &boss.loot {
                if !self.items.contains(id) {
                    problems.push(format!("boss {} drops unknown item {id}", boss.id));
                }
            }
        }

        for class in WowClass::all().iter().filter(|c| c.is_healer_class()) {
            let Some(brain) = ai::ai_for_class(*class) else {
                continue;
            };
            for family in brain.families() {
                if self.spells.ranks(*class, *family).is_empty() {
                    problems.push(format!("{} AI needs {family:?} but no rank is defined", class.name()));
                }
            }
        }

        if problems.is_empty() {
            debug!("game data validated");
            Ok(())
        } else {
            Err(ConfigError::ValidationError(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encounter::{DamageEvent, DamageEventKind, TargetRule};
    use crate::types::School;
    use std::fs;

    #[test]
    fn test_builtin_is_valid() {
        GameData::builtin().validate().unwrap();
    }

    #[test]
    fn test_unknown_debuff_reported() {
        let mut data = GameData::builtin();
        data.bosses.bosses[0].damage_events.push(DamageEvent {
            name: "Typo".into(),
            kind: DamageEventKind::Debuff,
            damage: 0.0,
            interval: 5.0,
            school: School::Shadow,
            target_count: None,
            debuff_id: Some("impending_dom".into()),
            target: TargetRule::Random,
            active_in_phases: None,
        });
        match data.validate() {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("impending_dom")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dir_falls_back_per_file() {
        let dir = std::env::temp_dir().join(format!("raid_core_data_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("constants.toml"), "[timing]\ntick_ms = 50\n").unwrap();

        let data = GameData::load_dir(&dir).unwrap();
        assert_eq!(data.constants.tick_ms(), 50);
        assert_eq!(data.bosses.len(), BossTable::with_defaults().len());

        fs::remove_dir_all(&dir).unwrap();
    }
}
