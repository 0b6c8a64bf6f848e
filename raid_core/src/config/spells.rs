//! Spell table loading

use super::ConfigError;
use crate::spell::{Spell, SpellBook};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Container for spell definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellsConfig {
    pub spells: Vec<Spell>,
}

impl SpellBook {
    /// Built-in healer spells (level 60 ranks)
    pub fn with_defaults() -> Self {
        let toml = include_str!("../../config/spells.toml");
        parse_spell_configs(toml).unwrap_or_else(|err| {
            warn!(%err, "built-in spell table failed to parse");
            SpellBook::new()
        })
    }
}

fn into_book(config: SpellsConfig) -> SpellBook {
    let mut book = SpellBook::new();
    for spell in config.spells {
        book.register(spell);
    }
    book
}

/// Load spell definitions from a TOML file
pub fn load_spell_configs(path: &Path) -> Result<SpellBook, ConfigError> {
    let config: SpellsConfig = super::load_toml(path)?;
    Ok(into_book(config))
}

/// Load spell definitions from a TOML string
pub fn parse_spell_configs(content: &str) -> Result<SpellBook, ConfigError> {
    let config: SpellsConfig = super::parse_toml(content)?;
    Ok(into_book(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::BuffEffect;
    use crate::spell::{AmountRange, BuffTarget, RankChoice, SpellFamily};
    use crate::types::WowClass;

    #[test]
    fn test_parse_spells() {
        let toml = r#"
[[spells]]
id = "flash_of_light_r6"
name = "Flash of Light"
family = "flash_of_light"
rank = 6
class = "paladin"
mana_cost = 140
cast_time = 1.5
spell_power_coefficient = 0.43
heal = { min = 346, max = 386 }

[[spells]]
id = "renew_r10"
name = "Renew"
family = "renew"
rank = 10
class = "priest"
mana_cost = 410
hot = { duration = 15, tick_interval = 3, total_healing = 970 }
"#;
        let book = parse_spell_configs(toml).unwrap();
        assert_eq!(book.len(), 2);

        let fol = book.pick(WowClass::Paladin, SpellFamily::FlashOfLight, RankChoice::Max).unwrap();
        assert!((fol.coefficient() - 0.43).abs() < f64::EPSILON);
        assert_eq!(fol.cast_time_ms(), 1500);

        let renew = book.get("renew_r10").unwrap();
        assert!(renew.is_instant());
        assert_eq!(renew.hot.as_ref().unwrap().ticks(), 5);
    }

    #[test]
    fn test_builtin_spells_parse() {
        let book = parse_spell_configs(include_str!("../../config/spells.toml")).unwrap();
        assert_eq!(book.len(), 45);
        assert_eq!(SpellBook::with_defaults().len(), book.len());

        let blessing = book.get("blessing_of_light_r3").unwrap().applies_buff.as_ref().unwrap();
        assert_eq!(
            blessing.effect,
            BuffEffect::HealingReceived {
                bonuses: vec![(SpellFamily::HolyLight, 400.0), (SpellFamily::FlashOfLight, 115.0)],
            }
        );
        assert_eq!(book.get("mana_spring_totem_r4").unwrap().applies_buff.as_ref().unwrap().target, BuffTarget::CasterGroup);
        assert!(!book.get("inner_focus").unwrap().on_gcd);

        let regrowth = book.get("regrowth_r9").unwrap();
        assert_eq!(regrowth.hot.as_ref().unwrap().coefficient, Some(0.7));
        assert_eq!(regrowth.heal, Some(AmountRange::new(1003.0, 1119.0)));

        let chain = book.get("chain_heal_r3").unwrap().chain.as_ref().unwrap();
        assert_eq!(chain.max_bounces, 2);
        assert_eq!(book.get("cleanse").unwrap().dispels.len(), 3);
        assert!(book.get("lay_on_hands_r3").unwrap().drains_all_mana);
    }
}
