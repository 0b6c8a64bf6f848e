//! Buff/debuff/HoT registry

mod buff;
mod debuff;
mod hot;
pub mod tick;

pub use buff::{ActiveBuff, BuffEffect};
pub use debuff::{ActiveDebuff, DebuffDefinition};
pub use hot::ActiveHoT;
pub use tick::{dispel, tick_member, DotTick, EffectTickReport, Explosion, HotTick};

use std::collections::BTreeMap;

/// Debuff definitions by id
#[derive(Debug, Clone, Default)]
pub struct DebuffTable {
    definitions: BTreeMap<String, DebuffDefinition>,
}

impl DebuffTable {
    pub fn new() -> Self {
        DebuffTable {
            definitions: BTreeMap::new(),
        }
    }

    /// Register a definition, replacing any with the same id
    pub fn register(&mut self, definition: DebuffDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&DebuffDefinition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DebuffDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_registered() {
        let table = DebuffTable::with_defaults();
        assert!(table.contains("living_bomb"));
        assert!(table.contains("weakened_soul"));
        assert!(!table.get("living_bomb").unwrap().dispellable);
        assert!((table.get("gehennas_curse").unwrap().healing_reduction - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_impending_doom_single_tick() {
        let doom = DebuffTable::with_defaults()
            .get("impending_doom")
            .unwrap()
            .instantiate(0);
        assert!(doom.is_periodic());
        assert_eq!(doom.tick_interval_ms, Some(10_000));
    }
}
