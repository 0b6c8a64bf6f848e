//! Spell lookup table with rank selection

use super::{Spell, SpellFamily};
use crate::types::{DebuffType, WowClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which rank of a family to cast
///
/// Ordered from strongest to cheapest; `max` of two choices is the cheaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankChoice {
    Max,
    Downranked,
    Cheapest,
}

/// Spells by id
#[derive(Debug, Clone, Default)]
pub struct SpellBook {
    spells: BTreeMap<String, Spell>,
}

impl SpellBook {
    pub fn new() -> Self {
        SpellBook {
            spells: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, spell: Spell) {
        self.spells.insert(spell.id.clone(), spell);
    }

    pub fn get(&self, id: &str) -> Option<&Spell> {
        self.spells.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.spells.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Spell> {
        self.spells.values()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Every rank a class knows of a family, highest rank first
    pub fn ranks(&self, class: WowClass, family: SpellFamily) -> Vec<&Spell> {
        let mut ranks: Vec<&Spell> = self
            .spells
            .values()
            .filter(|s| s.class == class && s.family == family)
            .collect();
        ranks.sort_by(|a, b| b.rank.cmp(&a.rank));
        ranks
    }

    /// Pick a rank: highest, second highest, or lowest
    pub fn pick(&self, class: WowClass, family: SpellFamily, choice: RankChoice) -> Option<&Spell> {
        let ranks = self.ranks(class, family);
        let last = ranks.len().checked_sub(1)?;
        let idx = match choice {
            RankChoice::Max => 0,
            RankChoice::Downranked => last.min(1),
            RankChoice::Cheapest => last,
        };
        ranks.get(idx).copied()
    }

    /// Cheapest spell of this class that removes `debuff_type`
    pub fn dispel_for(&self, class: WowClass, debuff_type: DebuffType) -> Option<&Spell> {
        self.spells
            .values()
            .filter(|s| s.class == class && s.dispels.contains(&debuff_type))
            .min_by(|a, b| a.mana_cost.total_cmp(&b.mana_cost))
    }
}
