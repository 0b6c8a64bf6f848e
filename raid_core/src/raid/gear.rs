//! Items and equipped gear

use crate::types::{EquipmentSlot, WowClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An equippable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub slot: EquipmentSlot,
    pub item_level: u32,
    #[serde(default)]
    pub stamina: f64,
    #[serde(default)]
    pub intellect: f64,
    /// +healing
    #[serde(default)]
    pub healing_power: f64,
    /// Spell crit chance as a fraction (0.01 = 1%)
    #[serde(default)]
    pub spell_crit: f64,
    #[serde(default)]
    pub mp5: f64,
    /// Classes allowed to use it (empty = anyone)
    #[serde(default)]
    pub classes: Vec<WowClass>,
    /// DKP price when won from a boss
    #[serde(default)]
    pub dkp_cost: f64,
}

impl Item {
    pub fn usable_by(&self, class: WowClass) -> bool {
        self.classes.is_empty() || self.classes.contains(&class)
    }
}

/// Slots an item declared for `slot` may occupy (rings and trinkets pair up)
pub fn compatible_slots(slot: EquipmentSlot) -> &'static [EquipmentSlot] {
    match slot {
        EquipmentSlot::Finger1 | EquipmentSlot::Finger2 => {
            &[EquipmentSlot::Finger1, EquipmentSlot::Finger2]
        }
        EquipmentSlot::Trinket1 | EquipmentSlot::Trinket2 => {
            &[EquipmentSlot::Trinket1, EquipmentSlot::Trinket2]
        }
        EquipmentSlot::Head => &[EquipmentSlot::Head],
        EquipmentSlot::Neck => &[EquipmentSlot::Neck],
        EquipmentSlot::Shoulders => &[EquipmentSlot::Shoulders],
        EquipmentSlot::Back => &[EquipmentSlot::Back],
        EquipmentSlot::Chest => &[EquipmentSlot::Chest],
        EquipmentSlot::Wrist => &[EquipmentSlot::Wrist],
        EquipmentSlot::Hands => &[EquipmentSlot::Hands],
        EquipmentSlot::Waist => &[EquipmentSlot::Waist],
        EquipmentSlot::Legs => &[EquipmentSlot::Legs],
        EquipmentSlot::Feet => &[EquipmentSlot::Feet],
        EquipmentSlot::MainHand => &[EquipmentSlot::MainHand],
        EquipmentSlot::OffHand => &[EquipmentSlot::OffHand],
        EquipmentSlot::Ranged => &[EquipmentSlot::Ranged],
    }
}

/// Equipped items by slot; every slot may be empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    slots: BTreeMap<EquipmentSlot, Item>,
}

/// Summed item stats
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GearTotals {
    pub stamina: f64,
    pub intellect: f64,
    pub healing_power: f64,
    pub spell_crit: f64,
    pub mp5: f64,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equip into a specific slot, returning what was there
    pub fn equip(&mut self, slot: EquipmentSlot, item: Item) -> Option<Item> {
        self.slots.insert(slot, item)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Item> {
        self.slots.remove(&slot)
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&Item> {
        self.slots.get(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EquipmentSlot, &Item)> {
        self.slots.iter()
    }

    /// Sum of equipped item levels
    pub fn gear_score(&self) -> u32 {
        self.slots.values().map(|i| i.item_level).sum()
    }

    pub fn totals(&self) -> GearTotals {
        self.slots.values().fold(GearTotals::default(), |mut acc, item| {
            acc.stamina += item.stamina;
            acc.intellect += item.intellect;
            acc.healing_power += item.healing_power;
            acc.spell_crit += item.spell_crit;
            acc.mp5 += item.mp5;
            acc
        })
    }

    /// The slot this item would replace and the item-level gain, if any
    ///
    /// Among paired slots the emptier/weaker one is chosen.
    pub fn upgrade_slot_for(&self, item: &Item) -> Option<(EquipmentSlot, u32)> {
        compatible_slots(item.slot)
            .iter()
            .map(|slot| (*slot, self.get(*slot).map(|i| i.item_level).unwrap_or(0)))
            .min_by_key(|(_, level)| *level)
            .filter(|(_, level)| item.item_level > *level)
            .map(|(slot, level)| (slot, item.item_level - level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(id: &str, level: u32) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_string(),
            slot: EquipmentSlot::Finger1,
            item_level: level,
            stamina: 5.0,
            intellect: 0.0,
            healing_power: 20.0,
            spell_crit: 0.0,
            mp5: 0.0,
            classes: vec![],
            dkp_cost: 0.0,
        }
    }

    #[test]
    fn test_gear_score_sums_levels() {
        let mut eq = Equipment::new();
        eq.equip(EquipmentSlot::Finger1, ring("a", 60));
        eq.equip(EquipmentSlot::Finger2, ring("b", 66));
        assert_eq!(eq.gear_score(), 126);
        assert!((eq.totals().healing_power - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_upgrade_picks_weaker_ring() {
        let mut eq = Equipment::new();
        eq.equip(EquipmentSlot::Finger1, ring("a", 70));
        eq.equip(EquipmentSlot::Finger2, ring("b", 60));
        let (slot, gain) = eq.upgrade_slot_for(&ring("c", 66)).unwrap();
        assert_eq!(slot, EquipmentSlot::Finger2);
        assert_eq!(gain, 6);
        assert!(eq.upgrade_slot_for(&ring("d", 55)).is_none());
    }
}
