//! Core identifiers and enums shared across the simulation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a raid member
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub String);

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        MemberId(s.to_string())
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        MemberId(s)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Simulated time in milliseconds
pub type Millis = u64;

/// Convert a duration in seconds (as written in data tables) to milliseconds
pub fn secs_to_ms(secs: f64) -> Millis {
    if secs <= 0.0 {
        0
    } else {
        (secs * 1000.0).round() as Millis
    }
}

/// Convert milliseconds back to seconds for display
pub fn ms_to_secs(ms: Millis) -> f64 {
    ms as f64 / 1000.0
}

/// Playable class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WowClass {
    Warrior,
    Paladin,
    Priest,
    Druid,
    Shaman,
    Mage,
    Warlock,
    Hunter,
    Rogue,
}

impl WowClass {
    pub fn all() -> &'static [WowClass] {
        &[
            WowClass::Warrior,
            WowClass::Paladin,
            WowClass::Priest,
            WowClass::Druid,
            WowClass::Shaman,
            WowClass::Mage,
            WowClass::Warlock,
            WowClass::Hunter,
            WowClass::Rogue,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            WowClass::Warrior => "Warrior",
            WowClass::Paladin => "Paladin",
            WowClass::Priest => "Priest",
            WowClass::Druid => "Druid",
            WowClass::Shaman => "Shaman",
            WowClass::Mage => "Mage",
            WowClass::Warlock => "Warlock",
            WowClass::Hunter => "Hunter",
            WowClass::Rogue => "Rogue",
        }
    }

    /// Which resource this class spends
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            WowClass::Warrior => ResourceKind::Rage,
            WowClass::Rogue => ResourceKind::Energy,
            _ => ResourceKind::Mana,
        }
    }

    /// Whether the class has healing spells the AI can drive
    pub fn is_healer_class(&self) -> bool {
        matches!(
            self,
            WowClass::Paladin | WowClass::Priest | WowClass::Druid | WowClass::Shaman
        )
    }

    /// Debuff types this class can remove
    pub fn dispel_types(&self) -> &'static [DebuffType] {
        match self {
            WowClass::Paladin => &[DebuffType::Magic, DebuffType::Poison, DebuffType::Disease],
            WowClass::Priest => &[DebuffType::Magic, DebuffType::Disease],
            WowClass::Druid => &[DebuffType::Curse, DebuffType::Poison],
            WowClass::Shaman => &[DebuffType::Poison, DebuffType::Disease],
            WowClass::Mage => &[DebuffType::Curse],
            _ => &[],
        }
    }
}

/// Resource pool kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Mana,
    Rage,
    Energy,
}

/// Raid role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tank,
    Healer,
    Dps,
}

impl Role {
    /// Tie-break priority for heal targeting (lower sorts first)
    pub fn heal_priority(&self) -> u8 {
        match self {
            Role::Tank => 0,
            Role::Healer => 1,
            Role::Dps => 2,
        }
    }
}

/// Where a member stands; area heals only jump within a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionZone {
    Melee,
    Ranged,
    Tank,
}

/// Dispel category of a debuff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuffType {
    Magic,
    Poison,
    Disease,
    Curse,
    Enrage,
    Physical,
}

/// Damage school of a boss ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum School {
    #[default]
    Physical,
    Fire,
    Frost,
    Nature,
    Shadow,
    Arcane,
    Holy,
}

impl School {
    pub fn is_magic(&self) -> bool {
        !matches!(self, School::Physical)
    }
}

/// Equipment slot (17 fixed slots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Neck,
    Shoulders,
    Back,
    Chest,
    Wrist,
    Hands,
    Waist,
    Legs,
    Feet,
    Finger1,
    Finger2,
    Trinket1,
    Trinket2,
    MainHand,
    OffHand,
    Ranged,
}

impl EquipmentSlot {
    /// Get all equipment slots
    pub fn all() -> &'static [EquipmentSlot] {
        &[
            EquipmentSlot::Head,
            EquipmentSlot::Neck,
            EquipmentSlot::Shoulders,
            EquipmentSlot::Back,
            EquipmentSlot::Chest,
            EquipmentSlot::Wrist,
            EquipmentSlot::Hands,
            EquipmentSlot::Waist,
            EquipmentSlot::Legs,
            EquipmentSlot::Feet,
            EquipmentSlot::Finger1,
            EquipmentSlot::Finger2,
            EquipmentSlot::Trinket1,
            EquipmentSlot::Trinket2,
            EquipmentSlot::MainHand,
            EquipmentSlot::OffHand,
            EquipmentSlot::Ranged,
        ]
    }
}
