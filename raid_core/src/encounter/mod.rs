//! Encounter scripting - boss definitions, scripts and the boss state machine

mod engine;
mod script;

pub use engine::Boss;
pub(crate) use engine::deal_damage;
pub use script::{AddState, EncounterScript, ScriptHit, ScriptTick};

pub use crate::combat_log::WipeReason;
use crate::types::{secs_to_ms, Millis, School};
use serde::{Deserialize, Serialize};

/// What a damage event does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageEventKind {
    /// Full damage to whoever holds aggro
    TankDamage,
    /// Reduced damage to `target_count` random living members (all if unset)
    RaidDamage,
    /// Full damage to one random living member
    RandomTarget,
    /// Apply `debuff_id` following `target`
    Debuff,
    /// Hand aggro to the next tank
    TankSwap,
}

/// Who a debuff event lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    Tank,
    #[default]
    Random,
    RandomNonTank,
    /// Every living member
    Raid,
}

/// One scripted boss ability on a recurring timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DamageEventKind,
    #[serde(default)]
    pub damage: f64,
    /// Seconds between firings
    pub interval: f64,
    #[serde(default)]
    pub school: School,
    #[serde(default)]
    pub target_count: Option<usize>,
    #[serde(default)]
    pub debuff_id: Option<String>,
    #[serde(default)]
    pub target: TargetRule,
    /// Phases this fires in (unset = every phase)
    #[serde(default)]
    pub active_in_phases: Option<Vec<u32>>,
}

impl DamageEvent {
    pub fn interval_ms(&self) -> Millis {
        secs_to_ms(self.interval)
    }

    pub fn active_in(&self, phase: u32) -> bool {
        self.active_in_phases
            .as_ref()
            .map(|phases| phases.contains(&phase))
            .unwrap_or(true)
    }
}

/// Health threshold that moves the boss into a new phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub phase: u32,
    /// Fraction of max health (0.5 = 50%)
    pub health_percent: f64,
    #[serde(default)]
    pub message: String,
}

/// Adds spawned at the pull
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSpec {
    pub name: String,
    #[serde(default = "default_count")]
    pub count: u32,
    pub damage: f64,
    /// Seconds between swings
    pub interval: f64,
    #[serde(default)]
    pub school: School,
}

fn default_count() -> u32 {
    1
}

/// Which script drives the boss's special mechanics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptKind {
    #[default]
    Standard,
    TankSwap,
    AddWave { adds: Vec<AddSpec> },
}

/// Static boss definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDefinition {
    pub id: String,
    pub name: String,
    pub max_health: f64,
    /// Seconds until the forced wipe
    pub enrage_timer: f64,
    #[serde(default)]
    pub damage_events: Vec<DamageEvent>,
    #[serde(default)]
    pub phase_transitions: Vec<PhaseTransition>,
    #[serde(default)]
    pub script: ScriptKind,
    /// Item ids the boss can drop
    #[serde(default)]
    pub loot: Vec<String>,
    /// Items rolled per kill
    #[serde(default = "default_drops")]
    pub drops: usize,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_drops() -> usize {
    2
}

impl BossDefinition {
    /// Every debuff id the script references
    pub fn debuff_ids(&self) -> impl Iterator<Item = &str> {
        self.damage_events
            .iter()
            .filter_map(|e| e.debuff_id.as_deref())
    }
}

/// Encounter state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum EncounterStatus {
    Inactive,
    Active,
    Victory,
    Wipe(WipeReason),
}

impl EncounterStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EncounterStatus::Victory | EncounterStatus::Wipe(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_gate() {
        let event = DamageEvent {
            name: "Wrath of Ragnaros".into(),
            kind: DamageEventKind::RaidDamage,
            damage: 800.0,
            interval: 25.0,
            school: School::Fire,
            target_count: None,
            debuff_id: None,
            target: TargetRule::Random,
            active_in_phases: Some(vec![1]),
        };
        assert!(event.active_in(1));
        assert!(!event.active_in(2));
        assert_eq!(event.interval_ms(), 25_000);
    }

    #[test]
    fn test_definition_from_toml() {
        let def: BossDefinition = toml::from_str(
            r#"
id = "golemagg"
name = "Golemagg the Incinerator"
max_health = 1000000
enrage_timer = 480

[script]
type = "tank_swap"

[[damage_events]]
name = "Magma Splash"
type = "debuff"
interval = 10
debuff_id = "magma_splash"
target = "tank"

[[phase_transitions]]
phase = 2
health_percent = 0.1
message = "Golemagg enrages!"
"#,
        )
        .unwrap();
        assert_eq!(def.script, ScriptKind::TankSwap);
        assert_eq!(def.debuff_ids().collect::<Vec<_>>(), vec!["magma_splash"]);
        assert_eq!(def.drops, 2);
    }
}
