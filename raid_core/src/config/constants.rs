//! Simulation tunables

use crate::types::{Millis, Role};
use serde::{Deserialize, Serialize};

/// Tunable simulation constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConstants {
    #[serde(default)]
    pub timing: TimingConstants,
    #[serde(default)]
    pub crit: CritConstants,
    #[serde(default)]
    pub ai: AiThresholds,
    #[serde(default)]
    pub encounter: EncounterConstants,
    #[serde(default)]
    pub regen: RegenConstants,
    #[serde(default)]
    pub loot: LootConstants,
}

impl SimConstants {
    pub fn tick_ms(&self) -> Millis {
        self.timing.tick_ms.max(1)
    }

    pub fn gcd_ms(&self) -> Millis {
        self.timing.gcd_ms
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConstants {
    /// Fixed simulation step
    #[serde(default = "default_tick_ms")]
    pub tick_ms: Millis,
    /// Global cooldown after most actions
    #[serde(default = "default_gcd_ms")]
    pub gcd_ms: Millis,
}

impl Default for TimingConstants {
    fn default() -> Self {
        TimingConstants {
            tick_ms: 100,
            gcd_ms: 1500,
        }
    }
}

fn default_tick_ms() -> Millis {
    100
}
fn default_gcd_ms() -> Millis {
    1500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritConstants {
    /// Heal crit multiplier (1.5 = 150%)
    #[serde(default = "default_crit_multiplier")]
    pub heal_multiplier: f64,
    #[serde(default = "default_crit_multiplier")]
    pub damage_multiplier: f64,
}

impl Default for CritConstants {
    fn default() -> Self {
        CritConstants {
            heal_multiplier: 1.5,
            damage_multiplier: 1.5,
        }
    }
}

fn default_crit_multiplier() -> f64 {
    1.5
}

/// Health bands and mana states the healer AI keys on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiThresholds {
    /// Below this: emergency
    #[serde(default = "default_emergency")]
    pub emergency: f64,
    /// Below this: moderate
    #[serde(default = "default_moderate")]
    pub moderate: f64,
    /// Below this: light; at or above: top-off
    #[serde(default = "default_light")]
    pub light: f64,
    /// Below this mana fraction, prefer downranked spells
    #[serde(default = "default_low_mana")]
    pub low_mana: f64,
    /// Below this mana fraction, cheapest rank only
    #[serde(default = "default_critical_mana")]
    pub critical_mana: f64,
    /// Group members below this health count as injured for chain heals
    #[serde(default = "default_group_injured_below")]
    pub group_injured_below: f64,
    /// Injured group members needed before a chain heal
    #[serde(default = "default_chain_heal_min_injured")]
    pub chain_heal_min_injured: usize,
}

impl Default for AiThresholds {
    fn default() -> Self {
        AiThresholds {
            emergency: 0.35,
            moderate: 0.60,
            light: 0.75,
            low_mana: 0.30,
            critical_mana: 0.15,
            group_injured_below: 0.80,
            chain_heal_min_injured: 3,
        }
    }
}

fn default_emergency() -> f64 {
    0.35
}
fn default_moderate() -> f64 {
    0.60
}
fn default_light() -> f64 {
    0.75
}
fn default_low_mana() -> f64 {
    0.30
}
fn default_critical_mana() -> f64 {
    0.15
}
fn default_group_injured_below() -> f64 {
    0.80
}
fn default_chain_heal_min_injured() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterConstants {
    /// Scale applied to every `raid_damage` hit
    #[serde(default = "default_raid_damage_multiplier")]
    pub raid_damage_multiplier: f64,
    /// Damage per second a tank contributes before gear
    #[serde(default = "default_tank_dps")]
    pub tank_base_dps: f64,
    /// Damage per second a damage dealer contributes before gear
    #[serde(default = "default_dps_base")]
    pub dps_base_dps: f64,
    #[serde(default = "default_dps_per_gear_score")]
    pub dps_per_gear_score: f64,
    /// Uniform +/- spread on raid damage each tick
    #[serde(default = "default_dps_variance")]
    pub dps_variance: f64,
}

impl EncounterConstants {
    /// Baseline damage per second for a role
    pub fn base_dps(&self, role: Role) -> f64 {
        match role {
            Role::Tank => self.tank_base_dps,
            Role::Dps => self.dps_base_dps,
            Role::Healer => 0.0,
        }
    }
}

impl Default for EncounterConstants {
    fn default() -> Self {
        EncounterConstants {
            raid_damage_multiplier: 0.6,
            tank_base_dps: 250.0,
            dps_base_dps: 600.0,
            dps_per_gear_score: 0.5,
            dps_variance: 0.10,
        }
    }
}

fn default_raid_damage_multiplier() -> f64 {
    0.6
}
fn default_tank_dps() -> f64 {
    250.0
}
fn default_dps_base() -> f64 {
    600.0
}
fn default_dps_per_gear_score() -> f64 {
    0.5
}
fn default_dps_variance() -> f64 {
    0.10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenConstants {
    /// Spirit regen pauses this long after spending mana
    #[serde(default = "default_five_second_rule_ms")]
    pub five_second_rule_ms: Millis,
    /// Whether health regenerates during combat at all
    #[serde(default)]
    pub health_regen_in_combat: bool,
}

impl Default for RegenConstants {
    fn default() -> Self {
        RegenConstants {
            five_second_rule_ms: 5000,
            health_regen_in_combat: false,
        }
    }
}

fn default_five_second_rule_ms() -> Millis {
    5000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootConstants {
    /// DKP to every member present at a kill
    #[serde(default = "default_dkp_per_kill")]
    pub dkp_per_kill: f64,
    /// DKP to every member present at a wipe
    #[serde(default = "default_dkp_per_attempt")]
    pub dkp_per_attempt: f64,
}

impl Default for LootConstants {
    fn default() -> Self {
        LootConstants {
            dkp_per_kill: 10.0,
            dkp_per_attempt: 2.0,
        }
    }
}

fn default_dkp_per_kill() -> f64 {
    10.0
}
fn default_dkp_per_attempt() -> f64 {
    2.0
}
