//! Harmful timed effects and their static definitions

use crate::types::{secs_to_ms, DebuffType, Millis, School};
use serde::{Deserialize, Serialize};

/// Static debuff definition, loaded from the debuff table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebuffDefinition {
    /// Unique identifier (e.g., "impending_doom")
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Dispel category
    pub debuff_type: DebuffType,
    /// Duration in seconds
    pub duration: f64,
    /// Damage dealt each tick, if this is a DoT
    #[serde(default)]
    pub damage_per_tick: Option<f64>,
    /// Seconds between ticks
    #[serde(default)]
    pub tick_interval: Option<f64>,
    /// School of tick and explosion damage
    #[serde(default)]
    pub school: School,
    /// Mana removed each tick (Ignite Mana)
    #[serde(default)]
    pub mana_drain_per_tick: f64,
    /// Explicitly false for effects that cannot be cleansed
    #[serde(default = "default_dispellable")]
    pub dispellable: bool,
    /// Damage dealt to the bearer's group when the debuff runs out
    #[serde(default)]
    pub explodes_on_expiry: Option<f64>,
    /// Landing on the active tank hands aggro to the next tank
    #[serde(default)]
    pub forces_tank_swap: bool,
    #[serde(default)]
    pub is_boss_debuff: bool,
    /// Fraction of incoming healing removed (0.75 = heals do 25%)
    #[serde(default)]
    pub healing_reduction: f64,
    /// Extra fraction of magic damage taken (1.0 = double)
    #[serde(default)]
    pub increases_magic_damage_taken: f64,
}

fn default_dispellable() -> bool {
    true
}

impl DebuffDefinition {
    /// Create a live instance of this debuff
    pub fn instantiate(&self, applied_at_ms: Millis) -> ActiveDebuff {
        let duration_ms = secs_to_ms(self.duration);
        ActiveDebuff {
            id: self.id.clone(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            debuff_type: self.debuff_type,
            school: self.school,
            remaining_ms: duration_ms,
            max_duration_ms: duration_ms,
            damage_per_tick: self.damage_per_tick,
            tick_interval_ms: self.tick_interval.map(secs_to_ms).filter(|ms| *ms > 0),
            since_last_tick_ms: 0,
            mana_drain_per_tick: self.mana_drain_per_tick,
            dispellable: self.dispellable,
            explodes_on_expiry: self.explodes_on_expiry,
            forces_tank_swap: self.forces_tank_swap,
            is_boss_debuff: self.is_boss_debuff,
            healing_reduction: self.healing_reduction.clamp(0.0, 1.0),
            increases_magic_damage_taken: self.increases_magic_damage_taken.max(0.0),
            applied_at_ms,
        }
    }
}

/// An active debuff on a raid member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveDebuff {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub debuff_type: DebuffType,
    pub school: School,
    pub remaining_ms: Millis,
    pub max_duration_ms: Millis,
    pub damage_per_tick: Option<f64>,
    pub tick_interval_ms: Option<Millis>,
    /// Tick accumulator
    pub since_last_tick_ms: Millis,
    pub mana_drain_per_tick: f64,
    pub dispellable: bool,
    pub explodes_on_expiry: Option<f64>,
    pub forces_tank_swap: bool,
    pub is_boss_debuff: bool,
    pub healing_reduction: f64,
    pub increases_magic_damage_taken: f64,
    /// Simulation time of the original application
    pub applied_at_ms: Millis,
}

impl ActiveDebuff {
    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0
    }

    /// Whether this debuff ticks at all
    pub fn is_periodic(&self) -> bool {
        self.tick_interval_ms.is_some()
            && (self.damage_per_tick.unwrap_or(0.0) > 0.0 || self.mana_drain_per_tick > 0.0)
    }

    /// Whether a dispel of one of `filter` can remove this
    pub fn can_be_dispelled_by(&self, filter: &[DebuffType]) -> bool {
        self.dispellable && filter.contains(&self.debuff_type)
    }

    /// Whether expiring while active sets off `explodes_on_expiry`
    pub fn explodes(&self) -> bool {
        self.explodes_on_expiry.is_some() && (self.forces_tank_swap || self.is_boss_debuff)
    }

    /// Reapplication: restart the timer, keep position and tick phase
    pub fn refresh(&mut self, other: &ActiveDebuff) {
        self.remaining_ms = other.max_duration_ms;
        self.max_duration_ms = other.max_duration_ms;
    }

    pub fn duration_percent(&self) -> f64 {
        if self.max_duration_ms == 0 {
            return 0.0;
        }
        (self.remaining_ms as f64 / self.max_duration_ms as f64 * 100.0).clamp(0.0, 100.0)
    }
}
