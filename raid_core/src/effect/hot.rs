//! ActiveHoT - heal-over-time instances on a raid member

use crate::spell::SpellFamily;
use crate::types::{Millis, MemberId};
use serde::{Deserialize, Serialize};

/// An active heal-over-time on a raid member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveHoT {
    /// Spell that applied it
    pub spell_id: String,
    pub family: SpellFamily,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Caster, for "don't stack your own HoT"
    pub caster_id: MemberId,
    pub heal_per_tick: f64,
    pub tick_interval_ms: Millis,
    /// Tick accumulator
    pub since_last_tick_ms: Millis,
    pub remaining_ms: Millis,
    pub max_duration_ms: Millis,
    /// Critical on application carries through every tick
    #[serde(default)]
    pub is_crit: bool,
}

impl ActiveHoT {
    pub fn new(
        spell_id: impl Into<String>,
        family: SpellFamily,
        name: impl Into<String>,
        caster_id: MemberId,
        heal_per_tick: f64,
        tick_interval_ms: Millis,
        duration_ms: Millis,
    ) -> Self {
        ActiveHoT {
            spell_id: spell_id.into(),
            family,
            name: name.into(),
            icon: None,
            caster_id,
            heal_per_tick,
            tick_interval_ms: tick_interval_ms.max(1),
            since_last_tick_ms: 0,
            remaining_ms: duration_ms,
            max_duration_ms: duration_ms,
            is_crit: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0
    }

    /// Healing per second
    pub fn hps(&self) -> f64 {
        self.heal_per_tick / (self.tick_interval_ms as f64 / 1000.0)
    }

    /// Ticks still to come
    pub fn remaining_ticks(&self) -> u64 {
        (self.remaining_ms + self.since_last_tick_ms) / self.tick_interval_ms
    }

    /// Total healing still to come
    pub fn total_remaining_healing(&self) -> f64 {
        self.remaining_ticks() as f64 * self.heal_per_tick
    }

    /// Healing this HoT would do over `window_ms` of ticks (Swiftmend)
    pub fn healing_over(&self, window_ms: Millis) -> f64 {
        (window_ms / self.tick_interval_ms) as f64 * self.heal_per_tick
    }

    /// Reapplication by the same caster: restart duration and tick phase
    pub fn refresh(&mut self, other: &ActiveHoT) {
        self.heal_per_tick = other.heal_per_tick;
        self.tick_interval_ms = other.tick_interval_ms;
        self.remaining_ms = other.max_duration_ms;
        self.max_duration_ms = other.max_duration_ms;
        self.since_last_tick_ms = 0;
        self.is_crit = other.is_crit;
    }

    pub fn duration_percent(&self) -> f64 {
        if self.max_duration_ms == 0 {
            return 0.0;
        }
        (self.remaining_ms as f64 / self.max_duration_ms as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renew() -> ActiveHoT {
        ActiveHoT::new(
            "renew_r10",
            SpellFamily::Renew,
            "Renew",
            MemberId::from("priest"),
            194.0,
            3000,
            15_000,
        )
    }

    #[test]
    fn test_total_remaining() {
        let hot = renew();
        assert_eq!(hot.remaining_ticks(), 5);
        assert!((hot.total_remaining_healing() - 970.0).abs() < 0.01);
    }

    #[test]
    fn test_healing_over_window() {
        let hot = renew();
        // Four 3s ticks fit in 12s
        assert!((hot.healing_over(12_000) - 776.0).abs() < 0.01);
    }

    #[test]
    fn test_hps() {
        let hot = renew();
        assert!((hot.hps() - 194.0 / 3.0).abs() < 1e-9);
    }
}
