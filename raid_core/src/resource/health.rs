//! Health pool with clamping and life/death tracking

use serde::{Deserialize, Serialize};

/// Health state of a combatant
///
/// Invariants: `0 <= current_health <= max_health` and
/// `is_alive == (current_health > 0)`, except that a member stays dead at
/// positive health only through an explicit [`Vitals::revive`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    current_health: f64,
    max_health: f64,
    is_alive: bool,
}

/// Result of healing a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealOutcome {
    /// Amount that was resolved for this target
    pub raw: f64,
    /// Amount that actually restored health
    pub effective: f64,
    /// Amount that didn't land: full health, a dead target or healing reduction
    pub overheal: f64,
    /// The part of `overheal` cancelled by healing reduction
    #[serde(default)]
    pub prevented: f64,
}

/// Result of damaging a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    /// Incoming damage after modifiers
    pub raw: f64,
    /// Soaked by absorb shields
    pub absorbed: f64,
    /// Health actually removed
    pub dealt: f64,
    /// Damage beyond remaining health
    pub overkill: f64,
    /// This hit killed the target
    pub killed: bool,
}

impl Vitals {
    pub fn new(max_health: f64) -> Self {
        let max_health = max_health.max(1.0);
        Vitals {
            current_health: max_health,
            max_health,
            is_alive: true,
        }
    }

    pub fn current(&self) -> f64 {
        self.current_health
    }

    pub fn max(&self) -> f64 {
        self.max_health
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn missing(&self) -> f64 {
        self.max_health - self.current_health
    }

    pub fn percent(&self) -> f64 {
        (self.current_health / self.max_health).clamp(0.0, 1.0)
    }

    /// Apply a signed delta, clamped to [0, max]
    ///
    /// Health reaching zero flips the member dead. Positive deltas never
    /// revive; a dead member's health is left untouched.
    pub fn apply_health_delta(&mut self, delta: f64) -> f64 {
        if !self.is_alive {
            return 0.0;
        }
        let before = self.current_health;
        self.current_health = (self.current_health + delta).clamp(0.0, self.max_health);
        if self.current_health <= 0.0 {
            self.current_health = 0.0;
            self.is_alive = false;
        }
        self.current_health - before
    }

    /// Heal, recording anything that didn't land as overheal
    pub fn heal(&mut self, amount: f64) -> HealOutcome {
        let raw = amount.max(0.0);
        let effective = self.apply_health_delta(raw).max(0.0);
        HealOutcome {
            raw,
            effective,
            overheal: raw - effective,
            prevented: 0.0,
        }
    }

    /// Remove health (absorbs are handled by the caller)
    pub fn damage(&mut self, amount: f64) -> DamageOutcome {
        let raw = amount.max(0.0);
        if !self.is_alive {
            return DamageOutcome {
                raw,
                overkill: raw,
                ..Default::default()
            };
        }
        let dealt = -self.apply_health_delta(-raw);
        DamageOutcome {
            raw,
            absorbed: 0.0,
            dealt,
            overkill: raw - dealt,
            killed: !self.is_alive,
        }
    }

    /// Bring a dead member back with the given health
    pub fn revive(&mut self, health: f64) {
        self.current_health = health.clamp(1.0, self.max_health);
        self.is_alive = true;
    }

    /// Restore to full health and alive
    pub fn reset(&mut self) {
        self.current_health = self.max_health;
        self.is_alive = true;
    }

    /// Change max health, keeping current within bounds
    pub fn set_max(&mut self, max_health: f64) {
        self.max_health = max_health.max(1.0);
        self.current_health = self.current_health.min(self.max_health);
    }

    /// Set current health directly (clamped); zero kills
    pub fn set_current(&mut self, health: f64) {
        self.current_health = health.clamp(0.0, self.max_health);
        self.is_alive = self.current_health > 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overheal_on_full_health() {
        let mut v = Vitals::new(1000.0);
        let out = v.heal(300.0);
        assert_eq!(out.effective, 0.0);
        assert_eq!(out.overheal, 300.0);
    }

    #[test]
    fn test_partial_overheal() {
        let mut v = Vitals::new(1000.0);
        v.damage(100.0);
        let out = v.heal(300.0);
        assert_eq!(out.effective, 100.0);
        assert_eq!(out.overheal, 200.0);
    }

    #[test]
    fn test_dead_target_heal_is_overheal() {
        let mut v = Vitals::new(1000.0);
        let dmg = v.damage(5000.0);
        assert!(dmg.killed);
        assert_eq!(dmg.overkill, 4000.0);

        let out = v.heal(500.0);
        assert_eq!(out.overheal, 500.0);
        assert!(!v.is_alive());
        assert_eq!(v.current(), 0.0);
    }

    #[test]
    fn test_revive_only_explicit() {
        let mut v = Vitals::new(1000.0);
        v.damage(1000.0);
        assert!(!v.is_alive());
        v.revive(200.0);
        assert!(v.is_alive());
        assert_eq!(v.current(), 200.0);
    }

    proptest! {
        #[test]
        fn prop_health_clamped(deltas in proptest::collection::vec(-3000.0f64..3000.0, 1..50)) {
            let mut v = Vitals::new(2500.0);
            for d in deltas {
                v.apply_health_delta(d);
                prop_assert!(v.current() >= 0.0);
                prop_assert!(v.current() <= v.max());
                prop_assert_eq!(v.is_alive(), v.current() > 0.0);
            }
        }
    }
}
