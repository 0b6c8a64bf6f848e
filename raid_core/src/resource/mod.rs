//! Resource model - mana/rage/energy pools, health, and the healing ledger

mod health;
mod ledger;

pub use health::{DamageOutcome, HealOutcome, Vitals};
pub use ledger::{CasterHealing, HealingLedger};

use crate::error::CastError;
use crate::types::{Millis, ResourceKind};
use serde::{Deserialize, Serialize};

/// A spendable resource pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub kind: ResourceKind,
    pub current: f64,
    pub max: f64,
}

impl ResourcePool {
    /// Create a full pool
    pub fn new(kind: ResourceKind, max: f64) -> Self {
        let max = max.max(0.0);
        let current = match kind {
            // Rage starts empty
            ResourceKind::Rage => 0.0,
            _ => max,
        };
        ResourcePool { kind, current, max }
    }

    pub fn mana(max: f64) -> Self {
        Self::new(ResourceKind::Mana, max)
    }

    /// Fraction of the pool remaining (0.0 to 1.0)
    pub fn percent(&self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// Spend `amount`, failing without change if the pool is short
    pub fn spend(&mut self, amount: f64) -> Result<(), CastError> {
        apply_mana_cost(self, amount)
    }

    /// Empty the pool, returning what was drained
    pub fn drain_all(&mut self) -> f64 {
        let drained = self.current;
        self.current = 0.0;
        drained
    }

    /// Remove up to `amount` without failing, returning what was removed
    pub fn drain(&mut self, amount: f64) -> f64 {
        let drained = amount.max(0.0).min(self.current);
        self.current -= drained;
        drained
    }

    /// Restore up to max, returning the amount actually gained
    pub fn restore(&mut self, amount: f64) -> f64 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }

    /// Fill the pool (rage empties instead)
    pub fn reset(&mut self) {
        self.current = match self.kind {
            ResourceKind::Rage => 0.0,
            _ => self.max,
        };
    }
}

/// Deduct a cost from a pool
///
/// A zero cost always succeeds, even on an empty pool.
pub fn apply_mana_cost(pool: &mut ResourcePool, amount: f64) -> Result<(), CastError> {
    if amount <= 0.0 {
        return Ok(());
    }
    if amount > pool.current {
        return Err(CastError::InsufficientMana {
            needed: amount,
            available: pool.current,
        });
    }
    pool.current -= amount;
    Ok(())
}

/// Regenerate `mp5 * dt / 5s`, clamped to max. Returns the amount gained.
pub fn regenerate_mana(pool: &mut ResourcePool, mp5: f64, dt_ms: Millis) -> f64 {
    if mp5 <= 0.0 || dt_ms == 0 {
        return 0.0;
    }
    let gain = mp5 * (dt_ms as f64 / 5000.0);
    pool.restore(gain)
}
