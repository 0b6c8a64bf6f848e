//! Per-caster spell cooldowns, keyed by spell family

use super::SpellFamily;
use crate::error::CastError;
use crate::types::{MemberId, Millis};
use std::collections::BTreeMap;

/// Runtime cooldown overlay; the spell definitions stay immutable
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    remaining: BTreeMap<(MemberId, SpellFamily), Millis>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a family on cooldown for a caster
    pub fn start(&mut self, caster: &MemberId, family: SpellFamily, duration_ms: Millis) {
        if duration_ms == 0 {
            return;
        }
        self.remaining.insert((caster.clone(), family), duration_ms);
    }

    pub fn remaining(&self, caster: &MemberId, family: SpellFamily) -> Millis {
        self.remaining
            .get(&(caster.clone(), family))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_ready(&self, caster: &MemberId, family: SpellFamily) -> bool {
        self.remaining(caster, family) == 0
    }

    /// Fail with `OnCooldown` while the family is cooling down
    pub fn check(&self, caster: &MemberId, family: SpellFamily) -> Result<(), CastError> {
        match self.remaining(caster, family) {
            0 => Ok(()),
            remaining_ms => Err(CastError::OnCooldown { family, remaining_ms }),
        }
    }

    /// Count every cooldown down, dropping the finished ones
    pub fn tick(&mut self, dt_ms: Millis) {
        for remaining in self.remaining.values_mut() {
            *remaining = remaining.saturating_sub(dt_ms);
        }
        self.remaining.retain(|_, remaining| *remaining > 0);
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }
}
