//! Beneficial timed effects

use crate::spell::SpellFamily;
use crate::types::{Millis, MemberId};
use serde::{Deserialize, Serialize};

/// What a buff does while it is up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuffEffect {
    /// Absorbs incoming damage until depleted (Power Word: Shield)
    Absorb { remaining: f64 },
    /// Flat bonus to heals of certain spell families received by the bearer
    /// (Blessing of Light)
    HealingReceived { bonuses: Vec<(SpellFamily, f64)> },
    /// The bearer's next heal is a guaranteed critical (Divine Favor)
    NextHealCrits,
    /// The bearer's next spell costs no mana and gains crit chance (Inner Focus)
    NextSpellFree { crit_bonus: f64 },
    /// The bearer's next nature spell is instant (Nature's Swiftness)
    NextNatureInstant,
    /// Extra mana per 5 seconds (Mana Spring Totem)
    ManaRegen { mp5: f64 },
    /// No mechanical effect
    Generic,
}

impl BuffEffect {
    /// Consumed by the bearer's next cast
    pub fn is_consumable(&self) -> bool {
        matches!(
            self,
            BuffEffect::NextHealCrits | BuffEffect::NextSpellFree { .. } | BuffEffect::NextNatureInstant
        )
    }
}

/// An active buff on a raid member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub remaining_ms: Millis,
    pub max_duration_ms: Millis,
    pub effect: BuffEffect,
    /// Who applied it
    #[serde(default)]
    pub source: Option<MemberId>,
}

impl ActiveBuff {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_ms: Millis, effect: BuffEffect) -> Self {
        ActiveBuff {
            id: id.into(),
            name: name.into(),
            icon: None,
            remaining_ms: duration_ms,
            max_duration_ms: duration_ms,
            effect,
            source: None,
        }
    }

    pub fn with_source(mut self, source: MemberId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Percentage of duration remaining
    pub fn duration_percent(&self) -> f64 {
        if self.max_duration_ms == 0 {
            return 0.0;
        }
        (self.remaining_ms as f64 / self.max_duration_ms as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Count down; returns true while still active
    pub fn tick(&mut self, dt_ms: Millis) -> bool {
        self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms);
        self.is_active()
    }

    pub fn is_active(&self) -> bool {
        if let BuffEffect::Absorb { remaining } = self.effect {
            if remaining <= 0.0 {
                return false;
            }
        }
        self.remaining_ms > 0
    }

    /// Flat healing bonus this buff grants to a spell family
    pub fn healing_bonus_for(&self, family: SpellFamily) -> f64 {
        match &self.effect {
            BuffEffect::HealingReceived { bonuses } => bonuses
                .iter()
                .filter(|(f, _)| *f == family)
                .map(|(_, v)| *v)
                .sum(),
            _ => 0.0,
        }
    }

    /// Soak damage into an absorb; returns the amount absorbed
    pub fn absorb(&mut self, amount: f64) -> f64 {
        match &mut self.effect {
            BuffEffect::Absorb { remaining } => {
                let soaked = amount.min(*remaining).max(0.0);
                *remaining -= soaked;
                soaked
            }
            _ => 0.0,
        }
    }
}
