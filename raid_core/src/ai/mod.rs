//! Healer AI - per-class spell priority tables
//!
//! Decisions are pure: the caller supplies target health, own mana and the
//! class context, and gets back a spell family, a rank and a mechanic. The
//! spell book turns that into a concrete spell id.

mod agent;
mod classes;
mod targeting;

pub use agent::{assign_healers, AgentPlan, HealerAgent, PlannedAction};
pub use classes::{DruidAI, PaladinAI, PriestAI, ShamanAI};
pub use targeting::{dispel_target, select_target, DispelTarget};

use crate::config::AiThresholds;
use crate::spell::{RankChoice, SpellFamily};
use crate::types::WowClass;
use serde::{Deserialize, Serialize};

/// Target health band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Emergency,
    Moderate,
    Light,
    TopOff,
}

impl HealthBand {
    pub fn classify(health_pct: f64, thresholds: &AiThresholds) -> Self {
        if health_pct < thresholds.emergency {
            HealthBand::Emergency
        } else if health_pct < thresholds.moderate {
            HealthBand::Moderate
        } else if health_pct < thresholds.light {
            HealthBand::Light
        } else {
            HealthBand::TopOff
        }
    }
}

/// Healer mana state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManaState {
    Normal,
    Low,
    Critical,
}

impl ManaState {
    pub fn classify(mana_pct: f64, thresholds: &AiThresholds) -> Self {
        if mana_pct < thresholds.critical_mana {
            ManaState::Critical
        } else if mana_pct < thresholds.low_mana {
            ManaState::Low
        } else {
            ManaState::Normal
        }
    }

    /// Cheapest rank this mana state allows
    pub fn min_rank(&self) -> RankChoice {
        match self {
            ManaState::Normal => RankChoice::Max,
            ManaState::Low => RankChoice::Downranked,
            ManaState::Critical => RankChoice::Cheapest,
        }
    }
}

/// Class mechanic attached to a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mechanic {
    Plain,
    ApplyShield,
    UseInnerFocus,
    UseNaturesSwiftness,
    UseDivineFavor,
    ConsumeHoT,
}

impl Mechanic {
    /// Off-GCD spell to fire right before the main spell
    pub fn precast(&self) -> Option<SpellFamily> {
        match self {
            Mechanic::UseInnerFocus => Some(SpellFamily::InnerFocus),
            Mechanic::UseNaturesSwiftness => Some(SpellFamily::NaturesSwiftness),
            Mechanic::UseDivineFavor => Some(SpellFamily::DivineFavor),
            Mechanic::Plain | Mechanic::ApplyShield | Mechanic::ConsumeHoT => None,
        }
    }
}

/// Class-specific facts about the target and the healer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassContext {
    pub target_is_tank: bool,
    /// Families of the healer's own HoTs already on the target
    pub own_hots: Vec<SpellFamily>,
    /// Someone's Rejuvenation or Regrowth is on the target
    pub target_has_swiftmend_hot: bool,
    pub target_has_weakened_soul: bool,
    /// Families whose cooldown is ready
    pub ready: Vec<SpellFamily>,
}

impl ClassContext {
    pub fn has_own_hot(&self, family: SpellFamily) -> bool {
        self.own_hots.contains(&family)
    }

    pub fn is_ready(&self, family: SpellFamily) -> bool {
        self.ready.contains(&family)
    }
}

/// Inputs to one decision
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionInput {
    pub target_health_pct: f64,
    pub mana_pct: f64,
    /// Injured members in the target's group
    pub injured_in_group: usize,
    pub context: ClassContext,
}

/// What to cast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub family: SpellFamily,
    pub rank: RankChoice,
    pub mechanic: Mechanic,
}

impl Decision {
    pub fn plain(family: SpellFamily) -> Self {
        Decision {
            family,
            rank: RankChoice::Max,
            mechanic: Mechanic::Plain,
        }
    }

    pub fn downranked(family: SpellFamily) -> Self {
        Decision {
            rank: RankChoice::Downranked,
            ..Self::plain(family)
        }
    }

    pub fn with(family: SpellFamily, mechanic: Mechanic) -> Self {
        Decision {
            mechanic,
            ..Self::plain(family)
        }
    }
}

/// Spell priority table for one healing class
pub trait HealerAI: Send + Sync {
    fn class(&self) -> WowClass;

    /// Band-driven choice before any mana adjustment
    fn select_spell(&self, band: HealthBand, input: &DecisionInput, thresholds: &AiThresholds) -> Decision;

    /// Efficient spell used when mana runs short
    fn conservation_spell(&self) -> SpellFamily;

    /// Every family the table can return
    fn families(&self) -> &'static [SpellFamily];
}

static PRIEST: PriestAI = PriestAI;
static PALADIN: PaladinAI = PaladinAI;
static DRUID: DruidAI = DruidAI;
static SHAMAN: ShamanAI = ShamanAI;

/// The priority table for a class, if it heals
pub fn ai_for_class(class: WowClass) -> Option<&'static dyn HealerAI> {
    match class {
        WowClass::Priest => Some(&PRIEST),
        WowClass::Paladin => Some(&PALADIN),
        WowClass::Druid => Some(&DRUID),
        WowClass::Shaman => Some(&SHAMAN),
        _ => None,
    }
}

/// Full decision: the class table, then the mana overlay
///
/// Below the critical mana threshold the conservation spell is forced at its
/// cheapest rank; below the low threshold every choice is at least downranked.
pub fn decide(ai: &dyn HealerAI, input: &DecisionInput, thresholds: &AiThresholds) -> Decision {
    let mana = ManaState::classify(input.mana_pct, thresholds);
    if mana == ManaState::Critical {
        return Decision {
            family: ai.conservation_spell(),
            rank: RankChoice::Cheapest,
            mechanic: Mechanic::Plain,
        };
    }
    let band = HealthBand::classify(input.target_health_pct, thresholds);
    let mut decision = ai.select_spell(band, input, thresholds);
    decision.rank = decision.rank.max(mana.min_rank());
    decision
}
