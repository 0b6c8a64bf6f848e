//! Priority tables for the four healing classes

use super::{Decision, DecisionInput, HealerAI, HealthBand, Mechanic};
use crate::config::AiThresholds;
use crate::spell::{RankChoice, SpellFamily as F};
use crate::types::WowClass;

/// Lay on Hands only below this
const LAY_ON_HANDS_BELOW: f64 = 0.10;

#[derive(Debug, Clone, Copy, Default)]
pub struct PriestAI;

impl HealerAI for PriestAI {
    fn class(&self) -> WowClass {
        WowClass::Priest
    }

    fn select_spell(&self, band: HealthBand, input: &DecisionInput, _: &AiThresholds) -> Decision {
        let ctx = &input.context;
        match band {
            HealthBand::Emergency => {
                if !ctx.target_has_weakened_soul && ctx.is_ready(F::PowerWordShield) {
                    Decision::with(F::PowerWordShield, Mechanic::ApplyShield)
                } else if ctx.is_ready(F::InnerFocus) {
                    Decision::with(F::GreaterHeal, Mechanic::UseInnerFocus)
                } else {
                    Decision::plain(F::GreaterHeal)
                }
            }
            HealthBand::Moderate => Decision::plain(F::FlashHeal),
            HealthBand::Light => Decision::plain(F::Heal),
            HealthBand::TopOff => {
                if ctx.has_own_hot(F::Renew) {
                    Decision::downranked(F::Heal)
                } else {
                    Decision::plain(F::Renew)
                }
            }
        }
    }

    fn conservation_spell(&self) -> F {
        F::Heal
    }

    fn families(&self) -> &'static [F] {
        &[
            F::PowerWordShield,
            F::InnerFocus,
            F::GreaterHeal,
            F::FlashHeal,
            F::Heal,
            F::Renew,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PaladinAI;

impl HealerAI for PaladinAI {
    fn class(&self) -> WowClass {
        WowClass::Paladin
    }

    fn select_spell(&self, band: HealthBand, input: &DecisionInput, _: &AiThresholds) -> Decision {
        let ctx = &input.context;
        match band {
            HealthBand::Emergency => {
                if input.target_health_pct < LAY_ON_HANDS_BELOW && ctx.is_ready(F::LayOnHands) {
                    Decision::plain(F::LayOnHands)
                } else if ctx.is_ready(F::DivineFavor) {
                    Decision::with(F::HolyLight, Mechanic::UseDivineFavor)
                } else {
                    Decision::plain(F::HolyLight)
                }
            }
            HealthBand::Moderate => Decision::plain(F::HolyLight),
            HealthBand::Light => Decision::plain(F::FlashOfLight),
            HealthBand::TopOff => Decision::downranked(F::FlashOfLight),
        }
    }

    fn conservation_spell(&self) -> F {
        F::FlashOfLight
    }

    fn families(&self) -> &'static [F] {
        &[F::LayOnHands, F::DivineFavor, F::HolyLight, F::FlashOfLight]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DruidAI;

impl DruidAI {
    /// Apply a HoT unless ours is already ticking, else a small Healing Touch
    fn hot_or_touch(input: &DecisionInput, family: F) -> Decision {
        if input.context.has_own_hot(family) {
            Decision::downranked(F::HealingTouch)
        } else {
            Decision::plain(family)
        }
    }
}

impl HealerAI for DruidAI {
    fn class(&self) -> WowClass {
        WowClass::Druid
    }

    fn select_spell(&self, band: HealthBand, input: &DecisionInput, _: &AiThresholds) -> Decision {
        let ctx = &input.context;
        match band {
            HealthBand::Emergency => {
                if ctx.is_ready(F::NaturesSwiftness) {
                    Decision::with(F::HealingTouch, Mechanic::UseNaturesSwiftness)
                } else if ctx.target_has_swiftmend_hot && ctx.is_ready(F::Swiftmend) {
                    Decision::with(F::Swiftmend, Mechanic::ConsumeHoT)
                } else {
                    Self::hot_or_touch(input, F::Regrowth)
                }
            }
            HealthBand::Moderate => Self::hot_or_touch(input, F::Regrowth),
            HealthBand::Light | HealthBand::TopOff => Self::hot_or_touch(input, F::Rejuvenation),
        }
    }

    fn conservation_spell(&self) -> F {
        F::HealingTouch
    }

    fn families(&self) -> &'static [F] {
        &[
            F::NaturesSwiftness,
            F::Swiftmend,
            F::HealingTouch,
            F::Regrowth,
            F::Rejuvenation,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShamanAI;

impl HealerAI for ShamanAI {
    fn class(&self) -> WowClass {
        WowClass::Shaman
    }

    fn select_spell(&self, band: HealthBand, input: &DecisionInput, thresholds: &AiThresholds) -> Decision {
        if input.injured_in_group >= thresholds.chain_heal_min_injured
            && input.target_health_pct < thresholds.moderate
        {
            return Decision::plain(F::ChainHeal);
        }
        match band {
            HealthBand::Emergency => Decision::plain(F::LesserHealingWave),
            HealthBand::Moderate => Decision::plain(F::HealingWave),
            HealthBand::Light => Decision::downranked(F::HealingWave),
            HealthBand::TopOff => Decision {
                rank: RankChoice::Cheapest,
                ..Decision::plain(F::LesserHealingWave)
            },
        }
    }

    fn conservation_spell(&self) -> F {
        F::HealingWave
    }

    fn families(&self) -> &'static [F] {
        &[F::ChainHeal, F::LesserHealingWave, F::HealingWave]
    }
}
