//! Spell definitions and the spell book

mod book;
pub mod cooldown;
pub mod resolver;

pub use book::{RankChoice, SpellBook};
pub use cooldown::CooldownTracker;
pub use resolver::{AppliedHeal, PreparedCast, ResolvedHeal, Resolution, ResolutionReport};

use crate::effect::BuffEffect;
use crate::types::{secs_to_ms, DebuffType, Millis, School, WowClass};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Spell family shared by every rank of a spell
///
/// Cooldowns and flat healing bonuses key on the family, not the rank id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellFamily {
    // Paladin
    HolyLight,
    FlashOfLight,
    HolyShock,
    Cleanse,
    BlessingOfLight,
    DivineFavor,
    LayOnHands,
    // Priest
    Heal,
    GreaterHeal,
    FlashHeal,
    Renew,
    PowerWordShield,
    InnerFocus,
    DispelMagic,
    Smite,
    // Druid
    HealingTouch,
    Rejuvenation,
    Regrowth,
    Swiftmend,
    NaturesSwiftness,
    RemoveCurse,
    AbolishPoison,
    Wrath,
    // Shaman
    HealingWave,
    LesserHealingWave,
    ChainHeal,
    ManaSpringTotem,
    LightningBolt,
    // Shared
    CurePoison,
    CureDisease,
}

impl SpellFamily {
    /// Nature spells Nature's Swiftness can make instant
    pub fn is_nature(&self) -> bool {
        matches!(
            self,
            SpellFamily::HealingTouch
                | SpellFamily::Regrowth
                | SpellFamily::Wrath
                | SpellFamily::HealingWave
                | SpellFamily::LesserHealingWave
                | SpellFamily::ChainHeal
                | SpellFamily::LightningBolt
        )
    }

    /// HoTs Swiftmend can consume, with the seconds of ticks it cashes in
    pub fn swiftmend_window(&self) -> Option<Millis> {
        match self {
            SpellFamily::Rejuvenation => Some(12_000),
            SpellFamily::Regrowth => Some(18_000),
            _ => None,
        }
    }
}

/// Inclusive amount range rolled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    pub fn new(min: f64, max: f64) -> Self {
        AmountRange { min, max }
    }

    pub fn roll(&self, rng: &mut impl Rng) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn average(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Heal-over-time payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotSpec {
    /// Seconds
    pub duration: f64,
    /// Seconds between ticks
    pub tick_interval: f64,
    pub total_healing: f64,
    /// Defaults to duration / 15
    #[serde(default)]
    pub coefficient: Option<f64>,
}

impl HotSpec {
    pub fn ticks(&self) -> u64 {
        let interval = secs_to_ms(self.tick_interval).max(1);
        secs_to_ms(self.duration) / interval
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient.unwrap_or((self.duration / 15.0).min(1.0))
    }
}

/// Chain-heal bounce payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub max_bounces: u32,
    /// Each bounce heals for (1 - reduction) of the previous one
    pub bounce_reduction: f64,
}

/// Who a buff-applying spell lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuffTarget {
    #[default]
    Target,
    Caster,
    /// Every living member of the caster's group
    CasterGroup,
}

/// Buff applied when a utility spell resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffSpec {
    pub id: String,
    pub name: String,
    /// Seconds
    pub duration: f64,
    pub effect: BuffEffect,
    #[serde(default)]
    pub target: BuffTarget,
}

/// Immutable spell definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: String,
    pub name: String,
    pub family: SpellFamily,
    #[serde(default = "default_rank")]
    pub rank: u32,
    pub class: WowClass,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub mana_cost: f64,
    /// Seconds; 0 = instant
    #[serde(default)]
    pub cast_time: f64,
    /// Seconds
    #[serde(default)]
    pub cooldown: f64,
    #[serde(default)]
    pub heal: Option<AmountRange>,
    #[serde(default)]
    pub damage: Option<AmountRange>,
    #[serde(default)]
    pub school: School,
    /// Damage absorbed by a shield
    #[serde(default)]
    pub absorb: Option<AmountRange>,
    #[serde(default)]
    pub spell_power_coefficient: Option<f64>,
    #[serde(default = "default_true")]
    pub on_gcd: bool,
    #[serde(default)]
    pub hot: Option<HotSpec>,
    #[serde(default)]
    pub chain: Option<ChainSpec>,
    #[serde(default)]
    pub dispels: Vec<DebuffType>,
    #[serde(default)]
    pub applies_buff: Option<BuffSpec>,
    /// Costs nothing, empties the pool, heals for the caster's max health
    #[serde(default)]
    pub drains_all_mana: bool,
    /// Consumes a Rejuvenation or Regrowth on the target
    #[serde(default)]
    pub consumes_hot: bool,
    #[serde(default)]
    pub is_aoe: bool,
    #[serde(default)]
    pub is_channeled: bool,
}

fn default_rank() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Spell {
    pub fn cast_time_ms(&self) -> Millis {
        secs_to_ms(self.cast_time)
    }

    pub fn cooldown_ms(&self) -> Millis {
        secs_to_ms(self.cooldown)
    }

    pub fn is_instant(&self) -> bool {
        self.cast_time_ms() == 0
    }

    /// Fraction of spell power added to each cast
    ///
    /// Falls back to the cast-time rule: min(cast, 3.5) / 3.5, instants 1.5 / 3.5.
    pub fn coefficient(&self) -> f64 {
        self.spell_power_coefficient.unwrap_or_else(|| {
            let cast = if self.is_instant() { 1.5 } else { self.cast_time.min(3.5) };
            cast / 3.5
        })
    }

    /// Targets the boss rather than a raid member
    pub fn is_offensive(&self) -> bool {
        self.damage.is_some()
    }

    /// No heal, damage, absorb or HoT: only side effects
    pub fn is_utility(&self) -> bool {
        self.heal.is_none()
            && self.damage.is_none()
            && self.absorb.is_none()
            && self.hot.is_none()
            && !self.drains_all_mana
            && !self.consumes_hot
    }

    pub fn is_dispel(&self) -> bool {
        !self.dispels.is_empty()
    }

    /// Average direct healing before spell power, for efficiency comparisons
    pub fn average_heal(&self) -> f64 {
        let direct = self.heal.map(|r| r.average()).unwrap_or(0.0);
        let hot = self.hot.map(|h| h.total_healing).unwrap_or(0.0);
        direct + hot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_coefficients() {
        let book = SpellBook::with_defaults();
        let gh = book.get("greater_heal_r4").unwrap();
        assert!((gh.coefficient() - 3.0 / 3.5).abs() < 1e-9);
        let hl = book.get("holy_light_r9").unwrap();
        assert!((hl.coefficient() - 2.5 / 3.5).abs() < 1e-9);
        let fol = book.get("flash_of_light_r6").unwrap();
        assert!((fol.coefficient() - 0.43).abs() < 1e-9);
    }

    #[test]
    fn test_renew_ticks() {
        let book = SpellBook::with_defaults();
        let renew = book.get("renew_r10").unwrap().hot.unwrap();
        assert_eq!(renew.ticks(), 5);
        assert!((renew.coefficient() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_roll_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let range = AmountRange::new(346.0, 386.0);
        for _ in 0..200 {
            let v = range.roll(&mut rng);
            assert!((346.0..=386.0).contains(&v));
        }
        assert_eq!(AmountRange::new(50.0, 50.0).roll(&mut rng), 50.0);
    }

    #[test]
    fn test_utility_flags() {
        let book = SpellBook::with_defaults();
        assert!(book.get("cleanse").unwrap().is_utility());
        assert!(book.get("cleanse").unwrap().is_dispel());
        assert!(!book.get("lay_on_hands_r3").unwrap().is_utility());
        assert!(book.get("smite_r8").unwrap().is_offensive());
    }
}
