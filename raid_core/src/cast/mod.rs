//! Cast state machine shared by human players and AI healers
//!
//! `Idle -> GlobalCooldown -> Idle` for instants,
//! `Idle -> Casting -> GlobalCooldown -> Idle` for cast-time spells, with a
//! `Casting -> Idle` cancellation edge. The caller checks mana, cooldowns and
//! targets; this type only tracks timing.

use crate::error::CastError;
use crate::spell::{PreparedCast, Spell};
use crate::types::{MemberId, Millis};
use serde::{Deserialize, Serialize};

/// A cast in progress
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCast {
    pub spell_id: String,
    pub target: Option<MemberId>,
    pub elapsed_ms: Millis,
    pub cast_time_ms: Millis,
    /// Global cooldown to start on completion (0 for off-GCD spells)
    pub gcd_ms: Millis,
    pub prepared: PreparedCast,
}

impl ActiveCast {
    pub fn progress(&self) -> f64 {
        if self.cast_time_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f64 / self.cast_time_ms as f64).clamp(0.0, 1.0)
    }

    pub fn remaining_ms(&self) -> Millis {
        self.cast_time_ms.saturating_sub(self.elapsed_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CastState {
    #[default]
    Idle,
    Casting(ActiveCast),
    GlobalCooldown { remaining_ms: Millis },
}

/// What `Caster::start` did with the spell
#[derive(Debug, Clone, PartialEq)]
pub enum CastStart {
    /// Resolve now
    Instant(ActiveCast),
    /// Cast bar started; resolves from `Caster::tick`
    Started,
}

/// Read-only view for the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastBar {
    pub spell_id: String,
    pub target: Option<MemberId>,
    pub progress: f64,
    pub remaining_ms: Millis,
}

/// One entity's single outstanding cast
#[derive(Debug, Clone, PartialEq)]
pub struct Caster {
    pub member_id: MemberId,
    pub state: CastState,
}

impl Caster {
    pub fn new(member_id: MemberId) -> Self {
        Caster {
            member_id,
            state: CastState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == CastState::Idle
    }

    pub fn is_casting(&self) -> bool {
        matches!(self.state, CastState::Casting(_))
    }

    pub fn gcd_remaining(&self) -> Millis {
        match self.state {
            CastState::GlobalCooldown { remaining_ms } => remaining_ms,
            _ => 0,
        }
    }

    /// Cast bar fill from 0 to 1, or 0 when not casting
    pub fn progress(&self) -> f64 {
        match &self.state {
            CastState::Casting(cast) => cast.progress(),
            _ => 0.0,
        }
    }

    pub fn cast_bar(&self) -> Option<CastBar> {
        match &self.state {
            CastState::Casting(cast) => Some(CastBar {
                spell_id: cast.spell_id.clone(),
                target: cast.target.clone(),
                progress: cast.progress(),
                remaining_ms: cast.remaining_ms(),
            }),
            _ => None,
        }
    }

    /// Fail with `Busy` mid-cast or `OnGlobalCooldown` while locked
    pub fn check_ready(&self, spell: &Spell) -> Result<(), CastError> {
        match self.state {
            CastState::Casting(_) => Err(CastError::Busy),
            CastState::GlobalCooldown { remaining_ms } if spell.on_gcd => {
                Err(CastError::OnGlobalCooldown { remaining_ms })
            }
            _ => Ok(()),
        }
    }

    /// Begin a cast already checked by the caller
    ///
    /// Instants lock the global cooldown immediately; cast-time spells lock it
    /// when they complete.
    pub fn start(
        &mut self,
        spell: &Spell,
        target: Option<MemberId>,
        prepared: PreparedCast,
        gcd_ms: Millis,
    ) -> Result<CastStart, CastError> {
        self.check_ready(spell)?;
        let cast = ActiveCast {
            spell_id: spell.id.clone(),
            target,
            elapsed_ms: 0,
            cast_time_ms: prepared.cast_time_ms(spell),
            gcd_ms: if spell.on_gcd { gcd_ms } else { 0 },
            prepared,
        };
        if cast.cast_time_ms == 0 {
            if cast.gcd_ms > 0 {
                self.state = CastState::GlobalCooldown {
                    remaining_ms: cast.gcd_ms,
                };
            }
            Ok(CastStart::Instant(cast))
        } else {
            self.state = CastState::Casting(cast);
            Ok(CastStart::Started)
        }
    }

    /// Advance timers; returns the cast that finished this tick, if any
    pub fn tick(&mut self, dt_ms: Millis) -> Option<ActiveCast> {
        match &mut self.state {
            CastState::Idle => None,
            CastState::GlobalCooldown { remaining_ms } => {
                *remaining_ms = remaining_ms.saturating_sub(dt_ms);
                if *remaining_ms == 0 {
                    self.state = CastState::Idle;
                }
                None
            }
            CastState::Casting(cast) => {
                cast.elapsed_ms += dt_ms;
                if cast.elapsed_ms < cast.cast_time_ms {
                    return None;
                }
                let done = cast.clone();
                self.state = if done.gcd_ms > 0 {
                    CastState::GlobalCooldown {
                        remaining_ms: done.gcd_ms,
                    }
                } else {
                    CastState::Idle
                };
                Some(done)
            }
        }
    }

    /// Abandon the cast in progress; silent when not casting
    pub fn cancel(&mut self) -> Option<ActiveCast> {
        if !self.is_casting() {
            return None;
        }
        match std::mem::take(&mut self.state) {
            CastState::Casting(cast) => Some(cast),
            _ => None,
        }
    }

    /// Drop any cast and lockout
    pub fn reset(&mut self) {
        self.state = CastState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::SpellBook;

    fn caster() -> Caster {
        Caster::new(MemberId::from("player"))
    }

    #[test]
    fn test_cast_time_spell_then_gcd() {
        let book = SpellBook::with_defaults();
        let fol = book.get("flash_of_light_r6").unwrap();
        let mut caster = caster();

        let start = caster.start(fol, Some(MemberId::from("tank")), PreparedCast::default(), 1500);
        assert_eq!(start, Ok(CastStart::Started));
        assert_eq!(caster.check_ready(fol), Err(CastError::Busy));

        for _ in 0..14 {
            assert!(caster.tick(100).is_none());
        }
        assert!((caster.progress() - 14.0 / 15.0).abs() < 1e-9);
        let done = caster.tick(100).unwrap();
        assert_eq!(done.spell_id, "flash_of_light_r6");
        assert_eq!(caster.gcd_remaining(), 1500);
        assert!(matches!(
            caster.check_ready(fol),
            Err(CastError::OnGlobalCooldown { remaining_ms: 1500 })
        ));

        for _ in 0..15 {
            caster.tick(100);
        }
        assert!(caster.is_idle());
    }

    #[test]
    fn test_instant_locks_gcd_at_begin() {
        let book = SpellBook::with_defaults();
        let renew = book.get("renew_r10").unwrap();
        let mut caster = caster();
        let start = caster.start(renew, None, PreparedCast::default(), 1500).unwrap();
        assert!(matches!(start, CastStart::Instant(_)));
        assert_eq!(caster.gcd_remaining(), 1500);
    }

    #[test]
    fn test_off_gcd_ignores_lockout() {
        let book = SpellBook::with_defaults();
        let renew = book.get("renew_r10").unwrap();
        let focus = book.get("inner_focus").unwrap();
        let mut caster = caster();
        caster.start(renew, None, PreparedCast::default(), 1500).unwrap();
        assert!(caster.check_ready(focus).is_ok());
        caster.start(focus, None, PreparedCast::default(), 1500).unwrap();
        assert_eq!(caster.gcd_remaining(), 1500);
    }

    #[test]
    fn test_cancel() {
        let book = SpellBook::with_defaults();
        let heal = book.get("greater_heal_r4").unwrap();
        let mut caster = caster();
        assert!(caster.cancel().is_none());

        caster.start(heal, None, PreparedCast::default(), 1500).unwrap();
        caster.tick(1000);
        let cancelled = caster.cancel().unwrap();
        assert_eq!(cancelled.elapsed_ms, 1000);
        assert!(caster.is_idle());
        assert_eq!(caster.progress(), 0.0);
    }

    #[test]
    fn test_natures_swiftness_makes_instant() {
        let book = SpellBook::with_defaults();
        let touch = book.get("healing_touch_r11").unwrap();
        let prepared = PreparedCast {
            instant: true,
            ..Default::default()
        };
        let mut caster = caster();
        let start = caster.start(touch, None, prepared, 1500).unwrap();
        assert!(matches!(start, CastStart::Instant(_)));
    }
}
