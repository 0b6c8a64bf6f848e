//! Recoverable simulation errors

use crate::spell::SpellFamily;
use crate::types::{MemberId, Millis};
use thiserror::Error;

/// Why a cast could not begin or resolve
///
/// Every variant is local and recoverable: the player UI ignores the attempt,
/// an AI agent moves down its fallback chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CastError {
    #[error("Not enough mana: need {needed:.0}, have {available:.0}")]
    InsufficientMana { needed: f64, available: f64 },
    #[error("{family:?} is on cooldown for {remaining_ms}ms")]
    OnCooldown { family: SpellFamily, remaining_ms: Millis },
    #[error("Global cooldown active for {remaining_ms}ms")]
    OnGlobalCooldown { remaining_ms: Millis },
    #[error("Already casting")]
    Busy,
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    #[error("Unknown spell: {0}")]
    NoSuchSpell(String),
    #[error("Unknown target: {0}")]
    NoSuchTarget(MemberId),
    #[error("Caster cannot use this spell")]
    WrongClass,
    #[error("Encounter is over")]
    EncounterOver,
}

/// Roster management error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    #[error("Raid already has {0} members")]
    RaidFull(usize),
    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),
    #[error("{0} is not on the bench")]
    NotOnBench(MemberId),
    #[error("Roster cannot change during combat")]
    InCombat,
}
