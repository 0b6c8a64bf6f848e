//! raid_core - Fixed-timestep raid healing combat simulation
//!
//! This library provides:
//! - Raid: roster, health and mana pools, buffs, debuffs and HoTs
//! - Spells: the spell book, rank selection and the spell resolver
//! - Healer AI: per-class priority tables and tank/raid assignments
//! - Encounters: boss definitions, scripts and the boss state machine
//! - Simulation: the tick scheduler, combat log, scoring and DKP loot

pub mod ai;
pub mod cast;
pub mod combat_log;
pub mod config;
pub mod effect;
pub mod encounter;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod raid;
pub mod resource;
pub mod spell;
pub mod types;

// Re-export core types for convenience
pub use ai::{ai_for_class, decide, Decision, HealerAI, HealerAgent, HealthBand, ManaState, Mechanic};
pub use cast::{CastBar, CastState, Caster};
pub use combat_log::{CombatEvent, CombatLog, LogEntry, WipeReason};
pub use config::{ConfigError, GameData, SimConstants};
pub use effect::{ActiveBuff, ActiveDebuff, ActiveHoT, BuffEffect, DebuffDefinition, DebuffTable};
pub use encounter::{Boss, BossDefinition, EncounterStatus};
pub use engine::{GameSnapshot, GameState, ScoreReport, Simulation};
pub use error::{CastError, RosterError};
pub use raid::{Item, Raid, RaidMember, RaidSave, RosterConfig};
pub use resource::{HealOutcome, HealingLedger, Vitals};
pub use spell::{RankChoice, Spell, SpellBook, SpellFamily};
pub use types::{MemberId, Millis, Role, School, WowClass};
