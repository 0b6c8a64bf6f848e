//! Prelude module for convenient imports
//!
//! ```rust
//! use raid_core::prelude::*;
//! ```

// Core types
pub use crate::types::{DebuffType, EquipmentSlot, MemberId, Millis, PositionZone, ResourceKind, Role, School, WowClass};

// Raid
pub use crate::raid::{HealerAssignment, Item, MemberConfig, Raid, RaidMember, RaidSave, RosterConfig};
pub use crate::resource::{HealOutcome, HealingLedger, ResourcePool, Vitals};

// Effects
pub use crate::effect::{ActiveBuff, ActiveDebuff, ActiveHoT, BuffEffect, DebuffTable};

// Spells
pub use crate::spell::{CooldownTracker, PreparedCast, RankChoice, Spell, SpellBook, SpellFamily};

// Encounters
pub use crate::encounter::{Boss, BossDefinition, EncounterStatus, WipeReason};

// Simulation
pub use crate::cast::{Caster, CastState};
pub use crate::combat_log::{CombatEvent, CombatLog};
pub use crate::config::{GameData, SimConstants};
pub use crate::engine::{GameSnapshot, ScoreReport, Simulation};
pub use crate::error::{CastError, RosterError};
