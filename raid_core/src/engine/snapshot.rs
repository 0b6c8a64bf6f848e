//! Read-only view of the simulation for renderers and network mirrors

use super::ScoreReport;
use crate::cast::{CastBar, Caster};
use crate::combat_log::LogEntry;
use crate::encounter::{Boss, EncounterStatus};
use crate::raid::{Raid, RaidMember};
use crate::types::{MemberId, Millis, ResourceKind, Role, WowClass};
use serde::{Deserialize, Serialize};

/// Log lines carried in a snapshot
pub const SNAPSHOT_LOG_LINES: usize = 50;

/// A buff, debuff or HoT as shown on a raid frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectView {
    pub id: String,
    pub name: String,
    /// Missing icons render as the name only
    pub icon: Option<String>,
    pub remaining_ms: Millis,
    pub max_duration_ms: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberView {
    pub id: MemberId,
    pub name: String,
    pub class: WowClass,
    pub role: Role,
    pub group: u8,
    pub alive: bool,
    pub health: f64,
    pub max_health: f64,
    pub resource_kind: ResourceKind,
    pub resource: f64,
    pub max_resource: f64,
    pub buffs: Vec<EffectView>,
    pub debuffs: Vec<EffectView>,
    pub hots: Vec<EffectView>,
    pub dkp: f64,
}

impl MemberView {
    fn from_member(member: &RaidMember) -> Self {
        MemberView {
            id: member.id.clone(),
            name: member.name.clone(),
            class: member.class,
            role: member.role,
            group: member.group,
            alive: member.is_alive(),
            health: member.vitals.current(),
            max_health: member.vitals.max(),
            resource_kind: member.resource.kind,
            resource: member.resource.current,
            max_resource: member.resource.max,
            buffs: member
                .buffs
                .iter()
                .map(|b| EffectView {
                    id: b.id.clone(),
                    name: b.name.clone(),
                    icon: b.icon.clone(),
                    remaining_ms: b.remaining_ms,
                    max_duration_ms: b.max_duration_ms,
                })
                .collect(),
            debuffs: member
                .debuffs
                .iter()
                .map(|d| EffectView {
                    id: d.id.clone(),
                    name: d.name.clone(),
                    icon: d.icon.clone(),
                    remaining_ms: d.remaining_ms,
                    max_duration_ms: d.max_duration_ms,
                })
                .collect(),
            hots: member
                .hots
                .iter()
                .map(|h| EffectView {
                    id: h.spell_id.clone(),
                    name: h.name.clone(),
                    icon: h.icon.clone(),
                    remaining_ms: h.remaining_ms,
                    max_duration_ms: h.max_duration_ms,
                })
                .collect(),
            dkp: member.dkp,
        }
    }

    pub fn health_pct(&self) -> f64 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossView {
    pub id: String,
    pub name: String,
    pub health: f64,
    pub max_health: f64,
    pub enrage_remaining_ms: Millis,
    pub phase: u32,
    pub status: EncounterStatus,
    /// Who holds aggro
    pub tank: Option<MemberId>,
    pub loose_adds: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub member_id: MemberId,
    pub cast: Option<CastBar>,
    pub gcd_remaining_ms: Millis,
}

impl PlayerView {
    fn from_caster(caster: &Caster) -> Self {
        PlayerView {
            member_id: caster.member_id.clone(),
            cast: caster.cast_bar(),
            gcd_remaining_ms: caster.gcd_remaining(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub elapsed_ms: Millis,
    pub raid: Vec<MemberView>,
    pub boss: BossView,
    pub players: Vec<PlayerView>,
    /// Newest first
    pub recent_log: Vec<LogEntry>,
    pub score: Option<ScoreReport>,
}

impl GameSnapshot {
    pub(crate) fn capture<'a>(
        elapsed_ms: Millis,
        raid: &Raid,
        boss: &Boss,
        players: impl Iterator<Item = &'a Caster>,
        recent_log: impl Iterator<Item = &'a LogEntry>,
        score: Option<&ScoreReport>,
    ) -> Self {
        GameSnapshot {
            elapsed_ms,
            raid: raid.members.iter().map(MemberView::from_member).collect(),
            boss: BossView {
                id: boss.id.clone(),
                name: boss.name.clone(),
                health: boss.current_health,
                max_health: boss.max_health,
                enrage_remaining_ms: boss.enrage_remaining_ms,
                phase: boss.current_phase,
                status: boss.status,
                tank: boss.script.tank(raid),
                loose_adds: boss.script.loose_adds(),
            },
            players: players.map(PlayerView::from_caster).collect(),
            recent_log: recent_log.cloned().collect(),
            score: score.cloned(),
        }
    }

    pub fn member(&self, id: &MemberId) -> Option<&MemberView> {
        self.raid.iter().find(|m| &m.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
