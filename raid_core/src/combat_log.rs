//! Player-facing combat log

use crate::types::{ms_to_secs, MemberId, Millis, School};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an encounter was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeReason {
    Enrage,
    RaidDead,
}

/// Something that happened in combat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    EncounterStart {
        boss: String,
    },
    CastStarted {
        caster: MemberId,
        spell: String,
        target: Option<MemberId>,
    },
    CastCancelled {
        caster: MemberId,
        spell: String,
    },
    Heal {
        caster: MemberId,
        target: MemberId,
        spell: String,
        amount: f64,
        overheal: f64,
        is_crit: bool,
        periodic: bool,
    },
    Damage {
        source: String,
        target: MemberId,
        amount: f64,
        absorbed: f64,
        school: School,
    },
    BossDamage {
        caster: MemberId,
        spell: String,
        amount: f64,
        is_crit: bool,
    },
    ManaDrain {
        source: String,
        target: MemberId,
        amount: f64,
    },
    BuffApplied {
        caster: MemberId,
        target: MemberId,
        buff: String,
    },
    DebuffApplied {
        source: String,
        target: MemberId,
        debuff: String,
    },
    Dispel {
        caster: MemberId,
        target: MemberId,
        debuff: String,
    },
    /// A cleanse that found nothing it could remove
    DispelFailed {
        caster: MemberId,
        target: MemberId,
        spell: String,
    },
    Explosion {
        bearer: MemberId,
        debuff: String,
        victims: usize,
    },
    Death {
        member: MemberId,
    },
    PhaseChange {
        phase: u32,
        message: String,
    },
    TankSwap {
        from: Option<MemberId>,
        to: MemberId,
    },
    AddLoose {
        add: String,
    },
    Victory {
        boss: String,
    },
    Wipe {
        boss: String,
        reason: WipeReason,
    },
    Loot {
        member: MemberId,
        item: String,
        dkp: f64,
    },
    DkpAwarded {
        amount: f64,
        members: usize,
    },
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::EncounterStart { boss } => write!(f, "{boss} engaged"),
            CombatEvent::CastStarted { caster, spell, target } => match target {
                Some(target) => write!(f, "{caster} begins casting {spell} on {target}"),
                None => write!(f, "{caster} begins casting {spell}"),
            },
            CombatEvent::CastCancelled { caster, spell } => write!(f, "{caster} stops casting {spell}"),
            CombatEvent::Heal {
                caster,
                target,
                spell,
                amount,
                overheal,
                is_crit,
                periodic,
            } => {
                let verb = match (is_crit, periodic) {
                    (true, _) => "critically heals",
                    (false, true) => "ticks on",
                    (false, false) => "heals",
                };
                write!(f, "{caster}'s {spell} {verb} {target} for {amount:.0}")?;
                if *overheal > 0.0 {
                    write!(f, " ({overheal:.0} overheal)")?;
                }
                Ok(())
            }
            CombatEvent::Damage {
                source,
                target,
                amount,
                absorbed,
                school,
            } => {
                write!(f, "{source} hits {target} for {amount:.0} {school:?}")?;
                if *absorbed > 0.0 {
                    write!(f, " ({absorbed:.0} absorbed)")?;
                }
                Ok(())
            }
            CombatEvent::BossDamage {
                caster,
                spell,
                amount,
                is_crit,
            } => {
                let verb = if *is_crit { "crits" } else { "hits" };
                write!(f, "{caster}'s {spell} {verb} the boss for {amount:.0}")
            }
            CombatEvent::ManaDrain { source, target, amount } => {
                write!(f, "{source} drains {amount:.0} mana from {target}")
            }
            CombatEvent::BuffApplied { caster, target, buff } => {
                write!(f, "{caster} gives {target} {buff}")
            }
            CombatEvent::DebuffApplied { source, target, debuff } => {
                write!(f, "{target} is afflicted by {debuff} ({source})")
            }
            CombatEvent::Dispel { caster, target, debuff } => {
                write!(f, "{caster} removes {debuff} from {target}")
            }
            CombatEvent::DispelFailed { caster, target, spell } => {
                write!(f, "{caster}'s {spell} finds nothing to remove on {target}")
            }
            CombatEvent::Explosion { bearer, debuff, victims } => {
                write!(f, "{debuff} on {bearer} explodes, hitting {victims}")
            }
            CombatEvent::Death { member } => write!(f, "{member} dies"),
            CombatEvent::PhaseChange { phase, message } => write!(f, "Phase {phase}: {message}"),
            CombatEvent::TankSwap { from, to } => match from {
                Some(from) => write!(f, "Aggro moves from {from} to {to}"),
                None => write!(f, "{to} picks up the boss"),
            },
            CombatEvent::AddLoose { add } => write!(f, "{add} is loose in the raid"),
            CombatEvent::Victory { boss } => write!(f, "{boss} has been defeated"),
            CombatEvent::Wipe { boss, reason } => match reason {
                WipeReason::Enrage => write!(f, "{boss} enrages. The raid wipes"),
                WipeReason::RaidDead => write!(f, "The raid has fallen to {boss}"),
            },
            CombatEvent::Loot { member, item, dkp } => {
                write!(f, "{member} receives {item} for {dkp:.0} DKP")
            }
            CombatEvent::DkpAwarded { amount, members } => {
                write!(f, "{amount:.0} DKP awarded to {members} members")
            }
        }
    }
}

/// A timestamped log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time_ms: Millis,
    pub event: CombatEvent,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>6.1}] {}", ms_to_secs(self.time_ms), self.event)
    }
}

/// Append-only combat log in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatLog {
    entries: Vec<LogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time_ms: Millis, event: CombatEvent) {
        self.entries.push(LogEntry { time_ms, event });
    }

    pub fn extend(&mut self, time_ms: Millis, events: impl IntoIterator<Item = CombatEvent>) {
        for event in events {
            self.push(time_ms, event);
        }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The `n` newest entries, newest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev().take(n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries matching `pred`
    pub fn count(&self, pred: impl Fn(&CombatEvent) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.event)).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_is_newest_first() {
        let mut log = CombatLog::new();
        log.push(0, CombatEvent::EncounterStart { boss: "Lucifron".into() });
        log.push(100, CombatEvent::Death { member: MemberId::from("rogue1") });
        let recent: Vec<_> = log.recent(5).collect();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].time_ms, 100);
    }

    #[test]
    fn test_heal_message() {
        let event = CombatEvent::Heal {
            caster: MemberId::from("priest1"),
            target: MemberId::from("tank1"),
            spell: "Flash Heal".into(),
            amount: 900.0,
            overheal: 50.0,
            is_crit: true,
            periodic: false,
        };
        assert_eq!(
            event.to_string(),
            "priest1's Flash Heal critically heals tank1 for 900 (50 overheal)"
        );
    }
}
