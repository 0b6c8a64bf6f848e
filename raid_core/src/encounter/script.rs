//! Per-boss mechanic scripts
//!
//! Each variant owns only the state its boss needs.

use super::ScriptKind;
use crate::combat_log::CombatEvent;
use crate::effect::tick::accumulate_ticks;
use crate::effect::ActiveDebuff;
use crate::raid::Raid;
use crate::types::{secs_to_ms, MemberId, Millis, Role, School};
use rand::seq::SliceRandom;
use rand::Rng;

/// A live add and its aggro target
#[derive(Debug, Clone, PartialEq)]
pub struct AddState {
    pub name: String,
    pub tank: Option<MemberId>,
    pub damage: f64,
    pub interval_ms: Millis,
    pub since_last_ms: Millis,
    pub school: School,
    /// Its tank died; it now hits random members
    pub loose: bool,
}

/// Damage a script deals this tick
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptHit {
    pub source: String,
    pub target: MemberId,
    pub damage: f64,
    pub school: School,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptTick {
    pub hits: Vec<ScriptHit>,
    pub events: Vec<CombatEvent>,
}

/// Boss-specific mechanic state
#[derive(Debug, Clone, PartialEq)]
pub enum EncounterScript {
    /// Aggro stays on the first living tank
    Standard,
    /// Aggro moves between tanks on demand
    TankSwap {
        current_tank: Option<MemberId>,
        swaps: u32,
    },
    /// Adds each hold a tank; orphaned adds go loose
    AddWave { adds: Vec<AddState> },
}

impl EncounterScript {
    pub fn from_kind(kind: &ScriptKind) -> Self {
        match kind {
            ScriptKind::Standard => EncounterScript::Standard,
            ScriptKind::TankSwap => EncounterScript::TankSwap {
                current_tank: None,
                swaps: 0,
            },
            ScriptKind::AddWave { adds } => EncounterScript::AddWave {
                adds: adds
                    .iter()
                    .flat_map(|spec| {
                        (1..=spec.count).map(move |n| AddState {
                            name: if spec.count > 1 {
                                format!("{} {}", spec.name, n)
                            } else {
                                spec.name.clone()
                            },
                            tank: None,
                            damage: spec.damage,
                            interval_ms: secs_to_ms(spec.interval).max(1),
                            since_last_ms: 0,
                            school: spec.school,
                            loose: false,
                        })
                    })
                    .collect(),
            },
        }
    }

    /// Pick up the boss (and adds) at the pull
    pub fn start(&mut self, raid: &Raid) -> Vec<CombatEvent> {
        let tanks = living_tanks(raid);
        match self {
            EncounterScript::Standard => Vec::new(),
            EncounterScript::TankSwap { current_tank, swaps } => {
                *current_tank = tanks.first().cloned();
                *swaps = 0;
                current_tank
                    .iter()
                    .map(|to| CombatEvent::TankSwap { from: None, to: to.clone() })
                    .collect()
            }
            EncounterScript::AddWave { adds } => {
                // The first tank keeps the boss; adds go round-robin to the rest
                let add_tanks = if tanks.len() > 1 { &tanks[1..] } else { &tanks[..] };
                for (i, add) in adds.iter_mut().enumerate() {
                    add.tank = add_tanks.get(i % add_tanks.len().max(1)).cloned();
                    add.since_last_ms = 0;
                    add.loose = add.tank.is_none();
                }
                Vec::new()
            }
        }
    }

    /// Whoever the boss is hitting right now
    pub fn tank(&self, raid: &Raid) -> Option<MemberId> {
        match self {
            EncounterScript::TankSwap {
                current_tank: Some(id),
                ..
            } if raid.get(id).map(|m| m.is_alive()).unwrap_or(false) => Some(id.clone()),
            _ => raid.first_living_tank().map(|m| m.id.clone()),
        }
    }

    /// Move aggro off a dead tank
    pub fn ensure_tank(&mut self, raid: &Raid) -> Vec<CombatEvent> {
        if let EncounterScript::TankSwap { current_tank, .. } = self {
            let alive = current_tank
                .as_ref()
                .and_then(|id| raid.get(id))
                .map(|m| m.is_alive())
                .unwrap_or(false);
            if !alive {
                return self.swap(raid);
            }
        }
        Vec::new()
    }

    /// Hand aggro to the next living tank in roster order
    pub fn swap(&mut self, raid: &Raid) -> Vec<CombatEvent> {
        let EncounterScript::TankSwap { current_tank, swaps } = self else {
            return Vec::new();
        };
        let tanks: Vec<(usize, MemberId)> = raid
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == Role::Tank && m.is_alive())
            .map(|(i, m)| (i, m.id.clone()))
            .collect();
        let current_idx = current_tank.as_ref().and_then(|id| raid.index_of(id));
        let next = match current_idx {
            Some(idx) => tanks
                .iter()
                .find(|(i, _)| *i > idx)
                .or_else(|| tanks.iter().find(|(i, _)| *i != idx)),
            None => tanks.first(),
        };
        let Some((_, next)) = next else {
            return Vec::new();
        };
        let from = current_tank.replace(next.clone());
        *swaps += 1;
        vec![CombatEvent::TankSwap {
            from,
            to: next.clone(),
        }]
    }

    /// React to a debuff landing on `target`
    pub fn on_debuff_landed(&mut self, target: &MemberId, debuff: &ActiveDebuff, raid: &Raid) -> Vec<CombatEvent> {
        let on_current_tank = matches!(
            self,
            EncounterScript::TankSwap { current_tank: Some(tank), .. } if tank == target
        );
        if debuff.forces_tank_swap && on_current_tank {
            self.swap(raid)
        } else {
            Vec::new()
        }
    }

    /// Advance add swings
    pub fn tick(&mut self, dt_ms: Millis, raid: &Raid, rng: &mut impl Rng) -> ScriptTick {
        let mut out = ScriptTick::default();
        let EncounterScript::AddWave { adds } = self else {
            return out;
        };
        let living: Vec<MemberId> = raid.living().map(|m| m.id.clone()).collect();
        for add in adds.iter_mut() {
            let tank_alive = add
                .tank
                .as_ref()
                .and_then(|id| raid.get(id))
                .map(|m| m.is_alive())
                .unwrap_or(false);
            if !add.loose && !tank_alive {
                add.loose = true;
                out.events.push(CombatEvent::AddLoose { add: add.name.clone() });
            }
            let swings = accumulate_ticks(&mut add.since_last_ms, add.interval_ms, dt_ms);
            for _ in 0..swings {
                let target = if add.loose {
                    living.choose(rng).cloned()
                } else {
                    add.tank.clone()
                };
                if let Some(target) = target {
                    out.hits.push(ScriptHit {
                        source: add.name.clone(),
                        target,
                        damage: add.damage,
                        school: add.school,
                    });
                }
            }
        }
        out
    }

    /// Adds that have lost their tank
    pub fn loose_adds(&self) -> usize {
        match self {
            EncounterScript::AddWave { adds } => adds.iter().filter(|a| a.loose).count(),
            _ => 0,
        }
    }
}

fn living_tanks(raid: &Raid) -> Vec<MemberId> {
    raid.tanks()
        .filter(|m| m.is_alive())
        .map(|m| m.id.clone())
        .collect()
}
