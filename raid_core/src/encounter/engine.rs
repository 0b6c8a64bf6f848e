//! Boss runtime - health, enrage, phases and the damage event timers

use super::{BossDefinition, DamageEvent, DamageEventKind, EncounterScript, EncounterStatus, TargetRule, WipeReason};
use crate::combat_log::CombatEvent;
use crate::config::SimConstants;
use crate::effect::tick::accumulate_ticks;
use crate::effect::DebuffTable;
use crate::raid::{Raid, RaidMember};
use crate::types::{secs_to_ms, Millis, Role, School};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

/// A boss being fought
#[derive(Debug, Clone)]
pub struct Boss {
    pub id: String,
    pub name: String,
    pub current_health: f64,
    pub max_health: f64,
    pub enrage_timer_ms: Millis,
    pub enrage_remaining_ms: Millis,
    pub current_phase: u32,
    pub status: EncounterStatus,
    pub script: EncounterScript,
    definition: BossDefinition,
    /// One accumulator per damage event, same order as the definition
    event_timers: Vec<Millis>,
    /// Phases already entered through a health threshold
    crossed_phases: Vec<u32>,
    elapsed_ms: Millis,
}

impl Boss {
    pub fn new(definition: BossDefinition) -> Self {
        let enrage_timer_ms = secs_to_ms(definition.enrage_timer);
        Boss {
            id: definition.id.clone(),
            name: definition.name.clone(),
            current_health: definition.max_health.max(0.0),
            max_health: definition.max_health.max(0.0),
            enrage_timer_ms,
            enrage_remaining_ms: enrage_timer_ms,
            current_phase: 1,
            status: EncounterStatus::Inactive,
            script: EncounterScript::from_kind(&definition.script),
            event_timers: vec![0; definition.damage_events.len()],
            crossed_phases: Vec::new(),
            elapsed_ms: 0,
            definition,
        }
    }

    pub fn definition(&self) -> &BossDefinition {
        &self.definition
    }

    /// Pull the boss
    pub fn start(&mut self, raid: &Raid) -> Vec<CombatEvent> {
        *self = Boss::new(self.definition.clone());
        self.status = EncounterStatus::Active;
        info!(boss = %self.name, health = self.max_health, "encounter started");

        let mut events = vec![CombatEvent::EncounterStart {
            boss: self.name.clone(),
        }];
        events.extend(self.script.start(raid));
        events
    }

    pub fn health_pct(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.current_health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn is_active(&self) -> bool {
        self.status == EncounterStatus::Active
    }

    pub fn elapsed_ms(&self) -> Millis {
        self.elapsed_ms
    }

    /// Damage the boss, entering any phase whose threshold was crossed
    pub fn damage(&mut self, amount: f64) -> Vec<CombatEvent> {
        if !self.is_active() || amount <= 0.0 {
            return Vec::new();
        }
        self.current_health = (self.current_health - amount).max(0.0);
        self.check_phases()
    }

    fn check_phases(&mut self) -> Vec<CombatEvent> {
        let pct = self.health_pct();
        let mut transitions: Vec<_> = self.definition.phase_transitions.iter().collect();
        transitions.sort_by(|a, b| b.health_percent.total_cmp(&a.health_percent));

        let mut events = Vec::new();
        for transition in transitions {
            if pct > transition.health_percent || self.crossed_phases.contains(&transition.phase) {
                continue;
            }
            self.crossed_phases.push(transition.phase);
            self.current_phase = transition.phase;
            info!(boss = %self.name, phase = transition.phase, "phase transition");
            events.push(CombatEvent::PhaseChange {
                phase: transition.phase,
                message: transition.message.clone(),
            });
        }
        events
    }

    /// Advance the encounter by `dt_ms`
    pub fn tick(
        &mut self,
        dt_ms: Millis,
        now_ms: Millis,
        raid: &mut Raid,
        debuffs: &DebuffTable,
        constants: &SimConstants,
        rng: &mut impl Rng,
    ) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        if !self.is_active() {
            return events;
        }
        self.elapsed_ms += dt_ms;

        // === Raid damage on the boss ===
        let raid_damage = raid_dps(raid, constants, rng) * dt_ms as f64 / 1000.0;
        events.extend(self.damage(raid_damage));
        if self.current_health <= 0.0 {
            events.extend(self.finish(EncounterStatus::Victory));
            return events;
        }

        // === Enrage ===
        self.enrage_remaining_ms = self.enrage_remaining_ms.saturating_sub(dt_ms);

        // === Scripted abilities ===
        let mut due = Vec::new();
        for (i, event) in self.definition.damage_events.iter().enumerate() {
            if !event.active_in(self.current_phase) {
                continue;
            }
            let fires = accumulate_ticks(&mut self.event_timers[i], event.interval_ms(), dt_ms);
            for _ in 0..fires {
                due.push(event.clone());
            }
        }
        for event in &due {
            self.fire(event, now_ms, raid, debuffs, constants, rng, &mut events);
        }

        let script_tick = self.script.tick(dt_ms, raid, rng);
        events.extend(script_tick.events);
        for hit in script_tick.hits {
            if let Some(member) = raid.get_mut(&hit.target) {
                deal_damage(member, &hit.source, hit.damage, hit.school, &mut events);
            }
        }
        events.extend(self.script.ensure_tank(raid));

        // === Terminal conditions ===
        if self.current_health <= 0.0 {
            events.extend(self.finish(EncounterStatus::Victory));
        } else if self.enrage_remaining_ms == 0 {
            events.extend(self.finish(EncounterStatus::Wipe(WipeReason::Enrage)));
        } else if raid.all_dead() {
            events.extend(self.finish(EncounterStatus::Wipe(WipeReason::RaidDead)));
        }
        events
    }

    /// Check for a raid wipe caused outside the boss tick
    pub fn check_raid_dead(&mut self, raid: &Raid) -> Vec<CombatEvent> {
        if self.is_active() && raid.all_dead() {
            self.finish(EncounterStatus::Wipe(WipeReason::RaidDead))
        } else {
            Vec::new()
        }
    }

    /// Check for a kill caused outside the boss tick
    pub fn check_victory(&mut self) -> Vec<CombatEvent> {
        if self.is_active() && self.current_health <= 0.0 {
            self.finish(EncounterStatus::Victory)
        } else {
            Vec::new()
        }
    }

    fn finish(&mut self, status: EncounterStatus) -> Vec<CombatEvent> {
        self.status = status;
        match status {
            EncounterStatus::Victory => {
                info!(boss = %self.name, elapsed_ms = self.elapsed_ms, "victory");
                vec![CombatEvent::Victory {
                    boss: self.name.clone(),
                }]
            }
            EncounterStatus::Wipe(reason) => {
                info!(boss = %self.name, elapsed_ms = self.elapsed_ms, ?reason, "wipe");
                vec![CombatEvent::Wipe {
                    boss: self.name.clone(),
                    reason,
                }]
            }
            _ => Vec::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fire(
        &mut self,
        event: &DamageEvent,
        now_ms: Millis,
        raid: &mut Raid,
        debuffs: &DebuffTable,
        constants: &SimConstants,
        rng: &mut impl Rng,
        events: &mut Vec<CombatEvent>,
    ) {
        debug!(boss = %self.name, ability = %event.name, "ability fired");
        match event.kind {
            DamageEventKind::TankDamage => {
                if let Some(idx) = self.script.tank(raid).and_then(|id| raid.index_of(&id)) {
                    deal_damage(&mut raid.members[idx], &event.name, event.damage, event.school, events);
                }
                events.extend(self.script.ensure_tank(raid));
            }
            DamageEventKind::RaidDamage => {
                let living = living_indices(raid, |_| true);
                let count = event.target_count.unwrap_or(living.len()).min(living.len());
                let amount = event.damage * constants.encounter.raid_damage_multiplier;
                let targets: Vec<usize> = living.choose_multiple(rng, count).copied().collect();
                for idx in targets {
                    deal_damage(&mut raid.members[idx], &event.name, amount, event.school, events);
                }
                events.extend(self.script.ensure_tank(raid));
            }
            DamageEventKind::RandomTarget => {
                let living = living_indices(raid, |_| true);
                if let Some(&idx) = living.choose(rng) {
                    deal_damage(&mut raid.members[idx], &event.name, event.damage, event.school, events);
                }
                events.extend(self.script.ensure_tank(raid));
            }
            DamageEventKind::Debuff => {
                let Some(debuff_id) = event.debuff_id.as_deref() else {
                    warn!(ability = %event.name, "debuff event without a debuff id");
                    return;
                };
                let Some(definition) = debuffs.get(debuff_id) else {
                    warn!(ability = %event.name, debuff = debuff_id, "unknown debuff, skipping");
                    return;
                };
                for idx in self.debuff_targets(event.target, raid, rng) {
                    let debuff = definition.instantiate(now_ms);
                    let member = &mut raid.members[idx];
                    member.apply_debuff(debuff.clone());
                    let target = member.id.clone();
                    events.push(CombatEvent::DebuffApplied {
                        source: self.name.clone(),
                        target: target.clone(),
                        debuff: debuff.name.clone(),
                    });
                    events.extend(self.script.on_debuff_landed(&target, &debuff, raid));
                }
            }
            DamageEventKind::TankSwap => {
                events.extend(self.script.swap(raid));
            }
        }
    }

    fn debuff_targets(&self, rule: TargetRule, raid: &Raid, rng: &mut impl Rng) -> Vec<usize> {
        match rule {
            TargetRule::Tank => self
                .script
                .tank(raid)
                .and_then(|id| raid.index_of(&id))
                .into_iter()
                .collect(),
            TargetRule::Random => living_indices(raid, |_| true).choose(rng).copied().into_iter().collect(),
            TargetRule::RandomNonTank => {
                let mut pool = living_indices(raid, |m| m.role != Role::Tank);
                if pool.is_empty() {
                    pool = living_indices(raid, |_| true);
                }
                pool.choose(rng).copied().into_iter().collect()
            }
            TargetRule::Raid => living_indices(raid, |_| true),
        }
    }
}

fn living_indices(raid: &Raid, filter: impl Fn(&RaidMember) -> bool) -> Vec<usize> {
    raid.members
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_alive() && filter(m))
        .map(|(i, _)| i)
        .collect()
}

/// Damage per second the living raid puts on the boss
fn raid_dps(raid: &Raid, constants: &SimConstants, rng: &mut impl Rng) -> f64 {
    let tuning = &constants.encounter;
    let total: f64 = raid
        .living()
        .filter(|m| m.role != Role::Healer)
        .map(|m| tuning.base_dps(m.role) + m.gear_score() as f64 * tuning.dps_per_gear_score)
        .sum();
    if total <= 0.0 {
        return 0.0;
    }
    let variance = tuning.dps_variance.clamp(0.0, 1.0);
    total * rng.gen_range(1.0 - variance..=1.0 + variance)
}

/// Apply one hit to a member and log it
pub(crate) fn deal_damage(
    member: &mut RaidMember,
    source: &str,
    amount: f64,
    school: School,
    events: &mut Vec<CombatEvent>,
) {
    if !member.is_alive() {
        return;
    }
    let outcome = member.take_damage(amount, school);
    events.push(CombatEvent::Damage {
        source: source.to_string(),
        target: member.id.clone(),
        amount: outcome.dealt,
        absorbed: outcome.absorbed,
        school,
    });
    if outcome.killed {
        info!(member = %member.id, source, "member died");
        events.push(CombatEvent::Death {
            member: member.id.clone(),
        });
    }
}
