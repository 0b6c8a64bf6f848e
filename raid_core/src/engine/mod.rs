//! Tick scheduler - one fixed step drives every system in a fixed order
//!
//! Per tick: advance time, boss script, effect ticks on every member, AI
//! healers in roster order, player cast bars, regeneration, then the
//! victory/wipe check and scoring.

mod score;
mod snapshot;

pub use score::{award_dkp, distribute_loot, HealerScore, LootAward, ScoreReport};
pub use snapshot::{BossView, EffectView, GameSnapshot, MemberView, PlayerView, SNAPSHOT_LOG_LINES};

use crate::ai::{assign_healers, AgentPlan, HealerAgent, PlannedAction};
use crate::cast::{ActiveCast, CastStart, Caster};
use crate::combat_log::{CombatEvent, CombatLog};
use crate::config::{ConfigError, GameData};
use crate::encounter::{deal_damage, Boss, BossDefinition, EncounterStatus};
use crate::error::{CastError, RosterError};
use crate::raid::{Raid, RaidSave};
use crate::resource::{regenerate_mana, HealingLedger};
use crate::spell::resolver::{self, PreparedCast, ResolutionReport};
use crate::spell::{CooldownTracker, RankChoice, Spell, SpellFamily};
use crate::types::{MemberId, Millis, ResourceKind, Role, WowClass};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// Whose cast bar a cast runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Player(usize),
    Agent(usize),
}

/// All mutable simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub raid: Raid,
    pub boss: Boss,
    /// AI healers in roster order
    pub agents: Vec<HealerAgent>,
    /// Human-controlled casters
    pub players: Vec<Caster>,
    pub cooldowns: CooldownTracker,
    pub ledger: HealingLedger,
    pub log: CombatLog,
    pub elapsed_ms: Millis,
    pub defeated_bosses: Vec<String>,
    /// Set once when the encounter ends
    pub score: Option<ScoreReport>,
}

impl GameState {
    fn caster(&self, slot: Slot) -> &Caster {
        match slot {
            Slot::Player(i) => &self.players[i],
            Slot::Agent(i) => &self.agents[i].caster,
        }
    }

    fn caster_mut(&mut self, slot: Slot) -> &mut Caster {
        match slot {
            Slot::Player(i) => &mut self.players[i],
            Slot::Agent(i) => &mut self.agents[i].caster,
        }
    }

    fn player_slot(&self, player: &MemberId) -> Result<Slot, CastError> {
        self.players
            .iter()
            .position(|p| &p.member_id == player)
            .map(Slot::Player)
            .ok_or_else(|| CastError::NoSuchTarget(player.clone()))
    }

    fn log_all(&mut self, events: Vec<CombatEvent>) {
        self.log.extend(self.elapsed_ms, events);
    }

    // === Casting ===

    /// Validate, pay and start a cast; instants resolve immediately
    fn begin_cast(
        &mut self,
        data: &GameData,
        rng: &mut impl Rng,
        slot: Slot,
        spell_id: &str,
        target: Option<&MemberId>,
    ) -> Result<(), CastError> {
        if !self.boss.is_active() {
            return Err(CastError::EncounterOver);
        }
        let spell = data
            .spells
            .get(spell_id)
            .ok_or_else(|| CastError::NoSuchSpell(spell_id.to_string()))?;
        let caster_id = self.caster(slot).member_id.clone();
        self.caster(slot).check_ready(spell)?;
        self.cooldowns.check(&caster_id, spell.family)?;

        let member = self
            .raid
            .get(&caster_id)
            .ok_or_else(|| CastError::NoSuchTarget(caster_id.clone()))?;
        resolver::validate(spell, member, target, &self.raid)?;
        let prepared = PreparedCast::for_caster(member, spell);
        let cost = prepared.mana_cost(spell);

        let now = self.elapsed_ms;
        self.raid
            .get_mut(&caster_id)
            .ok_or_else(|| CastError::NoSuchTarget(caster_id.clone()))?
            .spend_mana(cost, now)?;

        match self
            .caster_mut(slot)
            .start(spell, target.cloned(), prepared, data.constants.gcd_ms())?
        {
            CastStart::Instant(cast) => self.complete_cast(data, rng, &caster_id, cast),
            CastStart::Started => self.log.push(
                now,
                CombatEvent::CastStarted {
                    caster: caster_id,
                    spell: spell.name.clone(),
                    target: target.cloned(),
                },
            ),
        }
        Ok(())
    }

    /// Resolve a finished cast against the raid as it is now
    ///
    /// A target that died or became ineligible mid-cast makes the spell
    /// fizzle; the mana stays spent.
    fn complete_cast(&mut self, data: &GameData, rng: &mut impl Rng, caster_id: &MemberId, cast: ActiveCast) {
        if !self.boss.is_active() {
            return;
        }
        let Some(spell) = data.spells.get(&cast.spell_id) else {
            warn!(spell = %cast.spell_id, "finished cast of unknown spell");
            return;
        };
        let Some(member) = self.raid.get(caster_id) else {
            return;
        };
        if let Err(err) = resolver::validate(spell, member, cast.target.as_ref(), &self.raid) {
            debug!(caster = %caster_id, spell = %spell.id, %err, "cast fizzled");
            return;
        }
        let resolution = match resolver::resolve(
            spell,
            caster_id,
            cast.target.as_ref(),
            &self.raid,
            &cast.prepared,
            &data.constants,
            rng,
        ) {
            Ok(resolution) => resolution,
            Err(err) => {
                debug!(caster = %caster_id, spell = %spell.id, %err, "cast fizzled");
                return;
            }
        };
        if let Some(member) = self.raid.get_mut(caster_id) {
            cast.prepared.consume(member);
        }

        let now = self.elapsed_ms;
        let report = resolver::apply(&resolution, &mut self.raid, &mut self.ledger, &data.debuffs, now);
        self.cooldowns.start(caster_id, spell.family, spell.cooldown_ms());
        self.log_resolution(caster_id, spell, &report);

        if let Some((amount, _)) = report.boss_damage {
            let events = self.boss.damage(amount);
            self.log_all(events);
        }
    }

    fn log_resolution(&mut self, caster: &MemberId, spell: &Spell, report: &ResolutionReport) {
        let mut events = Vec::new();
        for heal in &report.heals {
            events.push(CombatEvent::Heal {
                caster: caster.clone(),
                target: heal.target.clone(),
                spell: spell.name.clone(),
                amount: heal.outcome.effective,
                overheal: heal.outcome.overheal,
                is_crit: heal.is_crit,
                periodic: false,
            });
        }
        let mut applied: Vec<(MemberId, String)> = Vec::new();
        if let Some(target) = &report.hot_applied {
            applied.push((target.clone(), spell.name.clone()));
        }
        if let Some((target, _)) = &report.absorb_applied {
            applied.push((target.clone(), spell.name.clone()));
        }
        applied.extend(report.buffs_applied.iter().cloned());
        for (target, buff) in applied {
            events.push(CombatEvent::BuffApplied {
                caster: caster.clone(),
                target,
                buff,
            });
        }
        if let Some((target, debuff)) = &report.dispelled {
            events.push(CombatEvent::Dispel {
                caster: caster.clone(),
                target: target.clone(),
                debuff: debuff.name.clone(),
            });
        }
        if let Some(target) = &report.dispel_missed {
            events.push(CombatEvent::DispelFailed {
                caster: caster.clone(),
                target: target.clone(),
                spell: spell.name.clone(),
            });
        }
        if let Some((amount, is_crit)) = report.boss_damage {
            events.push(CombatEvent::BossDamage {
                caster: caster.clone(),
                spell: spell.name.clone(),
                amount,
                is_crit,
            });
        }
        self.log_all(events);
    }

    // === Tick steps ===

    /// Step 3: debuffs, HoTs and buffs on every member, then explosions
    fn tick_effects(&mut self, dt_ms: Millis) {
        let now = self.elapsed_ms;
        let mut events = Vec::new();
        let mut explosions = Vec::new();

        for member in &mut self.raid.members {
            let report = member.tick_effects(dt_ms);
            for dot in &report.dot_ticks {
                if dot.outcome.raw > 0.0 {
                    events.push(CombatEvent::Damage {
                        source: dot.name.clone(),
                        target: member.id.clone(),
                        amount: dot.outcome.dealt,
                        absorbed: dot.outcome.absorbed,
                        school: dot.school,
                    });
                }
                if dot.mana_drained > 0.0 {
                    events.push(CombatEvent::ManaDrain {
                        source: dot.name.clone(),
                        target: member.id.clone(),
                        amount: dot.mana_drained,
                    });
                }
            }
            for tick in &report.hot_ticks {
                self.ledger.record(&tick.caster_id, &tick.outcome, tick.is_crit);
                events.push(CombatEvent::Heal {
                    caster: tick.caster_id.clone(),
                    target: member.id.clone(),
                    spell: tick.name.clone(),
                    amount: tick.outcome.effective,
                    overheal: tick.outcome.overheal,
                    is_crit: tick.is_crit,
                    periodic: true,
                });
            }
            if report.died {
                info!(member = %member.id, "member died to a periodic effect");
                events.push(CombatEvent::Death {
                    member: member.id.clone(),
                });
            }
            explosions.extend(report.explosions);
        }

        for blast in explosions {
            let victims: Vec<usize> = self
                .raid
                .members
                .iter()
                .enumerate()
                .filter(|(_, m)| m.is_alive() && (m.id == blast.bearer || m.group == blast.group))
                .map(|(idx, _)| idx)
                .collect();
            events.push(CombatEvent::Explosion {
                bearer: blast.bearer.clone(),
                debuff: blast.name.clone(),
                victims: victims.len(),
            });
            for idx in victims {
                deal_damage(&mut self.raid.members[idx], &blast.name, blast.damage, blast.school, &mut events);
            }
        }

        events.extend(self.boss.script.ensure_tank(&self.raid));
        self.log.extend(now, events);
    }

    /// Step 4: finish running casts, then plan from one view and act in order
    fn tick_agents(&mut self, data: &GameData, rng: &mut impl Rng, dt_ms: Millis) {
        let view = self.raid.clone();

        for i in 0..self.agents.len() {
            if !self.raid.get(&self.agents[i].member_id).is_some_and(|m| m.is_alive()) {
                self.agents[i].caster.reset();
                continue;
            }
            if let Some(cast) = self.agents[i].caster.tick(dt_ms) {
                let caster_id = self.agents[i].member_id.clone();
                self.complete_cast(data, rng, &caster_id, cast);
            }
        }

        let mut claimed: Vec<(MemberId, String)> = Vec::new();
        let mut plans: Vec<(usize, AgentPlan)> = Vec::new();
        for (i, agent) in self.agents.iter().enumerate() {
            let Some(plan) = agent.plan(&view, &self.cooldowns, &data.constants.ai, &claimed) else {
                continue;
            };
            if let PlannedAction::Dispel { debuff_id, .. } = &plan.action {
                claimed.push((plan.target.clone(), debuff_id.clone()));
            }
            plans.push((i, plan));
        }

        for (i, plan) in plans {
            if !self.boss.is_active() {
                break;
            }
            self.execute_plan(data, rng, i, plan);
        }
    }

    /// Try the plan's spells in order until one begins
    fn execute_plan(&mut self, data: &GameData, rng: &mut impl Rng, index: usize, plan: AgentPlan) {
        let slot = Slot::Agent(index);
        let class = self.agents[index].class;
        match plan.action {
            PlannedAction::Heal(decision) => {
                if let Some(family) = decision.mechanic.precast() {
                    match data.spells.pick(class, family, RankChoice::Max) {
                        Some(spell) => {
                            if let Err(err) = self.begin_cast(data, rng, slot, &spell.id, None) {
                                debug!(agent = %plan.agent, spell = %spell.id, %err, "precast rejected");
                            }
                        }
                        None => debug!(agent = %plan.agent, ?family, "no precast spell"),
                    }
                }
                let candidates = self.agents[index].candidates(&decision, &data.spells);
                for spell_id in &candidates {
                    match self.begin_cast(data, rng, slot, spell_id, Some(&plan.target)) {
                        Ok(()) => return,
                        Err(err) => debug!(agent = %plan.agent, spell = %spell_id, %err, "cast rejected"),
                    }
                }
                debug!(agent = %plan.agent, target = %plan.target, "nothing castable, idling");
            }
            PlannedAction::Dispel { debuff_id, debuff_type } => {
                let Some(spell) = data.spells.dispel_for(class, debuff_type) else {
                    debug!(agent = %plan.agent, ?debuff_type, "no dispel spell");
                    return;
                };
                if let Err(err) = self.begin_cast(data, rng, slot, &spell.id, Some(&plan.target)) {
                    debug!(agent = %plan.agent, debuff = %debuff_id, %err, "dispel rejected");
                }
            }
        }
    }

    /// Step 5: human cast bars
    fn tick_players(&mut self, data: &GameData, rng: &mut impl Rng, dt_ms: Millis) {
        for i in 0..self.players.len() {
            let caster_id = self.players[i].member_id.clone();
            if !self.raid.get(&caster_id).is_some_and(|m| m.is_alive()) {
                self.players[i].reset();
                continue;
            }
            if let Some(cast) = self.players[i].tick(dt_ms) {
                self.complete_cast(data, rng, &caster_id, cast);
            }
        }
    }

    /// Step 6: mana for everyone, health only when enabled
    fn regenerate(&mut self, data: &GameData, dt_ms: Millis) {
        let now = self.elapsed_ms;
        let regen = &data.constants.regen;
        for member in self.raid.members.iter_mut().filter(|m| m.is_alive()) {
            if member.resource.kind == ResourceKind::Mana {
                let mp5 = member.current_mp5(now, regen.five_second_rule_ms);
                regenerate_mana(&mut member.resource, mp5, dt_ms);
            }
            if regen.health_regen_in_combat && member.stats.health_regen_per_5 > 0.0 {
                member
                    .vitals
                    .heal(member.stats.health_regen_per_5 * dt_ms as f64 / 5000.0);
            }
        }
    }

    /// Damage or deaths from outside the boss tick can end the fight too
    fn check_terminal(&mut self) {
        let mut events = self.boss.check_victory();
        events.extend(self.boss.check_raid_dead(&self.raid));
        self.log_all(events);
    }

    /// Step 7: score, loot and DKP, exactly once per encounter
    fn finalize(&mut self, data: &GameData, rng: &mut impl Rng) {
        let outcome = self.boss.status;
        if self.score.is_some() || !outcome.is_terminal() {
            return;
        }
        for agent in &mut self.agents {
            agent.caster.reset();
        }
        for player in &mut self.players {
            player.reset();
        }

        let mut report = ScoreReport::compute(
            self.boss.definition(),
            outcome,
            &self.raid,
            &self.ledger,
            self.elapsed_ms,
        );
        let mut events = Vec::new();
        if outcome == EncounterStatus::Victory {
            report.loot = distribute_loot(self.boss.definition(), &data.items, &mut self.raid, rng);
            for award in &report.loot {
                events.push(CombatEvent::Loot {
                    member: award.member.clone(),
                    item: award.item_name.clone(),
                    dkp: award.dkp_cost,
                });
            }
            if !self.defeated_bosses.contains(&self.boss.id) {
                self.defeated_bosses.push(self.boss.id.clone());
            }
        }
        report.dkp_awarded = award_dkp(&mut self.raid, outcome, &data.constants.loot);
        events.push(CombatEvent::DkpAwarded {
            amount: report.dkp_awarded,
            members: self.raid.members.len(),
        });
        self.log_all(events);

        info!(summary = %report.summary(), "encounter finished");
        self.score = Some(report);
    }

    /// Pre-pull buffs: Blessing of Light on each tank, Mana Spring per shaman
    fn precombat_buffs(&mut self, data: &GameData, rng: &mut impl Rng) {
        let healers_of = |raid: &Raid, class: WowClass| -> Vec<MemberId> {
            raid.living()
                .filter(|m| m.class == class && m.role == Role::Healer)
                .map(|m| m.id.clone())
                .collect()
        };
        let paladins = healers_of(&self.raid, WowClass::Paladin);
        let shamans = healers_of(&self.raid, WowClass::Shaman);
        let tanks: Vec<MemberId> = self
            .raid
            .tanks()
            .filter(|m| m.is_alive())
            .map(|m| m.id.clone())
            .collect();

        if !paladins.is_empty() {
            for (i, tank) in tanks.iter().enumerate() {
                let paladin = &paladins[i % paladins.len()];
                self.precast_buff(data, rng, paladin, SpellFamily::BlessingOfLight, Some(tank));
            }
        }
        for shaman in &shamans {
            self.precast_buff(data, rng, shaman, SpellFamily::ManaSpringTotem, None);
        }
    }

    /// Apply a spell's buffs without cost, cooldown or cast time
    fn precast_buff(
        &mut self,
        data: &GameData,
        rng: &mut impl Rng,
        caster_id: &MemberId,
        family: SpellFamily,
        target: Option<&MemberId>,
    ) {
        let Some(class) = self.raid.get(caster_id).map(|m| m.class) else {
            return;
        };
        let Some(spell) = data.spells.pick(class, family, RankChoice::Max) else {
            debug!(caster = %caster_id, ?family, "no pre-pull spell");
            return;
        };
        let resolution = match resolver::resolve(
            spell,
            caster_id,
            target,
            &self.raid,
            &PreparedCast::default(),
            &data.constants,
            rng,
        ) {
            Ok(resolution) => resolution,
            Err(err) => {
                debug!(caster = %caster_id, spell = %spell.id, %err, "pre-pull buff skipped");
                return;
            }
        };
        let mut events = Vec::new();
        for (recipient, buff) in resolution.buffs {
            if let Some(member) = self.raid.get_mut(&recipient) {
                events.push(CombatEvent::BuffApplied {
                    caster: caster_id.clone(),
                    target: recipient.clone(),
                    buff: buff.name.clone(),
                });
                member.apply_buff(buff);
            }
        }
        self.log_all(events);
    }
}

/// A seeded, single-threaded encounter
///
/// `R` defaults to ChaCha8 so a seed reproduces a run on every platform.
pub struct Simulation<R: Rng = ChaCha8Rng> {
    data: GameData,
    state: GameState,
    rng: R,
}

impl Simulation<ChaCha8Rng> {
    /// Encounter against `boss_id` from the data tables
    ///
    /// `players` are member ids driven through [`Simulation::cast_spell`];
    /// every other healer gets an AI agent.
    pub fn new(
        data: GameData,
        raid: Raid,
        boss_id: &str,
        players: &[MemberId],
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let boss = data
            .bosses
            .get(boss_id)
            .cloned()
            .ok_or_else(|| ConfigError::ValidationError(format!("unknown boss '{boss_id}'")))?;
        Ok(Self::with_rng(data, raid, boss, players, ChaCha8Rng::seed_from_u64(seed)))
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(data: GameData, raid: Raid, boss: BossDefinition, players: &[MemberId], rng: R) -> Self {
        let players: Vec<Caster> = players
            .iter()
            .filter(|id| {
                let known = raid.get(id).is_some();
                if !known {
                    warn!(player = %id, "player is not in the raid, ignoring");
                }
                known
            })
            .map(|id| Caster::new(id.clone()))
            .collect();
        let player_ids: Vec<MemberId> = players.iter().map(|p| p.member_id.clone()).collect();
        let agents = assign_healers(&raid, &player_ids);
        info!(boss = %boss.name, agents = agents.len(), players = players.len(), "simulation created");

        Simulation {
            state: GameState {
                boss: Boss::new(boss),
                agents,
                players,
                cooldowns: CooldownTracker::new(),
                ledger: HealingLedger::new(),
                log: CombatLog::new(),
                elapsed_ms: 0,
                defeated_bosses: Vec::new(),
                score: None,
                raid,
            },
            data,
            rng,
        }
    }

    // === Accessors ===

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn raid(&self) -> &Raid {
        &self.state.raid
    }

    pub fn boss(&self) -> &Boss {
        &self.state.boss
    }

    pub fn log(&self) -> &CombatLog {
        &self.state.log
    }

    pub fn ledger(&self) -> &HealingLedger {
        &self.state.ledger
    }

    pub fn agents(&self) -> &[HealerAgent] {
        &self.state.agents
    }

    pub fn elapsed_ms(&self) -> Millis {
        self.state.elapsed_ms
    }

    pub fn status(&self) -> EncounterStatus {
        self.state.boss.status
    }

    pub fn is_over(&self) -> bool {
        self.state.boss.status.is_terminal()
    }

    pub fn score(&self) -> Option<&ScoreReport> {
        self.state.score.as_ref()
    }

    pub fn defeated_bosses(&self) -> &[String] {
        &self.state.defeated_bosses
    }

    /// Mark bosses as already killed (loaded from a save)
    pub fn set_defeated_bosses(&mut self, defeated: Vec<String>) {
        self.state.defeated_bosses = defeated;
    }

    // === Lifecycle ===

    /// Pull the boss; does nothing unless the encounter is waiting
    pub fn start(&mut self) {
        if self.state.boss.status != EncounterStatus::Inactive {
            return;
        }
        let Simulation { data, state, rng } = self;
        state.elapsed_ms = 0;
        let events = state.boss.start(&state.raid);
        state.log_all(events);
        state.precombat_buffs(data, rng);
    }

    /// Advance one fixed step; returns the encounter status afterwards
    pub fn tick(&mut self) -> EncounterStatus {
        let Simulation { data, state, rng } = self;
        if !state.boss.is_active() {
            return state.boss.status;
        }
        let dt_ms = data.constants.tick_ms();

        // 1. Time
        state.elapsed_ms += dt_ms;
        state.cooldowns.tick(dt_ms);

        // 2. Boss
        let events = state.boss.tick(
            dt_ms,
            state.elapsed_ms,
            &mut state.raid,
            &data.debuffs,
            &data.constants,
            rng,
        );
        state.log_all(events);

        // 3. Effects
        if state.boss.is_active() {
            state.tick_effects(dt_ms);
            state.check_terminal();
        }

        // 4-5. Healers
        if state.boss.is_active() {
            state.tick_agents(data, rng, dt_ms);
            state.tick_players(data, rng, dt_ms);
            state.check_terminal();
        }

        // 6. Regen
        if state.boss.is_active() {
            state.regenerate(data, dt_ms);
        }

        // 7. Outcome
        state.finalize(data, rng);
        state.boss.status
    }

    /// Tick until the encounter ends or `max_ms` of simulated time passes
    pub fn run_until_done(&mut self, max_ms: Millis) -> EncounterStatus {
        self.start();
        while self.state.boss.is_active() && self.state.elapsed_ms < max_ms {
            self.tick();
        }
        self.state.boss.status
    }

    /// Restore the raid, drop every effect and rebuild the boss
    ///
    /// DKP, gear and the defeated-boss list survive.
    pub fn reset(&mut self) {
        let state = &mut self.state;
        state.raid.reset();
        state.boss = Boss::new(state.boss.definition().clone());
        for agent in &mut state.agents {
            agent.caster.reset();
        }
        for player in &mut state.players {
            player.reset();
        }
        state.cooldowns.clear();
        state.ledger.clear();
        state.log.clear();
        state.elapsed_ms = 0;
        state.score = None;
        info!(boss = %state.boss.name, "encounter reset");
    }

    /// Reset against a different boss
    pub fn set_boss(&mut self, boss_id: &str) -> Result<(), ConfigError> {
        let boss = self
            .data
            .bosses
            .get(boss_id)
            .cloned()
            .ok_or_else(|| ConfigError::ValidationError(format!("unknown boss '{boss_id}'")))?;
        self.state.boss = Boss::new(boss);
        self.reset();
        Ok(())
    }

    /// Swap a raid member with a benched one between pulls
    pub fn swap_bench(&mut self, out: &MemberId, incoming: &MemberId) -> Result<(), RosterError> {
        if self.state.boss.is_active() {
            return Err(RosterError::InCombat);
        }
        self.state.raid.swap_bench(out, incoming)?;

        let GameState { raid, players, .. } = &mut self.state;
        players.retain(|p| raid.get(&p.member_id).is_some());
        let player_ids: Vec<MemberId> = players.iter().map(|p| p.member_id.clone()).collect();
        self.state.agents = assign_healers(&self.state.raid, &player_ids);
        Ok(())
    }

    // === Player intent ===

    /// Begin a cast for a human player
    ///
    /// A failed attempt changes nothing and logs nothing.
    pub fn cast_spell(
        &mut self,
        player: &MemberId,
        spell_id: &str,
        target: Option<&MemberId>,
    ) -> Result<(), CastError> {
        let Simulation { data, state, rng } = self;
        let slot = state.player_slot(player)?;
        state.begin_cast(data, rng, slot, spell_id, target)
    }

    /// Abandon a player's cast; silent when nothing is being cast
    pub fn cancel_cast(&mut self, player: &MemberId) {
        let Ok(slot) = self.state.player_slot(player) else {
            return;
        };
        if let Some(cast) = self.state.caster_mut(slot).cancel() {
            let spell = self
                .data
                .spells
                .get(&cast.spell_id)
                .map(|s| s.name.clone())
                .unwrap_or(cast.spell_id);
            let now = self.state.elapsed_ms;
            self.state.log.push(
                now,
                CombatEvent::CastCancelled {
                    caster: player.clone(),
                    spell,
                },
            );
        }
    }

    // === Views ===

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(
            self.state.elapsed_ms,
            &self.state.raid,
            &self.state.boss,
            self.state.players.iter(),
            self.state.log.recent(SNAPSHOT_LOG_LINES),
            self.state.score.as_ref(),
        )
    }

    /// Roster, gear, DKP and progress for the next session
    pub fn save(&self) -> RaidSave {
        RaidSave::capture(&self.state.raid, &self.state.defeated_bosses)
    }
}
