//! Raid members and the raid roster

mod gear;
mod roster;

pub use gear::{compatible_slots, Equipment, GearTotals, Item};
pub use roster::{BaseStats, HealerAssignment, MemberConfig, RaidSave, RosterConfig};

use crate::effect::{self, ActiveBuff, ActiveDebuff, ActiveHoT, BuffEffect, EffectTickReport};
use crate::error::RosterError;
use crate::resource::{DamageOutcome, HealOutcome, ResourcePool, Vitals};
use crate::spell::SpellFamily;
use crate::types::{DebuffType, MemberId, Millis, PositionZone, ResourceKind, Role, School, WowClass};
use serde::{Deserialize, Serialize};

/// Maximum members in an active raid
pub const MAX_RAID_SIZE: usize = 40;

/// Rage conversion at level 60
const RAGE_CONVERSION: f64 = 453.3;

/// Stats derived from base values plus gear
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberStats {
    pub spell_power: f64,
    /// Fraction (0.05 = 5%)
    pub crit_chance: f64,
    /// Gear regen, always active
    pub mp5: f64,
    /// Spirit regen, only outside the five-second rule
    pub spirit_mp5: f64,
    pub health_regen_per_5: f64,
}

/// One simulated character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidMember {
    // === Identity ===
    pub id: MemberId,
    pub name: String,
    pub class: WowClass,
    pub spec: String,
    pub role: Role,

    // === Vitals ===
    pub vitals: Vitals,
    pub resource: ResourcePool,

    // === Position ===
    /// Raid group 1-8
    pub group: u8,
    pub zone: PositionZone,

    // === Gear ===
    pub equipment: Equipment,
    pub base: BaseStats,
    pub stats: MemberStats,

    // === Live effects ===
    #[serde(default)]
    pub buffs: Vec<ActiveBuff>,
    #[serde(default)]
    pub debuffs: Vec<ActiveDebuff>,
    #[serde(default)]
    pub hots: Vec<ActiveHoT>,

    // === Bookkeeping ===
    #[serde(default)]
    pub dkp: f64,
    /// Last time mana was spent, for the five-second rule
    #[serde(default)]
    pub last_mana_spend_ms: Option<Millis>,
    #[serde(default)]
    pub assignment: Option<HealerAssignment>,
}

impl RaidMember {
    /// Build a member from a roster entry
    pub fn from_config(config: &MemberConfig) -> Self {
        let base = config.base.unwrap_or_else(|| BaseStats::for_class(config.class, config.role));
        let mut member = RaidMember {
            id: MemberId::from(config.id.as_str()),
            name: config.name.clone(),
            class: config.class,
            spec: config.spec.clone().unwrap_or_default(),
            role: config.role,
            vitals: Vitals::new(base.health),
            resource: ResourcePool::new(config.class.resource_kind(), base.mana),
            group: config.group.clamp(1, 8),
            zone: config.zone.unwrap_or(match config.role {
                Role::Tank => PositionZone::Tank,
                Role::Healer => PositionZone::Ranged,
                Role::Dps => PositionZone::Melee,
            }),
            equipment: Equipment::new(),
            base,
            stats: MemberStats::default(),
            buffs: Vec::new(),
            debuffs: Vec::new(),
            hots: Vec::new(),
            dkp: config.dkp,
            last_mana_spend_ms: None,
            assignment: config.assignment,
        };
        for item in &config.gear {
            let slot = member
                .equipment
                .upgrade_slot_for(item)
                .map(|(slot, _)| slot)
                .unwrap_or(item.slot);
            member.equipment.equip(slot, item.clone());
        }
        member.recompute_stats();
        member.vitals.reset();
        member.resource.reset();
        member
    }

    /// Rebuild derived stats from base values and equipment
    pub fn recompute_stats(&mut self) {
        let gear = self.equipment.totals();
        self.stats = MemberStats {
            spell_power: self.base.spell_power + gear.healing_power,
            crit_chance: self.base.crit_chance + gear.spell_crit + gear.intellect / 6000.0,
            mp5: self.base.mp5 + gear.mp5,
            spirit_mp5: self.base.spirit_mp5,
            health_regen_per_5: self.base.health_regen_per_5,
        };
        self.vitals.set_max(self.base.health + gear.stamina * 10.0);
        if self.resource.kind == ResourceKind::Mana {
            self.resource.max = self.base.mana + gear.intellect * 15.0;
            self.resource.current = self.resource.current.min(self.resource.max);
        }
    }

    /// Equip an item, rebuilding stats and returning the replaced item
    pub fn equip(&mut self, item: Item) -> Option<Item> {
        let slot = self
            .equipment
            .upgrade_slot_for(&item)
            .map(|(slot, _)| slot)
            .unwrap_or(item.slot);
        let old = self.equipment.equip(slot, item);
        self.recompute_stats();
        old
    }

    pub fn gear_score(&self) -> u32 {
        self.equipment.gear_score()
    }

    // === Vitals ===

    pub fn is_alive(&self) -> bool {
        self.vitals.is_alive()
    }

    pub fn health_pct(&self) -> f64 {
        self.vitals.percent()
    }

    pub fn is_injured(&self) -> bool {
        self.is_alive() && self.vitals.missing() > 0.0
    }

    pub fn mana_pct(&self) -> f64 {
        self.resource.percent()
    }

    /// Largest healing reduction among debuffs (they don't stack)
    pub fn healing_reduction(&self) -> f64 {
        self.debuffs
            .iter()
            .map(|d| d.healing_reduction)
            .fold(0.0, f64::max)
    }

    /// Receive a heal, applying healing reduction
    ///
    /// `raw` stays the amount that was resolved. The share cancelled by
    /// reduction counts as overheal (and is reported as `prevented`), so
    /// `effective + overheal == raw` still holds.
    pub fn receive_heal(&mut self, amount: f64) -> HealOutcome {
        let raw = amount.max(0.0);
        let reduction = self.healing_reduction();
        let landed = if reduction > 0.0 {
            (raw * (1.0 - reduction)).floor().max(0.0)
        } else {
            raw
        };
        let mut outcome = self.vitals.heal(landed);
        outcome.raw = raw;
        outcome.prevented = raw - landed;
        outcome.overheal += outcome.prevented;
        outcome
    }

    /// Take damage: magic vulnerability, then absorbs, then health
    pub fn take_damage(&mut self, amount: f64, school: School) -> DamageOutcome {
        let mut incoming = amount.max(0.0);
        if school.is_magic() {
            let vuln: f64 = self.debuffs.iter().map(|d| d.increases_magic_damage_taken).sum();
            incoming *= 1.0 + vuln;
        }
        incoming = incoming.floor();

        if !self.is_alive() {
            return DamageOutcome {
                raw: incoming,
                overkill: incoming,
                ..Default::default()
            };
        }

        let mut absorbed = 0.0;
        for buff in self.buffs.iter_mut() {
            if incoming - absorbed <= 0.0 {
                break;
            }
            absorbed += buff.absorb(incoming - absorbed);
        }
        self.buffs.retain(|b| b.is_active());

        let mut outcome = self.vitals.damage(incoming - absorbed);
        outcome.raw = incoming;
        outcome.absorbed = absorbed;

        if self.resource.kind == ResourceKind::Rage && outcome.dealt > 0.0 {
            self.resource.restore(2.5 * outcome.dealt / RAGE_CONVERSION);
        }
        if outcome.killed {
            self.clear_effects();
        }
        outcome
    }

    /// Spend mana at `now_ms`
    pub fn spend_mana(&mut self, amount: f64, now_ms: Millis) -> Result<(), crate::error::CastError> {
        self.resource.spend(amount)?;
        if amount > 0.0 {
            self.last_mana_spend_ms = Some(now_ms);
        }
        Ok(())
    }

    /// Whether the member spent mana within the last `rule_ms`
    pub fn in_five_second_rule(&self, now_ms: Millis, rule_ms: Millis) -> bool {
        self.last_mana_spend_ms
            .map(|t| now_ms.saturating_sub(t) < rule_ms)
            .unwrap_or(false)
    }

    /// Mana per 5 seconds right now (gear, buffs, and spirit outside the 5SR)
    pub fn current_mp5(&self, now_ms: Millis, rule_ms: Millis) -> f64 {
        let buff_mp5: f64 = self
            .buffs
            .iter()
            .map(|b| match b.effect {
                BuffEffect::ManaRegen { mp5 } => mp5,
                _ => 0.0,
            })
            .sum();
        let spirit = if self.in_five_second_rule(now_ms, rule_ms) {
            0.0
        } else {
            self.stats.spirit_mp5
        };
        self.stats.mp5 + buff_mp5 + spirit
    }

    // === Effects ===

    /// Apply a buff, replacing one with the same id
    pub fn apply_buff(&mut self, buff: ActiveBuff) {
        if !self.is_alive() {
            return;
        }
        if let Some(existing) = self.buffs.iter_mut().find(|b| b.id == buff.id) {
            *existing = buff;
        } else {
            self.buffs.push(buff);
        }
    }

    pub fn remove_buff(&mut self, id: &str) -> Option<ActiveBuff> {
        let idx = self.buffs.iter().position(|b| b.id == id)?;
        Some(self.buffs.remove(idx))
    }

    pub fn has_buff(&self, id: &str) -> bool {
        self.buffs.iter().any(|b| b.id == id)
    }

    /// Remove and return the first buff matching `pred`
    pub fn consume_buff(&mut self, pred: impl Fn(&BuffEffect) -> bool) -> Option<ActiveBuff> {
        let idx = self.buffs.iter().position(|b| pred(&b.effect))?;
        Some(self.buffs.remove(idx))
    }

    pub fn has_buff_effect(&self, pred: impl Fn(&BuffEffect) -> bool) -> bool {
        self.buffs.iter().any(|b| pred(&b.effect))
    }

    /// Sum of flat healing bonuses for a spell family
    pub fn healing_bonus_for(&self, family: SpellFamily) -> f64 {
        self.buffs.iter().map(|b| b.healing_bonus_for(family)).sum()
    }

    /// Apply a debuff; same id refreshes in place. Returns true if new.
    pub fn apply_debuff(&mut self, debuff: ActiveDebuff) -> bool {
        if !self.is_alive() {
            return false;
        }
        if let Some(existing) = self.debuffs.iter_mut().find(|d| d.id == debuff.id) {
            existing.refresh(&debuff);
            false
        } else {
            self.debuffs.push(debuff);
            true
        }
    }

    pub fn has_debuff(&self, id: &str) -> bool {
        self.debuffs.iter().any(|d| d.id == id)
    }

    /// First debuff a dispel of `filter` could remove
    pub fn dispellable_debuff(&self, filter: &[DebuffType]) -> Option<&ActiveDebuff> {
        self.debuffs.iter().find(|d| d.can_be_dispelled_by(filter))
    }

    /// Apply a HoT; the same caster and family refreshes in place
    pub fn apply_hot(&mut self, hot: ActiveHoT) {
        if !self.is_alive() {
            return;
        }
        if let Some(existing) = self
            .hots
            .iter_mut()
            .find(|h| h.caster_id == hot.caster_id && h.family == hot.family)
        {
            existing.refresh(&hot);
        } else {
            self.hots.push(hot);
        }
    }

    /// Whether `caster` already has a HoT of `family` ticking here
    pub fn has_own_hot(&self, caster: &MemberId, family: SpellFamily) -> bool {
        self.hots
            .iter()
            .any(|h| &h.caster_id == caster && h.family == family)
    }

    pub fn has_hot_of(&self, families: &[SpellFamily]) -> bool {
        self.hots.iter().any(|h| families.contains(&h.family))
    }

    /// Remove the first HoT of one of `families` (Swiftmend)
    pub fn consume_hot(&mut self, families: &[SpellFamily]) -> Option<ActiveHoT> {
        let idx = self.hots.iter().position(|h| families.contains(&h.family))?;
        Some(self.hots.remove(idx))
    }

    /// Advance every timed effect by `dt_ms`
    pub fn tick_effects(&mut self, dt_ms: Millis) -> EffectTickReport {
        effect::tick_member(self, dt_ms)
    }

    /// Drop every buff, debuff and HoT
    pub fn clear_effects(&mut self) {
        self.buffs.clear();
        self.debuffs.clear();
        self.hots.clear();
    }

    /// Full health and mana, no effects
    pub fn reset_for_encounter(&mut self) {
        self.clear_effects();
        self.vitals.reset();
        self.resource.reset();
        self.last_mana_spend_ms = None;
    }
}

/// The active roster plus the bench
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Raid {
    pub members: Vec<RaidMember>,
    #[serde(default)]
    pub bench: Vec<RaidMember>,
}

impl Raid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to the active roster
    pub fn add(&mut self, member: RaidMember) -> Result<(), RosterError> {
        if self.members.len() >= MAX_RAID_SIZE {
            return Err(RosterError::RaidFull(MAX_RAID_SIZE));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn get(&self, id: &MemberId) -> Option<&RaidMember> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn get_mut(&mut self, id: &MemberId) -> Option<&mut RaidMember> {
        self.members.iter_mut().find(|m| &m.id == id)
    }

    pub fn index_of(&self, id: &MemberId) -> Option<usize> {
        self.members.iter().position(|m| &m.id == id)
    }

    pub fn living(&self) -> impl Iterator<Item = &RaidMember> {
        self.members.iter().filter(|m| m.is_alive())
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    pub fn all_dead(&self) -> bool {
        !self.members.is_empty() && self.living_count() == 0
    }

    /// Living members of a group, in roster order
    pub fn group_members(&self, group: u8) -> impl Iterator<Item = &RaidMember> {
        self.members
            .iter()
            .filter(move |m| m.group == group && m.is_alive())
    }

    /// Injured living members in a group
    pub fn injured_in_group(&self, group: u8, below_pct: f64) -> usize {
        self.group_members(group)
            .filter(|m| m.health_pct() < below_pct)
            .count()
    }

    pub fn tanks(&self) -> impl Iterator<Item = &RaidMember> {
        self.members.iter().filter(|m| m.role == Role::Tank)
    }

    /// First living tank-role member in roster order
    pub fn first_living_tank(&self) -> Option<&RaidMember> {
        self.tanks().find(|m| m.is_alive())
    }

    /// Swap an active member with a benched one
    pub fn swap_bench(&mut self, out: &MemberId, incoming: &MemberId) -> Result<(), RosterError> {
        let out_idx = self
            .index_of(out)
            .ok_or_else(|| RosterError::UnknownMember(out.clone()))?;
        let bench_idx = self
            .bench
            .iter()
            .position(|m| &m.id == incoming)
            .ok_or_else(|| RosterError::NotOnBench(incoming.clone()))?;

        let mut promoted = self.bench.remove(bench_idx);
        promoted.reset_for_encounter();
        let mut demoted = std::mem::replace(&mut self.members[out_idx], promoted);
        demoted.reset_for_encounter();
        self.bench.push(demoted);
        Ok(())
    }

    /// Restore everyone and discard all effects
    pub fn reset(&mut self) {
        for member in &mut self.members {
            member.reset_for_encounter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DebuffTable;

    fn member(id: &str, class: WowClass, role: Role) -> RaidMember {
        RaidMember::from_config(&MemberConfig::new(id, class, role))
    }

    #[test]
    fn test_shield_absorbs_before_health() {
        let mut priest = member("p", WowClass::Priest, Role::Healer);
        let max = priest.vitals.max();
        priest.apply_buff(ActiveBuff::new(
            "power_word_shield",
            "Power Word: Shield",
            30_000,
            BuffEffect::Absorb { remaining: 500.0 },
        ));
        let out = priest.take_damage(800.0, School::Physical);
        assert_eq!(out.absorbed, 500.0);
        assert_eq!(out.dealt, 300.0);
        assert_eq!(priest.vitals.current(), max - 300.0);
        assert!(!priest.has_buff("power_word_shield"));
    }

    #[test]
    fn test_magic_vulnerability() {
        let table = DebuffTable::with_defaults();
        let mut mage = member("m", WowClass::Mage, Role::Dps);
        let curse = table.get("shazzrahs_curse").unwrap().instantiate(0);
        mage.apply_debuff(curse);
        let out = mage.take_damage(100.0, School::Arcane);
        assert_eq!(out.raw, 200.0);
        let phys = mage.take_damage(100.0, School::Physical);
        assert_eq!(phys.raw, 100.0);
    }

    #[test]
    fn test_healing_reduction_keeps_conservation() {
        let table = DebuffTable::with_defaults();
        let mut warrior = member("w", WowClass::Warrior, Role::Tank);
        warrior.take_damage(2000.0, School::Physical);
        warrior.apply_debuff(table.get("gehennas_curse").unwrap().instantiate(0));
        let out = warrior.receive_heal(1000.0);
        assert_eq!(out.raw, 1000.0);
        assert_eq!(out.effective, 250.0);
        assert_eq!(out.prevented, 750.0);
        assert_eq!(out.overheal, 750.0);
        assert_eq!(out.raw, out.effective + out.overheal);
    }

    #[test]
    fn test_death_clears_effects() {
        let mut rogue = member("r", WowClass::Rogue, Role::Dps);
        rogue.apply_buff(ActiveBuff::new("x", "X", 10_000, BuffEffect::Generic));
        rogue.take_damage(1_000_000.0, School::Physical);
        assert!(!rogue.is_alive());
        assert!(rogue.buffs.is_empty());
    }

    #[test]
    fn test_warrior_gains_rage() {
        let mut warrior = member("w", WowClass::Warrior, Role::Tank);
        warrior.take_damage(1000.0, School::Physical);
        assert!(warrior.resource.current > 0.0);
    }

    #[test]
    fn test_raid_full() {
        let mut raid = Raid::new();
        for i in 0..MAX_RAID_SIZE {
            raid.add(member(&format!("m{i}"), WowClass::Mage, Role::Dps)).unwrap();
        }
        let err = raid.add(member("extra", WowClass::Mage, Role::Dps)).unwrap_err();
        assert_eq!(err, RosterError::RaidFull(MAX_RAID_SIZE));
    }

    #[test]
    fn test_swap_bench() {
        let mut raid = Raid::new();
        raid.add(member("a", WowClass::Mage, Role::Dps)).unwrap();
        raid.bench.push(member("b", WowClass::Rogue, Role::Dps));
        raid.swap_bench(&MemberId::from("a"), &MemberId::from("b")).unwrap();
        assert_eq!(raid.members[0].id, MemberId::from("b"));
        assert_eq!(raid.bench[0].id, MemberId::from("a"));
    }

    #[test]
    fn test_five_second_rule() {
        let mut priest = member("p", WowClass::Priest, Role::Healer);
        priest.stats.spirit_mp5 = 30.0;
        priest.stats.mp5 = 10.0;
        priest.spend_mana(100.0, 1000).unwrap();
        assert!((priest.current_mp5(3000, 5000) - 10.0).abs() < f64::EPSILON);
        assert!((priest.current_mp5(6000, 5000) - 40.0).abs() < f64::EPSILON);
    }
}
