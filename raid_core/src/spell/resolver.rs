//! Spell resolution - turn a spell, a caster and a target into concrete numbers
//!
//! Resolution is split in two: [`resolve`] rolls every amount against an
//! immutable view of the raid, [`apply`] writes the result back and records
//! the healing ledger. Rolling never mutates the raid, so the same roll can be
//! inspected, logged or discarded.

use super::{BuffTarget, Spell, SpellFamily};
use crate::config::SimConstants;
use crate::effect::{self, ActiveBuff, ActiveDebuff, ActiveHoT, BuffEffect, DebuffTable};
use crate::error::CastError;
use crate::raid::{Raid, RaidMember};
use crate::resource::{HealingLedger, HealOutcome};
use crate::types::{secs_to_ms, DebuffType, MemberId, Millis};
use rand::Rng;

/// Absorb shields last this long unless depleted
const SHIELD_DURATION_MS: Millis = 30_000;

/// HoT families Swiftmend can consume
const SWIFTMEND_FAMILIES: [SpellFamily; 2] = [SpellFamily::Rejuvenation, SpellFamily::Regrowth];

/// Per-cast modifiers from the caster's consumable buffs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedCast {
    /// Guaranteed critical on the primary heal (Divine Favor)
    pub forced_crit: bool,
    /// Added to crit chance (Inner Focus)
    pub extra_crit: f64,
    /// Costs no mana (Inner Focus)
    pub free: bool,
    /// Cast time removed (Nature's Swiftness)
    pub instant: bool,
    /// Buff ids consumed when the cast completes
    pub consumes: Vec<String>,
}

impl PreparedCast {
    /// Modifiers `caster`'s buffs grant to `spell`
    pub fn for_caster(caster: &RaidMember, spell: &Spell) -> Self {
        let mut prepared = PreparedCast::default();
        for buff in &caster.buffs {
            match buff.effect {
                BuffEffect::NextHealCrits if spell.heal.is_some() => {
                    prepared.forced_crit = true;
                    prepared.consumes.push(buff.id.clone());
                }
                BuffEffect::NextSpellFree { crit_bonus } if spell.mana_cost > 0.0 => {
                    prepared.free = true;
                    prepared.extra_crit += crit_bonus;
                    prepared.consumes.push(buff.id.clone());
                }
                BuffEffect::NextNatureInstant if spell.family.is_nature() && !spell.is_instant() => {
                    prepared.instant = true;
                    prepared.consumes.push(buff.id.clone());
                }
                _ => {}
            }
        }
        prepared
    }

    /// Mana this cast will cost
    pub fn mana_cost(&self, spell: &Spell) -> f64 {
        if self.free || spell.drains_all_mana {
            0.0
        } else {
            spell.mana_cost
        }
    }

    pub fn cast_time_ms(&self, spell: &Spell) -> Millis {
        if self.instant {
            0
        } else {
            spell.cast_time_ms()
        }
    }

    /// Remove the consumed buffs from the caster
    pub fn consume(&self, caster: &mut RaidMember) {
        for id in &self.consumes {
            caster.remove_buff(id);
        }
    }
}

/// One rolled heal
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHeal {
    pub target: MemberId,
    /// Amount before the target's healing reduction
    pub amount: f64,
    pub is_crit: bool,
    /// 0 = primary target
    pub bounce: u32,
}

/// Everything a cast will do, rolled but not yet applied
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub spell_id: String,
    pub spell_name: String,
    pub family: SpellFamily,
    pub caster: MemberId,
    pub target: Option<MemberId>,
    pub heals: Vec<ResolvedHeal>,
    pub hot: Option<ActiveHoT>,
    pub absorb: Option<f64>,
    pub buffs: Vec<(MemberId, ActiveBuff)>,
    pub dispels: Vec<DebuffType>,
    /// Swiftmend eats this HoT family on the target
    pub consumed_hot: Option<SpellFamily>,
    /// (amount, is_crit) against the boss
    pub boss_damage: Option<(f64, bool)>,
    pub drain_all_mana: bool,
}

impl Resolution {
    fn empty(spell: &Spell, caster: &MemberId, target: Option<&MemberId>) -> Self {
        Resolution {
            spell_id: spell.id.clone(),
            spell_name: spell.name.clone(),
            family: spell.family,
            caster: caster.clone(),
            target: target.cloned(),
            heals: Vec::new(),
            hot: None,
            absorb: None,
            buffs: Vec::new(),
            dispels: spell.dispels.clone(),
            consumed_hot: None,
            boss_damage: None,
            drain_all_mana: spell.drains_all_mana,
        }
    }

    /// Sum of rolled heal amounts
    pub fn total_heal(&self) -> f64 {
        self.heals.iter().map(|h| h.amount).sum()
    }
}

/// Heal as it landed
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedHeal {
    pub target: MemberId,
    pub outcome: HealOutcome,
    pub is_crit: bool,
    pub bounce: u32,
}

/// What [`apply`] actually changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    pub heals: Vec<AppliedHeal>,
    pub hot_applied: Option<MemberId>,
    pub absorb_applied: Option<(MemberId, f64)>,
    pub buffs_applied: Vec<(MemberId, String)>,
    pub dispelled: Option<(MemberId, ActiveDebuff)>,
    /// Dispel cast on a target with nothing matching
    pub dispel_missed: Option<MemberId>,
    pub boss_damage: Option<(f64, bool)>,
    pub mana_drained: f64,
}

/// Check a cast is legal against the current raid state
pub fn validate(
    spell: &Spell,
    caster: &RaidMember,
    target: Option<&MemberId>,
    raid: &Raid,
) -> Result<(), CastError> {
    if spell.class != caster.class {
        return Err(CastError::WrongClass);
    }
    if !caster.is_alive() {
        return Err(CastError::InvalidTarget(format!("{} is dead", caster.name)));
    }
    if spell.is_offensive() {
        return Ok(());
    }
    let needs_target = match &spell.applies_buff {
        Some(buff) => buff.target == BuffTarget::Target,
        None => true,
    };
    if !needs_target {
        return Ok(());
    }
    let target_id = target.ok_or_else(|| CastError::InvalidTarget("no target".to_string()))?;
    let target = raid
        .get(target_id)
        .ok_or_else(|| CastError::NoSuchTarget(target_id.clone()))?;
    if !target.is_alive() {
        return Err(CastError::InvalidTarget(format!("{} is dead", target.name)));
    }
    if spell.absorb.is_some() && target.has_debuff("weakened_soul") {
        return Err(CastError::InvalidTarget(format!("{} has Weakened Soul", target.name)));
    }
    if spell.consumes_hot && !target.has_hot_of(&SWIFTMEND_FAMILIES) {
        return Err(CastError::InvalidTarget(format!(
            "{} has no Rejuvenation or Regrowth",
            target.name
        )));
    }
    Ok(())
}

/// Roll base amount plus spell power, floored
fn roll_base(range: &super::AmountRange, spell_power: f64, coefficient: f64, rng: &mut impl Rng) -> f64 {
    (range.roll(rng) + spell_power * coefficient).floor()
}

fn roll_crit(chance: f64, rng: &mut impl Rng) -> bool {
    let chance = chance.clamp(0.0, 1.0);
    chance > 0.0 && rng.gen_bool(chance)
}

/// Roll every amount for a cast
pub fn resolve(
    spell: &Spell,
    caster_id: &MemberId,
    target_id: Option<&MemberId>,
    raid: &Raid,
    prepared: &PreparedCast,
    constants: &SimConstants,
    rng: &mut impl Rng,
) -> Result<Resolution, CastError> {
    let caster = raid
        .get(caster_id)
        .ok_or_else(|| CastError::NoSuchTarget(caster_id.clone()))?;
    let target = match target_id {
        Some(id) => Some(raid.get(id).ok_or_else(|| CastError::NoSuchTarget(id.clone()))?),
        None => None,
    };
    let mut resolution = Resolution::empty(spell, caster_id, target_id);
    let spell_power = caster.stats.spell_power;
    let crit_chance = caster.stats.crit_chance + prepared.extra_crit;

    if let Some(range) = &spell.damage {
        let mut amount = roll_base(range, spell_power, spell.coefficient(), rng);
        let crit = roll_crit(crit_chance, rng);
        if crit {
            amount = (amount * constants.crit.damage_multiplier).floor();
        }
        resolution.boss_damage = Some((amount, crit));
    }

    if let (Some(range), Some(target)) = (&spell.heal, target) {
        let total = roll_base(range, spell_power, spell.coefficient(), rng);
        let mut amount = total + target.healing_bonus_for(spell.family);
        let crit = prepared.forced_crit || roll_crit(crit_chance, rng);
        if crit {
            amount = (amount * constants.crit.heal_multiplier).floor();
        }
        resolution.heals.push(ResolvedHeal {
            target: target.id.clone(),
            amount,
            is_crit: crit,
            bounce: 0,
        });

        if let Some(chain) = &spell.chain {
            let factor = (1.0 - chain.bounce_reduction).clamp(0.0, 1.0);
            for (i, bounce_id) in chain_targets(raid, &target.id, chain.max_bounces)
                .into_iter()
                .enumerate()
            {
                let bounce = i as u32 + 1;
                let mut amount = (total * factor.powi(bounce as i32)).floor();
                let crit = roll_crit(crit_chance, rng);
                if crit {
                    amount = (amount * constants.crit.heal_multiplier).floor();
                }
                resolution.heals.push(ResolvedHeal {
                    target: bounce_id,
                    amount,
                    is_crit: crit,
                    bounce,
                });
            }
        }
    }

    if let (Some(hot), Some(target)) = (&spell.hot, target) {
        let ticks = hot.ticks().max(1) as f64;
        let mut per_tick = ((hot.total_healing + spell_power * hot.coefficient()) / ticks).floor();
        if prepared.forced_crit && spell.heal.is_none() {
            per_tick = (per_tick * constants.crit.heal_multiplier).floor();
        }
        let mut active = ActiveHoT::new(
            spell.id.clone(),
            spell.family,
            spell.name.clone(),
            caster_id.clone(),
            per_tick,
            secs_to_ms(hot.tick_interval),
            secs_to_ms(hot.duration),
        );
        active.icon = spell.icon.clone();
        active.is_crit = prepared.forced_crit && spell.heal.is_none();
        resolution.target = Some(target.id.clone());
        resolution.hot = Some(active);
    }

    if let (Some(range), Some(_)) = (&spell.absorb, target) {
        resolution.absorb = Some(roll_base(range, spell_power, spell.coefficient(), rng));
    }

    if spell.drains_all_mana {
        if let Some(target) = target {
            resolution.heals.push(ResolvedHeal {
                target: target.id.clone(),
                amount: caster.vitals.max().floor(),
                is_crit: false,
                bounce: 0,
            });
        }
    }

    if spell.consumes_hot {
        if let Some(target) = target {
            let consumed = target
                .hots
                .iter()
                .find(|h| SWIFTMEND_FAMILIES.contains(&h.family));
            if let Some(hot) = consumed {
                let window = hot.family.swiftmend_window().unwrap_or(0);
                let mut amount = hot.healing_over(window).floor();
                let crit = prepared.forced_crit || roll_crit(crit_chance, rng);
                if crit {
                    amount = (amount * constants.crit.heal_multiplier).floor();
                }
                resolution.consumed_hot = Some(hot.family);
                resolution.heals.push(ResolvedHeal {
                    target: target.id.clone(),
                    amount,
                    is_crit: crit,
                    bounce: 0,
                });
            }
        }
    }

    if let Some(spec) = &spell.applies_buff {
        let recipients: Vec<MemberId> = match spec.target {
            BuffTarget::Target => target.map(|t| vec![t.id.clone()]).unwrap_or_default(),
            BuffTarget::Caster => vec![caster_id.clone()],
            BuffTarget::CasterGroup => raid.group_members(caster.group).map(|m| m.id.clone()).collect(),
        };
        for recipient in recipients {
            let mut buff = ActiveBuff::new(
                spec.id.clone(),
                spec.name.clone(),
                secs_to_ms(spec.duration),
                spec.effect.clone(),
            )
            .with_source(caster_id.clone());
            buff.icon = spell.icon.clone();
            resolution.buffs.push((recipient, buff));
        }
    }

    Ok(resolution)
}

/// Bounce targets for a chain heal off `primary`
///
/// Living, injured members in the primary's zone, never the primary itself.
/// Same group first, then lowest health, then roster order.
pub fn chain_targets(raid: &Raid, primary: &MemberId, max_bounces: u32) -> Vec<MemberId> {
    let Some(origin) = raid.get(primary) else {
        return Vec::new();
    };
    let mut candidates: Vec<(usize, &RaidMember)> = raid
        .members
        .iter()
        .enumerate()
        .filter(|(_, m)| &m.id != primary && m.is_injured() && m.zone == origin.zone)
        .collect();
    candidates.sort_by(|(ia, a), (ib, b)| {
        (a.group != origin.group)
            .cmp(&(b.group != origin.group))
            .then(a.health_pct().total_cmp(&b.health_pct()))
            .then(ia.cmp(ib))
    });
    candidates
        .into_iter()
        .take(max_bounces as usize)
        .map(|(_, m)| m.id.clone())
        .collect()
}

/// Write a resolution back into the raid and the healing ledger
pub fn apply(
    resolution: &Resolution,
    raid: &mut Raid,
    ledger: &mut HealingLedger,
    debuffs: &DebuffTable,
    now_ms: Millis,
) -> ResolutionReport {
    let mut report = ResolutionReport {
        boss_damage: resolution.boss_damage,
        ..Default::default()
    };
    ledger.record_cast(&resolution.caster);

    if resolution.drain_all_mana {
        if let Some(caster) = raid.get_mut(&resolution.caster) {
            report.mana_drained = caster.resource.drain_all();
            caster.last_mana_spend_ms = Some(now_ms);
        }
    }

    if let (Some(family), Some(target)) = (resolution.consumed_hot, &resolution.target) {
        if let Some(member) = raid.get_mut(target) {
            member.consume_hot(&[family]);
        }
    }

    for heal in &resolution.heals {
        let Some(member) = raid.get_mut(&heal.target) else {
            continue;
        };
        let outcome = member.receive_heal(heal.amount);
        ledger.record(&resolution.caster, &outcome, heal.is_crit);
        report.heals.push(AppliedHeal {
            target: heal.target.clone(),
            outcome,
            is_crit: heal.is_crit,
            bounce: heal.bounce,
        });
    }

    if let (Some(hot), Some(target)) = (&resolution.hot, &resolution.target) {
        if let Some(member) = raid.get_mut(target) {
            if member.is_alive() {
                member.apply_hot(hot.clone());
                report.hot_applied = Some(target.clone());
            }
        }
    }

    if let (Some(amount), Some(target)) = (resolution.absorb, &resolution.target) {
        if let Some(member) = raid.get_mut(target) {
            if member.is_alive() {
                member.apply_buff(
                    ActiveBuff::new(
                        "power_word_shield",
                        resolution.spell_name.clone(),
                        SHIELD_DURATION_MS,
                        BuffEffect::Absorb { remaining: amount },
                    )
                    .with_source(resolution.caster.clone()),
                );
                if let Some(def) = debuffs.get("weakened_soul") {
                    member.apply_debuff(def.instantiate(now_ms));
                }
                report.absorb_applied = Some((target.clone(), amount));
            }
        }
    }

    for (recipient, buff) in &resolution.buffs {
        if let Some(member) = raid.get_mut(recipient) {
            if member.is_alive() {
                member.apply_buff(buff.clone());
                report.buffs_applied.push((recipient.clone(), buff.name.clone()));
            }
        }
    }

    if let (false, Some(target)) = (resolution.dispels.is_empty(), &resolution.target) {
        if let Some(member) = raid.get_mut(target) {
            match effect::dispel(member, &resolution.dispels) {
                Some(removed) => report.dispelled = Some((target.clone(), removed)),
                None => report.dispel_missed = Some(target.clone()),
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raid::MemberConfig;
    use crate::spell::SpellBook;
    use crate::types::{Role, School, WowClass};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn raid_of(configs: Vec<MemberConfig>) -> Raid {
        let mut raid = Raid::new();
        for config in configs {
            raid.add(RaidMember::from_config(&config)).unwrap();
        }
        raid
    }

    fn no_crit(raid: &mut Raid, id: &str) {
        let member = raid.get_mut(&MemberId::from(id)).unwrap();
        member.stats.crit_chance = 0.0;
        member.stats.spell_power = 0.0;
    }

    #[test]
    fn test_flash_of_light_lands_in_range() {
        let book = SpellBook::with_defaults();
        let fol = book.get("flash_of_light_r6").unwrap();
        let constants = SimConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..50 {
            let mut raid = raid_of(vec![
                MemberConfig::new("pally", WowClass::Paladin, Role::Healer),
                MemberConfig::new("tank", WowClass::Warrior, Role::Tank),
            ]);
            no_crit(&mut raid, "pally");
            let tank = raid.get_mut(&MemberId::from("tank")).unwrap();
            tank.vitals.set_max(4000.0);
            tank.vitals.set_current(2000.0);

            let pally = MemberId::from("pally");
            let target = MemberId::from("tank");
            let res = resolve(fol, &pally, Some(&target), &raid, &PreparedCast::default(), &constants, &mut rng).unwrap();
            let mut ledger = HealingLedger::default();
            let report = apply(&res, &mut raid, &mut ledger, &DebuffTable::new(), 0);

            let health = raid.get(&target).unwrap().vitals.current();
            assert!((2346.0..=2386.0).contains(&health), "health {health}");
            assert_eq!(report.heals[0].outcome.overheal, 0.0);
        }
    }

    #[test]
    fn test_healing_reduction_stays_in_the_ledger() {
        let book = SpellBook::with_defaults();
        let holy_light = book.get("holy_light_r9").unwrap();
        let debuffs = DebuffTable::with_defaults();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut raid = raid_of(vec![
            MemberConfig::new("pally", WowClass::Paladin, Role::Healer),
            MemberConfig::new("tank", WowClass::Warrior, Role::Tank),
        ]);
        let pally = MemberId::from("pally");
        let tank = MemberId::from("tank");
        let cursed = raid.get_mut(&tank).unwrap();
        cursed.take_damage(6000.0, School::Physical);
        cursed.apply_debuff(debuffs.get("gehennas_curse").unwrap().instantiate(0));
        let before = raid.get(&tank).unwrap().vitals.current();

        let res = resolve(holy_light, &pally, Some(&tank), &raid, &PreparedCast::default(), &SimConstants::default(), &mut rng)
            .unwrap();
        let mut ledger = HealingLedger::default();
        let report = apply(&res, &mut raid, &mut ledger, &debuffs, 0);

        let gained = raid.get(&tank).unwrap().vitals.current() - before;
        let outcome = report.heals[0].outcome;
        assert_eq!(outcome.raw, res.total_heal());
        assert_eq!(outcome.effective, gained);
        assert!(outcome.prevented > 0.0);
        assert!((outcome.prevented - (res.total_heal() - gained)).abs() < 1e-9);
        assert!((ledger.total_effective + ledger.total_overheal - res.total_heal()).abs() < 1e-9);
        assert!((ledger.total_raw - res.total_heal()).abs() < 1e-9);
    }

    #[test]
    fn test_cleanse_with_nothing_to_remove() {
        let book = SpellBook::with_defaults();
        let cleanse = book.get("cleanse").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut raid = raid_of(vec![
            MemberConfig::new("pally", WowClass::Paladin, Role::Healer),
            MemberConfig::new("mage", WowClass::Mage, Role::Dps),
        ]);
        let pally = MemberId::from("pally");
        let mage = MemberId::from("mage");

        let res = resolve(cleanse, &pally, Some(&mage), &raid, &PreparedCast::default(), &SimConstants::default(), &mut rng)
            .unwrap();
        let report = apply(&res, &mut raid, &mut HealingLedger::default(), &DebuffTable::new(), 0);
        assert!(report.dispelled.is_none());
        assert_eq!(report.dispel_missed, Some(mage));
    }

    #[test]
    fn test_blessing_of_light_before_crit() {
        let book = SpellBook::with_defaults();
        let fol = book.get("flash_of_light_r6").unwrap();
        let constants = SimConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut raid = raid_of(vec![
            MemberConfig::new("pally", WowClass::Paladin, Role::Healer),
            MemberConfig::new("tank", WowClass::Warrior, Role::Tank),
        ]);
        no_crit(&mut raid, "pally");
        let bol = book.get("blessing_of_light_r3").unwrap().applies_buff.clone().unwrap();
        raid.get_mut(&MemberId::from("tank"))
            .unwrap()
            .apply_buff(ActiveBuff::new(bol.id, bol.name, 300_000, bol.effect));

        let prepared = PreparedCast {
            forced_crit: true,
            ..Default::default()
        };
        let res = resolve(fol, &MemberId::from("pally"), Some(&MemberId::from("tank")), &raid, &prepared, &constants, &mut rng).unwrap();
        let heal = &res.heals[0];
        assert!(heal.is_crit);
        // (346..386 + 115) * 1.5
        assert!((691.0..=751.0).contains(&heal.amount), "amount {}", heal.amount);
    }

    #[test]
    fn test_chain_heal_decay_and_unique_targets() {
        let book = SpellBook::with_defaults();
        let chain = book.get("chain_heal_r3").unwrap();
        let constants = SimConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut raid = raid_of(vec![
            MemberConfig::new("shaman", WowClass::Shaman, Role::Healer),
            MemberConfig::new("a", WowClass::Rogue, Role::Dps),
            MemberConfig::new("b", WowClass::Rogue, Role::Dps),
            MemberConfig::new("c", WowClass::Rogue, Role::Dps),
        ]);
        no_crit(&mut raid, "shaman");
        for id in ["a", "b", "c"] {
            raid.get_mut(&MemberId::from(id)).unwrap().take_damage(3000.0, School::Physical);
        }

        let res = resolve(chain, &MemberId::from("shaman"), Some(&MemberId::from("a")), &raid, &PreparedCast::default(), &constants, &mut rng).unwrap();
        assert_eq!(res.heals.len(), 3);
        let first = res.heals[0].amount;
        assert!((res.heals[1].amount - (first * 0.5).floor()).abs() < 1.0);
        assert!((res.heals[2].amount - (first * 0.25).floor()).abs() < 1.0);

        let mut targets: Vec<&MemberId> = res.heals.iter().map(|h| &h.target).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn test_chain_skips_other_zones_and_healthy() {
        let mut raid = raid_of(vec![
            MemberConfig::new("a", WowClass::Rogue, Role::Dps),
            MemberConfig::new("b", WowClass::Rogue, Role::Dps),
            MemberConfig::new("far", WowClass::Mage, Role::Dps),
        ]);
        raid.get_mut(&MemberId::from("a")).unwrap().take_damage(1000.0, School::Physical);
        raid.get_mut(&MemberId::from("far")).unwrap().zone = crate::types::PositionZone::Ranged;
        raid.get_mut(&MemberId::from("far")).unwrap().take_damage(1000.0, School::Physical);
        // b is at full health
        assert!(chain_targets(&raid, &MemberId::from("a"), 2).is_empty());
    }

    #[test]
    fn test_shield_requires_no_weakened_soul() {
        let book = SpellBook::with_defaults();
        let pws = book.get("power_word_shield_r10").unwrap();
        let table = DebuffTable::with_defaults();
        let constants = SimConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut raid = raid_of(vec![
            MemberConfig::new("priest", WowClass::Priest, Role::Healer),
            MemberConfig::new("tank", WowClass::Warrior, Role::Tank),
        ]);
        let priest = MemberId::from("priest");
        let tank = MemberId::from("tank");

        assert!(validate(pws, raid.get(&priest).unwrap(), Some(&tank), &raid).is_ok());
        let res = resolve(pws, &priest, Some(&tank), &raid, &PreparedCast::default(), &constants, &mut rng).unwrap();
        let report = apply(&res, &mut raid, &mut HealingLedger::default(), &table, 0);
        assert!(report.absorb_applied.is_some());
        assert!(raid.get(&tank).unwrap().has_debuff("weakened_soul"));

        let err = validate(pws, raid.get(&priest).unwrap(), Some(&tank), &raid).unwrap_err();
        assert!(matches!(err, CastError::InvalidTarget(_)));
    }

    #[test]
    fn test_swiftmend_consumes_rejuvenation() {
        let book = SpellBook::with_defaults();
        let constants = SimConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut raid = raid_of(vec![
            MemberConfig::new("druid", WowClass::Druid, Role::Healer),
            MemberConfig::new("tank", WowClass::Warrior, Role::Tank),
        ]);
        no_crit(&mut raid, "druid");
        let druid = MemberId::from("druid");
        let tank = MemberId::from("tank");
        raid.get_mut(&tank).unwrap().take_damage(4000.0, School::Physical);

        let swiftmend = book.get("swiftmend").unwrap();
        assert!(validate(swiftmend, raid.get(&druid).unwrap(), Some(&tank), &raid).is_err());

        let rejuv = book.get("rejuvenation_r11").unwrap();
        let res = resolve(rejuv, &druid, Some(&tank), &raid, &PreparedCast::default(), &constants, &mut rng).unwrap();
        apply(&res, &mut raid, &mut HealingLedger::default(), &DebuffTable::new(), 0);
        assert_eq!(raid.get(&tank).unwrap().hots.len(), 1);

        let res = resolve(swiftmend, &druid, Some(&tank), &raid, &PreparedCast::default(), &constants, &mut rng).unwrap();
        // 4 ticks of 222
        assert_eq!(res.heals[0].amount, 888.0);
        apply(&res, &mut raid, &mut HealingLedger::default(), &DebuffTable::new(), 0);
        assert!(raid.get(&tank).unwrap().hots.is_empty());
    }

    #[test]
    fn test_lay_on_hands_drains_mana() {
        let book = SpellBook::with_defaults();
        let loh = book.get("lay_on_hands_r3").unwrap();
        let constants = SimConstants::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut raid = raid_of(vec![
            MemberConfig::new("pally", WowClass::Paladin, Role::Healer),
            MemberConfig::new("tank", WowClass::Warrior, Role::Tank),
        ]);
        let pally = MemberId::from("pally");
        let tank = MemberId::from("tank");
        raid.get_mut(&tank).unwrap().take_damage(6000.0, School::Physical);

        let res = resolve(loh, &pally, Some(&tank), &raid, &PreparedCast::default(), &constants, &mut rng).unwrap();
        let report = apply(&res, &mut raid, &mut HealingLedger::default(), &DebuffTable::new(), 0);
        assert!(report.mana_drained > 0.0);
        assert!(raid.get(&pally).unwrap().resource.is_empty());
        assert_eq!(report.heals[0].outcome.raw, raid.get(&pally).unwrap().vitals.max());
    }

    #[test]
    fn test_inner_focus_prepares_free_cast() {
        let book = SpellBook::with_defaults();
        let mut priest = RaidMember::from_config(&MemberConfig::new("priest", WowClass::Priest, Role::Healer));
        let spec = book.get("inner_focus").unwrap().applies_buff.clone().unwrap();
        priest.apply_buff(ActiveBuff::new(spec.id, spec.name, 300_000, spec.effect));

        let gh = book.get("greater_heal_r4").unwrap();
        let prepared = PreparedCast::for_caster(&priest, gh);
        assert!(prepared.free);
        assert_eq!(prepared.mana_cost(gh), 0.0);
        assert!((prepared.extra_crit - 0.25).abs() < f64::EPSILON);

        prepared.consume(&mut priest);
        assert!(!priest.has_buff("inner_focus"));
    }
}
