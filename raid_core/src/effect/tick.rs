//! Per-member effect tick processing

use super::ActiveDebuff;
use crate::raid::RaidMember;
use crate::resource::{DamageOutcome, HealOutcome};
use crate::types::{DebuffType, MemberId, Millis, ResourceKind, School};

/// One HoT tick that landed
#[derive(Debug, Clone, PartialEq)]
pub struct HotTick {
    pub caster_id: MemberId,
    pub spell_id: String,
    pub name: String,
    pub is_crit: bool,
    pub outcome: HealOutcome,
}

/// One damage-over-time tick that landed
#[derive(Debug, Clone, PartialEq)]
pub struct DotTick {
    pub debuff_id: String,
    pub name: String,
    pub school: School,
    pub outcome: DamageOutcome,
    pub mana_drained: f64,
}

/// A debuff that ran out while active and detonates
///
/// The caller applies `damage` to the bearer and its group.
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub debuff_id: String,
    pub name: String,
    pub damage: f64,
    pub school: School,
    pub bearer: MemberId,
    pub group: u8,
}

/// Everything that happened to one member during an effect tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectTickReport {
    pub dot_ticks: Vec<DotTick>,
    pub hot_ticks: Vec<HotTick>,
    pub explosions: Vec<Explosion>,
    pub expired_buffs: Vec<String>,
    pub expired_debuffs: Vec<String>,
    pub expired_hots: Vec<String>,
    /// The member died during this tick
    pub died: bool,
}

impl EffectTickReport {
    pub fn total_healing(&self) -> f64 {
        self.hot_ticks.iter().map(|t| t.outcome.effective).sum()
    }

    pub fn total_damage(&self) -> f64 {
        self.dot_ticks.iter().map(|t| t.outcome.dealt).sum()
    }
}

/// Count whole intervals crossed, leaving the remainder in the accumulator
pub fn accumulate_ticks(since_last: &mut Millis, interval: Millis, elapsed: Millis) -> u32 {
    if interval == 0 {
        return 0;
    }
    *since_last += elapsed;
    let mut ticks = 0;
    while *since_last >= interval {
        ticks += 1;
        *since_last -= interval;
    }
    ticks
}

/// Advance every effect on `member` by `dt_ms`
///
/// Order: damage-over-time debuffs, then HoTs, then buffs. Elapsed time is
/// clipped to each effect's remaining duration so an effect never ticks past
/// its own expiry.
pub fn tick_member(member: &mut RaidMember, dt_ms: Millis) -> EffectTickReport {
    let mut report = EffectTickReport::default();
    if !member.is_alive() {
        return report;
    }

    // === Debuffs ===
    let mut pending_dots = Vec::new();
    for debuff in member.debuffs.iter_mut() {
        let elapsed = dt_ms.min(debuff.remaining_ms);
        debuff.remaining_ms -= elapsed;
        if let (true, Some(interval)) = (debuff.is_periodic(), debuff.tick_interval_ms) {
            let ticks = accumulate_ticks(&mut debuff.since_last_tick_ms, interval, elapsed);
            for _ in 0..ticks {
                pending_dots.push((
                    debuff.id.clone(),
                    debuff.name.clone(),
                    debuff.school,
                    debuff.damage_per_tick.unwrap_or(0.0),
                    debuff.mana_drain_per_tick,
                ));
            }
        }
        if !debuff.is_active() && debuff.explodes() {
            report.explosions.push(Explosion {
                debuff_id: debuff.id.clone(),
                name: debuff.name.clone(),
                damage: debuff.explodes_on_expiry.unwrap_or(0.0),
                school: debuff.school,
                bearer: member.id.clone(),
                group: member.group,
            });
        }
    }
    report.expired_debuffs = member
        .debuffs
        .iter()
        .filter(|d| !d.is_active())
        .map(|d| d.name.clone())
        .collect();
    member.debuffs.retain(|d| d.is_active());

    for (debuff_id, name, school, damage, drain) in pending_dots {
        let mana_drained = if drain > 0.0 && member.resource.kind == ResourceKind::Mana {
            member.resource.drain(drain)
        } else {
            0.0
        };
        let outcome = if damage > 0.0 {
            member.take_damage(damage, school)
        } else {
            DamageOutcome::default()
        };
        report.died |= outcome.killed;
        report.dot_ticks.push(DotTick {
            debuff_id,
            name,
            school,
            outcome,
            mana_drained,
        });
        if !member.is_alive() {
            return report;
        }
    }

    // === HoTs ===
    let mut pending_heals = Vec::new();
    for hot in member.hots.iter_mut() {
        let elapsed = dt_ms.min(hot.remaining_ms);
        hot.remaining_ms -= elapsed;
        let ticks = accumulate_ticks(&mut hot.since_last_tick_ms, hot.tick_interval_ms, elapsed);
        for _ in 0..ticks {
            pending_heals.push((
                hot.caster_id.clone(),
                hot.spell_id.clone(),
                hot.name.clone(),
                hot.is_crit,
                hot.heal_per_tick,
            ));
        }
    }
    report.expired_hots = member
        .hots
        .iter()
        .filter(|h| !h.is_active())
        .map(|h| h.name.clone())
        .collect();
    member.hots.retain(|h| h.is_active());

    for (caster_id, spell_id, name, is_crit, amount) in pending_heals {
        let outcome = member.receive_heal(amount);
        report.hot_ticks.push(HotTick {
            caster_id,
            spell_id,
            name,
            is_crit,
            outcome,
        });
    }

    // === Buffs ===
    for buff in member.buffs.iter_mut() {
        buff.tick(dt_ms);
    }
    report.expired_buffs = member
        .buffs
        .iter()
        .filter(|b| !b.is_active())
        .map(|b| b.name.clone())
        .collect();
    member.buffs.retain(|b| b.is_active());

    report
}

/// Remove at most one debuff matching `filter`, oldest first
///
/// Debuffs flagged non-dispellable are skipped.
pub fn dispel(member: &mut RaidMember, filter: &[DebuffType]) -> Option<ActiveDebuff> {
    let idx = member
        .debuffs
        .iter()
        .position(|d| d.can_be_dispelled_by(filter))?;
    Some(member.debuffs.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{ActiveHoT, DebuffTable};
    use crate::raid::MemberConfig;
    use crate::spell::SpellFamily;
    use crate::types::{Role, WowClass};

    fn warrior() -> RaidMember {
        RaidMember::from_config(&MemberConfig::new("tank", WowClass::Warrior, Role::Tank))
    }

    fn rejuv() -> ActiveHoT {
        ActiveHoT::new(
            "rejuvenation_r11",
            SpellFamily::Rejuvenation,
            "Rejuvenation",
            MemberId::from("druid"),
            100.0,
            3000,
            12_000,
        )
    }

    #[test]
    fn test_accumulator_keeps_remainder() {
        let mut acc = 0;
        assert_eq!(accumulate_ticks(&mut acc, 3000, 2500), 0);
        assert_eq!(accumulate_ticks(&mut acc, 3000, 2500), 1);
        assert_eq!(acc, 2000);
        assert_eq!(accumulate_ticks(&mut acc, 3000, 7000), 3);
        assert_eq!(acc, 0);
    }

    #[test]
    fn test_hot_ticks_four_times_at_any_step() {
        for step in [100, 250, 500, 1000, 1500, 3000] {
            let mut member = warrior();
            member.take_damage(3000.0, School::Physical);
            member.apply_hot(rejuv());
            let mut ticks = 0;
            let mut t = 0;
            while t < 12_000 {
                ticks += tick_member(&mut member, step).hot_ticks.len();
                t += step;
            }
            assert_eq!(ticks, 4, "step {step}");
            assert!(member.hots.is_empty());
        }
    }

    #[test]
    fn test_large_step_clipped_to_duration() {
        let mut member = warrior();
        member.apply_hot(rejuv());
        let report = tick_member(&mut member, 60_000);
        assert_eq!(report.hot_ticks.len(), 4);
        assert_eq!(report.expired_hots, vec!["Rejuvenation".to_string()]);
    }

    #[test]
    fn test_dispel_fifo() {
        let table = DebuffTable::with_defaults();
        let mut member = warrior();
        member.apply_debuff(table.get("impending_doom").unwrap().instantiate(0));
        member.apply_debuff(table.get("poison_bolt_volley").unwrap().instantiate(1000));

        let removed = dispel(&mut member, &[DebuffType::Magic, DebuffType::Poison]).unwrap();
        assert_eq!(removed.id, "impending_doom");
        assert_eq!(member.debuffs.len(), 1);
    }

    #[test]
    fn test_living_bomb_explodes_once() {
        let table = DebuffTable::with_defaults();
        let mut member = warrior();
        member.apply_debuff(table.get("living_bomb").unwrap().instantiate(0));
        let first = tick_member(&mut member, 7_900);
        assert!(first.explosions.is_empty());
        let second = tick_member(&mut member, 200);
        assert_eq!(second.explosions.len(), 1);
        assert_eq!(second.explosions[0].damage, 3200.0);
        assert!(tick_member(&mut member, 1000).explosions.is_empty());
    }

    #[test]
    fn test_dot_kills_and_stops() {
        let table = DebuffTable::with_defaults();
        let mut member = warrior();
        member.vitals.set_current(100.0);
        member.apply_debuff(table.get("impending_doom").unwrap().instantiate(0));
        member.apply_hot(rejuv());
        let report = tick_member(&mut member, 10_000);
        assert!(report.died);
        assert!(report.hot_ticks.is_empty());
        assert!(member.hots.is_empty());
    }
}
