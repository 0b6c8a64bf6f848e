//! End-of-encounter scoring and DKP loot distribution

use crate::config::{ItemTable, LootConstants};
use crate::encounter::{BossDefinition, EncounterStatus};
use crate::raid::{Item, Raid};
use crate::resource::HealingLedger;
use crate::types::{ms_to_secs, MemberId, Millis, Role, WowClass};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, info};

/// Per-healer line of the score screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealerScore {
    pub member: MemberId,
    pub class: WowClass,
    pub effective: f64,
    pub overheal: f64,
    pub casts: u32,
    pub crits: u32,
    pub hps: f64,
}

impl HealerScore {
    pub fn overheal_ratio(&self) -> f64 {
        let raw = self.effective + self.overheal;
        if raw > 0.0 {
            self.overheal / raw
        } else {
            0.0
        }
    }
}

/// One item handed out after a kill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootAward {
    pub item_id: String,
    pub item_name: String,
    pub member: MemberId,
    pub dkp_cost: f64,
    /// The winning 1-100 roll when several members tied on DKP
    pub roll: Option<u32>,
}

/// Final encounter summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub boss: String,
    pub outcome: EncounterStatus,
    pub duration_ms: Millis,
    pub total_healing: f64,
    pub total_overheal: f64,
    pub overheal_ratio: f64,
    pub hps: f64,
    pub survivors: usize,
    pub deaths: usize,
    pub healers: Vec<HealerScore>,
    #[serde(default)]
    pub loot: Vec<LootAward>,
    /// DKP each member present received
    #[serde(default)]
    pub dkp_awarded: f64,
}

impl ScoreReport {
    /// Tally the ledger and the roster; loot and DKP are filled in later
    pub fn compute(
        boss: &BossDefinition,
        outcome: EncounterStatus,
        raid: &Raid,
        ledger: &HealingLedger,
        duration_ms: Millis,
    ) -> Self {
        let seconds = ms_to_secs(duration_ms);
        let per_second = |amount: f64| if seconds > 0.0 { amount / seconds } else { 0.0 };

        let healers = raid
            .members
            .iter()
            .filter(|m| m.role == Role::Healer)
            .map(|m| {
                let line = ledger.caster(&m.id).cloned().unwrap_or_default();
                HealerScore {
                    member: m.id.clone(),
                    class: m.class,
                    effective: line.effective,
                    overheal: line.overheal,
                    casts: line.casts,
                    crits: line.crits,
                    hps: per_second(line.effective),
                }
            })
            .collect();

        let survivors = raid.living_count();
        ScoreReport {
            boss: boss.name.clone(),
            outcome,
            duration_ms,
            total_healing: ledger.total_effective,
            total_overheal: ledger.total_overheal,
            overheal_ratio: ledger.overheal_ratio(),
            hps: per_second(ledger.total_effective),
            survivors,
            deaths: raid.members.len() - survivors,
            healers,
            loot: Vec::new(),
            dkp_awarded: 0.0,
        }
    }

    pub fn is_victory(&self) -> bool {
        self.outcome == EncounterStatus::Victory
    }

    /// Healers sorted by effective healing, best first
    pub fn ranking(&self) -> Vec<&HealerScore> {
        let mut ranked: Vec<&HealerScore> = self.healers.iter().collect();
        ranked.sort_by(|a, b| b.effective.total_cmp(&a.effective));
        ranked
    }

    pub fn summary(&self) -> String {
        let outcome = match self.outcome {
            EncounterStatus::Victory => "Victory".to_string(),
            EncounterStatus::Wipe(reason) => format!("Wipe ({reason:?})"),
            other => format!("{other:?}"),
        };
        format!(
            "{} - {} after {:.1}s | healing {:.0} ({:.1}% overheal) | {:.0} HPS | {} alive, {} dead",
            self.boss,
            outcome,
            ms_to_secs(self.duration_ms),
            self.total_healing,
            self.overheal_ratio * 100.0,
            self.hps,
            self.survivors,
            self.deaths,
        )
    }
}

/// Hand out `drops` distinct items from the boss's loot table
///
/// Each item goes to the member with the most DKP among those who can use
/// it and would upgrade a slot with it. Ties are settled by a 1-100 roll,
/// then roster order. The winner pays the item's cost and equips it.
/// Items nobody can use are left on the corpse.
pub fn distribute_loot(
    boss: &BossDefinition,
    items: &ItemTable,
    raid: &mut Raid,
    rng: &mut impl Rng,
) -> Vec<LootAward> {
    let table = items.loot_for(boss);
    let count = boss.drops.min(table.len());
    let drops: Vec<Item> = table.choose_multiple(rng, count).map(|i| (*i).clone()).collect();

    let mut awards = Vec::with_capacity(drops.len());
    for item in drops {
        let eligible: Vec<usize> = raid
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| item.usable_by(m.class) && m.equipment.upgrade_slot_for(&item).is_some())
            .map(|(idx, _)| idx)
            .collect();

        let Some(top) = eligible
            .iter()
            .map(|&idx| raid.members[idx].dkp)
            .max_by(f64::total_cmp)
        else {
            debug!(item = %item.id, "no eligible taker");
            continue;
        };
        let tied: Vec<usize> = eligible
            .into_iter()
            .filter(|&idx| raid.members[idx].dkp >= top)
            .collect();

        let (winner, roll) = if tied.len() == 1 {
            (tied[0], None)
        } else {
            let rolls: Vec<(usize, u32)> = tied.iter().map(|&idx| (idx, rng.gen_range(1..=100))).collect();
            let (idx, roll) = rolls
                .into_iter()
                .max_by_key(|&(idx, roll)| (roll, Reverse(idx)))
                .unwrap_or((tied[0], 0));
            (idx, Some(roll))
        };

        let member = &mut raid.members[winner];
        member.dkp -= item.dkp_cost;
        info!(member = %member.id, item = %item.id, cost = item.dkp_cost, "loot awarded");
        awards.push(LootAward {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            member: member.id.clone(),
            dkp_cost: item.dkp_cost,
            roll,
        });
        member.equip(item);
    }
    awards
}

/// Credit every member on the active roster; returns the amount each got
pub fn award_dkp(raid: &mut Raid, outcome: EncounterStatus, loot: &LootConstants) -> f64 {
    let amount = match outcome {
        EncounterStatus::Victory => loot.dkp_per_kill,
        EncounterStatus::Wipe(_) => loot.dkp_per_attempt,
        _ => 0.0,
    };
    for member in &mut raid.members {
        member.dkp += amount;
    }
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BossTable;
    use crate::raid::{MemberConfig, RaidMember};
    use crate::resource::HealOutcome;
    use crate::types::EquipmentSlot;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn robe(cost: f64) -> Item {
        Item {
            id: "test_robe".into(),
            name: "Test Robe".into(),
            slot: EquipmentSlot::Chest,
            item_level: 66,
            stamina: 10.0,
            intellect: 20.0,
            healing_power: 40.0,
            spell_crit: 0.0,
            mp5: 0.0,
            classes: vec![WowClass::Priest],
            dkp_cost: cost,
        }
    }

    fn boss_with(item: &Item) -> (BossDefinition, ItemTable) {
        let mut boss = BossTable::with_defaults().get("lucifron").cloned().unwrap();
        boss.loot = vec![item.id.clone()];
        boss.drops = 1;
        let mut items = ItemTable::new();
        items.register(item.clone());
        (boss, items)
    }

    fn priest(id: &str, dkp: f64) -> RaidMember {
        let mut config = MemberConfig::new(id, WowClass::Priest, Role::Healer);
        config.dkp = dkp;
        RaidMember::from_config(&config)
    }

    #[test]
    fn test_highest_dkp_wins_and_pays() {
        let item = robe(30.0);
        let (boss, items) = boss_with(&item);
        let mut raid = Raid::new();
        raid.add(priest("poor", 10.0)).unwrap();
        raid.add(priest("rich", 80.0)).unwrap();
        raid.add(RaidMember::from_config(&MemberConfig::new("mage", WowClass::Mage, Role::Dps)))
            .unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let awards = distribute_loot(&boss, &items, &mut raid, &mut rng);
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].member, MemberId::from("rich"));
        assert_eq!(awards[0].roll, None);

        let rich = raid.get(&MemberId::from("rich")).unwrap();
        assert!((rich.dkp - 50.0).abs() < 1e-9);
        assert!(rich.equipment.get(EquipmentSlot::Chest).is_some());
    }

    #[test]
    fn test_tie_is_rolled() {
        let item = robe(0.0);
        let (boss, items) = boss_with(&item);
        let mut raid = Raid::new();
        raid.add(priest("a", 20.0)).unwrap();
        raid.add(priest("b", 20.0)).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let awards = distribute_loot(&boss, &items, &mut raid, &mut rng);
        let roll = awards[0].roll.unwrap();
        assert!((1..=100).contains(&roll));
    }

    #[test]
    fn test_no_upgrade_no_award() {
        let item = robe(0.0);
        let (boss, items) = boss_with(&item);
        let mut raid = Raid::new();
        let mut geared = priest("geared", 50.0);
        geared.equip(Item {
            item_level: 80,
            ..robe(0.0)
        });
        raid.add(geared).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(distribute_loot(&boss, &items, &mut raid, &mut rng).is_empty());
    }

    #[test]
    fn test_score_totals() {
        let boss = BossTable::with_defaults().get("lucifron").cloned().unwrap();
        let mut raid = Raid::new();
        raid.add(priest("p", 0.0)).unwrap();
        let mut ledger = HealingLedger::new();
        ledger.record_cast(&MemberId::from("p"));
        ledger.record(
            &MemberId::from("p"),
            &HealOutcome {
                raw: 1000.0,
                effective: 750.0,
                overheal: 250.0,
                prevented: 0.0,
            },
            false,
        );
        let report = ScoreReport::compute(&boss, EncounterStatus::Victory, &raid, &ledger, 10_000);
        assert!((report.hps - 75.0).abs() < 1e-9);
        assert!((report.overheal_ratio - 0.25).abs() < 1e-9);
        assert_eq!(report.survivors, 1);
        assert_eq!(report.healers[0].casts, 1);
        assert!(report.summary().starts_with("Lucifron - Victory"));
    }

    #[test]
    fn test_dkp_per_outcome() {
        let mut raid = Raid::new();
        raid.add(priest("p", 0.0)).unwrap();
        let loot = LootConstants::default();
        assert_eq!(award_dkp(&mut raid, EncounterStatus::Victory, &loot), 10.0);
        assert_eq!(
            award_dkp(&mut raid, EncounterStatus::Wipe(crate::encounter::WipeReason::Enrage), &loot),
            2.0
        );
        assert!((raid.members[0].dkp - 12.0).abs() < 1e-9);
    }
}
