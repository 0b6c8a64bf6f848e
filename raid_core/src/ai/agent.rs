//! One AI-controlled healer

use super::{ai_for_class, decide, dispel_target, select_target, ClassContext, Decision, DecisionInput};
use crate::cast::Caster;
use crate::config::AiThresholds;
use crate::raid::{HealerAssignment, Raid, RaidMember};
use crate::spell::{CooldownTracker, RankChoice, SpellBook, SpellFamily};
use crate::types::{DebuffType, MemberId, Role, WowClass};

/// What an agent intends to do this tick
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedAction {
    Heal(Decision),
    Dispel { debuff_id: String, debuff_type: DebuffType },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentPlan {
    pub agent: MemberId,
    pub target: MemberId,
    pub action: PlannedAction,
}

/// AI healer: its coverage, its focus tank and its cast bar
#[derive(Debug, Clone, PartialEq)]
pub struct HealerAgent {
    pub member_id: MemberId,
    pub class: WowClass,
    pub assignment: HealerAssignment,
    /// Tank a tank healer stays on
    pub focus: Option<MemberId>,
    pub caster: Caster,
}

impl HealerAgent {
    pub fn new(member: &RaidMember, assignment: HealerAssignment, focus: Option<MemberId>) -> Self {
        HealerAgent {
            member_id: member.id.clone(),
            class: member.class,
            assignment,
            focus,
            caster: Caster::new(member.id.clone()),
        }
    }

    /// Decide from a read-only view of the raid
    ///
    /// Returns nothing while casting or locked by the global cooldown.
    pub fn plan(
        &self,
        raid: &Raid,
        cooldowns: &CooldownTracker,
        thresholds: &AiThresholds,
        claimed: &[(MemberId, String)],
    ) -> Option<AgentPlan> {
        if !self.caster.is_idle() {
            return None;
        }
        let me = raid.get(&self.member_id).filter(|m| m.is_alive())?;
        let brain = ai_for_class(self.class)?;

        let calm = raid.living().all(|m| m.health_pct() >= thresholds.moderate);
        if calm {
            if let Some(dispel) = dispel_target(raid, self.class.dispel_types(), claimed) {
                return Some(AgentPlan {
                    agent: self.member_id.clone(),
                    target: dispel.member,
                    action: PlannedAction::Dispel {
                        debuff_id: dispel.debuff_id,
                        debuff_type: dispel.debuff_type,
                    },
                });
            }
        }

        let target_id = select_target(raid, self.assignment, self.focus.as_ref())?;
        let target = raid.get(&target_id)?;
        let context = ClassContext {
            target_is_tank: target.role == Role::Tank,
            own_hots: target
                .hots
                .iter()
                .filter(|h| h.caster_id == me.id)
                .map(|h| h.family)
                .collect(),
            target_has_swiftmend_hot: target.has_hot_of(&[SpellFamily::Rejuvenation, SpellFamily::Regrowth]),
            target_has_weakened_soul: target.has_debuff("weakened_soul"),
            ready: brain
                .families()
                .iter()
                .copied()
                .filter(|f| cooldowns.is_ready(&me.id, *f))
                .collect(),
        };
        let input = DecisionInput {
            target_health_pct: target.health_pct(),
            mana_pct: me.mana_pct(),
            injured_in_group: raid.injured_in_group(target.group, thresholds.group_injured_below),
            context,
        };
        Some(AgentPlan {
            agent: self.member_id.clone(),
            target: target_id,
            action: PlannedAction::Heal(decide(brain, &input, thresholds)),
        })
    }

    /// Spell ids to try in order: the chosen rank, cheaper ranks, then the
    /// conservation spell at its cheapest rank
    pub fn candidates(&self, decision: &Decision, book: &SpellBook) -> Vec<String> {
        let ranks = book.ranks(self.class, decision.family);
        let mut ids: Vec<String> = match ranks.len().checked_sub(1) {
            Some(last) => {
                let start = match decision.rank {
                    RankChoice::Max => 0,
                    RankChoice::Downranked => last.min(1),
                    RankChoice::Cheapest => last,
                };
                ranks[start..].iter().map(|s| s.id.clone()).collect()
            }
            None => Vec::new(),
        };
        if let Some(brain) = ai_for_class(self.class) {
            if let Some(spell) = book.pick(self.class, brain.conservation_spell(), RankChoice::Cheapest) {
                if !ids.contains(&spell.id) {
                    ids.push(spell.id.clone());
                }
            }
        }
        ids
    }
}

/// Tank healers first: one per tank in roster order, then everyone on the raid
///
/// Explicit roster assignments win; a tank healer without a free tank falls
/// back to the first tank.
pub fn assign_healers(raid: &Raid, exclude: &[MemberId]) -> Vec<HealerAgent> {
    let tanks: Vec<MemberId> = raid.tanks().map(|m| m.id.clone()).collect();
    let mut next_tank = tanks.iter();
    raid.members
        .iter()
        .filter(|m| m.role == Role::Healer && ai_for_class(m.class).is_some())
        .filter(|m| !exclude.contains(&m.id))
        .map(|m| {
            let assignment = match m.assignment {
                Some(explicit) => explicit,
                None if next_tank.len() > 0 => HealerAssignment::Tank,
                None => HealerAssignment::Raid,
            };
            let focus = match assignment {
                HealerAssignment::Tank => next_tank.next().or(tanks.first()).cloned(),
                HealerAssignment::Raid => None,
            };
            HealerAgent::new(m, assignment, focus)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::DebuffTable;
    use crate::raid::{MemberConfig, RosterConfig};
    use crate::types::School;

    fn small_raid() -> Raid {
        let mut raid = Raid::new();
        for (id, class, role) in [
            ("tank", WowClass::Warrior, Role::Tank),
            ("priest", WowClass::Priest, Role::Healer),
            ("mage", WowClass::Mage, Role::Dps),
        ] {
            raid.add(RaidMember::from_config(&MemberConfig::new(id, class, role))).unwrap();
        }
        raid
    }

    fn priest_agent(raid: &Raid) -> HealerAgent {
        HealerAgent::new(raid.get(&MemberId::from("priest")).unwrap(), HealerAssignment::Raid, None)
    }

    #[test]
    fn test_plan_heals_lowest() {
        let mut raid = small_raid();
        raid.get_mut(&MemberId::from("mage")).unwrap().take_damage(2000.0, School::Fire);
        let agent = priest_agent(&raid);
        let plan = agent
            .plan(&raid, &CooldownTracker::new(), &AiThresholds::default(), &[])
            .unwrap();
        assert_eq!(plan.target, MemberId::from("mage"));
        assert!(matches!(plan.action, PlannedAction::Heal(d) if d.family == SpellFamily::FlashHeal));
    }

    #[test]
    fn test_plan_dispels_when_calm() {
        let mut raid = small_raid();
        let table = DebuffTable::with_defaults();
        raid.get_mut(&MemberId::from("mage"))
            .unwrap()
            .apply_debuff(table.get("ignite_mana").unwrap().instantiate(0));
        let agent = priest_agent(&raid);
        let plan = agent
            .plan(&raid, &CooldownTracker::new(), &AiThresholds::default(), &[])
            .unwrap();
        assert_eq!(
            plan.action,
            PlannedAction::Dispel {
                debuff_id: "ignite_mana".into(),
                debuff_type: DebuffType::Magic
            }
        );
    }

    #[test]
    fn test_no_plan_while_busy_or_nothing_to_do() {
        let raid = small_raid();
        let mut agent = priest_agent(&raid);
        assert!(agent
            .plan(&raid, &CooldownTracker::new(), &AiThresholds::default(), &[])
            .is_none());
        agent.caster.state = crate::cast::CastState::GlobalCooldown { remaining_ms: 500 };
        assert!(agent
            .plan(&raid, &CooldownTracker::new(), &AiThresholds::default(), &[])
            .is_none());
    }

    #[test]
    fn test_candidates_fall_back_to_conservation() {
        let raid = small_raid();
        let agent = priest_agent(&raid);
        let book = SpellBook::with_defaults();
        let ids = agent.candidates(&Decision::plain(SpellFamily::GreaterHeal), &book);
        assert_eq!(ids, vec!["greater_heal_r4", "greater_heal_r1", "heal_r2"]);
    }

    #[test]
    fn test_default_raid_assignments() {
        let raid = RosterConfig::default_raid().build().unwrap();
        let agents = assign_healers(&raid, &[]);
        assert_eq!(agents.len(), 12);
        let tank_healers: Vec<_> = agents
            .iter()
            .filter(|a| a.assignment == HealerAssignment::Tank)
            .collect();
        assert_eq!(tank_healers.len(), 4);
        let focuses: Vec<_> = tank_healers.iter().filter_map(|a| a.focus.clone()).collect();
        let tanks: Vec<_> = raid.tanks().map(|m| m.id.clone()).collect();
        assert_eq!(focuses, tanks);
    }
}
