//! Who an AI healer heals or cleanses

use crate::raid::{HealerAssignment, Raid, RaidMember};
use crate::types::{DebuffType, MemberId, Role};
use std::cmp::Ordering;

/// Lowest health first, then tank > healer > dps, then roster order
fn priority(a: &(usize, &RaidMember), b: &(usize, &RaidMember)) -> Ordering {
    a.1.health_pct()
        .total_cmp(&b.1.health_pct())
        .then(a.1.role.heal_priority().cmp(&b.1.role.heal_priority()))
        .then(a.0.cmp(&b.0))
}

fn lowest(raid: &Raid, filter: impl Fn(&RaidMember) -> bool) -> Option<MemberId> {
    raid.members
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_injured() && filter(m))
        .min_by(priority)
        .map(|(_, m)| m.id.clone())
}

/// Pick the heal target for a healer's coverage
///
/// Tank healers stay on their focus tank while it is injured, then any
/// injured tank, then the raid. Raid healers take the lowest member overall.
pub fn select_target(raid: &Raid, assignment: HealerAssignment, focus: Option<&MemberId>) -> Option<MemberId> {
    match assignment {
        HealerAssignment::Tank => {
            if let Some(tank) = focus.and_then(|id| raid.get(id)) {
                if tank.is_injured() {
                    return Some(tank.id.clone());
                }
            }
            lowest(raid, |m| m.role == Role::Tank).or_else(|| lowest(raid, |_| true))
        }
        HealerAssignment::Raid => lowest(raid, |_| true),
    }
}

/// A debuff an agent plans to remove
#[derive(Debug, Clone, PartialEq)]
pub struct DispelTarget {
    pub member: MemberId,
    pub debuff_id: String,
    pub debuff_type: DebuffType,
}

/// First removable debuff in roster order, skipping ones already claimed
pub fn dispel_target(raid: &Raid, types: &[DebuffType], claimed: &[(MemberId, String)]) -> Option<DispelTarget> {
    raid.living().find_map(|member| {
        member
            .debuffs
            .iter()
            .filter(|d| d.can_be_dispelled_by(types))
            .find(|d| !claimed.iter().any(|(id, debuff)| id == &member.id && debuff == &d.id))
            .map(|d| DispelTarget {
                member: member.id.clone(),
                debuff_id: d.id.clone(),
                debuff_type: d.debuff_type,
            })
    })
}
