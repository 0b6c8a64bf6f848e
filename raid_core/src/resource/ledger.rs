//! Aggregate healing accounting for scoring

use super::HealOutcome;
use crate::types::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Healing totals for one caster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasterHealing {
    pub raw: f64,
    pub effective: f64,
    pub overheal: f64,
    pub casts: u32,
    pub crits: u32,
}

/// Running healing totals
///
/// `effective + overheal == raw` at all times: nothing resolved is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealingLedger {
    pub total_raw: f64,
    pub total_effective: f64,
    pub total_overheal: f64,
    pub by_caster: BTreeMap<MemberId, CasterHealing>,
}

impl HealingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one landed heal
    pub fn record(&mut self, caster: &MemberId, outcome: &HealOutcome, is_crit: bool) {
        self.total_raw += outcome.raw;
        self.total_effective += outcome.effective;
        self.total_overheal += outcome.overheal;

        let entry = self.by_caster.entry(caster.clone()).or_default();
        entry.raw += outcome.raw;
        entry.effective += outcome.effective;
        entry.overheal += outcome.overheal;
        if is_crit {
            entry.crits += 1;
        }
    }

    /// Count a completed cast (separate from hits, chain heals land several)
    pub fn record_cast(&mut self, caster: &MemberId) {
        self.by_caster.entry(caster.clone()).or_default().casts += 1;
    }

    /// Overheal as a fraction of everything resolved
    pub fn overheal_ratio(&self) -> f64 {
        if self.total_raw <= 0.0 {
            return 0.0;
        }
        self.total_overheal / self.total_raw
    }

    pub fn caster(&self, id: &MemberId) -> Option<&CasterHealing> {
        self.by_caster.get(id)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
