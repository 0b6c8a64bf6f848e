//! Roster configuration, base stats and the persistence snapshot

use super::{Item, Raid, RaidMember, MAX_RAID_SIZE};
use crate::config::ConfigError;
use crate::error::RosterError;
use crate::types::{PositionZone, Role, WowClass};
use serde::{Deserialize, Serialize};

/// Which members an AI healer covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealerAssignment {
    /// Tank-role members first
    Tank,
    /// Lowest health anywhere
    Raid,
}

/// Naked stats before gear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub health: f64,
    /// Mana, or the rage/energy cap
    pub mana: f64,
    #[serde(default)]
    pub spell_power: f64,
    #[serde(default)]
    pub crit_chance: f64,
    #[serde(default)]
    pub mp5: f64,
    #[serde(default)]
    pub spirit_mp5: f64,
    #[serde(default)]
    pub health_regen_per_5: f64,
}

impl BaseStats {
    /// Level 60 baseline with a pre-raid set of healing gear folded in
    pub fn for_class(class: WowClass, role: Role) -> Self {
        let caster = |health, mana, spell_power, crit_chance, mp5, spirit_mp5| BaseStats {
            health,
            mana,
            spell_power,
            crit_chance,
            mp5,
            spirit_mp5,
            health_regen_per_5: 0.0,
        };
        match (class, role) {
            (WowClass::Warrior, Role::Tank) => caster(8500.0, 100.0, 0.0, 0.0, 0.0, 0.0),
            (WowClass::Warrior, _) => caster(5500.0, 100.0, 0.0, 0.0, 0.0, 0.0),
            (WowClass::Druid, Role::Tank) => caster(7500.0, 4000.0, 0.0, 0.0, 0.0, 0.0),
            (WowClass::Paladin, _) => caster(4500.0, 6500.0, 500.0, 0.08, 40.0, 20.0),
            (WowClass::Priest, _) => caster(4000.0, 7000.0, 500.0, 0.05, 30.0, 60.0),
            (WowClass::Druid, _) => caster(4200.0, 6500.0, 450.0, 0.05, 30.0, 50.0),
            (WowClass::Shaman, _) => caster(4500.0, 6500.0, 450.0, 0.05, 50.0, 25.0),
            (WowClass::Rogue, _) => caster(4500.0, 100.0, 0.0, 0.0, 0.0, 0.0),
            (WowClass::Hunter, _) => caster(4500.0, 5000.0, 0.0, 0.0, 0.0, 0.0),
            (WowClass::Mage, _) | (WowClass::Warlock, _) => caster(4000.0, 5500.0, 0.0, 0.0, 0.0, 0.0),
        }
    }
}

/// One roster entry as written in a roster file or save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberConfig {
    pub id: String,
    pub name: String,
    pub class: WowClass,
    pub role: Role,
    #[serde(default)]
    pub spec: Option<String>,
    #[serde(default = "default_group")]
    pub group: u8,
    #[serde(default)]
    pub zone: Option<PositionZone>,
    /// Overrides the class baseline
    #[serde(default)]
    pub base: Option<BaseStats>,
    #[serde(default)]
    pub gear: Vec<Item>,
    #[serde(default)]
    pub dkp: f64,
    #[serde(default)]
    pub assignment: Option<HealerAssignment>,
}

fn default_group() -> u8 {
    1
}

impl MemberConfig {
    pub fn new(id: &str, class: WowClass, role: Role) -> Self {
        MemberConfig {
            id: id.to_string(),
            name: id.to_string(),
            class,
            role,
            spec: None,
            group: 1,
            zone: None,
            base: None,
            gear: Vec::new(),
            dkp: 0.0,
            assignment: None,
        }
    }

    pub fn in_group(mut self, group: u8) -> Self {
        self.group = group;
        self
    }

    pub fn with_assignment(mut self, assignment: HealerAssignment) -> Self {
        self.assignment = Some(assignment);
        self
    }

    /// Capture a live member, gear and DKP included
    pub fn from_member(member: &RaidMember) -> Self {
        MemberConfig {
            id: member.id.0.clone(),
            name: member.name.clone(),
            class: member.class,
            role: member.role,
            spec: (!member.spec.is_empty()).then(|| member.spec.clone()),
            group: member.group,
            zone: Some(member.zone),
            base: Some(member.base),
            gear: member.equipment.iter().map(|(_, item)| item.clone()).collect(),
            dkp: member.dkp,
            assignment: member.assignment,
        }
    }
}

/// Roster file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub members: Vec<MemberConfig>,
    #[serde(default)]
    pub bench: Vec<MemberConfig>,
}

impl RosterConfig {
    /// Build a raid from this roster
    pub fn build(&self) -> Result<Raid, RosterError> {
        if self.members.len() > MAX_RAID_SIZE {
            return Err(RosterError::RaidFull(MAX_RAID_SIZE));
        }
        let mut raid = Raid::new();
        for config in &self.members {
            raid.add(RaidMember::from_config(config))?;
        }
        raid.bench = self.bench.iter().map(RaidMember::from_config).collect();
        Ok(raid)
    }

    /// A standard forty: 4 tanks, 12 healers, 24 damage dealers, 5 per group
    pub fn default_raid() -> Self {
        let mut layout: Vec<(WowClass, Role)> = Vec::with_capacity(MAX_RAID_SIZE);
        layout.extend([(WowClass::Warrior, Role::Tank); 3]);
        layout.push((WowClass::Druid, Role::Tank));
        layout.extend([(WowClass::Priest, Role::Healer); 4]);
        layout.extend([(WowClass::Paladin, Role::Healer); 3]);
        layout.extend([(WowClass::Druid, Role::Healer); 3]);
        layout.extend([(WowClass::Shaman, Role::Healer); 2]);
        layout.extend([(WowClass::Warrior, Role::Dps); 4]);
        layout.extend([(WowClass::Rogue, Role::Dps); 5]);
        layout.extend([(WowClass::Mage, Role::Dps); 6]);
        layout.extend([(WowClass::Warlock, Role::Dps); 5]);
        layout.extend([(WowClass::Hunter, Role::Dps); 4]);

        // Spread tanks and healers across groups instead of packing them
        let mut members: Vec<MemberConfig> = layout
            .iter()
            .enumerate()
            .map(|(i, (class, role))| {
                let id = format!("{}{}", class.name().to_lowercase(), i + 1);
                MemberConfig::new(&id, *class, *role).in_group((i % 8) as u8 + 1)
            })
            .collect();
        for member in members.iter_mut() {
            member.name = capitalize(&member.id);
        }

        let bench = vec![
            MemberConfig::new("priest_bench", WowClass::Priest, Role::Healer),
            MemberConfig::new("mage_bench", WowClass::Mage, Role::Dps),
        ];
        RosterConfig { members, bench }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Everything persisted between sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaidSave {
    pub roster: RosterConfig,
    #[serde(default)]
    pub defeated_bosses: Vec<String>,
}

impl RaidSave {
    pub fn capture(raid: &Raid, defeated_bosses: &[String]) -> Self {
        RaidSave {
            roster: RosterConfig {
                members: raid.members.iter().map(MemberConfig::from_member).collect(),
                bench: raid.bench.iter().map(MemberConfig::from_member).collect(),
            },
            defeated_bosses: defeated_bosses.to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Rebuild the raid; members come back at full health with no effects
    pub fn restore(&self) -> Result<Raid, RosterError> {
        self.roster.build()
    }
}
