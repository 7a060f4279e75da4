//! Data contracts and loaders.
//!
//! Serde mirrors of the JSON records a battle is assembled from, plus the
//! builders that turn them into validated engine types. The loaders are
//! strict: every numeric invariant of the contracts is enforced here or in
//! the constructors they call, so the engine itself never re-checks input
//! data mid-battle.
//!
//! Three documents describe a battle:
//!
//! - a skills document: a map from skill id to [`SkillData`],
//! - a combatants document: an array of [`CombatantData`],
//! - a config document: an [`EngineConfig`](crate::config::EngineConfig).
//!
//! [`BattlePackage::from_json`] bundles all three into a ready battle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{SkillCatalog, SkillEntry, SkillKind, SkillTier};
use crate::combatant::{Combatant, EquippedSkill, Stats};
use crate::config::EngineConfig;
use crate::error::DataError;
use crate::roster::Roster;

/// Stat block as it appears in combatant data files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsData {
    /// Starting hit points.
    pub hp: u32,
    /// Hit point ceiling.
    pub max_hp: u32,
    /// Starting qi.
    pub qi: u32,
    /// Qi ceiling.
    pub max_qi: u32,
    /// Physical power.
    pub strength: u32,
    /// ATB accumulation speed.
    pub agility: u32,
    /// Toughness.
    pub defense: u32,
}

/// One equipped skill slot in a combatant record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquippedSkillData {
    /// Skill id, resolved against the skills document.
    pub skill_id: String,
    /// Mastered tier, starting at 1.
    pub tier: u32,
}

/// One combatant record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantData {
    /// Unique id.
    pub id: String,
    /// Display name for narration.
    pub name: String,
    /// Team affiliation.
    pub faction: String,
    /// Stat block.
    pub stats: StatsData,
    /// Equipped skills in slot order.
    #[serde(default)]
    pub skills: Vec<EquippedSkillData>,
}

/// Tier parameters as they appear in skills documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierParamsData {
    /// Flat damage before multipliers.
    pub base_damage: u32,
    /// Multiplier on `base_damage`.
    pub power_multiplier: f64,
    /// Probability the technique connects.
    pub hit_chance: f64,
    /// Probability of a critical strike.
    pub critical_chance: f64,
    /// Qi cost per use.
    pub qi_cost: u32,
    /// Cooldown in turns.
    pub cooldown: u32,
    /// Movement skills: chance a surviving hit is a graze.
    #[serde(default)]
    pub partial_hit_chance: f64,
    /// Movement skills: damage multiplier for a graze.
    #[serde(default = "default_partial_damage_scale")]
    pub partial_damage_scale: f64,
    /// Defense skills: fraction of damage absorbed.
    #[serde(default)]
    pub damage_reduction: f64,
    /// Defense skills: probability the guard engages, when probabilistic.
    #[serde(default)]
    pub block_chance: Option<f64>,
}

fn default_partial_damage_scale() -> f64 {
    1.0
}

/// One tier record of a skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTierData {
    /// Tier number, starting at 1.
    pub tier: u32,
    /// Display name of the tier.
    pub tier_name: String,
    /// Numeric parameters.
    pub parameters: TierParamsData,
    /// Template key for the narration layer.
    pub narrative_template: String,
}

/// One skill record: name, category, tier list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillData {
    /// Display name.
    pub name: String,
    /// Functional category; Chinese labels with English aliases.
    #[serde(rename = "type")]
    pub kind: SkillKind,
    /// Tier records.
    pub tiers: Vec<SkillTierData>,
}

/// Parses a skills document into a validated catalog.
///
/// # Errors
///
/// Returns [`DataError::Parse`] on malformed JSON, or the underlying
/// validation error for out-of-range parameters and duplicate or zero
/// tier numbers.
pub fn parse_skill_catalog(json: &str) -> Result<SkillCatalog, DataError> {
    let raw: BTreeMap<String, SkillData> = serde_json::from_str(json)?;
    build_catalog(raw)
}

/// Builds a catalog from already-deserialized skill records.
///
/// # Errors
///
/// Same as [`parse_skill_catalog`], minus the parse errors.
pub fn build_catalog(skills: BTreeMap<String, SkillData>) -> Result<SkillCatalog, DataError> {
    let mut catalog = SkillCatalog::new();
    for (skill_id, skill) in skills {
        let mut tiers = BTreeMap::new();
        for tier_data in skill.tiers {
            let params = tier_data.parameters;
            let previous = tiers.insert(
                tier_data.tier,
                SkillTier {
                    tier_name: tier_data.tier_name,
                    base_damage: params.base_damage,
                    power_multiplier: params.power_multiplier,
                    hit_chance: params.hit_chance,
                    critical_chance: params.critical_chance,
                    qi_cost: params.qi_cost,
                    cooldown: params.cooldown,
                    narrative_template: tier_data.narrative_template,
                    partial_hit_chance: params.partial_hit_chance,
                    partial_damage_scale: params.partial_damage_scale,
                    damage_reduction: params.damage_reduction,
                    block_chance: params.block_chance,
                },
            );
            if previous.is_some() {
                return Err(DataError::InvalidTier {
                    skill_id: skill_id.as_str().into(),
                    tier: tier_data.tier,
                    message: "duplicate tier number".to_string(),
                });
            }
        }
        catalog.insert(
            skill_id.as_str(),
            SkillEntry {
                name: skill.name,
                kind: skill.kind,
                tiers,
            },
        )?;
    }
    Ok(catalog)
}

/// Parses a combatants document into validated records.
///
/// Skill references are resolved against `catalog`; stats invariants are
/// enforced by the combatant constructor.
///
/// # Errors
///
/// Returns [`DataError::Parse`] on malformed JSON,
/// [`DataError::UnknownSkillTier`] for a dangling skill reference, or
/// [`DataError::InvalidStats`] for a bad stat block.
pub fn parse_combatants(
    json: &str,
    catalog: &SkillCatalog,
) -> Result<Vec<Combatant>, DataError> {
    let raw: Vec<CombatantData> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|record| build_combatant(record, catalog))
        .collect()
}

/// Builds one combatant from its record, resolving skill references.
///
/// # Errors
///
/// Same as [`parse_combatants`], minus the parse errors.
pub fn build_combatant(
    record: CombatantData,
    catalog: &SkillCatalog,
) -> Result<Combatant, DataError> {
    let mut equipped = Vec::with_capacity(record.skills.len());
    for slot in record.skills {
        let skill_id = slot.skill_id.as_str().into();
        if !catalog.contains(&skill_id, slot.tier) {
            return Err(DataError::UnknownSkillTier {
                skill_id,
                tier: slot.tier,
            });
        }
        equipped.push(EquippedSkill {
            skill_id,
            tier: slot.tier,
        });
    }
    Combatant::new(
        record.id.as_str(),
        record.name,
        record.faction.as_str(),
        Stats {
            hp: record.stats.hp,
            max_hp: record.stats.max_hp,
            qi: record.stats.qi,
            max_qi: record.stats.max_qi,
            strength: record.stats.strength,
            agility: record.stats.agility,
            defense: record.stats.defense,
        },
        equipped,
    )
}

/// Parses and validates a config document.
///
/// # Errors
///
/// Returns [`DataError::Parse`] on malformed JSON or
/// [`DataError::InvalidConfig`] for out-of-range values.
pub fn parse_config(json: &str) -> Result<EngineConfig, DataError> {
    let config: EngineConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Everything a battle needs, loaded and validated.
#[derive(Debug)]
pub struct BattlePackage {
    /// The immutable skill catalog.
    pub catalog: SkillCatalog,
    /// The combatant store.
    pub roster: Roster,
    /// Run configuration.
    pub config: EngineConfig,
}

impl BattlePackage {
    /// Assembles a package from the three JSON documents.
    ///
    /// # Errors
    ///
    /// Any [`DataError`] from the individual loaders, plus
    /// [`DataError::DuplicateCombatant`] from roster assembly.
    pub fn from_json(
        skills_json: &str,
        combatants_json: &str,
        config_json: &str,
    ) -> Result<Self, DataError> {
        let catalog = parse_skill_catalog(skills_json)?;
        let combatants = parse_combatants(combatants_json, &catalog)?;
        let roster = Roster::new(combatants)?;
        let config = parse_config(config_json)?;
        Ok(Self {
            catalog,
            roster,
            config,
        })
    }
}
