//! Immutable skill catalog.
//!
//! The catalog maps `(skill_id, tier)` to the parameter block the
//! resolution stages read. It is built once before a battle, validated,
//! and never mutated afterwards; the engine holds it by shared reference.
//!
//! Storage is a `BTreeMap` keyed by skill id with per-skill tier maps, so
//! any iteration over the catalog is in lexicographic id order rather than
//! hash order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Identifier of a skill, unique across the catalog.
///
/// Ordered lexicographically; the action selector uses this order for
/// deterministic tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SkillId(String);

impl SkillId {
    /// Creates a skill id from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SkillId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Functional category of a skill.
///
/// The category decides which resolution stage reads the skill: attack
/// skills drive the damage stage, movement skills the evasion stage, and
/// defense skills the defense stage. Data files use the Chinese labels;
/// English aliases are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    /// Offensive technique (攻击).
    #[serde(rename = "攻击", alias = "attack")]
    Attack,
    /// Evasive footwork (闪避); grants the owner a chance to avoid hits.
    #[serde(rename = "闪避", alias = "movement")]
    Movement,
    /// Guarding technique (抵挡); reduces damage taken by the owner.
    #[serde(rename = "抵挡", alias = "defense")]
    Defense,
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "攻击"),
            Self::Movement => write!(f, "闪避"),
            Self::Defense => write!(f, "抵挡"),
        }
    }
}

fn default_partial_damage_scale() -> f64 {
    1.0
}

/// Parameter block of one skill tier.
///
/// The first six fields apply to attack tiers. Movement tiers reuse
/// `hit_chance` as the probability that an incoming attack still connects,
/// and may add a partial-evasion pair. Defense tiers use
/// `damage_reduction` and optionally `block_chance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTier {
    /// Display name of this tier (e.g. "初式").
    pub tier_name: String,
    /// Flat damage before multipliers.
    pub base_damage: u32,
    /// Multiplier applied to `base_damage`.
    pub power_multiplier: f64,
    /// Probability in `[0, 1]` that the technique connects.
    pub hit_chance: f64,
    /// Probability in `[0, 1]` of a critical strike.
    pub critical_chance: f64,
    /// Qi spent when the tier is used.
    pub qi_cost: u32,
    /// Turns before the skill can be used again.
    pub cooldown: u32,
    /// Template key handed to the narration layer.
    pub narrative_template: String,
    /// Movement tiers: chance that a surviving hit is only a graze.
    #[serde(default)]
    pub partial_hit_chance: f64,
    /// Movement tiers: damage multiplier applied to a graze.
    #[serde(default = "default_partial_damage_scale")]
    pub partial_damage_scale: f64,
    /// Defense tiers: fraction of damage absorbed, in `[0, 1)`.
    #[serde(default)]
    pub damage_reduction: f64,
    /// Defense tiers: when present, the guard only engages with this
    /// probability and one random value is consumed per attack.
    #[serde(default)]
    pub block_chance: Option<f64>,
}

impl SkillTier {
    fn validate(&self, skill_id: &SkillId, tier: u32) -> Result<(), DataError> {
        let invalid = |message: &str| DataError::InvalidTier {
            skill_id: skill_id.clone(),
            tier,
            message: message.to_string(),
        };
        let chance = |value: f64| (0.0..=1.0).contains(&value);

        if !chance(self.hit_chance) {
            return Err(invalid("hit_chance outside [0, 1]"));
        }
        if !chance(self.critical_chance) {
            return Err(invalid("critical_chance outside [0, 1]"));
        }
        if !chance(self.partial_hit_chance) {
            return Err(invalid("partial_hit_chance outside [0, 1]"));
        }
        if !chance(self.partial_damage_scale) {
            return Err(invalid("partial_damage_scale outside [0, 1]"));
        }
        if !(0.0..1.0).contains(&self.damage_reduction) {
            return Err(invalid("damage_reduction outside [0, 1)"));
        }
        if let Some(block) = self.block_chance {
            if !chance(block) {
                return Err(invalid("block_chance outside [0, 1]"));
            }
        }
        if !self.power_multiplier.is_finite() || self.power_multiplier < 0.0 {
            return Err(invalid("power_multiplier must be finite and non-negative"));
        }
        Ok(())
    }
}

/// One skill: a display name, a category, and its tier table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    /// Display name used by narration.
    pub name: String,
    /// Functional category.
    pub kind: SkillKind,
    /// Tier number to parameter block. Tiers start at 1.
    pub tiers: BTreeMap<u32, SkillTier>,
}

/// Immutable `(skill_id, tier)` to parameters lookup.
///
/// # Example
///
/// ```
/// use jianghu_core::catalog::{SkillCatalog, SkillEntry, SkillKind, SkillTier};
/// use std::collections::BTreeMap;
///
/// let mut tiers = BTreeMap::new();
/// tiers.insert(1, SkillTier {
///     tier_name: "初式".to_string(),
///     base_damage: 20,
///     power_multiplier: 1.0,
///     hit_chance: 1.0,
///     critical_chance: 0.0,
///     qi_cost: 0,
///     cooldown: 0,
///     narrative_template: "basic".to_string(),
///     partial_hit_chance: 0.0,
///     partial_damage_scale: 1.0,
///     damage_reduction: 0.0,
///     block_chance: None,
/// });
///
/// let mut catalog = SkillCatalog::new();
/// catalog.insert("basic_strike", SkillEntry {
///     name: "基本击".to_string(),
///     kind: SkillKind::Attack,
///     tiers,
/// }).unwrap();
///
/// assert!(catalog.tier(&"basic_strike".into(), 1).is_some());
/// assert!(catalog.tier(&"basic_strike".into(), 2).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCatalog {
    skills: BTreeMap<SkillId, SkillEntry>,
}

impl SkillCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a skill after validating every tier.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidTier`] when a tier parameter is out of
    /// range, or [`DataError::InvalidTier`] with a `tier >= 1` message for
    /// a zero tier number.
    pub fn insert(&mut self, id: impl Into<SkillId>, entry: SkillEntry) -> Result<(), DataError> {
        let id = id.into();
        for (&tier, params) in &entry.tiers {
            if tier == 0 {
                return Err(DataError::InvalidTier {
                    skill_id: id.clone(),
                    tier,
                    message: "tier numbers start at 1".to_string(),
                });
            }
            params.validate(&id, tier)?;
        }
        self.skills.insert(id, entry);
        Ok(())
    }

    /// Looks up the parameter block of `(skill_id, tier)`.
    #[must_use]
    pub fn tier(&self, skill_id: &SkillId, tier: u32) -> Option<&SkillTier> {
        self.skills.get(skill_id)?.tiers.get(&tier)
    }

    /// Returns the functional category of a skill.
    #[must_use]
    pub fn kind(&self, skill_id: &SkillId) -> Option<SkillKind> {
        self.skills.get(skill_id).map(|entry| entry.kind)
    }

    /// Returns the display name of a skill.
    #[must_use]
    pub fn skill_name(&self, skill_id: &SkillId) -> Option<&str> {
        self.skills.get(skill_id).map(|entry| entry.name.as_str())
    }

    /// True when `(skill_id, tier)` resolves.
    #[must_use]
    pub fn contains(&self, skill_id: &SkillId, tier: u32) -> bool {
        self.tier(skill_id, tier).is_some()
    }

    /// Number of skills in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// True when the catalog holds no skills.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Iterates skills in lexicographic id order.
    pub fn iter(&self) -> impl Iterator<Item = (&SkillId, &SkillEntry)> {
        self.skills.iter()
    }
}
