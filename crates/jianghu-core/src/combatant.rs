//! Combatant records.
//!
//! A [`Combatant`] is one fighter: identity, faction, a mutable stat block,
//! an ordered list of equipped skills, a cooldown table, and the ATB
//! accumulator. Records live in the [`Roster`](crate::roster::Roster) for
//! the whole battle; a downed combatant (hp 0) stays addressable but is
//! excluded from scheduling and targeting.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::SkillId;
use crate::error::DataError;

/// Stable, totally ordered combatant identifier.
///
/// The order over ids is the engine's universal tie-breaker: equal ATB
/// readiness, equal target HP, and equal scores all resolve to the lowest
/// id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(String);

impl CombatantId {
    /// Creates an id from a string.
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

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CombatantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CombatantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Team affiliation. Combatants comparing equal here fight on the same
/// side; the battle ends when at most one faction has living members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Faction(String);

impl Faction {
    /// Creates a faction label.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Faction {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Stat block. `hp` and `qi` are current values and mutate during battle;
/// the rest is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Current hit points.
    pub hp: u32,
    /// Hit point ceiling.
    pub max_hp: u32,
    /// Current qi.
    pub qi: u32,
    /// Qi ceiling.
    pub max_qi: u32,
    /// Physical power.
    pub strength: u32,
    /// Drives ATB accumulation speed.
    pub agility: u32,
    /// Toughness.
    pub defense: u32,
}

impl Stats {
    pub(crate) fn validate(&self, id: &CombatantId) -> Result<(), DataError> {
        if self.hp > self.max_hp {
            return Err(DataError::InvalidStats {
                id: id.clone(),
                message: format!("hp {} exceeds max_hp {}", self.hp, self.max_hp),
            });
        }
        if self.qi > self.max_qi {
            return Err(DataError::InvalidStats {
                id: id.clone(),
                message: format!("qi {} exceeds max_qi {}", self.qi, self.max_qi),
            });
        }
        Ok(())
    }
}

/// A skill slot: which skill at which tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedSkill {
    /// Catalog id of the skill.
    pub skill_id: SkillId,
    /// Tier the combatant has mastered.
    pub tier: u32,
}

/// One fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    id: CombatantId,
    display_name: String,
    faction: Faction,
    stats: Stats,
    equipped: Vec<EquippedSkill>,
    cooldowns: BTreeMap<SkillId, u32>,
    /// ATB accumulator in milli-units (thousandths of a time unit).
    time_units: u64,
}

impl Combatant {
    /// Builds a combatant after validating the stat block.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidStats`] when `hp > max_hp` or
    /// `qi > max_qi`.
    pub fn new(
        id: impl Into<CombatantId>,
        display_name: impl Into<String>,
        faction: impl Into<Faction>,
        stats: Stats,
        equipped: Vec<EquippedSkill>,
    ) -> Result<Self, DataError> {
        let id = id.into();
        stats.validate(&id)?;
        Ok(Self {
            id,
            display_name: display_name.into(),
            faction: faction.into(),
            stats,
            equipped,
            cooldowns: BTreeMap::new(),
            time_units: 0,
        })
    }

    /// Returns the combatant's id.
    #[must_use]
    pub fn id(&self) -> &CombatantId {
        &self.id
    }

    /// Returns the display name used by narration.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the faction.
    #[must_use]
    pub fn faction(&self) -> &Faction {
        &self.faction
    }

    /// Returns the stat block.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Equipped skills in slot order.
    #[must_use]
    pub fn equipped(&self) -> &[EquippedSkill] {
        &self.equipped
    }

    /// True while the combatant has hit points left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    /// Remaining cooldown turns for a skill; unseen skills are ready.
    #[must_use]
    pub fn cooldown(&self, skill_id: &SkillId) -> u32 {
        self.cooldowns.get(skill_id).copied().unwrap_or(0)
    }

    /// ATB accumulator in milli-units.
    #[must_use]
    pub fn time_units(&self) -> u64 {
        self.time_units
    }

    pub(crate) fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    pub(crate) fn set_cooldown(&mut self, skill_id: SkillId, value: u32) {
        self.cooldowns.insert(skill_id, value);
    }

    pub(crate) fn decrement_cooldowns(&mut self) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    pub(crate) fn cooldowns(&self) -> &BTreeMap<SkillId, u32> {
        &self.cooldowns
    }

    pub(crate) fn add_time_units(&mut self, milli: u64) {
        self.time_units = self.time_units.saturating_add(milli);
    }

    pub(crate) fn consume_time_units(&mut self, milli: u64) {
        self.time_units = self.time_units.saturating_sub(milli);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Stats {
        Stats {
            hp: 80,
            max_hp: 100,
            qi: 30,
            max_qi: 50,
            strength: 12,
            agility: 10,
            defense: 6,
        }
    }

    #[test]
    fn new_validates_stats() {
        let ok = Combatant::new("li_hua", "李华", "azure_sect", stats(), vec![]);
        assert!(ok.is_ok());

        let mut bad = stats();
        bad.hp = 200;
        let err = Combatant::new("li_hua", "李华", "azure_sect", bad, vec![]).unwrap_err();
        assert!(matches!(err, DataError::InvalidStats { .. }));

        let mut bad = stats();
        bad.qi = 80;
        assert!(Combatant::new("li_hua", "李华", "azure_sect", bad, vec![]).is_err());
    }

    #[test]
    fn unseen_cooldown_defaults_to_zero() {
        let combatant = Combatant::new("a", "A", "f", stats(), vec![]).unwrap();
        assert_eq!(combatant.cooldown(&"anything".into()), 0);
    }

    #[test]
    fn decrement_cooldowns_floors_at_zero() {
        let mut combatant = Combatant::new("a", "A", "f", stats(), vec![]).unwrap();
        combatant.set_cooldown("palm".into(), 2);
        combatant.set_cooldown("kick".into(), 0);

        combatant.decrement_cooldowns();
        assert_eq!(combatant.cooldown(&"palm".into()), 1);
        assert_eq!(combatant.cooldown(&"kick".into()), 0);

        combatant.decrement_cooldowns();
        combatant.decrement_cooldowns();
        assert_eq!(combatant.cooldown(&"palm".into()), 0);
    }

    #[test]
    fn alive_tracks_hp() {
        let mut combatant = Combatant::new("a", "A", "f", stats(), vec![]).unwrap();
        assert!(combatant.is_alive());
        combatant.stats_mut().hp = 0;
        assert!(!combatant.is_alive());
    }

    #[test]
    fn id_ordering_is_lexicographic() {
        assert!(CombatantId::new("a") < CombatantId::new("b"));
        assert!(CombatantId::new("aa") < CombatantId::new("ab"));
    }

    #[test]
    fn time_units_accumulate_and_consume() {
        let mut combatant = Combatant::new("a", "A", "f", stats(), vec![]).unwrap();
        combatant.add_time_units(150_000);
        assert_eq!(combatant.time_units(), 150_000);
        combatant.consume_time_units(100_000);
        assert_eq!(combatant.time_units(), 50_000);
        combatant.consume_time_units(100_000);
        assert_eq!(combatant.time_units(), 0);
    }
}
