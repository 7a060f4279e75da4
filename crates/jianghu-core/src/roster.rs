//! Combatant state store.
//!
//! The [`Roster`] exclusively owns every [`Combatant`] record for the
//! duration of a battle. Records are never removed; a downed combatant
//! stays addressable so late events can still name it.
//!
//! # Iteration order
//!
//! [`Roster::all`] and [`Roster::living`] yield combatants in insertion
//! order, which is stable for the whole run. Every result-affecting
//! traversal in the engine goes through these two iterators; the id index
//! is a hash map but is only used for point lookups.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::catalog::SkillId;
use crate::combatant::{Combatant, CombatantId, Faction};
use crate::error::{DataError, RosterError};

/// Owns all combatant records with stable insertion order.
#[derive(Debug, Clone)]
pub struct Roster {
    combatants: Vec<Combatant>,
    index: HashMap<CombatantId, usize>,
}

impl Roster {
    /// Builds a roster from combatants, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::DuplicateCombatant`] when two records share an
    /// id.
    pub fn new(combatants: Vec<Combatant>) -> Result<Self, DataError> {
        let mut index = HashMap::with_capacity(combatants.len());
        for (position, combatant) in combatants.iter().enumerate() {
            if index.insert(combatant.id().clone(), position).is_some() {
                return Err(DataError::DuplicateCombatant(combatant.id().clone()));
            }
        }
        Ok(Self { combatants, index })
    }

    /// All combatants in insertion order, downed included.
    pub fn all(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    /// Living combatants in insertion order.
    pub fn living(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(|c| c.is_alive())
    }

    /// Point lookup by id.
    #[must_use]
    pub fn by_id(&self, id: &CombatantId) -> Option<&Combatant> {
        self.index.get(id).map(|&position| &self.combatants[position])
    }

    /// Mutable point lookup by id.
    pub fn by_id_mut(&mut self, id: &CombatantId) -> Option<&mut Combatant> {
        let position = *self.index.get(id)?;
        Some(&mut self.combatants[position])
    }

    /// Number of combatants, downed included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// True when the roster holds no combatants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Reduces a combatant's hp, flooring at zero. Emits no event; the
    /// calling stage is responsible for reporting the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownCombatant`] for an unknown id.
    pub fn apply_damage(&mut self, id: &CombatantId, amount: u32) -> Result<(), RosterError> {
        let combatant = self
            .by_id_mut(id)
            .ok_or_else(|| RosterError::UnknownCombatant(id.clone()))?;
        let stats = combatant.stats_mut();
        stats.hp = stats.hp.saturating_sub(amount);
        Ok(())
    }

    /// Spends qi, requiring the full cost to be available.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::InsufficientQi`] when the combatant cannot
    /// cover the cost, leaving its qi untouched.
    pub fn spend_qi(&mut self, id: &CombatantId, cost: u32) -> Result<(), RosterError> {
        let combatant = self
            .by_id_mut(id)
            .ok_or_else(|| RosterError::UnknownCombatant(id.clone()))?;
        let stats = combatant.stats_mut();
        if stats.qi < cost {
            return Err(RosterError::InsufficientQi {
                id: id.clone(),
                need: cost,
                have: stats.qi,
            });
        }
        stats.qi -= cost;
        Ok(())
    }

    /// Overwrites a cooldown entry.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownCombatant`] for an unknown id.
    pub fn set_cooldown(
        &mut self,
        id: &CombatantId,
        skill_id: SkillId,
        value: u32,
    ) -> Result<(), RosterError> {
        let combatant = self
            .by_id_mut(id)
            .ok_or_else(|| RosterError::UnknownCombatant(id.clone()))?;
        combatant.set_cooldown(skill_id, value);
        Ok(())
    }

    /// Reduces every cooldown entry of one combatant by one, flooring at
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownCombatant`] for an unknown id.
    pub fn decrement_cooldowns(&mut self, id: &CombatantId) -> Result<(), RosterError> {
        let combatant = self
            .by_id_mut(id)
            .ok_or_else(|| RosterError::UnknownCombatant(id.clone()))?;
        combatant.decrement_cooldowns();
        Ok(())
    }

    /// Factions that still have living members, in faction order.
    #[must_use]
    pub fn factions_alive(&self) -> BTreeSet<Faction> {
        self.living().map(|c| c.faction().clone()).collect()
    }

    /// Distinct factions across all combatants, downed included.
    #[must_use]
    pub fn factions(&self) -> BTreeSet<Faction> {
        self.all().map(|c| c.faction().clone()).collect()
    }

    /// Serializable digest of the mutable state, for debugging and tests.
    #[must_use]
    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            combatants: self
                .all()
                .map(|c| {
                    (
                        c.id().clone(),
                        CombatantSnapshot {
                            hp: c.stats().hp,
                            qi: c.stats().qi,
                            cooldowns: c.cooldowns().clone(),
                            time_units: c.time_units(),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Point-in-time digest of all mutable combatant state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterSnapshot {
    /// Per-combatant state keyed by id.
    pub combatants: BTreeMap<CombatantId, CombatantSnapshot>,
}

/// Mutable state of one combatant at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatantSnapshot {
    /// Current hit points.
    pub hp: u32,
    /// Current qi.
    pub qi: u32,
    /// Remaining cooldown turns per skill.
    pub cooldowns: BTreeMap<SkillId, u32>,
    /// ATB accumulator in milli-units.
    pub time_units: u64,
}
