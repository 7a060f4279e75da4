//! Error types for the combat engine.
//!
//! The engine distinguishes four failure families:
//!
//! - [`DataError`]: invariant violations caught while building a catalog,
//!   roster, or config. These fail fast at construction and never occur
//!   mid-battle.
//! - [`SchedulerError`]: the turn scheduler could not make progress within
//!   its bounded number of accumulation ticks.
//! - [`RosterError`]: a caller violated a state-store contract (spending qi
//!   it does not have, addressing an unknown combatant).
//! - [`StageError`]: a resolution stage failed. Its [`Criticality`] decides
//!   whether the step aborts or merely logs and continues.
//!
//! During ordinary gameplay none of these escape [`Engine::step`]
//! (`crate::engine::Engine::step`): abnormal outcomes surface as `NOOP`
//! events with a reason, or flip the battle-over predicate.

use crate::catalog::SkillId;
use crate::combatant::CombatantId;

/// Construction-time data invariant violation.
///
/// Every variant corresponds to a constraint on the input data contracts:
/// unique ids, `hp <= max_hp`, chances inside `[0, 1]`, resolvable skill
/// references, and a sane scheduler configuration.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Two combatants share the same id.
    #[error("duplicate combatant id `{0}`")]
    DuplicateCombatant(CombatantId),

    /// A combatant's stat block violates an invariant.
    #[error("combatant `{id}`: {message}")]
    InvalidStats {
        /// Offending combatant.
        id: CombatantId,
        /// Which invariant was violated.
        message: String,
    },

    /// An equipped skill does not resolve to a catalog entry.
    #[error("unknown skill `{skill_id}` tier {tier}")]
    UnknownSkillTier {
        /// Referenced skill id.
        skill_id: SkillId,
        /// Referenced tier.
        tier: u32,
    },

    /// A skill tier's parameters violate an invariant.
    #[error("skill `{skill_id}` tier {tier}: {message}")]
    InvalidTier {
        /// Offending skill id.
        skill_id: SkillId,
        /// Offending tier.
        tier: u32,
        /// Which invariant was violated.
        message: String,
    },

    /// The engine config violates an invariant.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A battle needs at least two distinct factions.
    #[error("at least two factions required, found {0}")]
    TooFewFactions(usize),

    /// A data file could not be parsed.
    #[error("failed to parse data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The ATB scheduler exhausted its progress bound without any living
/// combatant reaching the ready threshold.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// No combatant became ready. Only possible when every living
    /// combatant has zero effective agility.
    #[error("no combatant became ready within {ticks} accumulation ticks")]
    Stuck {
        /// How many accumulation ticks were attempted.
        ticks: u32,
    },
}

/// A state-store contract violation.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The id does not name a combatant in the roster.
    #[error("unknown combatant `{0}`")]
    UnknownCombatant(CombatantId),

    /// A qi spend exceeded the combatant's current qi.
    #[error("combatant `{id}` lacks qi: need {need}, have {have}")]
    InsufficientQi {
        /// Combatant that was charged.
        id: CombatantId,
        /// Qi the action required.
        need: u32,
        /// Qi the combatant actually had.
        have: u32,
    },
}

/// Failure raised by a resolution stage.
///
/// The pipeline consults the owning stage's
/// [`Criticality`](crate::stage::Criticality) to decide the policy:
/// `Fatal` aborts the step (only the event-emission stage still runs),
/// `Recoverable` is appended to the step's diagnostic log and the
/// pipeline continues.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StageError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl StageError {
    /// Creates a stage error from anything displayable.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<RosterError> for StageError {
    fn from(err: RosterError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<SchedulerError> for StageError {
    fn from(err: SchedulerError) -> Self {
        Self::new(err.to_string())
    }
}
