//! Resolution stage trait.
//!
//! Each stage owns one concern of step resolution (scheduling, decision,
//! damage math, state application, ...). The pipeline invokes stages in
//! registered order; a stage declares its own applicability and failure
//! criticality, so inserting a custom stage needs no pipeline changes.

use crate::context::StepContext;
use crate::error::StageError;
use crate::world::BattleWorld;

/// How the pipeline treats a failure from a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criticality {
    /// Failure aborts the step: `errored` is set and only the event
    /// emission stage still runs.
    Fatal,
    /// Failure is appended to the step log and the pipeline continues.
    Recoverable,
}

/// One concern of step resolution.
///
/// Stages mutate only their designated [`StepContext`] fields and the
/// battle world. They must be deterministic and must draw randomness only
/// through the world's [`BattleRng`](crate::rng::BattleRng), in the order
/// documented in [`crate::pipeline`].
///
/// # Example
///
/// ```
/// use jianghu_core::context::StepContext;
/// use jianghu_core::error::StageError;
/// use jianghu_core::stage::{Criticality, Stage};
/// use jianghu_core::world::BattleWorld;
///
/// struct Taunt;
///
/// impl Stage for Taunt {
///     fn name(&self) -> &'static str {
///         "taunt"
///     }
///
///     fn criticality(&self) -> Criticality {
///         Criticality::Recoverable
///     }
///
///     fn applicable(&self, ctx: &StepContext, _world: &BattleWorld<'_>) -> bool {
///         ctx.actor_id.is_some()
///     }
///
///     fn run(
///         &self,
///         ctx: &mut StepContext,
///         _world: &mut BattleWorld<'_>,
///     ) -> Result<(), StageError> {
///         ctx.log("a sharp word before the strike");
///         Ok(())
///     }
/// }
/// ```
pub trait Stage {
    /// Unique name, used for pipeline mutation and diagnostics.
    fn name(&self) -> &'static str;

    /// How the pipeline treats this stage's failures.
    fn criticality(&self) -> Criticality;

    /// Whether the stage should run for the current context.
    fn applicable(&self, ctx: &StepContext, world: &BattleWorld<'_>) -> bool;

    /// Executes the stage.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] on failure; the pipeline applies the
    /// policy given by [`Stage::criticality`].
    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError>;

    /// True for stages that run even after the step aborted. Only the
    /// event emission stage returns true.
    fn always_runs(&self) -> bool {
        false
    }
}
