//! Ordered stage pipeline.
//!
//! One [`Pipeline::execute`] call resolves one scheduling step: each stage
//! runs in registered order if it is applicable, any stage may abort the
//! remainder, and the event emission stage runs unconditionally at its
//! position so every step leaves a coherent event record.
//!
//! # Randomness order
//!
//! The random source is consumed in a fixed sequence per step, and that
//! sequence is part of the engine contract. With the standard stage order:
//!
//! 1. evasion roll (only when the target has a movement skill), then its
//!    partial-evasion roll (only when the tier defines one),
//! 2. guard roll (only when the target's defense tier defines a
//!    `block_chance`),
//! 3. hit roll,
//! 4. critical roll (only on a hit).
//!
//! A stage that is not applicable consumes nothing. Reordering stages that
//! draw randomness changes battle outcomes for the same seed; hosts doing
//! so are deliberately forking the contract.
//!
//! # Failure policy
//!
//! A `Fatal` failure marks the step errored and skips to event emission.
//! A `Recoverable` failure is appended to the step's diagnostic log and
//! the pipeline continues.

use crate::context::StepContext;
use crate::stage::{Criticality, Stage};
use crate::stages::{
    ApplyStage, DamageStage, DecisionStage, DefenseStage, EmitStage, EvasionStage, ResourceStage,
    SchedulingStage,
};
use crate::world::BattleWorld;

/// Ordered list of resolution stages.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// An empty pipeline. Useful for hosts assembling a fully custom
    /// stage list; most callers want [`Pipeline::standard`].
    #[must_use]
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// The standard eight-stage resolution order: scheduling, decision,
    /// resource check, evasion, defense, damage, state apply, event emit.
    #[must_use]
    pub fn standard() -> Self {
        let mut pipeline = Self::empty();
        pipeline.push(Box::new(SchedulingStage));
        pipeline.push(Box::new(DecisionStage));
        pipeline.push(Box::new(ResourceStage));
        pipeline.push(Box::new(EvasionStage));
        pipeline.push(Box::new(DefenseStage));
        pipeline.push(Box::new(DamageStage));
        pipeline.push(Box::new(ApplyStage));
        pipeline.push(Box::new(EmitStage));
        pipeline
    }

    /// Appends a stage.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Inserts a stage, at `position` when given, else at the end.
    /// Positions past the end clamp to an append.
    pub fn add_stage(&mut self, stage: Box<dyn Stage>, position: Option<usize>) {
        match position {
            Some(position) if position < self.stages.len() => {
                self.stages.insert(position, stage);
            }
            _ => self.stages.push(stage),
        }
    }

    /// Removes the first stage with the given name. Returns whether one
    /// was removed.
    pub fn remove_stage(&mut self, name: &str) -> bool {
        match self.stages.iter().position(|stage| stage.name() == name) {
            Some(position) => {
                self.stages.remove(position);
                true
            }
            None => false,
        }
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True when the pipeline holds no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs all applicable stages in order for one step.
    pub(crate) fn execute(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) {
        for stage in &self.stages {
            if !ctx.should_continue && !stage.always_runs() {
                continue;
            }
            if !stage.applicable(ctx, world) {
                continue;
            }

            tracing::trace!(stage = stage.name(), "running stage");
            if let Err(error) = stage.run(ctx, world) {
                match stage.criticality() {
                    Criticality::Fatal => {
                        tracing::debug!(stage = stage.name(), %error, "fatal stage failure");
                        ctx.log(format!("{}: fatal: {error}", stage.name()));
                        ctx.errored = true;
                        ctx.abort();
                    }
                    Criticality::Recoverable => {
                        tracing::debug!(stage = stage.name(), %error, "recoverable stage failure");
                        ctx.log(format!("{}: recovered: {error}", stage.name()));
                    }
                }
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
