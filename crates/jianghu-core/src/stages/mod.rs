//! The standard resolution stages.
//!
//! Each stage owns one concern of step resolution and nothing else:
//!
//! - [`SchedulingStage`]: advance the ATB clock, pick the actor, tick its
//!   cooldowns down.
//! - [`DecisionStage`]: ask the action policy for `(skill, tier, target)`.
//! - [`ResourceStage`]: re-verify qi and cooldown for the chosen skill.
//! - [`EvasionStage`]: the target's footwork may turn the attack into a
//!   miss or a graze.
//! - [`DefenseStage`]: the target's guard may record a damage reduction.
//! - [`DamageStage`]: hit, critical, and damage math.
//! - [`ApplyStage`]: charge qi, start the cooldown, apply damage, queue a
//!   defeat marker.
//! - [`EmitStage`]: produce the primary event; always runs.
//!
//! The stage structs are exported so hosts can rebuild or reorder a
//! [`Pipeline`](crate::pipeline::Pipeline) around their own insertions.

mod apply;
mod damage;
mod decision;
mod defense;
mod emit;
mod evasion;
mod resource;
mod scheduling;

pub use apply::ApplyStage;
pub use damage::DamageStage;
pub use decision::DecisionStage;
pub use defense::DefenseStage;
pub use emit::EmitStage;
pub use evasion::EvasionStage;
pub use resource::ResourceStage;
pub use scheduling::SchedulingStage;
