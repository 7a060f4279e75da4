//! # Jianghu Core
//!
//! Deterministic combat simulation core for wuxia duels.
//!
//! This crate provides the turn-scheduling and action-resolution engine:
//! an Active-Time-Battle scheduler, a heuristic action selector, and a
//! staged resolution pipeline that turns combatant data into a fully
//! ordered stream of battle events.
//!
//! ## Architecture
//!
//! One `step()` is one pass through an ordered list of stages:
//!
//! - **Scheduling**: the ATB clock picks whoever crossed the readiness
//!   threshold, fastest first.
//! - **Decision**: a policy picks `(skill, tier, target)` or passes.
//! - **Resolution**: resource check, evasion, defense, damage math, state
//!   application.
//! - **Emission**: every step closes with a coherent event record.
//!
//! Stages share a per-step [`StepContext`](context::StepContext) and the
//! [`BattleWorld`](world::BattleWorld); the
//! [`Engine`](engine::Engine) facade drives the loop and owns the event
//! log.
//!
//! ## Determinism
//!
//! Equal `(seed, data)` inputs replay the same battle event for event:
//! all randomness flows through one seeded ChaCha8 generator, stages
//! consume it in a contracted order, and every result-affecting iteration
//! is in insertion or id order, never hash order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jianghu_core::{BattlePackage, Engine};
//!
//! let package = BattlePackage::from_json(skills, combatants, config)?;
//! let mut engine = Engine::from_config(package.roster, &package.catalog, package.config)?;
//! let events = engine.run_to_completion();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod combatant;
pub mod config;
pub mod context;
pub mod data;
pub mod engine;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod rng;
pub mod roster;
pub mod scheduler;
pub mod selector;
pub mod stage;
pub mod stages;
pub mod world;

// Re-exports for convenience
pub use catalog::{SkillCatalog, SkillId, SkillKind, SkillTier};
pub use combatant::{Combatant, CombatantId, EquippedSkill, Faction, Stats};
pub use config::EngineConfig;
pub use data::BattlePackage;
pub use engine::Engine;
pub use error::{DataError, RosterError, SchedulerError, StageError};
pub use event::{map_event_for_narration, BattleEvent, DamageBucket, EventKind, NarrationContext};
pub use pipeline::Pipeline;
pub use rng::BattleRng;
pub use roster::Roster;
pub use scheduler::AtbScheduler;
pub use selector::{ActionChoice, ActionPolicy, HeuristicPolicy};
pub use stage::{Criticality, Stage};

// Test modules
#[cfg(test)]
mod tests;
