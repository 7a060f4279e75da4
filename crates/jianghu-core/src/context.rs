//! Per-step resolution context.
//!
//! A [`StepContext`] is created at the top of every scheduling step,
//! threaded mutably through the stage list, and dropped once the engine
//! has collected its events. It is a plain record: each stage writes only
//! its designated fields and nothing here outlives the step.

use crate::catalog::SkillId;
use crate::combatant::CombatantId;
use crate::event::{BattleEvent, DamageBucket};

/// Mutable state flowing through one resolution step.
#[derive(Debug, Default)]
pub struct StepContext {
    /// Combatant scheduled to act, set by the scheduling stage.
    pub actor_id: Option<CombatantId>,
    /// Chosen victim, set by the decision stage.
    pub target_id: Option<CombatantId>,
    /// Chosen skill, set by the decision stage.
    pub skill_id: Option<SkillId>,
    /// Chosen tier, set by the decision stage.
    pub tier: Option<u32>,
    /// Whether the attack connected, set by evasion or damage stages.
    pub hit: Option<bool>,
    /// Whether the strike was critical, set by the damage stage.
    pub critical: Option<bool>,
    /// Final damage, set by the damage stage.
    pub final_damage: Option<u32>,
    /// Damage classification, set by the damage stage.
    pub damage_bucket: Option<DamageBucket>,
    /// Damage multiplier from a partial evasion, `1.0` when none.
    pub evasion_scale: f64,
    /// Damage multiplier from an engaged guard, `1.0` when none.
    pub defense_scale: f64,
    /// Combatant that hit zero hp this step, queued for a `DEFEAT` event.
    pub defeat_pending: Option<CombatantId>,
    /// Events generated this step, in emission order.
    pub events: Vec<BattleEvent>,
    /// One short diagnostic line per executed stage. Never influences
    /// outputs.
    pub log: Vec<String>,
    /// Cleared by a stage to stop the remainder of the pipeline.
    pub should_continue: bool,
    /// Set when a fatal stage failure made this step diagnostic-only.
    pub errored: bool,
    /// Set when the scheduler could not make progress; the engine ends
    /// the battle.
    pub scheduler_stuck: bool,
}

impl StepContext {
    /// A fresh context for one step.
    #[must_use]
    pub fn new() -> Self {
        Self {
            evasion_scale: 1.0,
            defense_scale: 1.0,
            should_continue: true,
            ..Self::default()
        }
    }

    /// Appends a diagnostic line.
    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(message.into());
    }

    /// Appends an event.
    pub fn push_event(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    /// Stops the remainder of the pipeline (the emission stage still
    /// runs).
    pub fn abort(&mut self) {
        self.should_continue = false;
    }

    /// True once the decision stage has fixed a complete action.
    #[must_use]
    pub fn action_chosen(&self) -> bool {
        self.skill_id.is_some() && self.tier.is_some() && self.target_id.is_some()
    }
}
