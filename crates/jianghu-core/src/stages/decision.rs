//! Decision stage: asks the action policy what to do.

use crate::context::StepContext;
use crate::error::StageError;
use crate::event::BattleEvent;
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Invokes the world's action policy for the scheduled actor.
///
/// When the policy declines (no viable skill, or no living opponent), the
/// stage emits a `NOOP` event and ends the step. The actor's threshold was
/// already consumed by scheduling, so a passed turn still costs the turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionStage;

impl Stage for DecisionStage {
    fn name(&self) -> &'static str {
        "decision"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Fatal
    }

    fn applicable(&self, ctx: &StepContext, _world: &BattleWorld<'_>) -> bool {
        ctx.actor_id.is_some() && ctx.skill_id.is_none()
    }

    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        let actor_id = ctx
            .actor_id
            .clone()
            .ok_or_else(|| StageError::new("decision stage ran without an actor"))?;
        let actor = world
            .roster
            .by_id(&actor_id)
            .ok_or_else(|| StageError::new(format!("unknown actor `{actor_id}`")))?;

        match world.policy.choose(actor, &world.roster, world.catalog) {
            Some(choice) => {
                ctx.log(format!(
                    "{actor_id} chose {} tier {} on {}",
                    choice.skill_id, choice.tier, choice.target_id
                ));
                ctx.skill_id = Some(choice.skill_id);
                ctx.tier = Some(choice.tier);
                ctx.target_id = Some(choice.target_id);
            }
            None => {
                ctx.log(format!("{actor_id} has no viable action"));
                ctx.push_event(BattleEvent::noop(actor_id, "no_viable_action"));
                ctx.abort();
            }
        }
        Ok(())
    }
}
