//! Resource check stage: re-verifies qi and cooldown.

use crate::context::StepContext;
use crate::error::StageError;
use crate::event::BattleEvent;
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Verifies the chosen skill is still affordable and off cooldown.
///
/// The shipped heuristic only proposes viable actions, so for it this
/// stage is a no-op guard. Custom policies get their contract enforced
/// here instead of deep in the damage math: a violation downgrades the
/// step to a `NOOP` with reason `resource` rather than corrupting state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceStage;

impl Stage for ResourceStage {
    fn name(&self) -> &'static str {
        "resource_check"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Fatal
    }

    fn applicable(&self, ctx: &StepContext, _world: &BattleWorld<'_>) -> bool {
        ctx.action_chosen()
    }

    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        let actor_id = ctx
            .actor_id
            .clone()
            .ok_or_else(|| StageError::new("resource check ran without an actor"))?;
        let (skill_id, tier) = match (&ctx.skill_id, ctx.tier) {
            (Some(skill_id), Some(tier)) => (skill_id.clone(), tier),
            _ => return Err(StageError::new("resource check ran without a skill")),
        };
        let params = world
            .catalog
            .tier(&skill_id, tier)
            .ok_or_else(|| StageError::new(format!("unknown skill `{skill_id}` tier {tier}")))?;
        let actor = world
            .roster
            .by_id(&actor_id)
            .ok_or_else(|| StageError::new(format!("unknown actor `{actor_id}`")))?;

        let qi_ok = actor.stats().qi >= params.qi_cost;
        let cooldown_ok = actor.cooldown(&skill_id) == 0;
        if qi_ok && cooldown_ok {
            ctx.log(format!(
                "resources ok: qi_cost={}, cooldown={}",
                params.qi_cost, params.cooldown
            ));
            return Ok(());
        }

        ctx.log(format!(
            "resource check failed for {actor_id}: qi_ok={qi_ok}, cooldown_ok={cooldown_ok}"
        ));
        ctx.push_event(BattleEvent::noop(actor_id, "resource"));
        ctx.abort();
        Ok(())
    }
}
