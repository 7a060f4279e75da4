//! State application stage.

use crate::context::StepContext;
use crate::error::StageError;
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Commits the computed results to the combatant store.
///
/// The actor pays the skill's qi cost and starts its cooldown whether or
/// not the attack connected; the technique was spent either way. Damage
/// lands only on a hit. A target dropping to zero hit points queues a
/// defeat marker for the emission stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyStage;

impl Stage for ApplyStage {
    fn name(&self) -> &'static str {
        "state_apply"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Fatal
    }

    fn applicable(&self, ctx: &StepContext, _world: &BattleWorld<'_>) -> bool {
        ctx.action_chosen() && ctx.hit.is_some()
    }

    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        let actor_id = ctx
            .actor_id
            .clone()
            .ok_or_else(|| StageError::new("apply stage ran without an actor"))?;
        let target_id = ctx
            .target_id
            .clone()
            .ok_or_else(|| StageError::new("apply stage ran without a target"))?;
        let (skill_id, tier) = match (&ctx.skill_id, ctx.tier) {
            (Some(skill_id), Some(tier)) => (skill_id.clone(), tier),
            _ => return Err(StageError::new("apply stage ran without a skill")),
        };
        let params = world
            .catalog
            .tier(&skill_id, tier)
            .ok_or_else(|| StageError::new(format!("unknown skill `{skill_id}` tier {tier}")))?;

        world.roster.spend_qi(&actor_id, params.qi_cost)?;
        world
            .roster
            .set_cooldown(&actor_id, skill_id.clone(), params.cooldown)?;

        if ctx.hit == Some(true) {
            let damage = ctx.final_damage.unwrap_or(0);
            world.roster.apply_damage(&target_id, damage)?;
            let target_hp = world
                .roster
                .by_id(&target_id)
                .map(|target| target.stats().hp)
                .unwrap_or(0);
            ctx.log(format!("{target_id} took {damage}, hp now {target_hp}"));
            if target_hp == 0 {
                ctx.defeat_pending = Some(target_id);
            }
        } else {
            ctx.log(format!("{actor_id} spent the technique on air"));
        }
        Ok(())
    }
}
