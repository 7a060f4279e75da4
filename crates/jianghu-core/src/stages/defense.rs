//! Defense stage: the target's guard answers the attack.

use crate::catalog::SkillKind;
use crate::context::StepContext;
use crate::error::StageError;
use crate::event::{BattleEvent, DamageBucket, EventKind};
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Records a damage-reduction coefficient from the target's defense skill.
///
/// Applicable when the target has a defense skill whose tier actually
/// absorbs something. A tier with a `block_chance` engages
/// probabilistically and consumes one random value per attack; without
/// the parameter the guard always engages and consumes nothing. An
/// engaged guard emits a `DEFEND` event and stores its multiplier in the
/// context for the damage stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefenseStage;

impl Stage for DefenseStage {
    fn name(&self) -> &'static str {
        "defense"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Recoverable
    }

    fn applicable(&self, ctx: &StepContext, world: &BattleWorld<'_>) -> bool {
        let Some(target_id) = &ctx.target_id else {
            return false;
        };
        ctx.action_chosen()
            && world
                .equipped_of_kind(target_id, SkillKind::Defense)
                .is_some_and(|(_, _, params)| params.damage_reduction > 0.0)
    }

    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        let target_id = ctx
            .target_id
            .clone()
            .ok_or_else(|| StageError::new("defense stage ran without a target"))?;
        let actor_id = ctx
            .actor_id
            .clone()
            .ok_or_else(|| StageError::new("defense stage ran without an actor"))?;
        let (skill_id, tier, params) = world
            .equipped_of_kind(&target_id, SkillKind::Defense)
            .ok_or_else(|| StageError::new(format!("{target_id} lost its defense skill")))?;

        if let Some(block_chance) = params.block_chance {
            if !world.rng.gen_bool(block_chance) {
                ctx.log(format!("{target_id} failed to raise {skill_id}"));
                return Ok(());
            }
        }

        ctx.log(format!(
            "{target_id} guards with {skill_id} ({} absorbed)",
            params.damage_reduction
        ));
        ctx.defense_scale = 1.0 - params.damage_reduction;
        ctx.push_event(BattleEvent {
            kind: EventKind::Defend,
            actor_id: target_id,
            target_id: Some(actor_id),
            skill_id: Some(skill_id),
            tier: Some(tier),
            hit: true,
            critical: false,
            damage: 0,
            damage_bucket: DamageBucket::None,
            reason: None,
        });
        Ok(())
    }
}
