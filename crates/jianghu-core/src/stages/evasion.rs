//! Evasion stage: the target's footwork answers the attack.

use crate::catalog::SkillKind;
use crate::context::StepContext;
use crate::error::StageError;
use crate::event::{BattleEvent, DamageBucket, EventKind};
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Rolls the target's movement skill against the incoming attack.
///
/// The movement tier's `hit_chance` is the probability the attack still
/// connects at all. A failed roll is a full evasion: the step records a
/// miss, emits a `DODGE`, and ends. A surviving attack may still be
/// reduced to a graze when the tier defines `partial_hit_chance`; the
/// graze multiplier is carried in the context for the damage stage.
///
/// Consumes one random value for the evasion roll, plus one more only
/// when a partial-hit parameter exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvasionStage;

impl Stage for EvasionStage {
    fn name(&self) -> &'static str {
        "evasion"
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
                .equipped_of_kind(target_id, SkillKind::Movement)
                .is_some()
    }

    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        let target_id = ctx
            .target_id
            .clone()
            .ok_or_else(|| StageError::new("evasion stage ran without a target"))?;
        let actor_id = ctx
            .actor_id
            .clone()
            .ok_or_else(|| StageError::new("evasion stage ran without an actor"))?;
        let (skill_id, tier, params) = world
            .equipped_of_kind(&target_id, SkillKind::Movement)
            .ok_or_else(|| StageError::new(format!("{target_id} lost its movement skill")))?;

        let connects = world.rng.gen_bool(params.hit_chance);
        if !connects {
            ctx.log(format!("{target_id} evaded with {skill_id}"));
            ctx.hit = Some(false);
            ctx.push_event(BattleEvent {
                kind: EventKind::Dodge,
                actor_id: target_id,
                target_id: Some(actor_id),
                skill_id: Some(skill_id),
                tier: Some(tier),
                hit: false,
                critical: false,
                damage: 0,
                damage_bucket: DamageBucket::None,
                reason: None,
            });
            ctx.abort();
            return Ok(());
        }

        if params.partial_hit_chance > 0.0 && world.rng.gen_bool(params.partial_hit_chance) {
            ctx.log(format!(
                "{target_id} turned the blow into a graze (x{})",
                params.partial_damage_scale
            ));
            ctx.evasion_scale = params.partial_damage_scale;
            ctx.push_event(BattleEvent {
                kind: EventKind::Dodge,
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
        }
        Ok(())
    }
}
