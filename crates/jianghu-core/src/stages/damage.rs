//! Damage calculation stage.

use crate::context::StepContext;
use crate::error::StageError;
use crate::event::DamageBucket;
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Rolls the hit and critical dice and computes the final damage.
///
/// On a hit the base is `round(base_damage * power_multiplier)`, scaled by
/// the guard coefficient recorded by the defense stage, then by the graze
/// multiplier from the evasion stage, then by the configured critical
/// multiplier when the critical roll succeeds. The result is rounded to
/// an integer and classified against the target's maximum hit points.
///
/// Consumes one random value for the hit roll, plus one for the critical
/// roll only when the attack hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DamageStage;

impl Stage for DamageStage {
    fn name(&self) -> &'static str {
        "damage_calc"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Fatal
    }

    fn applicable(&self, ctx: &StepContext, _world: &BattleWorld<'_>) -> bool {
        ctx.action_chosen() && ctx.hit.is_none()
    }

    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        let (skill_id, tier) = match (&ctx.skill_id, ctx.tier) {
            (Some(skill_id), Some(tier)) => (skill_id.clone(), tier),
            _ => return Err(StageError::new("damage stage ran without a skill")),
        };
        let target_id = ctx
            .target_id
            .clone()
            .ok_or_else(|| StageError::new("damage stage ran without a target"))?;
        let params = world
            .catalog
            .tier(&skill_id, tier)
            .ok_or_else(|| StageError::new(format!("unknown skill `{skill_id}` tier {tier}")))?;
        let target_max_hp = world
            .roster
            .by_id(&target_id)
            .ok_or_else(|| StageError::new(format!("unknown target `{target_id}`")))?
            .stats()
            .max_hp;

        if !world.rng.gen_bool(params.hit_chance) {
            ctx.log(format!("{skill_id} missed"));
            ctx.hit = Some(false);
            ctx.critical = Some(false);
            ctx.final_damage = Some(0);
            ctx.damage_bucket = Some(DamageBucket::None);
            return Ok(());
        }

        let base = (f64::from(params.base_damage) * params.power_multiplier).round();
        let mut damage = base * ctx.defense_scale * ctx.evasion_scale;

        let critical = world.rng.gen_bool(params.critical_chance);
        if critical {
            damage *= world.config.crit_multiplier;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let final_damage = damage.round().max(0.0) as u32;
        let bucket = DamageBucket::classify(final_damage, target_max_hp);

        ctx.log(format!(
            "{skill_id} dealt {final_damage} ({bucket:?}, critical={critical})"
        ));
        ctx.hit = Some(true);
        ctx.critical = Some(critical);
        ctx.final_damage = Some(final_damage);
        ctx.damage_bucket = Some(bucket);
        Ok(())
    }
}
