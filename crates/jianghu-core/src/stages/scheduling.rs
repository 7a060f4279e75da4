//! Scheduling stage: picks the next actor.

use crate::context::StepContext;
use crate::error::StageError;
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Advances the ATB clock until an actor is ready, records it in the
/// context, and ticks the actor's cooldowns down by one.
///
/// Cooldowns decrement here rather than in the apply stage so a skill
/// with cooldown `n` is unavailable for exactly `n` of its owner's turns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulingStage;

impl Stage for SchedulingStage {
    fn name(&self) -> &'static str {
        "scheduling"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Fatal
    }

    fn applicable(&self, ctx: &StepContext, _world: &BattleWorld<'_>) -> bool {
        ctx.actor_id.is_none()
    }

    fn run(&self, ctx: &mut StepContext, world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        let actor_id = match world.scheduler.select_next(&mut world.roster) {
            Ok(actor_id) => actor_id,
            Err(error) => {
                ctx.scheduler_stuck = true;
                return Err(error.into());
            }
        };

        world.roster.decrement_cooldowns(&actor_id)?;
        ctx.log(format!("scheduled {actor_id}"));
        ctx.actor_id = Some(actor_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::fixtures::{catalog_with, fighter, world_with};

    #[test]
    fn selects_actor_and_decrements_its_cooldowns() {
        let catalog = catalog_with(vec![]);
        let mut world = world_with(
            &catalog,
            vec![
                fighter("a", "azure", 50, 10, 10, &[]),
                fighter("b", "crimson", 50, 10, 5, &[]),
            ],
            1,
        );
        world
            .roster
            .set_cooldown(&"a".into(), "palm".into(), 2)
            .unwrap();

        let mut ctx = StepContext::new();
        SchedulingStage.run(&mut ctx, &mut world).unwrap();

        assert_eq!(ctx.actor_id, Some("a".into()));
        assert_eq!(
            world.roster.by_id(&"a".into()).unwrap().cooldown(&"palm".into()),
            1
        );
        // The loser of the race keeps its cooldowns.
        assert!(!ctx.scheduler_stuck);
    }

    #[test]
    fn stuck_scheduler_flags_the_context() {
        let catalog = catalog_with(vec![]);
        let mut world = world_with(
            &catalog,
            vec![
                fighter("a", "azure", 50, 10, 0, &[]),
                fighter("b", "crimson", 50, 10, 0, &[]),
            ],
            1,
        );

        let mut ctx = StepContext::new();
        let err = SchedulingStage.run(&mut ctx, &mut world).unwrap_err();
        assert!(ctx.scheduler_stuck);
        assert!(err.message.contains("accumulation ticks"));
    }

    #[test]
    fn not_applicable_once_actor_is_set() {
        let catalog = catalog_with(vec![]);
        let world = world_with(&catalog, vec![fighter("a", "azure", 50, 10, 10, &[])], 1);

        let mut ctx = StepContext::new();
        assert!(SchedulingStage.applicable(&ctx, &world));
        ctx.actor_id = Some("a".into());
        assert!(!SchedulingStage.applicable(&ctx, &world));
    }
}
