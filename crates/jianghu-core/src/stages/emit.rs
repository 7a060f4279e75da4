//! Event emission stage.

use crate::context::StepContext;
use crate::error::StageError;
use crate::event::{BattleEvent, DamageBucket, EventKind};
use crate::stage::{Criticality, Stage};
use crate::world::BattleWorld;

/// Produces the step's primary event.
///
/// This is the one stage that runs even after an abort, so every step
/// closes with a coherent record. A cleanly resolved attack becomes an
/// `ATTACK` event (plus a `DEFEAT` when the target fell); an errored step
/// becomes a `NOOP` with reason `error`. Steps that already emitted their
/// outcome earlier (a full evasion, a declined turn) add nothing here.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitStage;

impl Stage for EmitStage {
    fn name(&self) -> &'static str {
        "event_emit"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Recoverable
    }

    fn applicable(&self, _ctx: &StepContext, _world: &BattleWorld<'_>) -> bool {
        true
    }

    fn always_runs(&self) -> bool {
        true
    }

    fn run(&self, ctx: &mut StepContext, _world: &mut BattleWorld<'_>) -> Result<(), StageError> {
        if ctx.errored {
            if let Some(actor_id) = ctx.actor_id.clone() {
                ctx.push_event(BattleEvent::noop(actor_id, "error"));
            }
            return Ok(());
        }

        let (Some(actor_id), Some(target_id), Some(skill_id), Some(tier), Some(hit)) = (
            ctx.actor_id.clone(),
            ctx.target_id.clone(),
            ctx.skill_id.clone(),
            ctx.tier,
            ctx.hit,
        ) else {
            // The step's outcome (NOOP, full evasion) was already emitted.
            return Ok(());
        };
        if ctx.final_damage.is_none() {
            // A full evasion set `hit` without running the damage math.
            return Ok(());
        }

        ctx.push_event(BattleEvent {
            kind: EventKind::Attack,
            actor_id: actor_id.clone(),
            target_id: Some(target_id),
            skill_id: Some(skill_id),
            tier: Some(tier),
            hit,
            critical: ctx.critical.unwrap_or(false),
            damage: ctx.final_damage.unwrap_or(0),
            damage_bucket: ctx.damage_bucket.unwrap_or(DamageBucket::None),
            reason: None,
        });

        if let Some(defeated) = ctx.defeat_pending.clone() {
            ctx.push_event(BattleEvent {
                kind: EventKind::Defeat,
                actor_id,
                target_id: Some(defeated),
                skill_id: None,
                tier: None,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::fixtures::{catalog_with, fighter, world_with};

    fn world<'a>(catalog: &'a crate::catalog::SkillCatalog) -> crate::world::BattleWorld<'a> {
        world_with(
            catalog,
            vec![
                fighter("a", "azure", 50, 10, 10, &[]),
                fighter("b", "crimson", 50, 10, 5, &[]),
            ],
            1,
        )
    }

    fn resolved_ctx() -> StepContext {
        let mut ctx = StepContext::new();
        ctx.actor_id = Some("a".into());
        ctx.target_id = Some("b".into());
        ctx.skill_id = Some("palm".into());
        ctx.tier = Some(1);
        ctx.hit = Some(true);
        ctx.critical = Some(true);
        ctx.final_damage = Some(21);
        ctx.damage_bucket = Some(DamageBucket::High);
        ctx
    }

    #[test]
    fn resolved_attack_becomes_attack_event() {
        let catalog = catalog_with(vec![]);
        let mut world = world(&catalog);
        let mut ctx = resolved_ctx();
        EmitStage.run(&mut ctx, &mut world).unwrap();

        assert_eq!(ctx.events.len(), 1);
        let attack = &ctx.events[0];
        assert_eq!(attack.kind, EventKind::Attack);
        assert!(attack.hit);
        assert!(attack.critical);
        assert_eq!(attack.damage, 21);
        assert_eq!(attack.damage_bucket, DamageBucket::High);
    }

    #[test]
    fn queued_defeat_follows_the_attack() {
        let catalog = catalog_with(vec![]);
        let mut world = world(&catalog);
        let mut ctx = resolved_ctx();
        ctx.defeat_pending = Some("b".into());
        EmitStage.run(&mut ctx, &mut world).unwrap();

        assert_eq!(ctx.events.len(), 2);
        assert_eq!(ctx.events[0].kind, EventKind::Attack);
        let defeat = &ctx.events[1];
        assert_eq!(defeat.kind, EventKind::Defeat);
        assert_eq!(defeat.target_id.as_ref().unwrap().as_str(), "b");
        assert_eq!(defeat.actor_id.as_str(), "a");
    }

    #[test]
    fn errored_step_becomes_noop() {
        let catalog = catalog_with(vec![]);
        let mut world = world(&catalog);
        let mut ctx = resolved_ctx();
        ctx.errored = true;
        EmitStage.run(&mut ctx, &mut world).unwrap();

        assert_eq!(ctx.events.len(), 1);
        assert_eq!(ctx.events[0].kind, EventKind::Noop);
        assert_eq!(ctx.events[0].reason.as_deref(), Some("error"));
    }

    #[test]
    fn errored_step_without_actor_emits_nothing() {
        let catalog = catalog_with(vec![]);
        let mut world = world(&catalog);
        let mut ctx = StepContext::new();
        ctx.errored = true;
        ctx.scheduler_stuck = true;
        EmitStage.run(&mut ctx, &mut world).unwrap();
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn full_evasion_adds_no_attack_event() {
        let catalog = catalog_with(vec![]);
        let mut world = world(&catalog);
        let mut ctx = resolved_ctx();
        // A full evasion decides the hit without damage math.
        ctx.hit = Some(false);
        ctx.critical = None;
        ctx.final_damage = None;
        ctx.damage_bucket = None;
        EmitStage.run(&mut ctx, &mut world).unwrap();
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn always_runs_is_set() {
        assert!(EmitStage.always_runs());
    }
}
