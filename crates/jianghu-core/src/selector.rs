//! Heuristic action selection.
//!
//! Given the scheduled actor, a policy picks `(skill, tier, target)` or
//! declines to act. Policies are a trait seam so hosts can swap in their
//! own decision logic; the engine ships [`HeuristicPolicy`], an expected
//! damage maximizer.
//!
//! Policies take no random source. Selection must be a pure function of
//! the actor, roster, and catalog, otherwise replays diverge.

use crate::catalog::{SkillCatalog, SkillId, SkillKind};
use crate::combatant::{Combatant, CombatantId};
use crate::roster::Roster;

/// A fully specified action: which skill, at which tier, against whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionChoice {
    /// Skill to use.
    pub skill_id: SkillId,
    /// Tier to use it at.
    pub tier: u32,
    /// Combatant to strike.
    pub target_id: CombatantId,
}

/// Decision seam between the scheduler and the resolution stages.
pub trait ActionPolicy {
    /// Chooses an action for `actor`, or `None` to pass the turn.
    ///
    /// Implementations must be deterministic and must not consume
    /// randomness.
    fn choose(
        &self,
        actor: &Combatant,
        roster: &Roster,
        catalog: &SkillCatalog,
    ) -> Option<ActionChoice>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Expected-damage heuristic.
///
/// Scores every viable attack tier as
/// `base_damage * power_multiplier * hit_chance * (1 + critical_chance) / (cooldown + 1)`
/// and picks the highest. A tier is viable when the actor can pay its qi
/// cost and the skill is off cooldown. Targeting prefers the living
/// opposing combatant with the lowest current hp.
///
/// Every tie is broken without randomness: equal scores prefer the
/// lexicographically lower skill id, then the lower tier; equal target hp
/// prefers the lower combatant id.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    /// Creates the heuristic policy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn score(base_damage: u32, power_multiplier: f64, hit: f64, crit: f64, cooldown: u32) -> f64 {
        f64::from(base_damage) * power_multiplier * hit * (1.0 + crit) / f64::from(cooldown + 1)
    }

    fn pick_target<'r>(actor: &Combatant, roster: &'r Roster) -> Option<&'r Combatant> {
        roster
            .living()
            .filter(|c| c.faction() != actor.faction())
            .min_by(|a, b| {
                a.stats()
                    .hp
                    .cmp(&b.stats().hp)
                    .then_with(|| a.id().cmp(b.id()))
            })
    }
}

impl ActionPolicy for HeuristicPolicy {
    // Exact score equality is the documented tie condition.
    #[allow(clippy::float_cmp)]
    fn choose(
        &self,
        actor: &Combatant,
        roster: &Roster,
        catalog: &SkillCatalog,
    ) -> Option<ActionChoice> {
        let target = Self::pick_target(actor, roster)?;

        let mut best: Option<(f64, &SkillId, u32)> = None;
        for equipped in actor.equipped() {
            if catalog.kind(&equipped.skill_id) != Some(SkillKind::Attack) {
                continue;
            }
            let Some(params) = catalog.tier(&equipped.skill_id, equipped.tier) else {
                continue;
            };
            if actor.stats().qi < params.qi_cost || actor.cooldown(&equipped.skill_id) > 0 {
                continue;
            }

            let score = Self::score(
                params.base_damage,
                params.power_multiplier,
                params.hit_chance,
                params.critical_chance,
                params.cooldown,
            );
            let candidate = (score, &equipped.skill_id, equipped.tier);
            let better = match best {
                None => true,
                Some((best_score, best_id, best_tier)) => {
                    score > best_score
                        || (score == best_score
                            && (equipped.skill_id.as_str(), equipped.tier)
                                < (best_id.as_str(), best_tier))
                }
            };
            if better {
                best = Some(candidate);
            }
        }

        let (score, skill_id, tier) = best?;
        tracing::debug!(
            actor = %actor.id(),
            skill = %skill_id,
            tier,
            score,
            target = %target.id(),
            "heuristic selected action"
        );
        Some(ActionChoice {
            skill_id: skill_id.clone(),
            tier,
            target_id: target.id().clone(),
        })
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
