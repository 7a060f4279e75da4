//! Shared battle state handed to stages.
//!
//! [`BattleWorld`] bundles everything a stage may touch: the combatant
//! store, the random source, the scheduler, the action policy, the config,
//! and a shared reference to the immutable skill catalog. Stages receive
//! it mutably only for the duration of one `run` call and must not retain
//! anything from it.

use crate::catalog::{SkillCatalog, SkillId, SkillKind, SkillTier};
use crate::combatant::CombatantId;
use crate::config::EngineConfig;
use crate::rng::BattleRng;
use crate::roster::Roster;
use crate::scheduler::AtbScheduler;
use crate::selector::ActionPolicy;

/// Mutable battle state plus the immutable catalog reference.
pub struct BattleWorld<'a> {
    /// Combatant state store.
    pub roster: Roster,
    /// The battle's only random source.
    pub rng: BattleRng,
    /// Turn scheduler.
    pub scheduler: AtbScheduler,
    /// Decision policy.
    pub policy: Box<dyn ActionPolicy>,
    /// Engine configuration.
    pub config: EngineConfig,
    /// Immutable skill parameter lookup.
    pub catalog: &'a SkillCatalog,
}

impl<'a> BattleWorld<'a> {
    /// Bundles the battle state.
    #[must_use]
    pub fn new(
        roster: Roster,
        rng: BattleRng,
        scheduler: AtbScheduler,
        policy: Box<dyn ActionPolicy>,
        config: EngineConfig,
        catalog: &'a SkillCatalog,
    ) -> Self {
        Self {
            roster,
            rng,
            scheduler,
            policy,
            config,
            catalog,
        }
    }

    /// First equipped skill of the given kind on a combatant, with its
    /// tier parameters. Slot order decides when several are equipped.
    ///
    /// The returned parameter reference borrows the catalog, not the
    /// world, so callers may keep it while mutating the roster or rng.
    #[must_use]
    pub fn equipped_of_kind(
        &self,
        combatant_id: &CombatantId,
        kind: SkillKind,
    ) -> Option<(SkillId, u32, &'a SkillTier)> {
        let combatant = self.roster.by_id(combatant_id)?;
        combatant.equipped().iter().find_map(|equipped| {
            if self.catalog.kind(&equipped.skill_id) != Some(kind) {
                return None;
            }
            self.catalog
                .tier(&equipped.skill_id, equipped.tier)
                .map(|params| (equipped.skill_id.clone(), equipped.tier, params))
        })
    }
}

impl std::fmt::Debug for BattleWorld<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleWorld")
            .field("roster", &self.roster)
            .field("policy", &self.policy.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
