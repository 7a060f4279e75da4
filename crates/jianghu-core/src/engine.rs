//! Engine facade.
//!
//! [`Engine`] drives the resolution pipeline step by step, owns the
//! append-only event log, and answers the battle-over predicate. It is
//! the only type a host needs for an ordinary simulation:
//!
//! ```
//! use jianghu_core::catalog::{SkillCatalog, SkillEntry, SkillKind, SkillTier};
//! use jianghu_core::combatant::{Combatant, EquippedSkill, Stats};
//! use jianghu_core::config::EngineConfig;
//! use jianghu_core::engine::Engine;
//! use jianghu_core::roster::Roster;
//! use std::collections::BTreeMap;
//!
//! let mut catalog = SkillCatalog::new();
//! catalog.insert("basic_strike", SkillEntry {
//!     name: "基本击".to_string(),
//!     kind: SkillKind::Attack,
//!     tiers: BTreeMap::from([(1, SkillTier {
//!         tier_name: "初式".to_string(),
//!         base_damage: 20,
//!         power_multiplier: 1.0,
//!         hit_chance: 1.0,
//!         critical_chance: 0.0,
//!         qi_cost: 0,
//!         cooldown: 0,
//!         narrative_template: "strike".to_string(),
//!         partial_hit_chance: 0.0,
//!         partial_damage_scale: 1.0,
//!         damage_reduction: 0.0,
//!         block_chance: None,
//!     })]),
//! }).unwrap();
//!
//! let stats = Stats { hp: 10, max_hp: 10, qi: 0, max_qi: 0, strength: 5, agility: 10, defense: 0 };
//! let equipped = vec![EquippedSkill { skill_id: "basic_strike".into(), tier: 1 }];
//! let roster = Roster::new(vec![
//!     Combatant::new("a", "甲", "azure", stats, equipped.clone()).unwrap(),
//!     Combatant::new("b", "乙", "crimson", Stats { agility: 5, ..stats }, equipped).unwrap(),
//! ]).unwrap();
//!
//! let config = EngineConfig { rng_seed: 42, ..EngineConfig::default() };
//! let mut engine = Engine::from_config(roster, &catalog, config).unwrap();
//! let events = engine.run_to_completion();
//! assert!(engine.is_battle_over());
//! assert!(!events.is_empty());
//! ```
//!
//! `step()` never fails for ordinary gameplay. Abnormal outcomes become
//! `NOOP` events with a reason, or end the battle via
//! [`Engine::halted_reason`].

use crate::catalog::SkillCatalog;
use crate::combatant::Faction;
use crate::config::EngineConfig;
use crate::context::StepContext;
use crate::error::DataError;
use crate::event::{map_event_for_narration, BattleEvent, NarrationContext};
use crate::pipeline::Pipeline;
use crate::rng::BattleRng;
use crate::roster::{Roster, RosterSnapshot};
use crate::scheduler::AtbScheduler;
use crate::selector::{ActionPolicy, HeuristicPolicy};
use crate::stage::Stage;
use crate::world::BattleWorld;

/// Drives a battle to its end and records everything that happened.
pub struct Engine<'a> {
    world: BattleWorld<'a>,
    pipeline: Pipeline,
    events: Vec<BattleEvent>,
    step_index: u32,
    halted: Option<&'static str>,
}

impl<'a> Engine<'a> {
    /// Builds an engine from explicit collaborators and the standard
    /// pipeline.
    ///
    /// # Errors
    ///
    /// Returns a [`DataError`] when the config is invalid, fewer than two
    /// factions are present, or an equipped skill does not resolve in the
    /// catalog.
    pub fn new(
        roster: Roster,
        policy: Box<dyn ActionPolicy>,
        scheduler: AtbScheduler,
        rng: BattleRng,
        catalog: &'a SkillCatalog,
        config: EngineConfig,
    ) -> Result<Self, DataError> {
        Self::with_pipeline(
            roster,
            policy,
            scheduler,
            rng,
            catalog,
            config,
            Pipeline::standard(),
        )
    }

    /// Builds an engine with a custom pipeline.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::new`].
    #[allow(clippy::too_many_arguments)]
    pub fn with_pipeline(
        roster: Roster,
        policy: Box<dyn ActionPolicy>,
        scheduler: AtbScheduler,
        rng: BattleRng,
        catalog: &'a SkillCatalog,
        config: EngineConfig,
        pipeline: Pipeline,
    ) -> Result<Self, DataError> {
        Self::validate(&roster, catalog, &config)?;
        Ok(Self {
            world: BattleWorld::new(roster, rng, scheduler, policy, config, catalog),
            pipeline,
            events: Vec::new(),
            step_index: 0,
            halted: None,
        })
    }

    /// Builds an engine from a config record: seeded rng, scheduler from
    /// the threshold and tick scale, and the shipped heuristic policy.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::new`].
    pub fn from_config(
        roster: Roster,
        catalog: &'a SkillCatalog,
        config: EngineConfig,
    ) -> Result<Self, DataError> {
        let rng = BattleRng::new(config.rng_seed);
        let scheduler = AtbScheduler::new(config.atb_threshold, config.atb_tick_scale);
        Self::new(
            roster,
            Box::new(HeuristicPolicy::new()),
            scheduler,
            rng,
            catalog,
            config,
        )
    }

    fn validate(
        roster: &Roster,
        catalog: &SkillCatalog,
        config: &EngineConfig,
    ) -> Result<(), DataError> {
        config.validate()?;
        let factions = roster.factions();
        if factions.len() < 2 {
            return Err(DataError::TooFewFactions(factions.len()));
        }
        for combatant in roster.all() {
            for equipped in combatant.equipped() {
                if !catalog.contains(&equipped.skill_id, equipped.tier) {
                    return Err(DataError::UnknownSkillTier {
                        skill_id: equipped.skill_id.clone(),
                        tier: equipped.tier,
                    });
                }
            }
        }
        Ok(())
    }

    /// Executes one scheduling step and returns the events it produced.
    ///
    /// On a finished battle this is a no-op returning an empty slice, so
    /// callers may loop on it freely.
    pub fn step(&mut self) -> Vec<BattleEvent> {
        if self.is_battle_over() {
            return Vec::new();
        }

        let mut ctx = StepContext::new();
        self.pipeline.execute(&mut ctx, &mut self.world);

        if ctx.scheduler_stuck {
            tracing::debug!(step = self.step_index, "scheduler stuck, halting battle");
            self.halted = Some("stuck");
        }

        self.step_index += 1;
        tracing::debug!(
            step = self.step_index,
            events = ctx.events.len(),
            errored = ctx.errored,
            "step resolved"
        );

        self.events.extend(ctx.events.iter().cloned());
        ctx.events
    }

    /// Steps until the battle is over and returns the events generated by
    /// this call. Idempotent on a finished battle: the second call
    /// returns nothing.
    pub fn run_to_completion(&mut self) -> Vec<BattleEvent> {
        let mut produced = Vec::new();
        while !self.is_battle_over() {
            produced.extend(self.step());
        }
        produced
    }

    /// True when at most one faction has living members, the step safety
    /// bound was reached, or the scheduler reported no progress.
    #[must_use]
    pub fn is_battle_over(&self) -> bool {
        self.halted.is_some()
            || self.step_index >= self.world.config.max_steps
            || self.world.roster.factions_alive().len() <= 1
    }

    /// The winning faction, when exactly one still has living members.
    #[must_use]
    pub fn victor(&self) -> Option<Faction> {
        let alive = self.world.roster.factions_alive();
        if alive.len() == 1 {
            alive.into_iter().next()
        } else {
            None
        }
    }

    /// Why the engine stopped early, when it did (`"stuck"`).
    #[must_use]
    pub fn halted_reason(&self) -> Option<&'static str> {
        self.halted
    }

    /// The full event log, in emission order.
    #[must_use]
    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Number of steps executed so far.
    #[must_use]
    pub fn current_step_index(&self) -> u32 {
        self.step_index
    }

    /// Read access to the combatant store.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.world.roster
    }

    /// Digest of the mutable combatant state.
    #[must_use]
    pub fn snapshot(&self) -> RosterSnapshot {
        self.world.roster.snapshot()
    }

    /// Inserts a stage into the pipeline, at `position` when given.
    pub fn add_stage(&mut self, stage: Box<dyn Stage>, position: Option<usize>) {
        self.pipeline.add_stage(stage, position);
    }

    /// Removes a stage by name. Returns whether one was removed.
    pub fn remove_stage(&mut self, name: &str) -> bool {
        self.pipeline.remove_stage(name)
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }

    /// Maps an event to the plain record the narration layer consumes.
    ///
    /// Pure with respect to the engine: no state changes, no randomness,
    /// and equal inputs give equal records.
    #[must_use]
    pub fn map_event_for_narration(&self, event: &BattleEvent) -> NarrationContext {
        map_event_for_narration(event, &self.world.roster, self.world.catalog)
    }
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("step_index", &self.step_index)
            .field("events", &self.events.len())
            .field("halted", &self.halted)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SkillEntry, SkillKind, SkillTier};
    use crate::combatant::{Combatant, EquippedSkill, Stats};
    use std::collections::BTreeMap;

    fn strike_catalog() -> SkillCatalog {
        let mut catalog = SkillCatalog::new();
        catalog
            .insert(
                "basic_strike",
                SkillEntry {
                    name: "基本击".to_string(),
                    kind: SkillKind::Attack,
                    tiers: BTreeMap::from([(
                        1,
                        SkillTier {
                            tier_name: "初式".to_string(),
                            base_damage: 5,
                            power_multiplier: 1.0,
                            hit_chance: 1.0,
                            critical_chance: 0.0,
                            qi_cost: 0,
                            cooldown: 0,
                            narrative_template: "strike".to_string(),
                            partial_hit_chance: 0.0,
                            partial_damage_scale: 1.0,
                            damage_reduction: 0.0,
                            block_chance: None,
                        },
                    )]),
                },
            )
            .unwrap();
        catalog
    }

    fn fighter(id: &str, faction: &str, skills: &[(&str, u32)]) -> Combatant {
        Combatant::new(
            id,
            id.to_uppercase(),
            faction,
            Stats {
                hp: 30,
                max_hp: 30,
                qi: 10,
                max_qi: 10,
                strength: 5,
                agility: 10,
                defense: 2,
            },
            skills
                .iter()
                .map(|(skill_id, tier)| EquippedSkill {
                    skill_id: (*skill_id).into(),
                    tier: *tier,
                })
                .collect(),
        )
        .unwrap()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn single_faction_is_rejected() {
            let catalog = strike_catalog();
            let roster = Roster::new(vec![
                fighter("a", "azure", &[]),
                fighter("b", "azure", &[]),
            ])
            .unwrap();
            let err =
                Engine::from_config(roster, &catalog, EngineConfig::default()).unwrap_err();
            assert!(matches!(err, DataError::TooFewFactions(1)));
        }

        #[test]
        fn unresolvable_equipped_skill_is_rejected() {
            let catalog = strike_catalog();
            let roster = Roster::new(vec![
                fighter("a", "azure", &[("basic_strike", 9)]),
                fighter("b", "crimson", &[]),
            ])
            .unwrap();
            let err =
                Engine::from_config(roster, &catalog, EngineConfig::default()).unwrap_err();
            assert!(matches!(err, DataError::UnknownSkillTier { tier: 9, .. }));
        }

        #[test]
        fn invalid_config_is_rejected() {
            let catalog = strike_catalog();
            let roster = Roster::new(vec![
                fighter("a", "azure", &[]),
                fighter("b", "crimson", &[]),
            ])
            .unwrap();
            let config = EngineConfig {
                atb_threshold: 0,
                ..EngineConfig::default()
            };
            assert!(Engine::from_config(roster, &catalog, config).is_err());
        }
    }

    mod facade_tests {
        use super::*;

        fn duel_engine(catalog: &SkillCatalog) -> Engine<'_> {
            let roster = Roster::new(vec![
                fighter("a", "azure", &[("basic_strike", 1)]),
                fighter("b", "crimson", &[("basic_strike", 1)]),
            ])
            .unwrap();
            let config = EngineConfig {
                rng_seed: 42,
                ..EngineConfig::default()
            };
            Engine::from_config(roster, catalog, config).unwrap()
        }

        #[test]
        fn battle_runs_to_a_single_faction() {
            let catalog = strike_catalog();
            let mut engine = duel_engine(&catalog);
            let events = engine.run_to_completion();

            assert!(engine.is_battle_over());
            assert!(engine.victor().is_some());
            assert_eq!(events.len(), engine.events().len());
            assert!(engine.current_step_index() > 0);
        }

        #[test]
        fn step_after_the_end_is_a_no_op() {
            let catalog = strike_catalog();
            let mut engine = duel_engine(&catalog);
            engine.run_to_completion();

            let before = engine.events().len();
            assert!(engine.step().is_empty());
            assert!(engine.run_to_completion().is_empty());
            assert_eq!(engine.events().len(), before);
        }

        #[test]
        fn stuck_scheduler_halts_with_reason() {
            let catalog = strike_catalog();
            let mut slow = fighter("a", "azure", &[]);
            let mut slower = fighter("b", "crimson", &[]);
            // Zero agility on both sides: nobody ever becomes ready.
            slow.stats_mut().agility = 0;
            slower.stats_mut().agility = 0;
            let roster = Roster::new(vec![slow, slower]).unwrap();
            let mut engine =
                Engine::from_config(roster, &catalog, EngineConfig::default()).unwrap();

            let events = engine.step();
            assert!(events.is_empty());
            assert!(engine.is_battle_over());
            assert_eq!(engine.halted_reason(), Some("stuck"));
            assert!(engine.victor().is_none());
        }

        #[test]
        fn max_steps_bounds_the_battle() {
            // Both fighters always miss, so nobody ever falls.
            let mut catalog = SkillCatalog::new();
            catalog
                .insert(
                    "flail",
                    SkillEntry {
                        name: "乱打".to_string(),
                        kind: SkillKind::Attack,
                        tiers: BTreeMap::from([(
                            1,
                            SkillTier {
                                tier_name: "初式".to_string(),
                                base_damage: 5,
                                power_multiplier: 1.0,
                                hit_chance: 0.0,
                                critical_chance: 0.0,
                                qi_cost: 0,
                                cooldown: 0,
                                narrative_template: "t".to_string(),
                                partial_hit_chance: 0.0,
                                partial_damage_scale: 1.0,
                                damage_reduction: 0.0,
                                block_chance: None,
                            },
                        )]),
                    },
                )
                .unwrap();
            let roster = Roster::new(vec![
                fighter("a", "azure", &[("flail", 1)]),
                fighter("b", "crimson", &[("flail", 1)]),
            ])
            .unwrap();
            let config = EngineConfig {
                max_steps: 25,
                ..EngineConfig::default()
            };
            let mut engine = Engine::from_config(roster, &catalog, config).unwrap();
            engine.run_to_completion();

            assert_eq!(engine.current_step_index(), 25);
            assert!(engine.is_battle_over());
            assert!(engine.victor().is_none());
        }

        #[test]
        fn pipeline_mutation_through_the_facade() {
            let catalog = strike_catalog();
            let mut engine = duel_engine(&catalog);
            assert_eq!(engine.stage_names().len(), 8);
            assert!(engine.remove_stage("defense"));
            assert_eq!(engine.stage_names().len(), 7);
        }
    }
}
