//! Shared builders for the crate-level test suites.

use std::collections::BTreeMap;

use crate::catalog::{SkillCatalog, SkillEntry, SkillKind, SkillTier};
use crate::combatant::{Combatant, EquippedSkill, Stats};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::roster::Roster;

/// An attack tier with the given numbers and neutral extras.
pub fn attack_tier(
    base_damage: u32,
    hit_chance: f64,
    critical_chance: f64,
    qi_cost: u32,
    cooldown: u32,
) -> SkillTier {
    SkillTier {
        tier_name: "初式".to_string(),
        base_damage,
        power_multiplier: 1.0,
        hit_chance,
        critical_chance,
        qi_cost,
        cooldown,
        narrative_template: "strike".to_string(),
        partial_hit_chance: 0.0,
        partial_damage_scale: 1.0,
        damage_reduction: 0.0,
        block_chance: None,
    }
}

/// A movement tier: `hit_chance` is the probability the incoming attack
/// still connects.
pub fn movement_tier(hit_chance: f64, partial_hit_chance: f64, partial_scale: f64) -> SkillTier {
    SkillTier {
        tier_name: "身法".to_string(),
        base_damage: 0,
        power_multiplier: 0.0,
        hit_chance,
        critical_chance: 0.0,
        qi_cost: 0,
        cooldown: 0,
        narrative_template: "dodge".to_string(),
        partial_hit_chance,
        partial_damage_scale: partial_scale,
        damage_reduction: 0.0,
        block_chance: None,
    }
}

/// A defense tier absorbing `damage_reduction` of incoming damage.
pub fn defense_tier(damage_reduction: f64, block_chance: Option<f64>) -> SkillTier {
    SkillTier {
        tier_name: "守势".to_string(),
        base_damage: 0,
        power_multiplier: 0.0,
        hit_chance: 0.0,
        critical_chance: 0.0,
        qi_cost: 0,
        cooldown: 0,
        narrative_template: "guard".to_string(),
        partial_hit_chance: 0.0,
        partial_damage_scale: 1.0,
        damage_reduction,
        block_chance,
    }
}

/// A catalog from `(id, kind, tier 1 params)` triples.
pub fn catalog(skills: Vec<(&str, SkillKind, SkillTier)>) -> SkillCatalog {
    let mut catalog = SkillCatalog::new();
    for (id, kind, params) in skills {
        catalog
            .insert(
                id,
                SkillEntry {
                    name: id.to_string(),
                    kind,
                    tiers: BTreeMap::from([(1, params)]),
                },
            )
            .unwrap();
    }
    catalog
}

/// A fighter with tier 1 of each listed skill.
pub fn fighter(
    id: &str,
    faction: &str,
    hp: u32,
    qi: u32,
    agility: u32,
    skills: &[&str],
) -> Combatant {
    Combatant::new(
        id,
        id.to_uppercase(),
        faction,
        Stats {
            hp,
            max_hp: hp.max(1),
            qi,
            max_qi: qi.max(1),
            strength: 10,
            agility,
            defense: 5,
        },
        skills
            .iter()
            .map(|skill_id| EquippedSkill {
                skill_id: (*skill_id).into(),
                tier: 1,
            })
            .collect(),
    )
    .unwrap()
}

/// An engine over the given fighters with seed 42 and default knobs.
pub fn engine_with<'a>(
    catalog: &'a SkillCatalog,
    combatants: Vec<Combatant>,
    seed: u64,
) -> Engine<'a> {
    let roster = Roster::new(combatants).unwrap();
    let config = EngineConfig {
        rng_seed: seed,
        ..EngineConfig::default()
    };
    Engine::from_config(roster, catalog, config).unwrap()
}
