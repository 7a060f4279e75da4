//! Battle events and the narration mapping.
//!
//! Events are the engine's only durable output: an append-only, fully
//! ordered record of everything that happened. The serialized form is a
//! stable wire schema; field names and tag spellings here must not change
//! without versioning the consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{SkillCatalog, SkillId};
use crate::combatant::CombatantId;
use crate::roster::Roster;

/// What kind of thing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// An offensive technique was resolved (hit or miss).
    Attack,
    /// The target's footwork let the attack pass or graze.
    Dodge,
    /// The target's guard engaged and will absorb damage.
    Defend,
    /// A combatant fell to zero hit points.
    Defeat,
    /// The turn passed without an action; `reason` says why.
    Noop,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "ATTACK"),
            Self::Dodge => write!(f, "DODGE"),
            Self::Defend => write!(f, "DEFEND"),
            Self::Defeat => write!(f, "DEFEAT"),
            Self::Noop => write!(f, "NOOP"),
        }
    }
}

/// Damage coarsely classified against the target's maximum hit points.
///
/// `High` is at least 30% of max hp, `Medium` at least 10%, anything
/// positive below that is `Low`, and zero damage is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageBucket {
    /// No damage was dealt.
    None,
    /// Below 10% of the target's max hp.
    Low,
    /// At least 10% of the target's max hp.
    Medium,
    /// At least 30% of the target's max hp.
    High,
}

impl DamageBucket {
    /// Classifies a damage amount against a max hp ceiling.
    #[must_use]
    pub fn classify(damage: u32, max_hp: u32) -> Self {
        if damage == 0 {
            return Self::None;
        }
        if max_hp == 0 {
            return Self::Low;
        }
        let ratio = f64::from(damage) / f64::from(max_hp);
        if ratio >= 0.30 {
            Self::High
        } else if ratio >= 0.10 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One entry of the battle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    /// Event kind tag.
    pub kind: EventKind,
    /// Combatant that performed the recorded action. For `DODGE` and
    /// `DEFEND` this is the reacting target, not the attacker.
    pub actor_id: CombatantId,
    /// Other party of the exchange, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<CombatantId>,
    /// Skill involved, when one was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<SkillId>,
    /// Tier of the involved skill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    /// Whether the technique connected.
    pub hit: bool,
    /// Whether the strike was critical.
    pub critical: bool,
    /// Final damage dealt.
    pub damage: u32,
    /// Coarse damage classification.
    pub damage_bucket: DamageBucket,
    /// Why a `NOOP` happened, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BattleEvent {
    /// A no-action event with a reason.
    #[must_use]
    pub fn noop(actor_id: CombatantId, reason: &str) -> Self {
        Self {
            kind: EventKind::Noop,
            actor_id,
            target_id: None,
            skill_id: None,
            tier: None,
            hit: false,
            critical: false,
            damage: 0,
            damage_bucket: DamageBucket::None,
            reason: Some(reason.to_string()),
        }
    }
}

/// Plain record the narration layer consumes.
///
/// Produced by [`map_event_for_narration`]; contains display names and the
/// tier's template key so the narrator never needs the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationContext {
    /// Narrative category label: 攻击, 闪避, 抵挡, or 暴击 for criticals.
    pub narrative_type: String,
    /// Display name of the acting combatant.
    pub actor_name: String,
    /// Display name of the other party, when there is one.
    pub target_name: Option<String>,
    /// Display name of the involved skill.
    pub skill_name: Option<String>,
    /// Display name of the involved tier.
    pub tier_name: Option<String>,
    /// Whether the technique connected.
    pub hit: bool,
    /// Whether the strike was critical.
    pub critical: bool,
    /// Final damage dealt.
    pub damage_amount: u32,
    /// Coarse damage classification.
    pub damage_bucket: DamageBucket,
    /// Template key from the tier's data record.
    pub tier_narrative_template: Option<String>,
}

/// Maps an event to its narration context.
///
/// A pure function of the event, roster names, and catalog: calling it
/// twice on the same inputs yields equal records, and it consumes no
/// randomness. Ids that no longer resolve (which cannot happen for events
/// the engine produced) fall back to the raw id string.
#[must_use]
pub fn map_event_for_narration(
    event: &BattleEvent,
    roster: &Roster,
    catalog: &SkillCatalog,
) -> NarrationContext {
    let display_name = |id: &CombatantId| {
        roster
            .by_id(id)
            .map_or_else(|| id.as_str().to_string(), |c| c.display_name().to_string())
    };

    let narrative_type = if event.critical {
        "暴击"
    } else {
        match event.kind {
            EventKind::Attack | EventKind::Defeat => "攻击",
            EventKind::Dodge => "闪避",
            EventKind::Defend | EventKind::Noop => "抵挡",
        }
    };

    let skill_name = event
        .skill_id
        .as_ref()
        .map(|id| {
            catalog
                .skill_name(id)
                .map_or_else(|| id.as_str().to_string(), str::to_string)
        });
    let tier_params = event
        .skill_id
        .as_ref()
        .zip(event.tier)
        .and_then(|(id, tier)| catalog.tier(id, tier));

    NarrationContext {
        narrative_type: narrative_type.to_string(),
        actor_name: display_name(&event.actor_id),
        target_name: event.target_id.as_ref().map(display_name),
        skill_name,
        tier_name: tier_params.map(|p| p.tier_name.clone()),
        hit: event.hit,
        critical: event.critical,
        damage_amount: event.damage,
        damage_bucket: event.damage_bucket,
        tier_narrative_template: tier_params.map(|p| p.narrative_template.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod bucket_tests {
        use super::*;

        #[test]
        fn zero_damage_is_none() {
            assert_eq!(DamageBucket::classify(0, 100), DamageBucket::None);
        }

        #[test]
        fn thresholds_are_inclusive() {
            assert_eq!(DamageBucket::classify(30, 100), DamageBucket::High);
            assert_eq!(DamageBucket::classify(29, 100), DamageBucket::Medium);
            assert_eq!(DamageBucket::classify(10, 100), DamageBucket::Medium);
            assert_eq!(DamageBucket::classify(9, 100), DamageBucket::Low);
            assert_eq!(DamageBucket::classify(1, 100), DamageBucket::Low);
        }

        #[test]
        fn overkill_is_high() {
            assert_eq!(DamageBucket::classify(500, 100), DamageBucket::High);
        }

        #[test]
        fn zero_max_hp_with_damage_is_low() {
            assert_eq!(DamageBucket::classify(5, 0), DamageBucket::Low);
        }
    }

    mod schema_tests {
        use super::*;

        #[test]
        fn kind_tags_are_screaming_snake() {
            assert_eq!(
                serde_json::to_string(&EventKind::Attack).unwrap(),
                "\"ATTACK\""
            );
            assert_eq!(serde_json::to_string(&EventKind::Noop).unwrap(), "\"NOOP\"");
        }

        #[test]
        fn bucket_tags_are_lowercase() {
            assert_eq!(
                serde_json::to_string(&DamageBucket::Medium).unwrap(),
                "\"medium\""
            );
            assert_eq!(
                serde_json::to_string(&DamageBucket::None).unwrap(),
                "\"none\""
            );
        }

        #[test]
        fn event_roundtrips_through_json() {
            let event = BattleEvent {
                kind: EventKind::Attack,
                actor_id: "li".into(),
                target_id: Some("zhao".into()),
                skill_id: Some("palm".into()),
                tier: Some(2),
                hit: true,
                critical: true,
                damage: 42,
                damage_bucket: DamageBucket::High,
                reason: None,
            };
            let json = serde_json::to_string(&event).unwrap();
            let back: BattleEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event, back);
        }

        #[test]
        fn absent_optionals_are_omitted() {
            let event = BattleEvent::noop("li".into(), "no_viable_action");
            let json = serde_json::to_string(&event).unwrap();
            assert!(!json.contains("target_id"));
            assert!(!json.contains("skill_id"));
            assert!(json.contains("\"reason\":\"no_viable_action\""));
        }
    }
}
