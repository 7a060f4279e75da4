//! Active-Time-Battle scheduler.
//!
//! Each living combatant accrues time units proportional to its agility;
//! whoever crosses the threshold first acts next. Accumulation is integer
//! fixed-point in milli-units (thousandths of a time unit) so fractional
//! tick scales stay bit-exact across platforms.
//!
//! # Progress guarantee
//!
//! If any living combatant has `agility * tick_scale > 0` the scheduler
//! selects an actor within a bounded number of accumulation ticks.
//! Combatants with zero effective agility never self-select but do not
//! block the others. When nobody can progress the scheduler reports
//! [`SchedulerError::Stuck`] instead of spinning forever.

use crate::combatant::CombatantId;
use crate::error::SchedulerError;
use crate::roster::Roster;

/// Accumulation ticks attempted before declaring the battle stuck.
pub const MAX_ACCUMULATION_TICKS: u32 = 10_000;

const MILLI: u64 = 1_000;

/// Selects the next actor by accumulated time units.
///
/// # Example
///
/// ```
/// use jianghu_core::scheduler::AtbScheduler;
///
/// let scheduler = AtbScheduler::new(100, 1.0);
/// assert_eq!(scheduler.threshold(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct AtbScheduler {
    threshold: u32,
    tick_scale: f64,
}

impl AtbScheduler {
    /// Creates a scheduler with the given ready threshold and tick scale.
    #[must_use]
    pub fn new(threshold: u32, tick_scale: f64) -> Self {
        Self {
            threshold,
            tick_scale,
        }
    }

    /// The ready threshold in whole time units.
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// The per-tick agility multiplier.
    #[must_use]
    pub fn tick_scale(&self) -> f64 {
        self.tick_scale
    }

    /// Milli-units a combatant with the given agility gains per tick.
    ///
    /// Computed as `floor(agility * tick_scale * 1000)`: one float product
    /// per tick, truncated to an integer before it ever accumulates, so
    /// repeated ticks cannot drift.
    #[must_use]
    pub fn gain_milli(&self, agility: u32) -> u64 {
        let exact = f64::from(agility) * self.tick_scale * 1_000.0;
        if exact <= 0.0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            exact.floor() as u64
        }
    }

    /// Advances the clock until a living combatant is ready, then selects
    /// the one with the most accumulated time.
    ///
    /// Ready combatants are compared by accumulated time descending, then
    /// by id ascending, so equal accumulations always resolve the same
    /// way. The winner's accumulator is reduced by the threshold; any
    /// surplus carries into its next turn.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Stuck`] when no living combatant reaches
    /// the threshold within [`MAX_ACCUMULATION_TICKS`].
    pub fn select_next(&self, roster: &mut Roster) -> Result<CombatantId, SchedulerError> {
        let threshold_milli = u64::from(self.threshold) * MILLI;

        let mut ticks = 0u32;
        while !self.any_ready(roster, threshold_milli) {
            if ticks >= MAX_ACCUMULATION_TICKS {
                return Err(SchedulerError::Stuck {
                    ticks: MAX_ACCUMULATION_TICKS,
                });
            }
            self.accumulate(roster);
            ticks += 1;
        }

        let Some(chosen) = roster
            .living()
            .filter(|c| c.time_units() >= threshold_milli)
            .max_by(|a, b| {
                a.time_units()
                    .cmp(&b.time_units())
                    // Lowest id wins a tie, so invert the id comparison
                    // under max_by.
                    .then_with(|| b.id().cmp(a.id()))
            })
            .map(|c| c.id().clone())
        else {
            // Unreachable after any_ready.
            return Err(SchedulerError::Stuck { ticks });
        };

        tracing::trace!(actor = %chosen, ticks, "scheduler selected actor");

        if let Some(combatant) = roster.by_id_mut(&chosen) {
            combatant.consume_time_units(threshold_milli);
        }
        Ok(chosen)
    }

    fn any_ready(&self, roster: &Roster, threshold_milli: u64) -> bool {
        roster.living().any(|c| c.time_units() >= threshold_milli)
    }

    fn accumulate(&self, roster: &mut Roster) {
        let gains: Vec<(CombatantId, u64)> = roster
            .living()
            .map(|c| (c.id().clone(), self.gain_milli(c.stats().agility)))
            .collect();
        for (id, gain) in gains {
            if gain == 0 {
                continue;
            }
            if let Some(combatant) = roster.by_id_mut(&id) {
                combatant.add_time_units(gain);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{Combatant, Stats};

    fn fighter(id: &str, faction: &str, agility: u32) -> Combatant {
        Combatant::new(
            id,
            id.to_uppercase(),
            faction,
            Stats {
                hp: 50,
                max_hp: 50,
                qi: 10,
                max_qi: 10,
                strength: 8,
                agility,
                defense: 3,
            },
            vec![],
        )
        .unwrap()
    }

    mod gain_tests {
        use super::*;

        #[test]
        fn integer_scale() {
            let scheduler = AtbScheduler::new(100, 1.0);
            assert_eq!(scheduler.gain_milli(10), 10_000);
            assert_eq!(scheduler.gain_milli(0), 0);
        }

        #[test]
        fn fractional_scale_floors() {
            let scheduler = AtbScheduler::new(100, 0.333);
            // 7 * 0.333 * 1000 = 2331.0
            assert_eq!(scheduler.gain_milli(7), 2_331);
        }

        #[test]
        fn zero_scale_gains_nothing() {
            let scheduler = AtbScheduler::new(100, 0.0);
            assert_eq!(scheduler.gain_milli(99), 0);
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn fastest_acts_first() {
            let mut roster = Roster::new(vec![
                fighter("slow", "a", 5),
                fighter("fast", "b", 10),
            ])
            .unwrap();
            let scheduler = AtbScheduler::new(100, 1.0);

            let chosen = scheduler.select_next(&mut roster).unwrap();
            assert_eq!(chosen.as_str(), "fast");
        }

        #[test]
        fn equal_agility_resolves_to_lowest_id() {
            let mut roster = Roster::new(vec![
                fighter("b", "crimson", 10),
                fighter("a", "azure", 10),
            ])
            .unwrap();
            let scheduler = AtbScheduler::new(100, 1.0);

            let chosen = scheduler.select_next(&mut roster).unwrap();
            assert_eq!(chosen.as_str(), "a");
        }

        #[test]
        fn surplus_time_carries_forward() {
            // Agility 30 reaches 120 at tick 4; 20 milli-units carry over.
            let mut roster = Roster::new(vec![
                fighter("burst", "a", 30),
                fighter("pace", "b", 1),
            ])
            .unwrap();
            let scheduler = AtbScheduler::new(100, 1.0);

            let chosen = scheduler.select_next(&mut roster).unwrap();
            assert_eq!(chosen.as_str(), "burst");
            assert_eq!(roster.by_id(&"burst".into()).unwrap().time_units(), 20_000);
        }

        #[test]
        fn zero_agility_combatant_does_not_block_others() {
            let mut roster = Roster::new(vec![
                fighter("statue", "a", 0),
                fighter("runner", "b", 10),
            ])
            .unwrap();
            let scheduler = AtbScheduler::new(100, 1.0);

            for _ in 0..5 {
                let chosen = scheduler.select_next(&mut roster).unwrap();
                assert_eq!(chosen.as_str(), "runner");
            }
            assert_eq!(roster.by_id(&"statue".into()).unwrap().time_units(), 0);
        }

        #[test]
        fn downed_combatants_are_not_scheduled() {
            let mut roster = Roster::new(vec![
                fighter("fast", "a", 20),
                fighter("slow", "b", 5),
            ])
            .unwrap();
            roster.apply_damage(&"fast".into(), 50).unwrap();
            let scheduler = AtbScheduler::new(100, 1.0);

            let chosen = scheduler.select_next(&mut roster).unwrap();
            assert_eq!(chosen.as_str(), "slow");
        }

        #[test]
        fn all_zero_agility_reports_stuck() {
            let mut roster = Roster::new(vec![
                fighter("a", "a", 0),
                fighter("b", "b", 0),
            ])
            .unwrap();
            let scheduler = AtbScheduler::new(100, 1.0);

            let err = scheduler.select_next(&mut roster).unwrap_err();
            assert!(matches!(err, SchedulerError::Stuck { .. }));
        }

        #[test]
        fn already_ready_combatant_skips_accumulation() {
            let mut roster = Roster::new(vec![
                fighter("a", "a", 1),
                fighter("b", "b", 1),
            ])
            .unwrap();
            roster
                .by_id_mut(&"b".into())
                .unwrap()
                .add_time_units(150_000);
            let scheduler = AtbScheduler::new(100, 1.0);

            let chosen = scheduler.select_next(&mut roster).unwrap();
            assert_eq!(chosen.as_str(), "b");
            // Only the threshold is consumed; the surplus remains.
            assert_eq!(roster.by_id(&"b".into()).unwrap().time_units(), 50_000);
            // Nobody ticked, so "a" is untouched.
            assert_eq!(roster.by_id(&"a".into()).unwrap().time_units(), 0);
        }

        #[test]
        fn fractional_tick_scale_is_deterministic() {
            let run = || {
                let mut roster = Roster::new(vec![
                    fighter("x", "a", 7),
                    fighter("y", "b", 11),
                ])
                .unwrap();
                let scheduler = AtbScheduler::new(100, 0.37);
                let mut order = Vec::new();
                for _ in 0..12 {
                    order.push(scheduler.select_next(&mut roster).unwrap());
                }
                order
            };
            assert_eq!(run(), run());
        }
    }
}
