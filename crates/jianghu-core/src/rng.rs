//! Seeded deterministic random source.
//!
//! All randomness consumed by the engine flows through one [`BattleRng`]
//! instance owned by the battle world. There is no ambient or thread-local
//! randomness anywhere in the crate; two engines built with the same seed
//! and data replay the same battle event for event.
//!
//! The order in which stages draw from the generator is part of the engine
//! contract (see [`crate::pipeline`]), so every operation here documents
//! exactly how many values it consumes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic PRNG for battle resolution.
///
/// Wraps a `ChaCha8Rng` seeded from a 64-bit value. ChaCha8 is
/// platform-independent, which keeps replays stable across architectures.
///
/// # Example
///
/// ```
/// use jianghu_core::rng::BattleRng;
///
/// let mut a = BattleRng::new(42);
/// let mut b = BattleRng::new(42);
/// assert_eq!(a.gen_unit(), b.gen_unit());
/// ```
#[derive(Debug, Clone)]
pub struct BattleRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl BattleRng {
    /// Creates a generator from a 64-bit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Returns the seed this generator was built from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws one uniform float in `[0, 1)`. Consumes one value.
    pub fn gen_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Returns `true` with probability `p`, clipped to `[0, 1]`.
    ///
    /// Draws one float in `[0, 1)` and compares strictly `< p`, so `p = 0`
    /// never succeeds and `p >= 1` always succeeds. Consumes exactly one
    /// value regardless of the outcome.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        let p = p.max(0.0).min(1.0);
        self.gen_unit() < p
    }

    /// Draws a uniform integer in `[lo, hi)`. Consumes one value.
    ///
    /// An empty range (`hi <= lo`) returns `lo` without consuming
    /// randomness.
    pub fn gen_range(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..hi)
    }

    /// Picks an item by cumulative weight. Consumes one value.
    ///
    /// Weights below zero are treated as zero. Selection walks the
    /// cumulative sum with a binary search, so an item with zero weight is
    /// never picked while any positive weight exists, and equal cumulative
    /// boundaries resolve to the lowest original index. Index order, never
    /// hash order, decides ties.
    ///
    /// Returns `None` when `items` is empty or the weights sum to zero (in
    /// which case no randomness is consumed).
    pub fn choose_by_weight<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let mut cumulative = Vec::with_capacity(items.len());
        let mut total = 0.0_f64;
        for index in 0..items.len() {
            let w = weights.get(index).copied().unwrap_or(0.0).max(0.0);
            total += w;
            cumulative.push(total);
        }
        if total <= 0.0 {
            return None;
        }
        let draw = self.gen_unit() * total;
        let index = cumulative.partition_point(|edge| *edge <= draw);
        items.get(index.min(items.len() - 1))
    }
}
