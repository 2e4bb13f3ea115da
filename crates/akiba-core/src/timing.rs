//! Randomized timing policy.
//!
//! Pure draws over a caller-supplied RNG so the sequencer can run on a
//! seeded [`rand::rngs::StdRng`] in tests.

use rand::Rng;

/// Uniform draw from the closed interval `[min_ms, max_ms]`.
///
/// Re-derived on every call; nothing is memoized here. Nominal per-line
/// delays are rolled once at script-load time by the caller.
pub fn delay_between(rng: &mut impl Rng, min_ms: u64, max_ms: u64) -> u64 {
    debug_assert!(min_ms <= max_ms, "delay range inverted: {min_ms} > {max_ms}");
    if min_ms >= max_ms {
        return min_ms;
    }
    rng.gen_range(min_ms..=max_ms)
}

/// True with the given probability, from a uniform draw in `[0, 1)`.
///
/// A probability of `0.0` never fails; probabilities are never above `1.0`
/// in any script, so no upper clamp is applied.
pub fn should_fail(rng: &mut impl Rng, probability: f64) -> bool {
    probability > 0.0 && rng.gen::<f64>() < probability
}
