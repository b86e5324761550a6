//! Per-frame growth of a single seed.
//!
//! Seeds burst open during their first [`BURST_AGE`] units of age, then
//! slow to a tenth of that rate. The `1 - size / SOFT_SIZE_CAP` factor
//! makes growth taper towards [`SOFT_SIZE_CAP`] well before the hard
//! [`MAX_SIZE`] expiry.

use crate::seed::Seed;

/// Age gained per tick at speed `1.0`.
pub const AGE_RATE: f32 = 0.02;
/// Size gained per tick at speed `1.0` for a zero-size seed during the burst.
pub const GROWTH_RATE: f32 = 0.3;
/// Age at which the burst phase ends.
pub const BURST_AGE: f32 = 10.0;
/// Growth multiplier after the burst phase.
pub const SETTLE_FACTOR: f32 = 0.1;
/// Size at which growth reaches zero.
pub const SOFT_SIZE_CAP: f32 = 150.0;
/// Seeds older than this are removed.
pub const MAX_AGE: f32 = 120.0;
/// Seeds larger than this are removed.
pub const MAX_SIZE: f32 = 220.0;

/// Advances a seed by one tick.
///
/// ### Parameters
/// - `seed` - State before the tick.
/// - `speed` - Global speed multiplier; negative values are treated as `0`.
///
/// ### Returns
/// The updated seed and whether it has expired (`age > MAX_AGE` or
/// `size > MAX_SIZE`) and must be removed.
pub fn advance(seed: Seed, speed: f32) -> (Seed, bool) {
    let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };

    let age = seed.age + AGE_RATE * speed;
    let phase = if age < BURST_AGE { 1.0 } else { SETTLE_FACTOR };
    // Past the soft cap the factor would turn negative and shrink the seed.
    let headroom = (1.0 - seed.size / SOFT_SIZE_CAP).max(0.0);
    let size = seed.size + GROWTH_RATE * speed * headroom * phase;

    let next = Seed { age, size, ..seed };
    (next, is_expired(&next))
}

/// Whether a seed is past either lifetime limit.
#[inline]
pub fn is_expired(seed: &Seed) -> bool {
    seed.age > MAX_AGE || seed.size > MAX_SIZE
}
