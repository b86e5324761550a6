use glam::Vec2;
use rand::Rng;

use crate::types::SeedId;

/// One planted growth point.
///
/// `pos` and `hue_base` are fixed at planting. `size` and `age` only ever
/// grow, via [`crate::growth::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seed {
    pub id: SeedId,
    /// Canvas-local position in logical pixels.
    pub pos: Vec2,
    /// Current visual radius.
    pub size: f32,
    /// Life accumulator, starts at `0`.
    pub age: f32,
    /// Colour family in `[0, 1)`, a fraction of the hue wheel.
    pub hue_base: f32,
}

impl Seed {
    /// Creates a freshly planted seed.
    ///
    /// - `size` is drawn uniformly from `[2, 8)`.
    /// - `hue_base` is `palette_seed` jittered by up to `0.6`, wrapped into `[0, 1)`.
    ///
    /// ### Parameters
    /// - `id` - Identity token; the caller guarantees uniqueness.
    /// - `pos` - Canvas-local position.
    /// - `palette_seed` - Current global palette offset.
    /// - `rng` - Source of the size and hue jitter.
    pub fn plant(id: SeedId, pos: Vec2, palette_seed: f32, rng: &mut impl Rng) -> Self {
        let size = 2.0 + rng.random::<f32>() * 6.0;
        let hue_base = wrap_unit(palette_seed + rng.random::<f32>() * 0.6);
        Self {
            id,
            pos,
            size,
            age: 0.0,
            hue_base,
        }
    }

    /// Base hue in degrees.
    #[inline]
    pub fn hue_degrees(&self) -> f32 {
        self.hue_base * 360.0
    }
}

/// Wraps `v` into `[0, 1)`.
///
/// `rem_euclid` can round up to exactly `1.0` for tiny negative inputs, which
/// is folded back to `0.0`.
pub fn wrap_unit(v: f32) -> f32 {
    if !v.is_finite() {
        return 0.0;
    }
    let w = v.rem_euclid(1.0);
    if w >= 1.0 { 0.0 } else { w }
}
