//! Stochastic pixel spawner.
//!
//! Every tick each live seed scatters a handful of small dots inside its
//! radius and, now and then, a faint ring. Nothing here is cached: the
//! spawner is re-run from scratch for every seed on every frame and only
//! ever reads the seed.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::{color::Hsla, seed::Seed};

/// Spawn count growth per unit of seed age.
pub const AGE_SPAWN_FACTOR: f32 = 0.05;
/// Dots are scattered within this fraction of the seed's size.
pub const SCATTER_FRACTION: f32 = 0.9;
/// Opacity of a dot spawned exactly at the seed centre.
pub const CENTER_ALPHA: f32 = 0.8;
/// Peak hue deviation of the shimmer, in degrees.
pub const SHIMMER_DEGREES: f32 = 20.0;
pub const DOT_SATURATION: f32 = 0.8;

/// Ring pulse chance per tick at speed `1.0`.
pub const RING_PROBABILITY: f32 = 0.08;
pub const RING_ALPHA: f32 = 0.08;
pub const RING_WIDTH: f32 = 1.0;
pub const RING_LIGHTNESS: f32 = 0.6;

/// A single primitive to paint, in canvas-local logical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Filled circle.
    Dot {
        center: Vec2,
        radius: f32,
        color: Hsla,
    },
    /// Circle outline.
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Hsla,
    },
}

/// Number of dots a seed emits this tick.
///
/// `floor((r + age * 0.05) * speed * 0.5)` with `r` uniform in `[0, 1)`, so
/// older seeds and faster speeds emit more. Degenerate inputs yield `0`.
pub fn spawn_count(age: f32, speed: f32, rng: &mut impl Rng) -> u32 {
    let raw = (rng.random::<f32>() + age * AGE_SPAWN_FACTOR) * speed * 0.5;
    if raw.is_finite() && raw > 0.0 {
        raw.floor() as u32
    } else {
        0
    }
}

/// Opacity of a dot `distance` away from the centre of a seed of `size`.
///
/// Falls off linearly towards the edge and always lands in `[0, 0.8]`.
#[inline]
pub fn dot_alpha(distance: f32, size: f32) -> f32 {
    let denom = size.max(0.0) + 1.0;
    let alpha = CENTER_ALPHA * (1.0 - distance / denom);
    // `min`/`clamp` would turn a NaN into a bound, so reject it first.
    if !alpha.is_finite() {
        return 0.0;
    }
    alpha.min(1.0).clamp(0.0, CENTER_ALPHA)
}

/// Hue of the `k`-th dot of this tick's batch, in degrees `[0, 360)`.
#[inline]
pub fn shimmer_hue(seed: &Seed, k: u32) -> f32 {
    (seed.hue_degrees() + (seed.age + k as f32).sin() * SHIMMER_DEGREES).rem_euclid(360.0)
}

/// Probability of a ring pulse this tick, clamped to `[0, 1]`.
#[inline]
pub fn ring_probability(speed: f32) -> f64 {
    let p = (RING_PROBABILITY * speed) as f64;
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

/// Generates this tick's draw commands for one seed.
///
/// ### Parameters
/// - `seed` - Seed to decorate; only read.
/// - `brush` - Base dot radius.
/// - `speed` - Global speed multiplier.
/// - `rng` - Source of all randomness.
///
/// ### Returns
/// The dots (in batch order) followed by at most one ring.
pub fn spawn(seed: &Seed, brush: f32, speed: f32, rng: &mut impl Rng) -> Vec<DrawCommand> {
    let count = spawn_count(seed.age, speed, rng);
    let size = seed.size.max(0.0);
    let mut out = Vec::with_capacity(count as usize + 1);

    for k in 0..count {
        let angle = rng.random::<f32>() * TAU;
        let distance = rng.random::<f32>() * size * SCATTER_FRACTION;
        let center = seed.pos + Vec2::from_angle(angle) * distance;

        let radius = (brush * (0.3 + rng.random::<f32>() * 0.8)).max(1.0);
        let lightness = 0.45 + rng.random::<f32>() * 0.1;

        out.push(DrawCommand::Dot {
            center,
            radius,
            color: Hsla::new(
                shimmer_hue(seed, k),
                DOT_SATURATION,
                lightness,
                dot_alpha(distance, size),
            ),
        });
    }

    if rng.random_bool(ring_probability(speed)) {
        out.push(DrawCommand::Ring {
            center: seed.pos,
            radius: size * (0.9 + rng.random::<f32>() * 0.4),
            width: RING_WIDTH,
            color: Hsla::new(seed.hue_degrees(), DOT_SATURATION, RING_LIGHTNESS, RING_ALPHA),
        });
    }

    out
}
