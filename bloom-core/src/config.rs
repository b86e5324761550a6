use std::ops::RangeInclusive;

use crate::color::{Hsla, Rgba};

/// Bounds the control panel offers for [`Config::speed`].
pub const SPEED_RANGE: RangeInclusive<f32> = 0.2..=3.0;
/// Bounds the control panel offers for [`Config::brush`].
pub const BRUSH_RANGE: RangeInclusive<f32> = 2.0..=40.0;

/// Dark backdrop used by both the hard clear and the per-frame fade.
pub const BACKGROUND: Rgba = Rgba::from_rgb8(7, 9, 16, 1.0);
/// Alpha of the per-frame fade overlay. Lower means longer trails.
pub const FADE_ALPHA: f32 = 0.12;

/// Grid spacing in logical pixels.
pub const GRID_STEP: f32 = 40.0;
pub const GRID_COLOR: Rgba = Rgba::new(1.0, 1.0, 1.0, 0.04);

/// Ambience candidates per unit of speed per frame.
pub const AMBIENT_CANDIDATES_PER_SPEED: f32 = 20.0;
/// Chance that a single ambience candidate is actually plotted.
pub const AMBIENT_PROBABILITY: f64 = 0.05;
pub const AMBIENT_COLOR: Hsla = Hsla::new(210.0, 0.6, 0.7, 0.05);

/// User-adjustable render parameters.
///
/// Read by every tick; the engine never writes to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Global time multiplier for growth and spawn rates.
    pub speed: f32,
    /// Base radius of spawned dots, in logical pixels.
    pub brush: f32,
    pub show_grid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed: 1.0,
            brush: 6.0,
            show_grid: false,
        }
    }
}

impl Config {
    /// Sets the speed, clamped to [`SPEED_RANGE`]. Non-finite input is ignored.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = clamp_or(speed, SPEED_RANGE, self.speed);
    }

    /// Sets the brush size, clamped to [`BRUSH_RANGE`]. Non-finite input is ignored.
    pub fn set_brush(&mut self, brush: f32) {
        self.brush = clamp_or(brush, BRUSH_RANGE, self.brush);
    }

    /// Returns a copy with every field inside its UI bounds.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            speed: clamp_or(self.speed, SPEED_RANGE, defaults.speed),
            brush: clamp_or(self.brush, BRUSH_RANGE, defaults.brush),
            show_grid: self.show_grid,
        }
    }
}

fn clamp_or(v: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if v.is_finite() {
        v.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}
