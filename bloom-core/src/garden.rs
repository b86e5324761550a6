//! The garden: process-wide engine state and the commands that change it.
//!
//! Controls read and write `running` and `config` directly. The seed
//! population is private; it changes only through [`Garden::plant`],
//! [`Garden::clear`] and [`Garden::tick`], and observers read it through
//! [`Garden::snapshot`], which is rebuilt after every change.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info};

use crate::{
    canvas::Surface,
    compositor::{self, FrameParams, FrameStats},
    config::{BACKGROUND, Config},
    interaction::{self, PointerEvent},
    seed::{Seed, wrap_unit},
    types::SeedId,
};

#[derive(Debug)]
pub struct Garden {
    /// Whether ticks render. Toggled by the UI, never by the engine.
    pub running: bool,
    pub config: Config,
    palette_seed: f32,
    seeds: Vec<Seed>,
    snapshot: Arc<[Seed]>,
    next_id: SeedId,
}

impl Garden {
    /// Creates an empty, running garden.
    pub fn new(config: Config, palette_seed: f32) -> Self {
        Self {
            running: true,
            config: config.clamped(),
            palette_seed: wrap_unit(palette_seed),
            seeds: Vec::new(),
            snapshot: Arc::from(Vec::new()),
            next_id: 0,
        }
    }

    /// Creates an empty, running garden with a random palette.
    pub fn with_random_palette(config: Config, rng: &mut impl Rng) -> Self {
        Self::new(config, rng.random())
    }

    pub fn palette_seed(&self) -> f32 {
        self.palette_seed
    }

    /// Sets the palette offset for seeds planted from now on.
    pub fn set_palette_seed(&mut self, palette_seed: f32) {
        self.palette_seed = wrap_unit(palette_seed);
    }

    /// Rolls a new palette. Existing seeds keep their colours.
    pub fn reroll_palette(&mut self, rng: &mut impl Rng) -> f32 {
        self.set_palette_seed(rng.random());
        info!(palette_seed = self.palette_seed, "palette rerolled");
        self.palette_seed
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    /// Live population, oldest first.
    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    /// Immutable view of the population as of the last change.
    pub fn snapshot(&self) -> Arc<[Seed]> {
        Arc::clone(&self.snapshot)
    }

    /// Plants a seed at a canvas-local position.
    pub fn plant(&mut self, pos: Vec2, rng: &mut impl Rng) -> SeedId {
        let id = self.next_id;
        self.next_id += 1;
        let seed = Seed::plant(id, pos, self.palette_seed, rng);
        debug!(id, x = pos.x, y = pos.y, hue = seed.hue_base, "seed planted");
        self.seeds.push(seed);
        self.publish();
        id
    }

    /// Plants one seed for a press on the canvas.
    ///
    /// ### Parameters
    /// - `event` - Mouse or touch press in viewport coordinates.
    /// - `canvas_origin` - On-screen top-left corner of the canvas.
    /// - `canvas_size` - Logical canvas size; presses outside are ignored.
    /// - `rng` - Source of the new seed's jitter.
    pub fn plant_at_pointer(
        &mut self,
        event: &PointerEvent,
        canvas_origin: Vec2,
        canvas_size: Vec2,
        rng: &mut impl Rng,
    ) -> Option<SeedId> {
        let pos = interaction::press_on_canvas(event, canvas_origin, canvas_size)?;
        Some(self.plant(pos, rng))
    }

    /// Blanks the surface with the solid background and drops every seed.
    pub fn clear(&mut self, surface: &mut impl Surface) {
        surface.fill(BACKGROUND);
        let removed = self.seeds.len();
        self.seeds.clear();
        self.publish();
        info!(removed, "garden cleared");
    }

    /// Flips `running` and returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Renders one frame with the current configuration and swaps in the
    /// survivors.
    ///
    /// `config` is public, so it is clamped to its UI bounds here rather
    /// than trusted.
    ///
    /// ### Returns
    /// Frame counters, or `None` if the garden is paused and nothing happened.
    pub fn tick(&mut self, surface: &mut impl Surface, rng: &mut impl Rng) -> Option<FrameStats> {
        let params = FrameParams {
            running: self.running,
            config: self.config.clamped(),
        };
        let frame = compositor::render_frame(&self.seeds, &params, surface, rng)?;
        if frame.stats.expired > 0 {
            debug!(expired = frame.stats.expired, left = frame.seeds.len(), "seeds expired");
        }
        self.seeds = frame.seeds;
        self.publish();
        Some(frame.stats)
    }

    fn publish(&mut self) {
        self.snapshot = Arc::from(self.seeds.as_slice());
    }
}
