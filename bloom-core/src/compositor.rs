//! One frame of the garden.
//!
//! [`render_frame`] runs the whole per-tick pipeline:
//! 1. Fade the previous frame with a translucent backdrop (trails).
//! 2. Optionally lay the grid over it.
//! 3. Grow every seed with [`growth::advance`], paint what
//!    [`spawn::spawn`] produces for it, and drop the ones that expired.
//! 4. Sprinkle background ambience.
//!
//! The population goes in by reference and the survivors come back as a
//! new vector, so nothing outside the frame ever sees a half-updated list.

use glam::Vec2;
use rand::Rng;
use tracing::trace;

use crate::{
    canvas::Surface,
    config::{
        AMBIENT_CANDIDATES_PER_SPEED, AMBIENT_COLOR, AMBIENT_PROBABILITY, BACKGROUND, Config,
        FADE_ALPHA, GRID_COLOR, GRID_STEP,
    },
    growth,
    seed::Seed,
    spawn::{self, DrawCommand},
};

/// Everything a frame needs to know about the outside world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    pub running: bool,
    pub config: Config,
}

/// Counters describing what one rendered frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Seeds that were alive going into the frame.
    pub seeds_in: usize,
    /// Seeds removed because they expired.
    pub expired: usize,
    pub dots: usize,
    pub rings: usize,
    /// Ambience dots plotted.
    pub ambient: usize,
}

/// Result of a rendered frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Survivors, in the same relative order as the input.
    pub seeds: Vec<Seed>,
    pub stats: FrameStats,
}

/// Renders one frame and advances the population.
///
/// ### Parameters
/// - `seeds` - Population before the tick.
/// - `params` - Running flag and render configuration for this tick.
/// - `surface` - Target to paint on.
/// - `rng` - Source of all spawn and ambience randomness.
///
/// ### Returns
/// `None` when `params.running` is false: nothing is drawn and the
/// population is left as is. Otherwise the survivors and frame counters.
pub fn render_frame(
    seeds: &[Seed],
    params: &FrameParams,
    surface: &mut impl Surface,
    rng: &mut impl Rng,
) -> Option<Frame> {
    if !params.running {
        return None;
    }
    let cfg = params.config;
    let mut stats = FrameStats {
        seeds_in: seeds.len(),
        ..FrameStats::default()
    };

    surface.fade(BACKGROUND.with_alpha(FADE_ALPHA));

    if cfg.show_grid {
        surface.draw_grid(GRID_STEP, GRID_COLOR);
    }

    // Newest first, matching the layering of in-place backwards removal.
    let mut survivors = Vec::with_capacity(seeds.len());
    for seed in seeds.iter().rev() {
        let (grown, expired) = growth::advance(*seed, cfg.speed);

        for cmd in spawn::spawn(&grown, cfg.brush, cfg.speed, rng) {
            match cmd {
                DrawCommand::Dot { .. } => stats.dots += 1,
                DrawCommand::Ring { .. } => stats.rings += 1,
            }
            surface.draw(&cmd);
        }

        if expired {
            stats.expired += 1;
        } else {
            survivors.push(grown);
        }
    }
    survivors.reverse();

    stats.ambient = ambience(surface, cfg.speed, rng);

    trace!(
        seeds = stats.seeds_in,
        expired = stats.expired,
        dots = stats.dots,
        rings = stats.rings,
        "frame rendered"
    );

    Some(Frame {
        seeds: survivors,
        stats,
    })
}

/// Number of ambience candidates rolled per frame.
#[inline]
pub fn ambient_candidates(speed: f32) -> u32 {
    let n = (speed * AMBIENT_CANDIDATES_PER_SPEED).round();
    if n.is_finite() && n > 0.0 { n as u32 } else { 0 }
}

/// Plots faint dots at random spots, independent of any seed.
///
/// Returns how many were plotted.
fn ambience(surface: &mut impl Surface, speed: f32, rng: &mut impl Rng) -> usize {
    let size = surface.logical_size();
    let color = AMBIENT_COLOR.to_rgba();
    let mut plotted = 0;
    for _ in 0..ambient_candidates(speed) {
        if rng.random_bool(AMBIENT_PROBABILITY) {
            let pos = Vec2::new(rng.random::<f32>() * size.x, rng.random::<f32>() * size.y);
            surface.plot(pos, color);
            plotted += 1;
        }
    }
    plotted
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{canvas::Canvas, color::Rgba, growth::MAX_AGE};
    use rand::{SeedableRng, rngs::StdRng};

    /// Everything a [`Surface`] was asked to do, in order.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Op {
        Fill(Rgba),
        Fade(Rgba),
        Grid(f32),
        Draw(DrawCommand),
        Plot(Vec2),
    }

    pub(crate) struct Recorder {
        pub size: Vec2,
        pub ops: Vec<Op>,
    }

    impl Recorder {
        pub(crate) fn new(w: f32, h: f32) -> Self {
            Self {
                size: Vec2::new(w, h),
                ops: Vec::new(),
            }
        }
    }

    impl Surface for Recorder {
        fn logical_size(&self) -> Vec2 {
            self.size
        }
        fn fill(&mut self, color: Rgba) {
            self.ops.push(Op::Fill(color));
        }
        fn fade(&mut self, color: Rgba) {
            self.ops.push(Op::Fade(color));
        }
        fn draw_grid(&mut self, step: f32, _color: Rgba) {
            self.ops.push(Op::Grid(step));
        }
        fn draw(&mut self, cmd: &DrawCommand) {
            self.ops.push(Op::Draw(*cmd));
        }
        fn plot(&mut self, pos: Vec2, _color: Rgba) {
            self.ops.push(Op::Plot(pos));
        }
    }

    fn seed(id: u64, size: f32, age: f32) -> Seed {
        Seed {
            id,
            pos: Vec2::new(50.0, 50.0),
            size,
            age,
            hue_base: 0.5,
        }
    }

    fn params(running: bool, show_grid: bool) -> FrameParams {
        FrameParams {
            running,
            config: Config {
                show_grid,
                ..Config::default()
            },
        }
    }

    #[test]
    fn paused_frame_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut surface = Recorder::new(100.0, 100.0);
        let seeds = vec![seed(0, 5.0, 0.0)];

        let out = render_frame(&seeds, &params(false, true), &mut surface, &mut rng);

        assert!(out.is_none());
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn frame_starts_with_fade_not_a_hard_clear() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut surface = Recorder::new(100.0, 100.0);

        render_frame(&[], &params(true, false), &mut surface, &mut rng).unwrap();

        assert_eq!(surface.ops[0], Op::Fade(BACKGROUND.with_alpha(FADE_ALPHA)));
        assert!(!surface.ops.iter().any(|op| matches!(op, Op::Fill(_))));
        assert!(!surface.ops.iter().any(|op| matches!(op, Op::Grid(_))));
    }

    #[test]
    fn grid_follows_fade_when_enabled() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut surface = Recorder::new(100.0, 100.0);

        render_frame(&[], &params(true, true), &mut surface, &mut rng).unwrap();

        assert!(matches!(surface.ops[0], Op::Fade(_)));
        assert_eq!(surface.ops[1], Op::Grid(GRID_STEP));
    }

    #[test]
    fn seeds_grow_and_keep_order() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut surface = Recorder::new(100.0, 100.0);
        let seeds = vec![seed(0, 5.0, 0.0), seed(1, 6.0, 1.0), seed(2, 7.0, 2.0)];

        let frame = render_frame(&seeds, &params(true, false), &mut surface, &mut rng).unwrap();

        let ids: Vec<u64> = frame.seeds.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        for (before, after) in seeds.iter().zip(&frame.seeds) {
            assert!(after.age > before.age);
            assert!(after.size > before.size);
            assert_eq!(after.pos, before.pos);
        }
        assert_eq!(frame.stats.seeds_in, 3);
        assert_eq!(frame.stats.expired, 0);
    }

    #[test]
    fn expired_seeds_are_removed_after_drawing() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut surface = Recorder::new(100.0, 100.0);
        let seeds = vec![seed(0, 5.0, MAX_AGE), seed(1, 5.0, 0.0), seed(2, 500.0, 1.0)];

        let frame = render_frame(&seeds, &params(true, false), &mut surface, &mut rng).unwrap();

        assert_eq!(frame.seeds.len(), 1);
        assert_eq!(frame.seeds[0].id, 1);
        assert_eq!(frame.stats.expired, 2);
        // The old seed still emitted its last batch of dots.
        assert!(frame.stats.dots > 0);
    }

    #[test]
    fn removed_seeds_never_come_back() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut surface = Recorder::new(100.0, 100.0);
        let mut seeds = vec![seed(0, 5.0, MAX_AGE - 0.01), seed(1, 5.0, 0.0)];

        for _ in 0..50 {
            let frame =
                render_frame(&seeds, &params(true, false), &mut surface, &mut rng).unwrap();
            seeds = frame.seeds;
            assert!(seeds.iter().all(|s| s.id != 0));
        }
        assert_eq!(seeds.len(), 1);
    }

    #[test]
    fn draw_counts_match_recorded_ops() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut surface = Recorder::new(200.0, 200.0);
        let seeds: Vec<Seed> = (0..20).map(|i| seed(i, 30.0, 60.0)).collect();
        let p = FrameParams {
            running: true,
            config: Config {
                speed: 3.0,
                ..Config::default()
            },
        };

        let frame = render_frame(&seeds, &p, &mut surface, &mut rng).unwrap();

        let dots = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Draw(DrawCommand::Dot { .. })))
            .count();
        let rings = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Draw(DrawCommand::Ring { .. })))
            .count();
        let plots = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Plot(_)))
            .count();
        assert_eq!(dots, frame.stats.dots);
        assert_eq!(rings, frame.stats.rings);
        assert_eq!(plots, frame.stats.ambient);
        assert!(dots >= 20 * 4);
    }

    #[test]
    fn ambience_stays_on_canvas() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut surface = Recorder::new(64.0, 32.0);
        let p = FrameParams {
            running: true,
            config: Config {
                speed: 3.0,
                ..Config::default()
            },
        };
        let mut plotted = 0;
        for _ in 0..200 {
            let frame = render_frame(&[], &p, &mut surface, &mut rng).unwrap();
            plotted += frame.stats.ambient;
        }
        assert!(plotted > 0);
        for op in &surface.ops {
            if let Op::Plot(pos) = op {
                assert!(pos.x >= 0.0 && pos.x < 64.0);
                assert!(pos.y >= 0.0 && pos.y < 32.0);
            }
        }
    }

    #[test]
    fn ambient_candidates_scale_with_speed() {
        assert_eq!(ambient_candidates(1.0), 20);
        assert_eq!(ambient_candidates(0.2), 4);
        assert_eq!(ambient_candidates(3.0), 60);
        assert_eq!(ambient_candidates(-1.0), 0);
        assert_eq!(ambient_candidates(f32::NAN), 0);
    }

    #[test]
    fn renders_onto_a_real_canvas() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut canvas = Canvas::new(100.0, 100.0, 1.0).unwrap();
        let seeds = vec![seed(0, 20.0, 100.0)];
        let p = FrameParams {
            running: true,
            config: Config {
                speed: 3.0,
                brush: 10.0,
                show_grid: false,
            },
        };

        let before = canvas.pixels().to_vec();
        render_frame(&seeds, &p, &mut canvas, &mut rng).unwrap();
        assert_ne!(canvas.pixels(), &before[..]);
    }
}
