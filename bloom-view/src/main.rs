//! Application entry point for the Bloom garden viewer.
//!
//! This binary parses the command line, sets up logging and eframe/egui,
//! and delegates everything interactive to [`Viewer`] from the `viewer`
//! module.

mod viewer;

use std::path::PathBuf;

use bloom_core::config::Config;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::{Settings, Viewer};

/// Interactive generative seed garden.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Initial window width in points.
    #[arg(long, default_value_t = 1100.0)]
    width: f32,

    /// Initial window height in points.
    #[arg(long, default_value_t = 760.0)]
    height: f32,

    /// Growth and spawn speed multiplier (0.2 - 3).
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Dot size in logical pixels (2 - 40).
    #[arg(long, default_value_t = 6.0)]
    brush: f32,

    /// Show the grid overlay.
    #[arg(long)]
    grid: bool,

    /// Palette offset in [0, 1); random when omitted.
    #[arg(long)]
    palette_seed: Option<f32>,

    /// Seed for the random generator; taken from the OS when omitted.
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Start with the animation paused.
    #[arg(long)]
    paused: bool,

    /// Directory exported PNGs are written to.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,
}

impl Args {
    fn settings(&self) -> Settings {
        let mut config = Config {
            show_grid: self.grid,
            ..Config::default()
        };
        config.set_speed(self.speed);
        config.set_brush(self.brush);

        Settings {
            config,
            palette_seed: self.palette_seed,
            rng_seed: self.rng_seed,
            start_paused: self.paused,
            export_dir: self.export_dir.clone(),
        }
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    // Default to INFO level if RUST_LOG is not set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let settings = args.settings();
    info!(?settings, "starting bloom");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Bloom")
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "Bloom",
        options,
        Box::new(move |cc| Ok(Box::new(Viewer::new(cc.egui_ctx.clone(), settings)))),
    )
}
