//! Interactive garden viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the engine state (garden,
//! canvas, animation driver) and implements [`eframe::App`] to render and
//! control it through an egui UI.

use std::path::PathBuf;

use bloom_core::{
    canvas::{Canvas, Surface},
    compositor::FrameStats,
    config::{BRUSH_RANGE, Config, SPEED_RANGE},
    driver::{AnimationDriver, DriverState, FrameDecision, FrameScheduler, FrameToken},
    export::export_png,
    garden::Garden,
    interaction::PointerEvent,
    types::SeedId,
};
use eframe::App;
use glam::Vec2;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{error, info, warn};

/// Start-up options for a [`Viewer`].
#[derive(Clone, Debug)]
pub struct Settings {
    pub config: Config,
    pub palette_seed: Option<f32>,
    pub rng_seed: Option<u64>,
    pub start_paused: bool,
    pub export_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: Config::default(),
            palette_seed: None,
            rng_seed: None,
            start_paused: false,
            export_dir: PathBuf::from("."),
        }
    }
}

/// [`FrameScheduler`] backed by egui repaint requests.
///
/// A requested frame is due on the next `update` call, which egui issues
/// at the display refresh following [`egui::Context::request_repaint`].
struct RepaintScheduler {
    ctx: egui::Context,
    next: u64,
    due: Option<FrameToken>,
}

impl RepaintScheduler {
    fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            next: 0,
            due: None,
        }
    }

    fn take_due(&mut self) -> Option<FrameToken> {
        self.due.take()
    }
}

impl FrameScheduler for RepaintScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.due = Some(token);
        self.ctx.request_repaint();
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.due == Some(token) {
            self.due = None;
        }
    }
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle keyboard shortcuts and control panels.
/// 2. Create or resize the canvas to match the central panel.
/// 3. Plant seeds for pointer presses on the canvas.
/// 4. If the driver approves the due frame, tick the garden.
/// 5. Upload the canvas to a texture and paint it.
///
/// ### Fields
/// - `garden` - Seeds, running flag and render configuration.
/// - `canvas` - Raster the garden paints on; `None` until the first layout.
/// - `canvas_error` - Why the canvas could not be created, if it failed.
/// - `driver` / `scheduler` - Frame loop and its repaint-backed clock.
/// - `rng` - Shared random source for planting, spawning and palettes.
/// - `texture` - GPU copy of the canvas; refreshed when `dirty`.
/// - `last_stats` - Counters from the most recent rendered frame.
/// - `status` - Last export result or error, shown in the status bar.
pub struct Viewer {
    garden: Garden,
    canvas: Option<Canvas>,
    canvas_error: Option<String>,
    driver: AnimationDriver,
    scheduler: RepaintScheduler,
    rng: StdRng,

    export_dir: PathBuf,
    texture: Option<egui::TextureHandle>,
    dirty: bool,
    last_stats: Option<FrameStats>,
    status: Option<String>,
}

impl Viewer {
    /// Creates a viewer with an empty garden.
    ///
    /// The canvas and the frame loop start on the first `update`, once the
    /// central panel has a size.
    pub fn new(ctx: egui::Context, settings: Settings) -> Self {
        let mut rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut garden = match settings.palette_seed {
            Some(p) => Garden::new(settings.config, p),
            None => Garden::with_random_palette(settings.config, &mut rng),
        };
        garden.running = !settings.start_paused;

        Self {
            garden,
            canvas: None,
            canvas_error: None,
            driver: AnimationDriver::new(),
            scheduler: RepaintScheduler::new(ctx),
            rng,
            export_dir: settings.export_dir,
            texture: None,
            dirty: false,
            last_stats: None,
            status: None,
        }
    }

    /// Creates the canvas for the given panel size and starts the loop.
    ///
    /// Empty areas are skipped until a later layout. If the canvas cannot
    /// be created the error is kept for display and the driver never mounts.
    fn ensure_canvas(&mut self, size: Vec2, scale: f32) {
        if self.canvas.is_some() || self.canvas_error.is_some() {
            return;
        }
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }

        match Canvas::new(size.x, size.y, scale) {
            Ok(canvas) => {
                self.canvas = Some(canvas);
                self.driver.resize(size.x, size.y, scale);
                self.driver.mount(&mut self.scheduler);
                self.driver.set_running(self.garden.running, &mut self.scheduler);
                self.dirty = true;
            }
            Err(err) => {
                error!("cannot render garden: {err:#}");
                self.canvas_error = Some(format!("{err:#}"));
            }
        }
    }

    /// Resizes the backing buffer when the panel or pixel ratio changes.
    ///
    /// A size the canvas rejects is not remembered, so the same size is
    /// tried again on the next layout.
    fn sync_viewport(&mut self, size: Vec2, scale: f32) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        let previous = self.driver.viewport();
        let Some(vp) = self.driver.resize(size.x, size.y, scale) else {
            return;
        };
        if canvas.resize(vp.width, vp.height, vp.scale) {
            self.dirty = true;
        } else {
            warn!(
                width = vp.width,
                height = vp.height,
                scale = vp.scale,
                "canvas resize rejected"
            );
            self.driver.restore_viewport(previous);
        }
    }

    /// Runs the due frame, if the driver approves it.
    fn pump_frame(&mut self) -> Option<FrameStats> {
        self.driver.set_running(self.garden.running, &mut self.scheduler);

        let token = self.scheduler.take_due()?;
        if self.driver.on_frame(token, &mut self.scheduler) != FrameDecision::Render {
            return None;
        }
        let canvas = self.canvas.as_mut()?;
        let stats = self.garden.tick(canvas, &mut self.rng)?;
        self.last_stats = Some(stats);
        self.dirty = true;
        Some(stats)
    }

    /// Plants a seed for a press at `client` (screen points).
    fn plant_at(&mut self, client: Vec2, canvas_origin: Vec2) -> Option<SeedId> {
        let size = self.canvas.as_ref().map(Surface::logical_size)?;
        self.garden.plant_at_pointer(
            &PointerEvent::MouseDown { client },
            canvas_origin,
            size,
            &mut self.rng,
        )
    }

    fn toggle_pause(&mut self) {
        self.garden.toggle_pause();
        self.driver.set_running(self.garden.running, &mut self.scheduler);
    }

    fn clear(&mut self) {
        if let Some(canvas) = self.canvas.as_mut() {
            self.garden.clear(canvas);
            self.dirty = true;
        }
    }

    fn reroll_palette(&mut self) {
        self.garden.reroll_palette(&mut self.rng);
    }

    /// Writes a PNG of the canvas into the export directory.
    ///
    /// Failures are reported in the status bar and leave the garden alone.
    fn export(&mut self) {
        let Some(canvas) = self.canvas.as_ref() else {
            self.status = Some("nothing to export yet".to_owned());
            return;
        };

        let result = export_png(canvas, chrono::Local::now().naive_local())
            .and_then(|image| image.save_in(&self.export_dir));

        self.status = Some(match result {
            Ok(path) => format!("saved {}", path.display()),
            Err(err) => {
                warn!("export failed: {err:#}");
                format!("export failed: {err:#}")
            }
        });
    }

    /// Handles the global keyboard shortcuts.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (pause, clear, reroll, grid, export) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::C),
                i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::G),
                i.key_pressed(egui::Key::S),
            )
        });

        if pause {
            self.toggle_pause();
        }
        if clear {
            self.clear();
        }
        if reroll {
            self.reroll_palette();
        }
        if grid {
            self.garden.config.show_grid = !self.garden.config.show_grid;
        }
        if export {
            self.export();
        }
    }

    /// Builds the top panel (run control and commands).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.garden.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.toggle_pause();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                if ui.button("New palette").clicked() {
                    self.reroll_palette();
                }

                ui.separator();
                if ui.button("Export PNG").clicked() {
                    self.export();
                }
            });
        });
    }

    /// Builds the bottom status bar.
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("frames = {}", self.driver.frames_rendered()));
                ui.label(format!("state = {:?}", self.driver.state()));
                ui.separator();
                ui.label(format!("seeds = {}", self.garden.seed_count()));
                if let Some(stats) = self.last_stats {
                    ui.label(format!("dots/frame = {}", stats.dots));
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status.as_str());
                }
            });
        });
    }

    /// Builds the right-hand panel for the render parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Garden");

                ui.separator();
                ui.add(
                    egui::Slider::new(&mut self.garden.config.speed, SPEED_RANGE).text("Speed"),
                );
                ui.add(
                    egui::Slider::new(&mut self.garden.config.brush, BRUSH_RANGE).text("Brush"),
                );
                ui.checkbox(&mut self.garden.config.show_grid, "Grid");

                ui.separator();
                let mut palette = self.garden.palette_seed();
                if ui
                    .add(egui::Slider::new(&mut palette, 0.0..=0.999).text("Palette"))
                    .changed()
                {
                    self.garden.set_palette_seed(palette);
                }

                ui.separator();
                ui.label("Space pause · C clear · R palette · G grid · S export");

                ui.separator();
                if ui.button("Reset controls").clicked() {
                    self.garden.config = Config::default();
                }
            });
    }

    /// Builds the central panel where the garden is drawn and planted.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
            let rect = response.rect;
            let size = Vec2::new(rect.width(), rect.height());
            let scale = ctx.pixels_per_point();

            self.ensure_canvas(size, scale);

            if let Some(err) = &self.canvas_error {
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    format!("Unable to render: {err}"),
                    egui::FontId::proportional(16.0),
                    egui::Color32::LIGHT_RED,
                );
                return;
            }

            self.sync_viewport(size, scale);

            // Each press plants exactly one seed; touches arrive as presses too.
            let presses: Vec<Vec2> = ctx.input(|i| {
                i.events
                    .iter()
                    .filter_map(|e| match e {
                        egui::Event::PointerButton {
                            pos,
                            button: egui::PointerButton::Primary,
                            pressed: true,
                            ..
                        } => Some(Vec2::new(pos.x, pos.y)),
                        _ => None,
                    })
                    .collect()
            });
            let origin = Vec2::new(rect.min.x, rect.min.y);
            for client in presses {
                self.plant_at(client, origin);
            }

            self.pump_frame();
            self.upload_texture(ctx);

            if let Some(texture) = &self.texture {
                ui.painter_at(rect).image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
        });
    }

    /// Copies the canvas into the egui texture if it changed.
    fn upload_texture(&mut self, ctx: &egui::Context) {
        if !self.dirty {
            return;
        }
        let Some(canvas) = &self.canvas else {
            return;
        };

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [canvas.width() as usize, canvas.height() as usize],
            canvas.pixels(),
        );
        let options = egui::TextureOptions::NEAREST;
        match &mut self.texture {
            Some(texture) => texture.set(image, options),
            None => self.texture = Some(ctx.load_texture("garden", image, options)),
        }
        self.dirty = false;
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        if self.driver.state() != DriverState::Disposed {
            info!(seeds = self.garden.seed_count(), "closing viewer");
        }
        self.driver.dispose(&mut self.scheduler);
    }
}
