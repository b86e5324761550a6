//! Software raster the garden is painted onto.
//!
//! [`Canvas`] is an RGBA8 buffer sized in physical pixels. Everything that
//! draws on it speaks logical, canvas-local coordinates; the canvas scales
//! them by the device pixel ratio it was last sized with. The buffer is
//! always opaque: every paint is composited source-over onto what is
//! already there.
//!
//! The compositor only talks to the [`Surface`] trait so frames can be
//! rendered onto recording doubles in tests.

use anyhow::{Result, bail};
use glam::Vec2;
use tracing::debug;

use crate::{color::Rgba, config::BACKGROUND, spawn::DrawCommand};

/// Largest allowed physical side length.
pub const MAX_DIMENSION: u32 = 16_384;

/// Drawing target for one frame.
pub trait Surface {
    /// Size in logical pixels.
    fn logical_size(&self) -> Vec2;

    /// Replaces every pixel with `color` (alpha ignored).
    fn fill(&mut self, color: Rgba);

    /// Composites `color` over the whole surface using its alpha.
    fn fade(&mut self, color: Rgba);

    /// Draws one-pixel grid lines every `step` logical pixels.
    fn draw_grid(&mut self, step: f32, color: Rgba);

    /// Paints one spawner primitive.
    fn draw(&mut self, cmd: &DrawCommand);

    /// Paints a single logical pixel.
    fn plot(&mut self, pos: Vec2, color: Rgba);
}

/// Opaque RGBA8 raster with a device-pixel-ratio transform.
#[derive(Clone, Debug)]
pub struct Canvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    logical: Vec2,
    scale: f32,
}

impl Canvas {
    /// Creates a canvas filled with [`BACKGROUND`].
    ///
    /// ### Errors
    /// Fails when the requested area is empty, the scale is not a positive
    /// finite number, or the buffer would exceed [`MAX_DIMENSION`]. A host
    /// that gets an error here has nothing to render into.
    pub fn new(logical_width: f32, logical_height: f32, scale: f32) -> Result<Self> {
        let (width, height) = physical_dims(logical_width, logical_height, scale)?;
        let mut canvas = Self {
            pixels: vec![0; width as usize * height as usize * 4],
            width,
            height,
            logical: Vec2::new(logical_width, logical_height),
            scale,
        };
        canvas.fill(BACKGROUND);
        Ok(canvas)
    }

    /// Reallocates the buffer for a new display size and reapplies the scale.
    ///
    /// The new buffer starts as [`BACKGROUND`]. Zero-area or otherwise
    /// invalid sizes leave the canvas untouched and return `false`.
    pub fn resize(&mut self, logical_width: f32, logical_height: f32, scale: f32) -> bool {
        let Ok((width, height)) = physical_dims(logical_width, logical_height, scale) else {
            debug!(logical_width, logical_height, scale, "ignoring degenerate canvas resize");
            return false;
        };

        self.width = width;
        self.height = height;
        self.logical = Vec2::new(logical_width, logical_height);
        self.scale = scale;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
        self.fill(BACKGROUND);
        debug!(width, height, scale, "canvas resized");
        true
    }

    /// Physical width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Physical height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Device pixel ratio currently applied to drawing coordinates.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Raw RGBA8 bytes, row-major, top-left first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at physical coordinates, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Filled anti-aliased circle in logical coordinates.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let c = center * self.scale;
        let r = radius.max(0.0) * self.scale;
        self.shade_box(c, r + 1.0, color, |d| (r + 0.5 - d).clamp(0.0, 1.0));
    }

    /// Anti-aliased circle outline in logical coordinates.
    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        let c = center * self.scale;
        let r = radius.max(0.0) * self.scale;
        let half = (width.max(0.0) * self.scale * 0.5).max(0.5);
        self.shade_box(c, r + half + 1.0, color, |d| {
            (half + 0.5 - (d - r).abs()).clamp(0.0, 1.0)
        });
    }

    /// Runs `coverage(distance_from_center)` over the square of `extent`
    /// around `c` (physical units) and blends `color` accordingly.
    fn shade_box(&mut self, c: Vec2, extent: f32, color: Rgba, coverage: impl Fn(f32) -> f32) {
        if !c.is_finite() || !extent.is_finite() || color.a <= 0.0 {
            return;
        }
        let Some((x0, x1)) = clip_span(c.x - extent, c.x + extent, self.width) else {
            return;
        };
        let Some((y0, y1)) = clip_span(c.y - extent, c.y + extent, self.height) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let cov = coverage(p.distance(c));
                if cov > 0.0 {
                    self.blend(x, y, color, cov);
                }
            }
        }
    }

    /// Blends a physical rectangle `[x0, x1) x [y0, y1)`.
    fn blend_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        let a = (color.a * coverage).clamp(0.0, 1.0);
        let i = self.index(x, y);
        let px = &mut self.pixels[i..i + 4];
        px[0] = blend_channel(color.r, px[0], a);
        px[1] = blend_channel(color.g, px[1], a);
        px[2] = blend_channel(color.b, px[2], a);
        px[3] = 255;
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl Surface for Canvas {
    fn logical_size(&self) -> Vec2 {
        self.logical
    }

    fn fill(&mut self, color: Rgba) {
        let [r, g, b, _] = color.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }

    fn fade(&mut self, color: Rgba) {
        let a = color.a.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = blend_channel(color.r, px[0], a);
            px[1] = blend_channel(color.g, px[1], a);
            px[2] = blend_channel(color.b, px[2], a);
            px[3] = 255;
        }
    }

    fn draw_grid(&mut self, step: f32, color: Rgba) {
        if !(step.is_finite() && step > 0.0) {
            return;
        }
        let (w, h) = (self.width, self.height);

        let mut x = 0.0;
        while x < self.logical.x {
            let px = (x * self.scale).round() as u32;
            self.blend_rect(px, 0, px + 1, h, color);
            x += step;
        }

        let mut y = 0.0;
        while y < self.logical.y {
            let py = (y * self.scale).round() as u32;
            self.blend_rect(0, py, w, py + 1, color);
            y += step;
        }
    }

    fn draw(&mut self, cmd: &DrawCommand) {
        match *cmd {
            DrawCommand::Dot {
                center,
                radius,
                color,
            } => self.fill_circle(center, radius, color.to_rgba()),
            DrawCommand::Ring {
                center,
                radius,
                width,
                color,
            } => self.stroke_circle(center, radius, width, color.to_rgba()),
        }
    }

    fn plot(&mut self, pos: Vec2, color: Rgba) {
        if !pos.is_finite() || pos.x < 0.0 || pos.y < 0.0 {
            return;
        }
        let x0 = (pos.x * self.scale).floor() as u32;
        let y0 = (pos.y * self.scale).floor() as u32;
        let side = self.scale.ceil().max(1.0) as u32;
        self.blend_rect(x0, y0, x0.saturating_add(side), y0.saturating_add(side), color);
    }
}

/// Physical buffer dimensions for a logical size and scale.
fn physical_dims(logical_width: f32, logical_height: f32, scale: f32) -> Result<(u32, u32)> {
    if !(scale.is_finite() && scale > 0.0) {
        bail!("invalid device pixel ratio {scale}");
    }
    if !(logical_width.is_finite() && logical_height.is_finite())
        || logical_width <= 0.0
        || logical_height <= 0.0
    {
        bail!("canvas has no drawable area ({logical_width} x {logical_height})");
    }

    let w = (logical_width * scale).ceil();
    let h = (logical_height * scale).ceil();
    if w > MAX_DIMENSION as f32 || h > MAX_DIMENSION as f32 {
        bail!("canvas of {w} x {h} pixels exceeds the {MAX_DIMENSION} pixel limit");
    }
    Ok((w as u32, h as u32))
}

/// Clips the float span `[lo, hi]` to pixel indices `[0, len)`.
fn clip_span(lo: f32, hi: f32, len: u32) -> Option<(u32, u32)> {
    let lo = lo.floor().max(0.0);
    let hi = (hi.ceil() + 1.0).min(len as f32);
    if hi <= lo {
        return None;
    }
    Some((lo as u32, hi as u32))
}

#[inline]
fn blend_channel(src: f32, dst: u8, alpha: f32) -> u8 {
    let s = src.clamp(0.0, 1.0) * 255.0;
    (s * alpha + dst as f32 * (1.0 - alpha)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Hsla;

    const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    fn bg() -> [u8; 4] {
        let [r, g, b, _] = BACKGROUND.to_rgba8();
        [r, g, b, 255]
    }

    #[test]
    fn new_canvas_is_background_at_physical_resolution() {
        let c = Canvas::new(10.0, 5.0, 2.0).unwrap();
        assert_eq!((c.width(), c.height()), (20, 10));
        assert_eq!(c.pixels().len(), 20 * 10 * 4);
        assert_eq!(c.logical_size(), Vec2::new(10.0, 5.0));
        assert!(c.pixels().chunks_exact(4).all(|p| p == bg()));
    }

    #[test]
    fn new_rejects_unusable_dimensions() {
        assert!(Canvas::new(0.0, 10.0, 1.0).is_err());
        assert!(Canvas::new(10.0, -1.0, 1.0).is_err());
        assert!(Canvas::new(10.0, 10.0, 0.0).is_err());
        assert!(Canvas::new(10.0, 10.0, f32::NAN).is_err());
        assert!(Canvas::new(100_000.0, 10.0, 1.0).is_err());
    }

    #[test]
    fn zero_area_resize_is_a_no_op() {
        let mut c = Canvas::new(8.0, 8.0, 1.0).unwrap();
        c.fill(WHITE);
        assert!(!c.resize(0.0, 20.0, 1.0));
        assert_eq!((c.width(), c.height()), (8, 8));
        assert_eq!(c.pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn resize_reallocates_and_reapplies_scale() {
        let mut c = Canvas::new(8.0, 8.0, 1.0).unwrap();
        assert!(c.resize(30.0, 20.0, 1.5));
        assert_eq!((c.width(), c.height()), (45, 30));
        assert_eq!(c.scale(), 1.5);
        assert_eq!(c.logical_size(), Vec2::new(30.0, 20.0));

        // Logical (10, 10) lands on physical (15, 15).
        c.fill_circle(Vec2::new(10.0, 10.0), 1.0, WHITE);
        assert_eq!(c.pixel(15, 15), Some([255, 255, 255, 255]));
    }

    #[test]
    fn fade_moves_towards_overlay_without_reaching_it_at_once() {
        let mut c = Canvas::new(2.0, 2.0, 1.0).unwrap();
        c.fill(WHITE);
        c.fade(Rgba::new(0.0, 0.0, 0.0, 0.12));
        let [r, _, _, a] = c.pixel(0, 0).unwrap();
        assert_eq!(a, 255);
        assert_eq!(r, 224);

        for _ in 0..100 {
            c.fade(Rgba::new(0.0, 0.0, 0.0, 0.12));
        }
        assert!(c.pixel(1, 1).unwrap()[0] < 10);
    }

    #[test]
    fn fill_circle_covers_center_but_not_far_corner() {
        let mut c = Canvas::new(20.0, 20.0, 1.0).unwrap();
        c.fill_circle(Vec2::new(10.0, 10.0), 3.0, WHITE);
        assert_eq!(c.pixel(10, 10), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(0, 0), Some(bg()));
        assert_eq!(c.pixel(19, 19), Some(bg()));
    }

    #[test]
    fn stroke_circle_leaves_center_untouched() {
        let mut c = Canvas::new(40.0, 40.0, 1.0).unwrap();
        c.stroke_circle(Vec2::new(20.0, 20.0), 10.0, 1.0, WHITE);
        assert_eq!(c.pixel(20, 20), Some(bg()));
        assert_ne!(c.pixel(30, 20), Some(bg()));
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut c = Canvas::new(10.0, 10.0, 1.0).unwrap();
        c.fill_circle(Vec2::new(-50.0, -50.0), 5.0, WHITE);
        c.fill_circle(Vec2::new(500.0, 5.0), 5.0, WHITE);
        c.fill_circle(Vec2::new(f32::NAN, 5.0), 5.0, WHITE);
        c.plot(Vec2::new(-1.0, 3.0), WHITE);
        c.plot(Vec2::new(30.0, 3.0), WHITE);
        assert!(c.pixels().chunks_exact(4).all(|p| p == bg()));
    }

    #[test]
    fn grid_draws_lines_at_step() {
        let mut c = Canvas::new(100.0, 100.0, 1.0).unwrap();
        c.draw_grid(40.0, WHITE);
        assert_eq!(c.pixel(40, 7), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(7, 80), Some([255, 255, 255, 255]));
        assert_eq!(c.pixel(20, 20), Some(bg()));
    }

    #[test]
    fn plot_covers_one_logical_pixel() {
        let mut c = Canvas::new(10.0, 10.0, 2.0).unwrap();
        c.plot(Vec2::new(3.2, 4.7), WHITE);
        for (x, y) in [(6, 9), (7, 9), (6, 10), (7, 10)] {
            assert_eq!(c.pixel(x, y), Some([255, 255, 255, 255]));
        }
        assert_eq!(c.pixel(8, 9), Some(bg()));
    }

    #[test]
    fn draw_dispatches_dots_and_rings() {
        let mut c = Canvas::new(40.0, 40.0, 1.0).unwrap();
        c.draw(&DrawCommand::Dot {
            center: Vec2::new(5.0, 5.0),
            radius: 2.0,
            color: Hsla::new(0.0, 1.0, 0.5, 1.0),
        });
        assert_eq!(c.pixel(5, 5), Some([255, 0, 0, 255]));

        c.draw(&DrawCommand::Ring {
            center: Vec2::new(20.0, 20.0),
            radius: 8.0,
            width: 1.0,
            color: Hsla::new(120.0, 1.0, 0.5, 1.0),
        });
        assert_eq!(c.pixel(20, 20), Some(bg()));
        assert_eq!(c.pixel(28, 20).map(|p| p[1] > 100), Some(true));
    }
}
