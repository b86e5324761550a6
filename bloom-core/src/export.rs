//! PNG snapshots of the canvas.

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use image::{ImageFormat, RgbaImage};
use tracing::info;

use crate::canvas::Canvas;

/// An encoded canvas capture.
#[derive(Clone, Debug)]
pub struct ExportedImage {
    /// Suggested file name, stamped with the capture time.
    pub filename: String,
    /// PNG-encoded bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    /// Writes the PNG into `dir` under [`ExportedImage::filename`].
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), bytes = self.bytes.len(), "garden exported");
        Ok(path)
    }
}

/// `bloom-garden-YYYYMMDD-HHMMSS.png`
pub fn export_filename(at: NaiveDateTime) -> String {
    at.format("bloom-garden-%Y%m%d-%H%M%S.png").to_string()
}

/// Encodes the canvas at full physical resolution.
///
/// Only reads the canvas.
pub fn export_png(canvas: &Canvas, at: NaiveDateTime) -> Result<ExportedImage> {
    let image = RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.pixels().to_vec())
        .context("canvas buffer does not match its dimensions")?;

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("failed to encode canvas as PNG")?;

    Ok(ExportedImage {
        filename: export_filename(at),
        bytes,
        width: canvas.width(),
        height: canvas.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{canvas::Surface, color::Rgba};
    use chrono::NaiveDate;
    use glam::Vec2;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 30)
            .unwrap()
    }

    #[test]
    fn filename_is_timestamped() {
        assert_eq!(export_filename(at()), "bloom-garden-20240309-070530.png");
    }

    #[test]
    fn png_is_a_faithful_capture() {
        let mut canvas = Canvas::new(16.0, 8.0, 2.0).unwrap();
        canvas.fill_circle(Vec2::new(8.0, 4.0), 2.0, Rgba::new(1.0, 0.0, 0.0, 1.0));
        canvas.plot(Vec2::new(0.0, 0.0), Rgba::new(0.0, 1.0, 0.0, 1.0));

        let out = export_png(&canvas, at()).unwrap();
        assert_eq!((out.width, out.height), (32, 16));

        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (32, 16));
        assert_eq!(decoded.as_raw().as_slice(), canvas.pixels());
    }

    #[test]
    fn export_does_not_touch_the_canvas() {
        let mut canvas = Canvas::new(4.0, 4.0, 1.0).unwrap();
        canvas.fill(Rgba::new(0.2, 0.4, 0.6, 1.0));
        let before = canvas.pixels().to_vec();
        export_png(&canvas, at()).unwrap();
        assert_eq!(canvas.pixels(), &before[..]);
    }

    #[test]
    fn save_in_writes_file_and_reports_missing_dir() {
        let canvas = Canvas::new(4.0, 4.0, 1.0).unwrap();
        let out = export_png(&canvas, at()).unwrap();

        let dir = std::env::temp_dir().join(format!("bloom-export-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = out.save_in(&dir).unwrap();
        assert_eq!(fs::read(&path).unwrap(), out.bytes);
        fs::remove_dir_all(&dir).unwrap();

        assert!(out.save_in(&dir.join("missing")).is_err());
    }
}
