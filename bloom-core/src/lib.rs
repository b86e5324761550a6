//! Engine for an interactive generative seed garden.
//!
//! Pointer presses plant seeds; every frame each seed grows a little and
//! scatters colour-shifting dots around itself onto a canvas that fades
//! slowly, leaving trails.
//!
//! Main components:
//! - [`seed`] — the planted growth point.
//! - [`growth`] — per-tick growth and expiry.
//! - [`spawn`] — stochastic dots and ring pulses around a seed.
//! - [`compositor`] — one full frame: fade, grid, seeds, ambience.
//! - [`driver`] — the frame loop state machine.
//! - [`garden`] — engine state and the commands the UI calls.
//! - [`canvas`] — the software raster frames are painted on.
//! - [`interaction`] — pointer coordinates to canvas coordinates.
//! - [`export`] — PNG capture of the canvas.
//! - [`config`], [`color`], [`types`] — shared settings and values.

pub mod canvas;
pub mod color;
pub mod compositor;
pub mod config;
pub mod driver;
pub mod export;
pub mod garden;
pub mod growth;
pub mod interaction;
pub mod seed;
pub mod spawn;
pub mod types;
