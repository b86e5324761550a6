//! Animation driver: decides when a frame is rendered.
//!
//! The driver owns no simulation state. It holds at most one pending
//! [`FrameToken`] handed out by the host's [`FrameScheduler`] and, each
//! time the host delivers that token, answers whether to render. A
//! rendered frame immediately requests the next one, so the loop runs at
//! whatever rate the host refreshes at.
//!
//! ```text
//! Idle --mount--> Running <--set_running--> Paused
//!                    \                        /
//!                     `------dispose---------'--> Disposed
//! ```

use tracing::{debug, info};

/// Handle for one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Host-side source of frame callbacks (a display refresh, a repaint
/// request, a test frames_log).
pub trait FrameScheduler {
    /// Requests one callback at the next refresh.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraws a pending request. Unknown tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Paused,
    Disposed,
}

/// What the host should do with a delivered frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDecision {
    Render,
    Skip,
}

/// Display size the canvas should be backed at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical width.
    pub width: f32,
    /// Logical height.
    pub height: f32,
    /// Device pixel ratio.
    pub scale: f32,
}

impl Viewport {
    fn is_usable(&self) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.scale.is_finite()
            && self.width > 0.0
            && self.height > 0.0
            && self.scale > 0.0
    }
}

#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    pending: Option<FrameToken>,
    frames: u64,
    viewport: Option<Viewport>,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Idle,
            pending: None,
            frames: 0,
            viewport: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Number of frames this driver has approved for rendering.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Token of the callback currently requested from the host, if any.
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Starts the loop. Only meaningful from [`DriverState::Idle`].
    ///
    /// ### Returns
    /// `true` if the driver transitioned to `Running`.
    pub fn mount(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        if self.state != DriverState::Idle {
            return false;
        }
        self.state = DriverState::Running;
        self.pending = Some(scheduler.request_frame());
        info!("animation driver mounted");
        true
    }

    /// Follows the garden's running flag.
    ///
    /// Pausing leaves any in-flight request alone; it is skipped when it
    /// fires and nothing new is requested. Resuming requests a frame unless
    /// one is still in flight.
    pub fn set_running(&mut self, running: bool, scheduler: &mut impl FrameScheduler) {
        match (self.state, running) {
            (DriverState::Running, false) => {
                self.state = DriverState::Paused;
                info!(frames = self.frames, "animation paused");
            }
            (DriverState::Paused, true) => {
                self.state = DriverState::Running;
                if self.pending.is_none() {
                    self.pending = Some(scheduler.request_frame());
                }
                info!(frames = self.frames, "animation resumed");
            }
            _ => {}
        }
    }

    /// Handles a delivered frame callback.
    ///
    /// Tokens that are not the one currently pending (cancelled, superseded
    /// or delivered after disposal) are always skipped. A `Render` decision
    /// has already requested the following frame.
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        scheduler: &mut impl FrameScheduler,
    ) -> FrameDecision {
        if self.pending != Some(token) {
            return FrameDecision::Skip;
        }
        self.pending = None;

        match self.state {
            DriverState::Running => {
                self.frames += 1;
                self.pending = Some(scheduler.request_frame());
                FrameDecision::Render
            }
            DriverState::Idle | DriverState::Paused | DriverState::Disposed => FrameDecision::Skip,
        }
    }

    /// Records a new display size.
    ///
    /// ### Returns
    /// The viewport the canvas should now be resized to, or `None` when
    /// the size is unchanged, has no area, or the driver is disposed.
    pub fn resize(&mut self, width: f32, height: f32, scale: f32) -> Option<Viewport> {
        if self.state == DriverState::Disposed {
            return None;
        }
        let next = Viewport {
            width,
            height,
            scale,
        };
        if !next.is_usable() || self.viewport == Some(next) {
            return None;
        }
        self.viewport = Some(next);
        debug!(width, height, scale, "viewport changed");
        Some(next)
    }

    /// Puts back a viewport the canvas could not be resized to.
    ///
    /// Without this, a later resize event with the rejected size would be
    /// treated as unchanged and the canvas would stay at its old size.
    pub fn restore_viewport(&mut self, viewport: Option<Viewport>) {
        if self.state != DriverState::Disposed {
            self.viewport = viewport;
        }
    }

    /// Stops the loop for good. Safe to call repeatedly and from any state.
    pub fn dispose(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.state == DriverState::Disposed {
            return;
        }
        if let Some(token) = self.pending.take() {
            scheduler.cancel_frame(token);
        }
        self.state = DriverState::Disposed;
        info!(frames = self.frames, "animation driver disposed");
    }
}
