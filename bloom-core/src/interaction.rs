//! Pointer input to canvas-local positions.

use glam::Vec2;

/// A press on the canvas, in viewport coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    MouseDown { client: Vec2 },
    /// Touch start with every active touch point. Only the first is used.
    TouchStart { touches: Vec<Vec2> },
}

/// Viewport position of the press, if there is one.
pub fn pointer_position(event: &PointerEvent) -> Option<Vec2> {
    match event {
        PointerEvent::MouseDown { client } => Some(*client),
        PointerEvent::TouchStart { touches } => touches.first().copied(),
    }
}

/// Converts a viewport position into canvas-local coordinates.
///
/// `canvas_origin` is the on-screen top-left corner of the canvas.
#[inline]
pub fn to_canvas_local(client: Vec2, canvas_origin: Vec2) -> Vec2 {
    client - canvas_origin
}

/// Canvas-local position of a press, or `None` if it has no position or
/// falls outside a canvas of `canvas_size`.
pub fn press_on_canvas(
    event: &PointerEvent,
    canvas_origin: Vec2,
    canvas_size: Vec2,
) -> Option<Vec2> {
    let local = to_canvas_local(pointer_position(event)?, canvas_origin);
    let inside =
        local.x >= 0.0 && local.y >= 0.0 && local.x < canvas_size.x && local.y < canvas_size.y;
    inside.then_some(local)
}
