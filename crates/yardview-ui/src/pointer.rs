//! Pointer bookkeeping shared by the click and drag gestures.

/// Travel in logical pixels beyond which a press is a drag, not a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Tracks one press from drag-begin to release.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    last: (f64, f64),
    dragged: bool,
}

impl DragTracker {
    pub fn begin(&mut self) {
        *self = Self::default();
    }

    /// Feed the gesture's cumulative offset; returns the step since the
    /// previous update.
    pub fn update(&mut self, offset_x: f64, offset_y: f64) -> (f32, f32) {
        let (last_x, last_y) = self.last;
        self.last = (offset_x, offset_y);
        if !within_click_slop(offset_x, offset_y) {
            self.dragged = true;
        }
        ((offset_x - last_x) as f32, (offset_y - last_y) as f32)
    }

    /// Whether the press moved far enough to count as a drag. Once set it
    /// stays set until the next [`begin`](Self::begin).
    pub fn dragged(&self) -> bool {
        self.dragged
    }
}

pub fn within_click_slop(dx: f64, dy: f64) -> bool {
    dx.hypot(dy) <= CLICK_SLOP
}
