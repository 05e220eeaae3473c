use serde::{Deserialize, Serialize};

/// Camera placement: eye position and look-at target.
///
/// A plain value. It can be assigned to the live camera or stored in a
/// history entry; equality is exact so undo/redo round trips can be checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl CameraState {
    pub const fn new(position: [f32; 3], target: [f32; 3]) -> Self {
        Self { position, target }
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(self.target.iter())
            .all(|v| v.is_finite())
    }

    /// Eye-to-target distance.
    pub fn distance(&self) -> f32 {
        let d = [
            self.target[0] - self.position[0],
            self.target[1] - self.position[1],
            self.target[2] - self.position[2],
        ];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: [60.0, 45.0, 60.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}
