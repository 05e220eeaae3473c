//! Surface dimensions shared by every stage of the renderer chain.

/// Size of the drawing surface in logical pixels plus the device scale.
///
/// Dimensions are floored to 1 so a collapsed widget never produces a
/// zero-sized framebuffer or a NaN aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
    scale_factor: u32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_scale(width, height, 1)
    }

    pub fn with_scale(width: i32, height: i32, scale_factor: i32) -> Self {
        Self {
            width: width.max(1) as u32,
            height: height.max(1) as u32,
            scale_factor: scale_factor.max(1) as u32,
        }
    }

    /// Logical width (pointer and label coordinates).
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale_factor(&self) -> u32 {
        self.scale_factor
    }

    /// Framebuffer size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (self.width * self.scale_factor, self.height * self.scale_factor)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1)
    }
}
