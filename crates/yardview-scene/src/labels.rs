//! Annotation label layout.
//!
//! Labels float above their equipment. Each frame the anchor (top center
//! of the object's bounds plus a vertical offset) is projected through the
//! same camera as the raster pass into the label layer's logical pixels.

use glam::{Mat4, Vec2, Vec3, Vec4};
use yardview_core::Annotation;
use yardview_settings::LabelConfig;

use crate::lifecycle::LifecycleManager;
use crate::scene_graph::SceneGraph;
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub tag: String,
    pub text: String,
    /// Logical pixels from the top-left of the label layer
    pub position: Vec2,
    /// False when the anchor is behind the camera or outside the depth range
    pub visible: bool,
}

/// Project a world point into logical pixels. `None` behind the camera.
pub fn project(point: Vec3, view_projection: &Mat4, viewport: &Viewport) -> Option<Vec2> {
    let clip = *view_projection * Vec4::new(point.x, point.y, point.z, 1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if !ndc.is_finite() || ndc.z < -1.0 || ndc.z > 1.0 {
        return None;
    }
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width() as f32,
        (1.0 - ndc.y) * 0.5 * viewport.height() as f32,
    ))
}

#[derive(Debug)]
pub struct LabelLayout {
    viewport: Viewport,
    vertical_offset: f32,
    placements: Vec<LabelPlacement>,
}

impl LabelLayout {
    pub fn new(config: &LabelConfig) -> Self {
        Self {
            viewport: Viewport::default(),
            vertical_offset: config.vertical_offset,
            placements: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn placements(&self) -> &[LabelPlacement] {
        &self.placements
    }

    /// Recompute placements. Annotations on tags that are not live are skipped.
    pub fn layout(
        &mut self,
        annotations: &[Annotation],
        annotations_visible: bool,
        lifecycle: &LifecycleManager,
        graph: &SceneGraph,
        view_projection: &Mat4,
    ) -> &[LabelPlacement] {
        self.placements.clear();
        if !annotations_visible {
            return &self.placements;
        }

        for annotation in annotations {
            let bounds = lifecycle.object_bounds(graph, &annotation.tag);
            if bounds.is_empty() {
                continue;
            }
            let center = bounds.center();
            let anchor = Vec3::new(center.x, bounds.max.y + self.vertical_offset, center.z);
            let projected = project(anchor, view_projection, &self.viewport);
            self.placements.push(LabelPlacement {
                tag: annotation.tag.clone(),
                text: annotation.headline().to_string(),
                position: projected.unwrap_or(Vec2::ZERO),
                visible: projected.is_some(),
            });
        }
        &self.placements
    }
}
