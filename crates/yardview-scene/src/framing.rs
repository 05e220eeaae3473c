//! Camera placement that brings a set of objects into view.

use glam::Vec3;
use yardview_core::CameraState;
use yardview_settings::FramingConfig;

use crate::bounds::Aabb;

/// Compute a camera pose framing the union of `boxes`.
///
/// The camera sits in front of the union center (toward +Z), raised above
/// it, and looks at the center. Returns `None` when there is nothing to
/// frame or the boxes contain non-finite values.
pub fn frame_boxes(
    boxes: &[Aabb],
    fov_degrees: f32,
    config: &FramingConfig,
) -> Option<CameraState> {
    let union = Aabb::union_all(boxes.iter().filter(|b| !b.is_empty()));
    if union.is_empty() || !union.is_finite() {
        return None;
    }
    if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
        tracing::debug!(fov_degrees, "cannot frame with degenerate field of view");
        return None;
    }

    let center = union.center();
    let extent = union.extent();
    let max_dim = extent.max_element();

    let half_fov = (fov_degrees * 0.5).to_radians();
    let distance = (max_dim / (2.0 * half_fov.tan()) * config.padding).max(config.min_distance);

    let mut height = if extent.y < config.flatness_ratio * max_dim {
        // Flat layouts read better from higher up
        center.y + config.flat_height_factor * distance
    } else {
        center.y
            + (config.height_extent_factor * extent.y).max(config.height_max_dim_factor * max_dim)
    };
    height = height.max(center.y + config.min_height_above_center);

    let position = Vec3::new(center.x, height, center.z + distance);
    if !position.is_finite() {
        return None;
    }
    Some(CameraState::new(position.to_array(), center.to_array()))
}
