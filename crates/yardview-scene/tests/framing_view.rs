use glam::{Vec3, Vec4Swizzles};
use proptest::prelude::*;
use yardview_core::CameraState;
use yardview_scene::{frame_boxes, Aabb, PerspectiveCamera};
use yardview_settings::FramingConfig;

const FOV: f32 = 50.0;

fn camera_at(state: &CameraState, aspect: f32) -> PerspectiveCamera {
    let mut camera = PerspectiveCamera::default();
    camera.fov = FOV;
    camera.aspect_ratio = aspect;
    camera.far = 10_000.0;
    assert!(camera.set_state(state));
    camera
}

fn assert_in_view(camera: &PerspectiveCamera, boxes: &[Aabb]) {
    let vp = camera.view_projection();
    for corner in boxes.iter().flat_map(|b| b.corners()) {
        let clip = vp * corner.extend(1.0);
        assert!(clip.w > 0.0, "{corner} behind the camera");
        let ndc = clip.xyz() / clip.w;
        assert!(
            ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0,
            "{corner} outside the frustum at {ndc}"
        );
    }
}

#[test]
fn test_flat_plant_layout_fits_widescreen_view() {
    let boxes = [
        Aabb::new(Vec3::new(-20.0, 0.0, -10.0), Vec3::new(-12.0, 5.0, -2.0)),
        Aabb::new(Vec3::new(12.0, 0.0, 2.0), Vec3::new(20.0, 4.0, 10.0)),
        Aabb::new(Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 1.0, 2.0)),
    ];
    let state = frame_boxes(&boxes, FOV, &FramingConfig::default()).unwrap();
    assert_eq!(state.target, [0.0, 2.5, 0.0]);
    assert_in_view(&camera_at(&state, 16.0 / 9.0), &boxes);
}

#[test]
fn test_single_small_object_respects_min_distance() {
    let config = FramingConfig::default();
    let boxes = [Aabb::from_center_extent(Vec3::new(4.0, 0.5, 4.0), Vec3::splat(0.2))];
    let state = frame_boxes(&boxes, FOV, &config).unwrap();
    assert!(state.distance() >= config.min_distance);
    assert_in_view(&camera_at(&state, 4.0 / 3.0), &boxes);
}

#[test]
fn test_degenerate_fov_yields_nothing() {
    let boxes = [Aabb::from_center_extent(Vec3::ZERO, Vec3::ONE)];
    let config = FramingConfig::default();
    assert!(frame_boxes(&boxes, 0.0, &config).is_none());
    assert!(frame_boxes(&boxes, 180.0, &config).is_none());
    assert!(frame_boxes(&boxes, f32::NAN, &config).is_none());
}

fn aabb() -> impl Strategy<Value = Aabb> {
    (
        (-200.0f32..200.0, 0.0f32..20.0, -200.0f32..200.0),
        (0.1f32..40.0, 0.1f32..30.0, 0.1f32..40.0),
    )
        .prop_map(|((x, y, z), (w, h, d))| {
            Aabb::new(Vec3::new(x, y, z), Vec3::new(x + w, y + h, z + d))
        })
}

proptest! {
    #[test]
    fn framed_camera_looks_at_union_center_from_above_and_in_front(
        boxes in prop::collection::vec(aabb(), 1..8),
    ) {
        let config = FramingConfig::default();
        let state = frame_boxes(&boxes, FOV, &config).unwrap();
        let center = Aabb::union_all(&boxes).center();

        prop_assert!((Vec3::from_array(state.target) - center).length() < 1e-3);
        prop_assert!(state.position[1] >= center.y + config.min_height_above_center - 1e-3);
        prop_assert!(state.position[2] > center.z);
        prop_assert!(state.distance() >= config.min_distance);
    }

    #[test]
    fn empty_boxes_do_not_move_the_frame(boxes in prop::collection::vec(aabb(), 1..6)) {
        let config = FramingConfig::default();
        let mut padded = boxes.clone();
        padded.push(Aabb::EMPTY);
        prop_assert_eq!(
            frame_boxes(&boxes, FOV, &config),
            frame_boxes(&padded, FOV, &config)
        );
    }
}
