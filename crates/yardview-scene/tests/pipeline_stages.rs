mod common;

use yardview_core::{Annotation, LayerTable, SceneError};
use yardview_scene::{
    ColorMode, LoopState, Pipeline, RenderLoop, ResourceEvent, TickOutcome, Viewport,
};
use yardview_settings::SceneConfig;

use common::{plant, tank, RecordingCompositor};

fn pipeline() -> Pipeline {
    Pipeline::new(&SceneConfig::default())
}

#[test]
fn test_resize_before_setup_is_ignored() {
    let mut pipeline = pipeline();
    assert!(!pipeline.resize(1024, 768, 1));
    assert_eq!(pipeline.viewport(), Viewport::default());
    assert!(matches!(pipeline.render(), Err(SceneError::NotInitialized)));
}

#[test]
fn test_all_stages_share_one_size() {
    let mut pipeline = pipeline();
    let (compositor, log) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(800, 600))
        .unwrap();

    let dims = pipeline.dimensions();
    assert_eq!(dims.raster, (800, 600));
    assert_eq!(dims.outline, dims.raster);
    assert_eq!(dims.labels, (800, 600));
    assert!((dims.camera_aspect - 800.0 / 600.0).abs() < 1e-6);

    // HiDPI: device-pixel targets, logical-pixel labels
    assert!(pipeline.resize(1280, 720, 2));
    let dims = pipeline.dimensions();
    assert_eq!(dims.raster, (2560, 1440));
    assert_eq!(dims.outline, (2560, 1440));
    assert_eq!(dims.labels, (1280, 720));
    assert!((dims.camera_aspect - 1280.0 / 720.0).abs() < 1e-6);

    let resizes = &log.lock().resizes;
    assert_eq!(
        resizes.as_slice(),
        &[((800, 600), (800, 600)), ((2560, 1440), (2560, 1440))]
    );
}

#[test]
fn test_zero_size_is_clamped() {
    let mut pipeline = pipeline();
    let (compositor, _log) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(0, 0))
        .unwrap();
    let dims = pipeline.dimensions();
    assert_eq!(dims.raster, (1, 1));
    assert!(dims.camera_aspect.is_finite());
}

#[test]
fn test_second_setup_is_rejected() {
    let mut pipeline = pipeline();
    let (first, _) = RecordingCompositor::new();
    let (second, second_log) = RecordingCompositor::new();
    pipeline.setup(first.boxed(), Viewport::new(10, 10)).unwrap();
    assert!(pipeline.setup(second.boxed(), Viewport::new(10, 10)).is_err());
    assert!(second_log.lock().resizes.is_empty());
    assert!(pipeline.is_initialized());
}

#[test]
fn test_failed_resize_during_setup_disposes_compositor() {
    let mut pipeline = pipeline();
    let (compositor, log) = RecordingCompositor::failing_resize();
    let err = pipeline
        .setup(compositor.boxed(), Viewport::new(10, 10))
        .unwrap_err();
    assert!(matches!(err, SceneError::Framebuffer(_)));
    assert!(!pipeline.is_initialized());
    assert_eq!(log.lock().disposed, 1);
}

#[test]
fn test_removed_equipment_releases_gpu_resources() {
    let mut pipeline = pipeline();
    let (compositor, log) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(320, 240))
        .unwrap();
    let layers = LayerTable::with_default_layers();

    // Identical tanks share one geometry
    let equipment = vec![tank("T1", [0.0, 2.5, 0.0]), tank("T2", [9.0, 2.5, 0.0])];
    pipeline.reconcile(&equipment, &layers, ColorMode::Base);
    let geometry = pipeline
        .graph()
        .node(pipeline.lifecycle().mesh_node_for("T1").unwrap())
        .and_then(|n| n.geometry)
        .unwrap();
    assert_eq!(pipeline.pool().geometry_ref_count(geometry), 2);
    // Tank geometry plus the ground plane
    assert_eq!(pipeline.pool().live_geometries(), 2);
    assert_eq!(pipeline.pool().live_materials(), 3);
    pipeline.render().unwrap();

    pipeline.reconcile(&equipment[..1], &layers, ColorMode::Base);
    assert_eq!(pipeline.pool().geometry_ref_count(geometry), 1);
    assert_eq!(pipeline.pool().live_materials(), 2);

    pipeline.reconcile(&[], &layers, ColorMode::Base);
    assert_eq!(pipeline.pool().geometry_ref_count(geometry), 0);
    assert_eq!(pipeline.pool().live_geometries(), 1);
    pipeline.render().unwrap();

    let log = log.lock();
    assert!(log
        .resource_events
        .contains(&ResourceEvent::GeometryCreated(geometry)));
    assert!(log
        .resource_events
        .contains(&ResourceEvent::GeometryDisposed(geometry)));
    assert_eq!(log.draws_last_frame, 1);
}

#[test]
fn test_teardown_releases_everything() {
    let mut pipeline = pipeline();
    let (compositor, log) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(320, 240))
        .unwrap();
    pipeline.reconcile(&plant(), &LayerTable::with_default_layers(), ColorMode::Base);

    assert!(pipeline.teardown());
    assert!(!pipeline.teardown());
    assert_eq!(pipeline.pool().live_geometries(), 0);
    assert_eq!(pipeline.pool().live_materials(), 0);
    assert!(pipeline.lifecycle().is_empty());
    assert!(pipeline.graph().is_empty());
    assert_eq!(log.lock().disposed, 1);
}

#[test]
fn test_labels_follow_live_equipment() {
    let mut pipeline = pipeline();
    let (compositor, _log) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(800, 600))
        .unwrap();
    let mut layers = LayerTable::with_default_layers();
    pipeline.reconcile(&plant(), &layers, ColorMode::Base);
    pipeline.set_annotations(vec![
        Annotation::new("T1", "Inspect level sensor\nopened 08:00"),
        Annotation::new("GONE", "not in the scene"),
    ]);

    pipeline.render().unwrap();
    let labels = pipeline.labels();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].tag, "T1");
    assert_eq!(labels[0].text, "Inspect level sensor");
    assert!(labels[0].visible);
    // Anchored above the tank, so higher on screen than the camera target
    assert!(labels[0].position.y < 300.0);

    layers.set_visible("annotations", false).unwrap();
    pipeline.reconcile(&plant(), &layers, ColorMode::Base);
    pipeline.render().unwrap();
    assert!(pipeline.labels().is_empty());
}

#[test]
fn test_render_loop_drives_frames_until_cancelled() {
    let mut pipeline = pipeline();
    let mut render_loop = RenderLoop::new();
    assert_eq!(
        render_loop.tick(&mut pipeline).unwrap(),
        TickOutcome::Skipped
    );

    let (compositor, log) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(320, 240))
        .unwrap();
    assert_eq!(
        render_loop.tick(&mut pipeline).unwrap(),
        TickOutcome::Skipped
    );

    assert!(render_loop.start());
    for _ in 0..3 {
        assert!(matches!(
            render_loop.tick(&mut pipeline).unwrap(),
            TickOutcome::Rendered { .. }
        ));
    }
    assert_eq!(render_loop.ticks(), 3);
    assert_eq!(pipeline.frames(), 3);

    assert!(render_loop.cancel());
    assert_eq!(render_loop.state(), LoopState::Cancelled);
    assert_eq!(
        render_loop.tick(&mut pipeline).unwrap(),
        TickOutcome::Skipped
    );
    assert_eq!(log.lock().renders, 3);
}

#[test]
fn test_orbit_motion_reports_camera_moved() {
    let mut pipeline = pipeline();
    let (compositor, _log) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(320, 240))
        .unwrap();
    let mut render_loop = RenderLoop::new();
    render_loop.start();

    let before = pipeline.camera().state();
    pipeline.controls_mut().rotate(40.0, 0.0);
    assert_eq!(
        render_loop.tick(&mut pipeline).unwrap(),
        TickOutcome::Rendered { camera_moved: true }
    );
    assert_ne!(pipeline.camera().state(), before);

    // A programmatic assignment suspends damping for exactly one tick
    let pose = yardview_core::CameraState::new([5.0, 5.0, 5.0], [0.0, 0.0, 0.0]);
    assert!(pipeline.assign_camera(&pose));
    assert_eq!(
        render_loop.tick(&mut pipeline).unwrap(),
        TickOutcome::Rendered {
            camera_moved: false
        }
    );
    assert_eq!(pipeline.camera().state(), pose);
}
