mod common;

use std::cell::Cell;
use std::collections::BTreeSet;
use std::sync::Arc;
use yardview_core::{CameraState, EventBus, Result, SceneError, SceneEvent};
use yardview_scene::{
    ClickResolution, ColorMode, Compositor, CompositorFactory, OutlineKind, SceneController,
    TickOutcome, Viewport,
};
use yardview_settings::SceneConfig;

use common::{plant, record_events, tank, RecordingCompositor};

fn controller() -> (SceneController, Arc<EventBus>) {
    let bus = Arc::new(EventBus::new());
    let mut controller = SceneController::new(SceneConfig::default(), Arc::clone(&bus));
    controller.set_equipment(plant());
    (controller, bus)
}

fn click(tag: Option<&str>, multi_select: bool) -> ClickResolution {
    ClickResolution {
        tag: tag.map(str::to_string),
        multi_select,
    }
}

fn selection(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn close(a: [f32; 3], b: [f32; 3]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
}

#[test]
fn test_tank_is_built_from_its_shape_and_color() {
    let bus = Arc::new(EventBus::new());
    let mut controller = SceneController::new(SceneConfig::default(), bus);
    let report = controller.set_equipment(vec![tank("T1", [0.0, 2.5, 0.0])]);
    assert_eq!(report.created, 1);

    let pipeline = controller.pipeline();
    let mesh = pipeline.lifecycle().mesh_node_for("T1").unwrap();
    let node = pipeline.graph().node(mesh).unwrap();
    assert_eq!(
        node.primitive,
        yardview_scene::Primitive::Cylinder {
            radius: 3.0,
            half_height: 2.5
        }
    );

    let material = pipeline.pool().material(node.material.unwrap()).unwrap();
    let expected = yardview_core::Rgb::from_hex("#4FC3F7").unwrap().to_array();
    assert!(close(material.color(), expected));
    assert!(!material.is_transparent());
}

#[test]
fn test_click_sequence_builds_selection() {
    let (mut controller, bus) = controller();
    let events = record_events(&bus);

    assert!(controller.apply_click(&click(Some("T1"), false)));
    assert!(controller.apply_click(&click(Some("V1"), true)));
    assert_eq!(controller.selection(), &selection(&["T1", "V1"]));

    assert!(controller.apply_click(&click(Some("B1"), false)));
    assert_eq!(controller.selection(), &selection(&["B1"]));

    // Multi-select on the background changes nothing and records nothing
    let len = controller.history().len();
    assert!(!controller.apply_click(&click(None, true)));
    assert_eq!(controller.history().len(), len);

    assert!(controller.undo());
    assert_eq!(controller.selection(), &selection(&["T1", "V1"]));

    let last_selection = events.lock().iter().rev().find_map(|e| match e {
        SceneEvent::SelectionChanged { selection } => Some(selection.clone()),
        _ => None,
    });
    assert_eq!(last_selection, Some(vec!["T1".to_string(), "V1".to_string()]));
}

#[test]
fn test_layer_toggle_and_undo_round_trip() {
    let (mut controller, bus) = controller();
    let events = record_events(&bus);
    assert_eq!(controller.pipeline().lifecycle().len(), 4);

    assert!(controller.toggle_layer("tanks"));
    let lifecycle = controller.pipeline().lifecycle();
    assert_eq!(lifecycle.len(), 2);
    assert!(!lifecycle.contains("T1"));
    assert!(!lifecycle.contains("T2"));
    assert!(events.lock().contains(&SceneEvent::LayerVisibilityChanged {
        layer_id: "tanks".to_string(),
        visible: false,
    }));

    assert!(controller.undo());
    assert_eq!(controller.pipeline().lifecycle().len(), 4);
    assert!(controller.pipeline().lifecycle().contains("T1"));

    assert!(controller.redo());
    assert_eq!(controller.pipeline().lifecycle().len(), 2);
}

#[test]
fn test_all_layer_hides_every_equipment_type() {
    let (mut controller, _bus) = controller();
    assert!(controller.toggle_layer("all"));
    assert!(controller.pipeline().lifecycle().is_empty());
    assert!(controller.pipeline().lifecycle().terrain_node().is_some());

    assert!(!controller.toggle_layer("no-such-layer"));
    assert!(controller.undo());
    assert_eq!(controller.pipeline().lifecycle().len(), 4);
}

#[test]
fn test_live_objects_match_visible_equipment() {
    let (mut controller, _bus) = controller();
    controller.toggle_layer("valves");

    let expected: BTreeSet<&str> = ["B1", "T1", "T2"].into();
    let live: BTreeSet<&str> = controller.pipeline().lifecycle().tags().collect();
    assert_eq!(live, expected);

    let tagged = controller.pipeline().graph().tagged_nodes().count();
    assert_eq!(tagged, expected.len());
}

#[test]
fn test_outline_follows_selection_then_hover() {
    let (mut controller, _bus) = controller();
    assert!(!controller.pipeline().outline().is_active());

    controller.apply_click(&click(Some("T2"), false));
    let t2 = controller.pipeline().lifecycle().mesh_node_for("T2").unwrap();
    let outline = controller.pipeline().outline();
    assert_eq!(outline.kind, OutlineKind::Selected);
    assert_eq!(outline.targets, vec![t2]);

    // Selected equipment hidden by a layer leaves nothing to outline
    controller.toggle_layer("tanks");
    assert!(!controller.pipeline().outline().is_active());
    assert_eq!(controller.selection(), &selection(&["T2"]));

    controller.undo();
    let t2 = controller.pipeline().lifecycle().mesh_node_for("T2").unwrap();
    assert_eq!(controller.pipeline().outline().targets, vec![t2]);
}

#[test]
fn test_focus_frames_system_and_is_undoable() {
    let (mut controller, bus) = controller();
    let events = record_events(&bus);
    let initial = controller.pipeline().camera().state();

    let completed = Cell::new(None);
    assert!(controller.focus_system("cooling", |framed| completed.set(Some(framed))));
    assert_eq!(completed.get(), Some(true));

    // Union of T1, T2 and V1 bounds
    let state = controller.pipeline().camera().state();
    assert!(close(state.target, [6.0, 2.5, 0.75]));
    assert!(state.position[1] > state.target[1]);
    assert!(state.position[2] > state.target[2]);

    {
        let events = events.lock();
        assert!(events.contains(&SceneEvent::CameraChanged(state)));
        assert!(events.contains(&SceneEvent::FocusCompleted {
            system: "cooling".to_string(),
            framed: true,
        }));
    }

    assert!(controller.undo());
    assert_eq!(controller.pipeline().camera().state(), initial);
}

#[test]
fn test_focus_on_empty_system_still_completes() {
    let (mut controller, bus) = controller();
    let events = record_events(&bus);

    let completed = Cell::new(None);
    assert!(!controller.focus_system("flare", |framed| completed.set(Some(framed))));
    assert_eq!(completed.get(), Some(false));
    assert!(!controller.can_undo());
    assert!(events.lock().contains(&SceneEvent::FocusCompleted {
        system: "flare".to_string(),
        framed: false,
    }));
}

#[test]
fn test_move_camera_rejects_non_finite_pose() {
    let (mut controller, _bus) = controller();
    let bad = CameraState::new([f32::NAN, 1.0, 1.0], [0.0; 3]);
    assert!(!controller.move_camera(bad));
    assert!(!controller.can_undo());

    let pose = CameraState::new([10.0, 20.0, 30.0], [1.0, 0.0, 1.0]);
    assert!(controller.move_camera(pose));
    assert_eq!(controller.pipeline().camera().state(), pose);
    assert_eq!(
        controller.history().undo_description().as_deref(),
        Some("Move camera")
    );
}

#[test]
fn test_history_events_track_availability() {
    let (mut controller, bus) = controller();
    let events = record_events(&bus);

    controller.apply_click(&click(Some("T1"), false));
    controller.undo();

    let history: Vec<_> = events
        .lock()
        .iter()
        .filter_map(|e| match e {
            SceneEvent::HistoryChanged { can_undo, can_redo } => Some((*can_undo, *can_redo)),
            _ => None,
        })
        .collect();
    assert_eq!(history, vec![(true, false), (false, true)]);
}

#[test]
fn test_color_mode_switch_updates_materials_in_place() {
    let (mut controller, _bus) = controller();
    let mut equipment = plant();
    equipment[0] = tank("T1", [0.0, 2.5, 0.0])
        .with_system("cooling")
        .with_state("Alarme");
    controller.set_equipment(equipment);

    let mesh = controller.pipeline().lifecycle().mesh_node_for("T1").unwrap();
    let report = controller.set_color_mode(ColorMode::OperationalState);
    assert_eq!(report.created + report.recreated + report.removed, 0);
    assert!(report.updated >= 1);
    assert_eq!(
        controller.pipeline().lifecycle().mesh_node_for("T1"),
        Some(mesh)
    );

    let pipeline = controller.pipeline();
    let material_id = pipeline.graph().node(mesh).unwrap().material.unwrap();
    let material = pipeline.pool().material(material_id).unwrap();
    let alarm = yardview_core::Rgb::from_bytes(0xD5, 0x00, 0xF9).to_array();
    assert!(close(material.color(), alarm));

    assert!(controller.set_color_mode(ColorMode::OperationalState).is_noop());
}

#[test]
fn test_setup_failure_is_reported() {
    let (mut controller, bus) = controller();
    let events = record_events(&bus);

    let factory = || -> Result<Box<dyn Compositor>> {
        Err(SceneError::ContextUnavailable("no GL".to_string()))
    };
    let err = controller
        .setup(factory, Viewport::new(640, 480))
        .unwrap_err();
    assert!(err.is_setup_failure());
    assert!(!controller.pipeline().is_initialized());
    assert!(!controller.render_loop().is_running());
    assert!(matches!(
        events.lock().last(),
        Some(SceneEvent::PipelineFailed { .. })
    ));
}

#[test]
fn test_setup_tick_teardown() {
    let (mut controller, _bus) = controller();
    let (compositor, log) = RecordingCompositor::new();

    controller
        .setup(
            move || -> Result<Box<dyn Compositor>> { Ok(compositor.boxed()) },
            Viewport::new(800, 600),
        )
        .unwrap();
    assert!(controller.render_loop().is_running());

    assert!(matches!(
        controller.tick().unwrap(),
        TickOutcome::Rendered { .. }
    ));
    // Four objects plus the ground plane
    assert_eq!(log.lock().draws_last_frame, 5);

    assert!(controller.teardown());
    assert!(!controller.teardown());
    assert_eq!(log.lock().disposed, 1);
    assert_eq!(controller.tick().unwrap(), TickOutcome::Skipped);
    assert_eq!(log.lock().renders, 1);
}

#[test]
fn test_remount_after_teardown_renders_the_scene_again() {
    let (mut controller, _bus) = controller();
    assert!(controller.apply_click(&click(Some("T1"), false)));

    let (first, first_log) = RecordingCompositor::new();
    controller
        .setup(
            move || -> Result<Box<dyn Compositor>> { Ok(first.boxed()) },
            Viewport::new(800, 600),
        )
        .unwrap();
    controller.tick().unwrap();
    assert!(controller.teardown());
    assert_eq!(first_log.lock().disposed, 1);
    assert!(controller.pipeline().lifecycle().is_empty());

    let (second, log) = RecordingCompositor::new();
    controller
        .setup(
            move || -> Result<Box<dyn Compositor>> { Ok(second.boxed()) },
            Viewport::new(800, 600),
        )
        .unwrap();
    assert!(controller.render_loop().is_running());
    assert_eq!(controller.pipeline().lifecycle().len(), 4);

    assert!(matches!(
        controller.tick().unwrap(),
        TickOutcome::Rendered { .. }
    ));
    let log = log.lock();
    assert_eq!(log.renders, 1);
    assert_eq!(log.draws_last_frame, 5);
    // The selection outline follows the rebuilt meshes
    assert_eq!(log.outline_targets_last_frame, 1);
}

fn assert_factory<F: CompositorFactory>(_: &F) {}

#[test]
fn test_closure_is_a_compositor_factory() {
    let (compositor, _log) = RecordingCompositor::new();
    let factory = move || -> Result<Box<dyn Compositor>> { Ok(compositor.boxed()) };
    assert_factory(&factory);
}

#[test]
fn test_systems_are_listed_once_and_sorted() {
    let (controller, _bus) = controller();
    assert_eq!(controller.systems(), vec!["admin".to_string(), "cooling".to_string()]);
    assert_eq!(controller.equipment().len(), 4);
}
