mod common;

use glam::{Vec2, Vec3};
use yardview_core::{EquipmentType, LayerTable};
use yardview_scene::raycast::intersect;
use yardview_scene::scene_graph::ObjectTag;
use yardview_scene::{
    ColorMode, InteractionResolver, Pipeline, Primitive, Ray, SceneGraph, Transform, Viewport,
};
use yardview_settings::SceneConfig;

use common::{tank, RecordingCompositor};

/// Crane-like assembly: tagged group, a box body and a sphere hook hanging
/// off the body, two levels down.
fn assembly() -> (SceneGraph, Vec<yardview_scene::NodeId>) {
    let mut graph = SceneGraph::new();
    let group = graph
        .add_child(
            graph.root(),
            Primitive::Group,
            Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)),
        )
        .unwrap();
    graph.set_tag(
        group,
        ObjectTag {
            tag: "C1".to_string(),
            equipment_type: EquipmentType::Crane,
            system: "yard".to_string(),
        },
    );
    let body = graph
        .add_child(
            group,
            Primitive::Box {
                half_extents: Vec3::new(1.0, 4.0, 1.0),
            },
            Transform::IDENTITY,
        )
        .unwrap();
    graph
        .add_child(
            body,
            Primitive::Sphere { radius: 0.5 },
            Transform::from_translation(Vec3::new(3.0, 2.0, 0.0)),
        )
        .unwrap();
    (graph, vec![group])
}

#[test]
fn test_hit_on_nested_part_resolves_to_tagged_group() {
    let (graph, candidates) = assembly();
    // Aim at the hook only: world (13, 2, 0), clear of the body
    let ray = Ray::new(Vec3::new(13.0, 2.0, 20.0), Vec3::NEG_Z);
    let hit = intersect(&graph, &ray, &candidates).unwrap();

    assert!((hit.distance - 19.5).abs() < 1e-4);
    let (_, tag) = graph.tagged_ancestor(hit.node).unwrap();
    assert_eq!(tag.tag, "C1");
}

#[test]
fn test_nearest_part_wins() {
    let (graph, candidates) = assembly();
    // Looking down -X through the hook and then the body
    let ray = Ray::new(Vec3::new(30.0, 2.0, 0.0), Vec3::NEG_X);
    let hit = intersect(&graph, &ray, &candidates).unwrap();
    assert!((hit.distance - 16.5).abs() < 1e-4);
}

#[test]
fn test_miss_returns_none() {
    let (graph, candidates) = assembly();
    let ray = Ray::new(Vec3::new(-50.0, 50.0, 0.0), Vec3::Y);
    assert!(intersect(&graph, &ray, &candidates).is_none());
}

#[test]
fn test_hidden_parts_are_not_pickable() {
    let (mut graph, candidates) = assembly();
    let body = graph.node(candidates[0]).unwrap().children[0];
    graph.node_mut(body).unwrap().visible = false;

    let ray = Ray::new(Vec3::new(30.0, 2.0, 0.0), Vec3::NEG_X);
    assert!(intersect(&graph, &ray, &candidates).is_none());
}

fn live_pipeline() -> Pipeline {
    let mut pipeline = Pipeline::new(&SceneConfig::default());
    let (compositor, _) = RecordingCompositor::new();
    pipeline
        .setup(compositor.boxed(), Viewport::new(800, 600))
        .unwrap();
    pipeline.reconcile(
        &[tank("T1", [0.0, 2.5, 0.0])],
        &LayerTable::with_default_layers(),
        ColorMode::Base,
    );
    pipeline
}

#[test]
fn test_pointer_at_center_picks_equipment_under_camera_target() {
    // The default camera looks at the origin, which sits inside T1's base
    let pipeline = live_pipeline();
    assert_eq!(pipeline.pick(Vec2::new(400.0, 300.0)).as_deref(), Some("T1"));
}

#[test]
fn test_terrain_hit_is_a_background_click() {
    let pipeline = live_pipeline();
    // Lower left corner lands on the ground plane, far from T1
    assert!(pipeline.pick(Vec2::new(5.0, 595.0)).is_none());
}

#[test]
fn test_hover_signals_only_on_change() {
    let pipeline = live_pipeline();
    let candidates = pipeline.lifecycle().pick_candidates();
    let ctx = pipeline.pick_context(&candidates);
    let mut resolver = InteractionResolver::new();

    let change = resolver.resolve_move(&ctx, Vec2::new(400.0, 300.0)).unwrap();
    assert_eq!(change.tag.as_deref(), Some("T1"));
    assert!(resolver.resolve_move(&ctx, Vec2::new(401.0, 300.0)).is_none());

    let change = resolver.resolve_move(&ctx, Vec2::new(5.0, 595.0)).unwrap();
    assert_eq!(change.tag, None);
    assert!(resolver.reset_hover().is_none());
}
