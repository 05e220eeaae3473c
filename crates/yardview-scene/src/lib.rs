//! # YardView Scene
//!
//! 3D scene engine for the YardView terminal dashboard.
//! Turns equipment snapshots into a lit, pickable scene with undoable
//! camera, layer and selection changes, automatic camera framing, and an
//! outline highlight for selected and hovered objects.

pub mod bounds;
pub mod camera;
pub mod color_mode;
pub mod commands;
pub mod compositor;
pub mod controller;
pub mod framing;
pub mod geometry;
pub mod history;
pub mod labels;
pub mod lifecycle;
pub mod outline;
pub mod pipeline;
pub mod raycast;
pub mod render_loop;
pub mod resources;
pub mod scene_graph;
pub mod selection;
pub mod viewport;

pub use bounds::Aabb;
pub use camera::{OrbitControls, PerspectiveCamera};
pub use color_mode::{product_color, ColorMode, ColorResolver};
pub use commands::{
    CommandCategory, CommandKind, PendingChanges, SceneCommand, SceneState, StateSnapshot,
};
pub use compositor::{GlCompositor, LightingParams};
pub use controller::SceneController;
pub use framing::frame_boxes;
pub use geometry::{MeshMaterial, RenderableMesh};
pub use history::{Command, CommandHistory};
pub use labels::{LabelLayout, LabelPlacement};
pub use lifecycle::{LifecycleManager, ReconcileReport};
pub use outline::{OutlineController, OutlineKind, OutlineState};
pub use pipeline::{Compositor, CompositorFactory, Frame, Pipeline, PipelineDimensions};
pub use raycast::{ClickResolution, ContainerRect, HoverChange, InteractionResolver, Ray};
pub use render_loop::{LoopState, RenderLoop, TickOutcome};
pub use resources::{GeometryId, MaterialId, ResourceEvent, ResourcePool};
pub use scene_graph::{NodeId, Primitive, SceneGraph, Transform};
pub use selection::next_selection;
pub use viewport::Viewport;
