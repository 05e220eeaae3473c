//! # Render Pipeline
//!
//! Owns the scene graph, the perspective camera and its controls, the
//! resource pool, and the renderer chain: raster pass, outline
//! post-process, and label overlay. Every stage of the chain is resized
//! together so they never disagree about the surface size.
//!
//! GL work is delegated to a [`Compositor`]; the pipeline itself is plain
//! data and can run headless (tests use a recording compositor).

use glam::{Mat4, Vec2, Vec3};
use std::collections::BTreeSet;
use yardview_core::{Annotation, CameraState, Equipment, LayerTable, Result, SceneError};
use yardview_settings::SceneConfig;

use crate::camera::{OrbitControls, PerspectiveCamera};
use crate::color_mode::ColorMode;
use crate::labels::{LabelLayout, LabelPlacement};
use crate::lifecycle::{LifecycleManager, ReconcileReport};
use crate::outline::{OutlineController, OutlineState};
use crate::raycast::{ContainerRect, PickContext};
use crate::resources::{ResourceEvent, ResourcePool};
use crate::scene_graph::{DrawItem, NodeId, SceneGraph};
use crate::viewport::Viewport;

/// Everything a compositor needs to draw one frame.
pub struct Frame<'a> {
    pub pool: &'a ResourcePool,
    pub draws: &'a [DrawItem],
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub outline: &'a OutlineState,
    pub background: [f32; 3],
    /// Resource creations and disposals since the previous frame
    pub resource_events: &'a [ResourceEvent],
}

/// Backend drawing the raster and outline passes.
pub trait Compositor {
    /// Raster target and outline target sizes in device pixels.
    fn resize(&mut self, raster: (u32, u32), outline: (u32, u32)) -> Result<()>;

    fn render(&mut self, frame: &Frame<'_>) -> Result<()>;

    /// Release every GPU object. Called exactly once.
    fn dispose(&mut self);
}

/// Deferred compositor construction, run once the GL context exists.
pub trait CompositorFactory {
    fn create(self) -> Result<Box<dyn Compositor>>;
}

impl<F> CompositorFactory for F
where
    F: FnOnce() -> Result<Box<dyn Compositor>>,
{
    fn create(self) -> Result<Box<dyn Compositor>> {
        self()
    }
}

/// Sizes of every stage, for checking they agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineDimensions {
    pub camera_aspect: f32,
    pub raster: (u32, u32),
    pub outline: (u32, u32),
    /// Logical pixels
    pub labels: (u32, u32),
}

pub struct Pipeline {
    camera: PerspectiveCamera,
    controls: OrbitControls,
    graph: SceneGraph,
    pool: ResourcePool,
    lifecycle: LifecycleManager,
    outline: OutlineController,
    labels: LabelLayout,
    annotations: Vec<Annotation>,
    annotations_visible: bool,
    viewport: Viewport,
    raster_size: (u32, u32),
    outline_size: (u32, u32),
    background: [f32; 3],
    compositor: Option<Box<dyn Compositor>>,
    frames: u64,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("initialized", &self.is_initialized())
            .field("viewport", &self.viewport)
            .field("objects", &self.lifecycle.len())
            .field("frames", &self.frames)
            .finish()
    }
}

impl Pipeline {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            camera: PerspectiveCamera::from_config(&config.camera),
            controls: OrbitControls::new(&config.camera),
            graph: SceneGraph::new(),
            pool: ResourcePool::new(),
            lifecycle: LifecycleManager::new(config.colors.clone(), &config.labels),
            outline: OutlineController::new(config.outline.clone()),
            labels: LabelLayout::new(&config.labels),
            annotations: Vec::new(),
            annotations_visible: true,
            viewport: Viewport::default(),
            raster_size: (1, 1),
            outline_size: (1, 1),
            background: config.colors.background.to_array(),
            compositor: None,
            frames: 0,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.compositor.is_some()
    }

    /// Install the compositor and size every stage to `viewport`.
    pub fn setup(&mut self, compositor: Box<dyn Compositor>, viewport: Viewport) -> Result<()> {
        if self.compositor.is_some() {
            return Err(SceneError::other("pipeline already set up"));
        }
        self.compositor = Some(compositor);
        self.apply_size(viewport);
        if let Err(e) = self.resize_compositor() {
            if let Some(mut compositor) = self.compositor.take() {
                compositor.dispose();
            }
            return Err(e);
        }
        tracing::info!(
            width = viewport.width(),
            height = viewport.height(),
            scale = viewport.scale_factor(),
            "render pipeline initialized"
        );
        Ok(())
    }

    /// Resize every stage together. Ignored before setup.
    pub fn resize(&mut self, width: i32, height: i32, scale_factor: i32) -> bool {
        if !self.is_initialized() {
            tracing::debug!(width, height, "resize before setup ignored");
            return false;
        }
        self.apply_size(Viewport::with_scale(width, height, scale_factor));
        if let Err(e) = self.resize_compositor() {
            tracing::error!(error = %e, "compositor resize failed");
        }
        true
    }

    fn apply_size(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera
            .update_aspect_ratio(viewport.width() as f32, viewport.height() as f32);
        self.raster_size = viewport.physical_size();
        self.outline_size = viewport.physical_size();
        self.labels.set_viewport(viewport);
    }

    fn resize_compositor(&mut self) -> Result<()> {
        let (raster, outline) = (self.raster_size, self.outline_size);
        match self.compositor.as_mut() {
            Some(compositor) => compositor.resize(raster, outline),
            None => Ok(()),
        }
    }

    pub fn dimensions(&self) -> PipelineDimensions {
        let labels = self.labels.viewport();
        PipelineDimensions {
            camera_aspect: self.camera.aspect_ratio,
            raster: self.raster_size,
            outline: self.outline_size,
            labels: (labels.width(), labels.height()),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Draw one frame: raster and outline passes, then label layout.
    pub fn render(&mut self) -> Result<()> {
        if !self.is_initialized() {
            return Err(SceneError::NotInitialized);
        }
        let view_projection = self.camera.view_projection();
        let draws = self.graph.draw_list();
        let events = self.pool.drain_events();
        let compositor = self
            .compositor
            .as_mut()
            .ok_or(SceneError::NotInitialized)?;

        let frame = Frame {
            pool: &self.pool,
            draws: &draws,
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            camera_position: self.camera.position,
            outline: self.outline.state(),
            background: self.background,
            resource_events: &events,
        };
        compositor.render(&frame)?;

        self.labels.layout(
            &self.annotations,
            self.annotations_visible,
            &self.lifecycle,
            &self.graph,
            &view_projection,
        );
        self.frames += 1;
        Ok(())
    }

    /// Release everything the pipeline owns. Returns false when there was
    /// nothing to tear down.
    pub fn teardown(&mut self) -> bool {
        let Some(mut compositor) = self.compositor.take() else {
            return false;
        };
        self.lifecycle.clear(&mut self.graph, &mut self.pool);
        self.pool.clear();
        self.pool.drain_events();
        compositor.dispose();
        tracing::info!(frames = self.frames, "render pipeline torn down");
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn reconcile(
        &mut self,
        equipment: &[Equipment],
        layers: &LayerTable,
        mode: ColorMode,
    ) -> ReconcileReport {
        self.annotations_visible = layers.are_annotations_visible();
        self.lifecycle
            .reconcile(&mut self.graph, &mut self.pool, equipment, layers, mode)
    }

    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    pub fn update_outline(&mut self, selection: &BTreeSet<String>, hover: Option<&str>) -> bool {
        self.outline.update(selection, hover, &self.lifecycle)
    }

    /// Programmatic camera assignment. Suspends the orbit controls so
    /// residual damping cannot pull the camera off the assigned pose.
    pub fn assign_camera(&mut self, state: &CameraState) -> bool {
        if !self.camera.set_state(state) {
            return false;
        }
        self.controls.suspend();
        true
    }

    /// Advance control damping if enabled, else re-enable for the next tick.
    /// Returns whether the camera moved.
    pub fn advance_controls(&mut self) -> bool {
        if self.controls.is_enabled() {
            self.controls.update(&mut self.camera)
        } else {
            self.controls.resume();
            false
        }
    }

    pub fn pick_context<'a>(&'a self, candidates: &'a [NodeId]) -> PickContext<'a> {
        PickContext {
            graph: &self.graph,
            camera: &self.camera,
            rect: ContainerRect::from_size(
                self.viewport.width() as f32,
                self.viewport.height() as f32,
            ),
            candidates,
        }
    }

    /// Tag under a pointer position in logical pixels.
    pub fn pick(&self, pointer: Vec2) -> Option<String> {
        let candidates = self.lifecycle.pick_candidates();
        self.pick_context(&candidates).pick(pointer)
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Apply a screen-space pan from the orbit controls.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.controls.pan(&self.camera, dx, dy);
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn outline(&self) -> &OutlineState {
        self.outline.state()
    }

    pub fn labels(&self) -> &[LabelPlacement] {
        self.labels.placements()
    }
}
