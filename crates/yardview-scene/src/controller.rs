//! # Scene Controller
//!
//! Application-facing entry point. Owns the command history and the state
//! it governs (camera, selection, layer visibility), the render pipeline,
//! the render loop, and the pointer resolver.
//!
//! Every state change goes through [`SceneController::execute`] (or undo/
//! redo). After each one the controller pushes the applied state into the
//! pipeline: camera poses are assigned to the live camera, layer changes
//! trigger a reconciliation, and the outline is re-resolved. Notifications
//! go out on the event bus.

use glam::Vec2;
use std::collections::BTreeSet;
use std::sync::Arc;
use yardview_core::{
    Annotation, CameraState, Equipment, EventBus, LayerTable, Result, SceneEvent,
};
use yardview_settings::SceneConfig;

use crate::bounds::Aabb;
use crate::color_mode::ColorMode;
use crate::commands::{SceneCommand, SceneState};
use crate::framing::frame_boxes;
use crate::history::CommandHistory;
use crate::lifecycle::ReconcileReport;
use crate::pipeline::{CompositorFactory, Pipeline};
use crate::raycast::{ClickResolution, InteractionResolver};
use crate::render_loop::{RenderLoop, TickOutcome};
use crate::selection::next_selection;
use crate::viewport::Viewport;

pub struct SceneController {
    config: SceneConfig,
    history: CommandHistory<SceneCommand>,
    state: SceneState,
    pipeline: Pipeline,
    render_loop: RenderLoop,
    resolver: InteractionResolver,
    equipment: Vec<Equipment>,
    color_mode: ColorMode,
    published_layers: Vec<(String, bool)>,
    bus: Arc<EventBus>,
}

impl std::fmt::Debug for SceneController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneController")
            .field("pipeline", &self.pipeline)
            .field("history_len", &self.history.len())
            .field("selection", self.state.selection())
            .field("color_mode", &self.color_mode)
            .finish()
    }
}

impl SceneController {
    pub fn new(config: SceneConfig, bus: Arc<EventBus>) -> Self {
        let layers = LayerTable::with_default_layers();
        let published_layers = layer_visibility(&layers);
        Self {
            history: CommandHistory::with_max_depth(config.history.max_depth),
            state: SceneState::new(config.camera.initial, layers),
            pipeline: Pipeline::new(&config),
            render_loop: RenderLoop::new(),
            resolver: InteractionResolver::new(),
            equipment: Vec::new(),
            color_mode: ColorMode::default(),
            published_layers,
            bus,
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        self.state.selection()
    }

    pub fn equipment(&self) -> &[Equipment] {
        &self.equipment
    }

    /// Distinct non-empty system names, sorted.
    pub fn systems(&self) -> Vec<String> {
        let systems: BTreeSet<&str> = self
            .equipment
            .iter()
            .map(|e| e.system.as_str())
            .filter(|s| !s.is_empty())
            .collect();
        systems.into_iter().map(str::to_string).collect()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.resolver.hovered()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn history(&self) -> &CommandHistory<SceneCommand> {
        &self.history
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    // ---- data inputs ---------------------------------------------------

    /// New equipment snapshot from the application.
    pub fn set_equipment(&mut self, equipment: Vec<Equipment>) -> ReconcileReport {
        self.equipment = equipment;
        let report = self.reconcile();
        self.refresh_outline();
        report
    }

    /// Replace the layer table outside the history (initial load).
    pub fn set_layers(&mut self, layers: LayerTable) {
        self.state.replace_layers(layers);
        self.sync();
    }

    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.pipeline.set_annotations(annotations);
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) -> ReconcileReport {
        if mode == self.color_mode {
            return ReconcileReport::default();
        }
        tracing::info!(mode = %mode, "color mode changed");
        self.color_mode = mode;
        self.reconcile()
    }

    fn reconcile(&mut self) -> ReconcileReport {
        let report = self
            .pipeline
            .reconcile(&self.equipment, self.state.layers(), self.color_mode);
        if !report.is_noop() {
            self.bus.publish(SceneEvent::SceneReconciled {
                created: report.created,
                updated: report.updated,
                recreated: report.recreated,
                removed: report.removed,
            });
        }
        report
    }

    // ---- history -------------------------------------------------------

    pub fn execute(&mut self, command: SceneCommand) {
        self.history.execute(command, &mut self.state);
        self.sync();
        self.publish_history();
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.state);
        if undone {
            self.sync();
            self.publish_history();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.state);
        if redone {
            self.sync();
            self.publish_history();
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn publish_history(&self) {
        self.bus.publish(SceneEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    /// Push whatever the last command wrote into the pipeline.
    fn sync(&mut self) {
        let pending = self.state.take_pending();

        if pending.camera {
            let camera = *self.state.camera();
            if self.pipeline.assign_camera(&camera) {
                self.bus.publish(SceneEvent::CameraChanged(camera));
            }
        }

        if pending.layers {
            let current = layer_visibility(self.state.layers());
            for (id, visible) in &current {
                let previous = self
                    .published_layers
                    .iter()
                    .find(|(pid, _)| pid == id)
                    .map(|(_, v)| *v);
                if previous != Some(*visible) {
                    self.bus.publish(SceneEvent::LayerVisibilityChanged {
                        layer_id: id.clone(),
                        visible: *visible,
                    });
                }
            }
            self.published_layers = current;
            self.reconcile();
        }

        if pending.selection {
            self.bus.publish(SceneEvent::SelectionChanged {
                selection: self.state.selection().iter().cloned().collect(),
            });
        }

        self.refresh_outline();
    }

    fn refresh_outline(&mut self) {
        self.pipeline
            .update_outline(self.state.selection(), self.resolver.hovered());
    }

    // ---- convenience commands ------------------------------------------

    /// Turn a click into a selection command. Returns whether one was recorded.
    pub fn apply_click(&mut self, click: &ClickResolution) -> bool {
        let current = self.state.selection().clone();
        match next_selection(&current, click) {
            Some(next) => {
                self.execute(SceneCommand::selection_change(current, next));
                true
            }
            None => false,
        }
    }

    /// Flip a layer's visibility through the history. False for unknown layers.
    pub fn toggle_layer(&mut self, layer_id: &str) -> bool {
        let Some(before) = self.state.layers().is_visible(layer_id) else {
            tracing::debug!(layer_id, "toggle of unknown layer ignored");
            return false;
        };
        self.execute(SceneCommand::layer_toggle(layer_id, before, !before));
        true
    }

    /// Move the camera through the history.
    pub fn move_camera(&mut self, after: CameraState) -> bool {
        if !after.is_finite() {
            tracing::debug!(?after, "non-finite camera move ignored");
            return false;
        }
        let before = self.pipeline.camera().state();
        self.execute(SceneCommand::camera_move(before, after));
        true
    }

    /// Frame every live object of `system`. `on_complete` always fires
    /// exactly once, with whether a camera move was issued.
    pub fn focus_system<F>(&mut self, system: &str, on_complete: F) -> bool
    where
        F: FnOnce(bool),
    {
        let lifecycle = self.pipeline.lifecycle();
        let graph = self.pipeline.graph();
        let boxes: Vec<Aabb> = lifecycle
            .tags_in_system(graph, system)
            .iter()
            .map(|tag| lifecycle.object_bounds(graph, tag))
            .collect();

        let framed = match frame_boxes(&boxes, self.pipeline.camera().fov, &self.config.framing)
        {
            Some(after) => {
                let before = self.pipeline.camera().state();
                self.execute(SceneCommand::focus(system, before, after));
                true
            }
            None => {
                tracing::debug!(system, targets = boxes.len(), "nothing to frame");
                false
            }
        };

        self.bus.publish(SceneEvent::FocusCompleted {
            system: system.to_string(),
            framed,
        });
        on_complete(framed);
        framed
    }

    // ---- pointer input -------------------------------------------------

    pub fn pointer_click(&mut self, x: f32, y: f32, multi_select: bool) -> ClickResolution {
        let candidates = self.pipeline.lifecycle().pick_candidates();
        let ctx = self.pipeline.pick_context(&candidates);
        let click = self
            .resolver
            .resolve_click(&ctx, Vec2::new(x, y), multi_select);
        self.bus.publish(SceneEvent::SelectionRequested {
            tag: click.tag.clone(),
            multi_select,
        });
        self.apply_click(&click);
        click
    }

    /// Returns whether the hovered tag changed.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let candidates = self.pipeline.lifecycle().pick_candidates();
        let ctx = self.pipeline.pick_context(&candidates);
        let change = self.resolver.resolve_move(&ctx, Vec2::new(x, y));
        self.apply_hover(change)
    }

    pub fn pointer_leave(&mut self) -> bool {
        let change = self.resolver.reset_hover();
        self.apply_hover(change)
    }

    fn apply_hover(&mut self, change: Option<crate::raycast::HoverChange>) -> bool {
        let Some(change) = change else {
            return false;
        };
        self.bus
            .publish(SceneEvent::HoverChanged { tag: change.tag });
        self.refresh_outline();
        true
    }

    // ---- pipeline lifecycle --------------------------------------------

    /// Install a compositor built by `factory` and start a fresh render
    /// loop. Objects released by an earlier teardown are rebuilt from the
    /// current equipment, so a widget can be unmounted and mounted again.
    pub fn setup<F: CompositorFactory>(&mut self, factory: F, viewport: Viewport) -> Result<()> {
        let result = factory
            .create()
            .and_then(|compositor| self.pipeline.setup(compositor, viewport));
        match result {
            Ok(()) => {
                self.render_loop = RenderLoop::new();
                self.render_loop.start();
                self.reconcile();
                self.refresh_outline();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "render pipeline setup failed");
                self.bus.publish(SceneEvent::PipelineFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn resize(&mut self, width: i32, height: i32, scale_factor: i32) -> bool {
        self.pipeline.resize(width, height, scale_factor)
    }

    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.render_loop.tick(&mut self.pipeline)
    }

    /// Stop the loop and release the pipeline. Safe to call repeatedly; a
    /// later [`setup`](Self::setup) mounts the scene again.
    pub fn teardown(&mut self) -> bool {
        let cancelled = self.render_loop.cancel();
        let released = self.pipeline.teardown();
        cancelled || released
    }
}

fn layer_visibility(layers: &LayerTable) -> Vec<(String, bool)> {
    layers.iter().map(|l| (l.id.clone(), l.visible)).collect()
}
