//! Reversible scene commands and the state they act on.

use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;
use yardview_core::{CameraState, LayerTable};

use crate::history::Command;

/// Camera, selection and layer visibility: everything the history owns.
///
/// Setters raise a pending flag even when the new value equals the old
/// one, so re-assigning the same camera pose still reaches the live camera.
#[derive(Debug, Clone)]
pub struct SceneState {
    camera: CameraState,
    selection: BTreeSet<String>,
    layers: LayerTable,
    pending: PendingChanges,
}

/// Which parts of [`SceneState`] were written since the last `take_pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub camera: bool,
    pub selection: bool,
    pub layers: bool,
}

impl PendingChanges {
    pub fn any(&self) -> bool {
        self.camera || self.selection || self.layers
    }
}

/// Comparable copy of the state without pending flags.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub camera: CameraState,
    pub selection: BTreeSet<String>,
    pub layers: Vec<(String, bool)>,
}

impl SceneState {
    pub fn new(camera: CameraState, layers: LayerTable) -> Self {
        Self {
            camera,
            selection: BTreeSet::new(),
            layers,
            pending: PendingChanges::default(),
        }
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
        self.pending.camera = true;
    }

    pub fn set_selection(&mut self, selection: BTreeSet<String>) {
        self.selection = selection;
        self.pending.selection = true;
    }

    pub fn set_layer_visible(&mut self, layer_id: &str, visible: bool) {
        match self.layers.set_visible(layer_id, visible) {
            Ok(_) => self.pending.layers = true,
            Err(e) => tracing::warn!(error = %e, "layer toggle ignored"),
        }
    }

    /// Replace the layer table wholesale (new data from the application).
    pub fn replace_layers(&mut self, layers: LayerTable) {
        self.layers = layers;
        self.pending.layers = true;
    }

    pub fn pending(&self) -> PendingChanges {
        self.pending
    }

    pub fn take_pending(&mut self) -> PendingChanges {
        std::mem::take(&mut self.pending)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            camera: self.camera,
            selection: self.selection.clone(),
            layers: self
                .layers
                .iter()
                .map(|l| (l.id.clone(), l.visible))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    Camera,
    Layer,
    Selection,
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandCategory::Camera => write!(f, "Camera"),
            CommandCategory::Layer => write!(f, "Layer"),
            CommandCategory::Selection => write!(f, "Selection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    CameraMove {
        before: CameraState,
        after: CameraState,
    },
    LayerToggle {
        layer_id: String,
        before: bool,
        after: bool,
    },
    SelectionChange {
        before: BTreeSet<String>,
        after: BTreeSet<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneCommand {
    id: Uuid,
    description: String,
    kind: CommandKind,
}

impl SceneCommand {
    fn new(description: String, kind: CommandKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            kind,
        }
    }

    pub fn camera_move(before: CameraState, after: CameraState) -> Self {
        Self::new(
            "Move camera".to_string(),
            CommandKind::CameraMove { before, after },
        )
    }

    pub fn focus(system: &str, before: CameraState, after: CameraState) -> Self {
        Self::new(
            format!("Focus system {system}"),
            CommandKind::CameraMove { before, after },
        )
    }

    pub fn layer_toggle(layer_id: impl Into<String>, before: bool, after: bool) -> Self {
        let layer_id = layer_id.into();
        let verb = if after { "Show" } else { "Hide" };
        Self::new(
            format!("{verb} layer {layer_id}"),
            CommandKind::LayerToggle {
                layer_id,
                before,
                after,
            },
        )
    }

    pub fn selection_change(before: BTreeSet<String>, after: BTreeSet<String>) -> Self {
        let description = match after.len() {
            0 => "Clear selection".to_string(),
            1 => format!(
                "Select {}",
                after.iter().next().map(String::as_str).unwrap_or_default()
            ),
            n => format!("Select {n} items"),
        };
        Self::new(description, CommandKind::SelectionChange { before, after })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn category(&self) -> CommandCategory {
        match self.kind {
            CommandKind::CameraMove { .. } => CommandCategory::Camera,
            CommandKind::LayerToggle { .. } => CommandCategory::Layer,
            CommandKind::SelectionChange { .. } => CommandCategory::Selection,
        }
    }
}

impl Command for SceneCommand {
    type Target = SceneState;

    fn apply(&self, state: &mut SceneState) {
        match &self.kind {
            CommandKind::CameraMove { after, .. } => state.set_camera(*after),
            CommandKind::LayerToggle {
                layer_id, after, ..
            } => state.set_layer_visible(layer_id, *after),
            CommandKind::SelectionChange { after, .. } => state.set_selection(after.clone()),
        }
    }

    fn inverse(&self, state: &mut SceneState) {
        match &self.kind {
            CommandKind::CameraMove { before, .. } => state.set_camera(*before),
            CommandKind::LayerToggle {
                layer_id, before, ..
            } => state.set_layer_visible(layer_id, *before),
            CommandKind::SelectionChange { before, .. } => state.set_selection(before.clone()),
        }
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}
