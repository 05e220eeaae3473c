//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};

use crate::data::CameraState;

/// Everything the scene engine reports to the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// A click resolved to a tag (or to the background).
    ///
    /// This is the raw pointer outcome; the applied selection follows as
    /// `SelectionChanged` once the click has been turned into a command.
    SelectionRequested {
        /// Resolved equipment tag, `None` for background clicks.
        tag: Option<String>,
        /// Whether the multi-select modifier was held.
        multi_select: bool,
    },
    /// The selection set changed (sorted tags).
    SelectionChanged {
        /// Current selection.
        selection: Vec<String>,
    },
    /// The hovered tag changed.
    HoverChanged {
        /// Newly hovered tag, `None` when the pointer left all equipment.
        tag: Option<String>,
    },
    /// The camera was repositioned programmatically.
    CameraChanged(CameraState),
    /// A focus request finished (also fired when nothing could be framed).
    FocusCompleted {
        /// The system that was requested.
        system: String,
        /// Whether a camera move was issued.
        framed: bool,
    },
    /// A layer's visibility changed.
    LayerVisibilityChanged {
        /// Layer id.
        layer_id: String,
        /// New visibility.
        visible: bool,
    },
    /// Undo/redo availability changed.
    HistoryChanged {
        /// Whether undo is possible.
        can_undo: bool,
        /// Whether redo is possible.
        can_redo: bool,
    },
    /// A reconciliation pass changed the live scene objects.
    SceneReconciled {
        /// Objects created.
        created: usize,
        /// Objects updated in place.
        updated: usize,
        /// Objects disposed and rebuilt.
        recreated: usize,
        /// Objects removed.
        removed: usize,
    },
    /// The render pipeline failed to set up.
    PipelineFailed {
        /// Error message.
        message: String,
    },
}

impl SceneEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            SceneEvent::SelectionRequested { .. } | SceneEvent::SelectionChanged { .. } => {
                EventCategory::Selection
            }
            SceneEvent::HoverChanged { .. } => EventCategory::Hover,
            SceneEvent::CameraChanged(_) | SceneEvent::FocusCompleted { .. } => {
                EventCategory::Camera
            }
            SceneEvent::LayerVisibilityChanged { .. } => EventCategory::Layers,
            SceneEvent::HistoryChanged { .. } => EventCategory::History,
            SceneEvent::SceneReconciled { .. } => EventCategory::Scene,
            SceneEvent::PipelineFailed { .. } => EventCategory::Error,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            SceneEvent::SelectionRequested { tag, multi_select } => format!(
                "Click on {}{}",
                tag.as_deref().unwrap_or("background"),
                if *multi_select { " (multi)" } else { "" }
            ),
            SceneEvent::SelectionChanged { selection } => {
                format!("Selection: {} item(s)", selection.len())
            }
            SceneEvent::HoverChanged { tag } => {
                format!("Hover: {}", tag.as_deref().unwrap_or("none"))
            }
            SceneEvent::CameraChanged(state) => format!(
                "Camera at ({:.1}, {:.1}, {:.1})",
                state.position[0], state.position[1], state.position[2]
            ),
            SceneEvent::FocusCompleted { system, framed } => {
                let outcome = if *framed { "framed" } else { "nothing to frame" };
                format!("Focus on {}: {}", system, outcome)
            }
            SceneEvent::LayerVisibilityChanged { layer_id, visible } => {
                format!("Layer {} {}", layer_id, if *visible { "shown" } else { "hidden" })
            }
            SceneEvent::HistoryChanged { can_undo, can_redo } => {
                format!("History: undo={} redo={}", can_undo, can_redo)
            }
            SceneEvent::SceneReconciled {
                created,
                updated,
                recreated,
                removed,
            } => format!(
                "Reconciled: +{} ~{} ^{} -{}",
                created, updated, recreated, removed
            ),
            SceneEvent::PipelineFailed { message } => format!("Pipeline failed: {}", message),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Click resolution and selection set changes.
    Selection,
    /// Hover changes.
    Hover,
    /// Camera moves and focus completion.
    Camera,
    /// Layer visibility.
    Layers,
    /// Undo/redo availability.
    History,
    /// Scene object lifecycle.
    Scene,
    /// Failures.
    Error,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Hover => write!(f, "Hover"),
            EventCategory::Camera => write!(f, "Camera"),
            EventCategory::Layers => write!(f, "Layers"),
            EventCategory::History => write!(f, "History"),
            EventCategory::Scene => write!(f, "Scene"),
            EventCategory::Error => write!(f, "Error"),
        }
    }
}
