//! # Outline Effect Controller
//!
//! Decides which objects the outline post-process highlights and with
//! which style. Selection always wins over hover; hover only shows while
//! nothing is selected. When neither applies the pass stays in the chain
//! with strength zero.

use std::collections::BTreeSet;
use yardview_settings::{OutlineConfig, OutlineStyle};

use crate::lifecycle::LifecycleManager;
use crate::scene_graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineKind {
    #[default]
    None,
    Selected,
    Hover,
}

/// Resolved outline pass parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineState {
    pub kind: OutlineKind,
    /// Mesh nodes written into the outline mask
    pub targets: Vec<NodeId>,
    pub color: [f32; 3],
    pub edge_strength: f32,
    pub edge_thickness: f32,
    pub edge_glow: f32,
}

impl OutlineState {
    fn none() -> Self {
        Self {
            kind: OutlineKind::None,
            targets: Vec::new(),
            color: [0.0; 3],
            edge_strength: 0.0,
            edge_thickness: 1.0,
            edge_glow: 0.0,
        }
    }

    fn styled(kind: OutlineKind, targets: Vec<NodeId>, style: &OutlineStyle) -> Self {
        Self {
            kind,
            targets,
            color: style.color.to_array(),
            edge_strength: style.edge_strength,
            edge_thickness: style.edge_thickness,
            edge_glow: style.edge_glow,
        }
    }

    pub fn is_active(&self) -> bool {
        self.kind != OutlineKind::None && !self.targets.is_empty() && self.edge_strength > 0.0
    }
}

impl Default for OutlineState {
    fn default() -> Self {
        Self::none()
    }
}

/// Inputs the current state was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    selection: BTreeSet<String>,
    hover: Option<String>,
    generation: u64,
}

#[derive(Debug)]
pub struct OutlineController {
    config: OutlineConfig,
    state: OutlineState,
    last: Option<Fingerprint>,
}

impl OutlineController {
    pub fn new(config: OutlineConfig) -> Self {
        Self {
            config,
            state: OutlineState::none(),
            last: None,
        }
    }

    pub fn state(&self) -> &OutlineState {
        &self.state
    }

    /// Re-resolve when selection, hover or the registry generation moved.
    /// Returns true only when the resolved state changed.
    pub fn update(
        &mut self,
        selection: &BTreeSet<String>,
        hover: Option<&str>,
        lifecycle: &LifecycleManager,
    ) -> bool {
        let fingerprint = Fingerprint {
            selection: selection.clone(),
            hover: hover.map(str::to_owned),
            generation: lifecycle.generation(),
        };
        if self.last.as_ref() == Some(&fingerprint) {
            return false;
        }
        self.last = Some(fingerprint);

        let next = self.resolve(selection, hover, lifecycle);
        if next == self.state {
            return false;
        }
        tracing::debug!(kind = ?next.kind, targets = next.targets.len(), "outline changed");
        self.state = next;
        true
    }

    fn resolve(
        &self,
        selection: &BTreeSet<String>,
        hover: Option<&str>,
        lifecycle: &LifecycleManager,
    ) -> OutlineState {
        let selected: Vec<NodeId> = selection
            .iter()
            .filter_map(|tag| lifecycle.mesh_node_for(tag))
            .collect();
        if !selected.is_empty() {
            return OutlineState::styled(OutlineKind::Selected, selected, &self.config.selected);
        }

        if selection.is_empty() {
            if let Some(node) = hover.and_then(|tag| lifecycle.mesh_node_for(tag)) {
                return OutlineState::styled(OutlineKind::Hover, vec![node], &self.config.hover);
            }
        }

        OutlineState::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_mode::ColorMode;
    use crate::resources::ResourcePool;
    use crate::scene_graph::SceneGraph;
    use yardview_core::{Equipment, EquipmentType, LayerTable, Rgb, ShapeParams};
    use yardview_settings::{ColorConfig, LabelConfig};

    fn scene(tags: &[&str]) -> (SceneGraph, ResourcePool, LifecycleManager) {
        let mut graph = SceneGraph::new();
        let mut pool = ResourcePool::new();
        let mut lifecycle = LifecycleManager::new(ColorConfig::default(), &LabelConfig::default());
        let items: Vec<Equipment> = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                Equipment::new(
                    *tag,
                    EquipmentType::Valve,
                    [i as f32 * 4.0, 1.0, 0.0],
                    ShapeParams::Sphere { radius: 1.0 },
                    Rgb::WHITE,
                )
            })
            .collect();
        lifecycle.reconcile(
            &mut graph,
            &mut pool,
            &items,
            &LayerTable::with_default_layers(),
            ColorMode::Base,
        );
        (graph, pool, lifecycle)
    }

    fn select(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_selection_beats_hover() {
        let (_, _, lifecycle) = scene(&["A", "B"]);
        let mut outline = OutlineController::new(OutlineConfig::default());
        assert!(outline.update(&select(&["A"]), Some("B"), &lifecycle));
        assert_eq!(outline.state().kind, OutlineKind::Selected);
        assert_eq!(
            outline.state().targets,
            vec![lifecycle.mesh_node_for("A").unwrap()]
        );
    }

    #[test]
    fn test_hover_only_without_selection() {
        let (_, _, lifecycle) = scene(&["A"]);
        let mut outline = OutlineController::new(OutlineConfig::default());
        assert!(outline.update(&BTreeSet::new(), Some("A"), &lifecycle));
        assert_eq!(outline.state().kind, OutlineKind::Hover);
        assert_eq!(outline.state().edge_strength, 2.5);
    }

    #[test]
    fn test_unresolvable_targets_disable_pass() {
        let (_, _, lifecycle) = scene(&["A"]);
        let mut outline = OutlineController::new(OutlineConfig::default());
        assert!(!outline.update(&select(&["GONE"]), Some("A"), &lifecycle));
        assert_eq!(outline.state().kind, OutlineKind::None);
        assert_eq!(outline.state().edge_strength, 0.0);
        assert!(!outline.state().is_active());
    }

    #[test]
    fn test_unchanged_inputs_do_not_report_change() {
        let (_, _, lifecycle) = scene(&["A"]);
        let mut outline = OutlineController::new(OutlineConfig::default());
        assert!(outline.update(&select(&["A"]), None, &lifecycle));
        assert!(!outline.update(&select(&["A"]), None, &lifecycle));
        assert!(outline.update(&BTreeSet::new(), None, &lifecycle));
    }
}
