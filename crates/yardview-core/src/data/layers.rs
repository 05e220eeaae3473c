use serde::{Deserialize, Serialize};

use super::equipment::EquipmentType;
use crate::error::DataError;

/// What a layer governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerTarget {
    /// Every equipment item of one type.
    Equipment(EquipmentType),
    /// Master switch over all equipment types.
    All,
    /// The ground plane.
    Terrain,
    /// Annotation label overlays.
    Annotations,
}

/// Visibility toggle shown in the layer panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub target: LayerTarget,
    pub visible: bool,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, target: LayerTarget) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            target,
            visible: true,
        }
    }
}

/// Ordered set of layers.
///
/// Equipment is visible when the `All` layer (if any) is visible and every
/// layer targeting its type is visible. Terrain-typed equipment also follows
/// the `Terrain` layer. A type with no governing layer is visible.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerTable {
    layers: Vec<Layer>,
}

impl LayerTable {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// One layer per equipment type plus terrain and annotations, all visible.
    pub fn with_default_layers() -> Self {
        let mut layers = vec![Layer::new("all", "All equipment", LayerTarget::All)];
        layers.extend(
            [
                (EquipmentType::Building, "buildings", "Buildings"),
                (EquipmentType::Crane, "cranes", "Cranes"),
                (EquipmentType::Tank, "tanks", "Tanks"),
                (EquipmentType::Pipe, "pipes", "Pipes"),
                (EquipmentType::Valve, "valves", "Valves"),
            ]
            .into_iter()
            .map(|(ty, id, name)| Layer::new(id, name, LayerTarget::Equipment(ty))),
        );
        layers.push(Layer::new("terrain", "Terrain", LayerTarget::Terrain));
        layers.push(Layer::new(
            "annotations",
            "Annotations",
            LayerTarget::Annotations,
        ));
        Self { layers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.get(id).map(|l| l.visible)
    }

    /// Set a layer's visibility, returning the previous value.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<bool, DataError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| DataError::UnknownLayer(id.to_string()))?;
        Ok(std::mem::replace(&mut layer.visible, visible))
    }

    fn target_visible(&self, target: LayerTarget) -> bool {
        self.layers
            .iter()
            .filter(|l| l.target == target)
            .all(|l| l.visible)
    }

    pub fn is_type_visible(&self, equipment_type: EquipmentType) -> bool {
        if !self.target_visible(LayerTarget::All) {
            return false;
        }
        if equipment_type == EquipmentType::Terrain && !self.is_terrain_visible() {
            return false;
        }
        self.target_visible(LayerTarget::Equipment(equipment_type))
    }

    pub fn is_terrain_visible(&self) -> bool {
        self.target_visible(LayerTarget::Terrain)
    }

    pub fn are_annotations_visible(&self) -> bool {
        self.target_visible(LayerTarget::Annotations)
    }

    /// Visibility of every layer, in table order. Used as a cheap change key.
    pub fn visibility_mask(&self) -> Vec<bool> {
        self.layers.iter().map(|l| l.visible).collect()
    }
}
