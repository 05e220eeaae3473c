use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::color::Rgb;

/// Smallest dimension a synthesized primitive may have.
pub const MIN_DIMENSION: f32 = 0.01;

/// Kind of equipment on the terminal floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentType {
    Building,
    Crane,
    Tank,
    Pipe,
    Valve,
    Terrain,
}

impl EquipmentType {
    pub const ALL: [EquipmentType; 6] = [
        EquipmentType::Building,
        EquipmentType::Crane,
        EquipmentType::Tank,
        EquipmentType::Pipe,
        EquipmentType::Valve,
        EquipmentType::Terrain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::Building => "building",
            EquipmentType::Crane => "crane",
            EquipmentType::Tank => "tank",
            EquipmentType::Pipe => "pipe",
            EquipmentType::Valve => "valve",
            EquipmentType::Terrain => "terrain",
        }
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimensions of the primitive an equipment item is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeParams {
    /// Axis-aligned box, full extents along x/y/z.
    Box { size: [f32; 3] },
    /// Upright cylinder centered on its position.
    Cylinder { radius: f32, height: f32 },
    Sphere { radius: f32 },
}

impl ShapeParams {
    /// Full extents of the shape's local bounding box.
    pub fn extent(&self) -> [f32; 3] {
        match *self {
            ShapeParams::Box { size } => size,
            ShapeParams::Cylinder { radius, height } => [radius * 2.0, height, radius * 2.0],
            ShapeParams::Sphere { radius } => [radius * 2.0; 3],
        }
    }

    /// Replace non-finite or too-small dimensions with `MIN_DIMENSION`.
    pub fn sanitized(&self) -> ShapeParams {
        let fix = |v: f32| {
            if v.is_finite() && v >= MIN_DIMENSION {
                v
            } else {
                MIN_DIMENSION
            }
        };
        match *self {
            ShapeParams::Box { size } => ShapeParams::Box {
                size: [fix(size[0]), fix(size[1]), fix(size[2])],
            },
            ShapeParams::Cylinder { radius, height } => ShapeParams::Cylinder {
                radius: fix(radius),
                height: fix(height),
            },
            ShapeParams::Sphere { radius } => ShapeParams::Sphere {
                radius: fix(radius),
            },
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.sanitized() != *self
    }
}

/// One piece of equipment as supplied by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique identifier, e.g. `TQ-101`.
    pub tag: String,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub position: [f32; 3],
    /// Euler XYZ rotation in radians.
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    pub shape: ShapeParams,
    #[serde(default)]
    pub operational_state: String,
    #[serde(default)]
    pub product: String,
    pub base_color: Rgb,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub details: String,
}

impl Equipment {
    pub fn new(
        tag: impl Into<String>,
        equipment_type: EquipmentType,
        position: [f32; 3],
        shape: ShapeParams,
        base_color: Rgb,
    ) -> Self {
        Self {
            tag: tag.into(),
            equipment_type,
            position,
            rotation: None,
            shape,
            operational_state: String::new(),
            product: String::new(),
            base_color,
            system: String::new(),
            area: String::new(),
            details: String::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.operational_state = state.into();
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = Some(rotation);
        self
    }
}

/// Drop duplicate tags (first occurrence wins) and clamp degenerate shapes.
///
/// Returns the cleaned snapshot; every correction is logged.
pub fn sanitize_snapshot(items: &[Equipment]) -> Vec<Equipment> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());

    for item in items {
        if !seen.insert(item.tag.as_str()) {
            tracing::warn!(tag = %item.tag, "duplicate equipment tag ignored");
            continue;
        }
        let mut item = item.clone();
        if item.shape.is_degenerate() {
            tracing::warn!(tag = %item.tag, shape = ?item.shape, "degenerate shape clamped");
            item.shape = item.shape.sanitized();
        }
        if !item.position.iter().all(|v| v.is_finite()) {
            tracing::warn!(tag = %item.tag, "non-finite position reset to origin");
            item.position = [0.0; 3];
        }
        out.push(item);
    }

    out
}
