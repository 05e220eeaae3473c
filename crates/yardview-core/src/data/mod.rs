//! Data model consumed by the scene engine.
//!
//! Equipment, layers, and annotations are owned by the surrounding
//! application. The engine only ever sees immutable snapshots of them;
//! everything here is `serde` friendly so snapshots can be handed over
//! as JSON.

mod annotation;
mod camera;
mod color;
mod equipment;
mod layers;

pub use annotation::Annotation;
pub use camera::CameraState;
pub use color::Rgb;
pub use equipment::{sanitize_snapshot, Equipment, EquipmentType, ShapeParams, MIN_DIMENSION};
pub use layers::{Layer, LayerTable, LayerTarget};
