//! # YardView Core
//!
//! Core types and utilities shared by the YardView crates.
//! Provides the equipment/layer data model handed to the scene engine,
//! the error taxonomy, the scene event bus, and shared-handle aliases.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod types;

pub use data::{
    Annotation, CameraState, Equipment, EquipmentType, Layer, LayerTable, LayerTarget, Rgb,
    ShapeParams,
};

pub use error::{DataError, Result, SceneError};

// Re-export event bus for convenience
pub use event_bus::{EventBus, EventCategory, EventFilter, SceneEvent, SubscriptionId};

pub use types::{
    shared, shared_none, DataCallback, Shared, SharedOption, SharedVec, UiCallback,
};
